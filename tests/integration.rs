//! Integration tests for the carousel rendering pipeline.
//!
//! These tests exercise the full path from job JSON to PNG and PDF output.
//! They verify:
//! - Auto-fit picks the documented sizes and flags overflow
//! - Editor and export paths agree on where lines go
//! - PNG output is full size and deterministic
//! - PDF output has one 1080×1350 page per slide, in order
//! - Font registration is idempotent across threads
//! - Exports retry and report failure
//!
//! Tests that need a real TrueType face look for DejaVu Sans and skip when
//! it is not installed.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use carousel::canvas::{DisplayList, DrawCommand, LayerRenderer};
use carousel::error::CarouselError;
use carousel::export::{ArtifactStore, ExportFormat, ExportJob, ExportStatus, Exporter, MemoryStore};
use carousel::font::{FontContext, FontKey, FontRegistry};
use carousel::model::*;
use carousel::raster::SlideRasterizer;
use carousel::style::*;
use carousel::text::fit::{AutoFit, FitBox};
use carousel::text::FontSpec;

// ─── Helpers ────────────────────────────────────────────────────

const DEJAVU: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn dejavu() -> Option<Vec<u8>> {
    if !Path::new(DEJAVU).exists() {
        eprintln!("SKIPPING: {} not installed", DEJAVU);
        return None;
    }
    std::fs::read(DEJAVU).ok()
}

fn text_box(id: &str, y: f64, height: f64, max_font: u32, min_font: u32) -> Layer {
    Layer::TextBox(TextBoxLayer {
        id: id.to_string(),
        position: LayerPosition {
            x: 60.0,
            y,
            width: 960.0,
            height,
        },
        constraints: TextConstraints {
            max_font,
            min_font,
            max_lines: None,
        },
        align: TextAlign::Left,
        bullet_style: None,
    })
}

fn slide(headline: &str) -> Slide {
    let mut content = SlideContent::new();
    content.insert("headline".to_string(), ContentValue::Text(headline.to_string()));
    Slide {
        blueprint: LayersBlueprint {
            layers: vec![Layer::Background, text_box("headline", 100.0, 400.0, 72, 24)],
        },
        content,
    }
}

fn job(slides: Vec<Slide>) -> RenderJob {
    RenderJob {
        slides,
        style_kit: StyleKit::default(),
        brand_kit: None,
        fonts: vec![],
        options: Default::default(),
    }
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

const LONG: &str = "Consistency beats intensity when you are building an audience on LinkedIn, \
    so publish on a schedule you can actually keep, reply to every comment within the first hour, \
    and reuse your best ideas in new formats.";

// ─── Auto-fit ───────────────────────────────────────────────────

#[test]
fn test_short_headline_keeps_max_font() {
    let ctx = FontContext::new();
    let result = AutoFit::new(&ctx)
        .solve(
            "Hi",
            &TextConstraints {
                max_font: 72,
                min_font: 24,
                max_lines: None,
            },
            FitBox {
                width: 960.0,
                height: 400.0,
            },
            &FontSpec::new("Helvetica", 700, 72.0),
            1.2,
        )
        .unwrap();
    assert_eq!(result.font_size, 72);
    assert!(!result.overflow);
}

#[test]
fn test_long_text_in_strip_overflows_at_min() {
    let ctx = FontContext::new();
    let result = AutoFit::new(&ctx)
        .solve(
            LONG,
            &TextConstraints {
                max_font: 72,
                min_font: 24,
                max_lines: None,
            },
            FitBox {
                width: 960.0,
                height: 60.0,
            },
            &FontSpec::new("Helvetica", 400, 72.0),
            1.2,
        )
        .unwrap();
    assert_eq!(result.font_size, 24);
    assert!(result.overflow);
}

#[test]
fn test_fit_is_monotonic_in_max_font() {
    let ctx = FontContext::new();
    let fit = AutoFit::new(&ctx);
    let mut previous = 0;
    for max_font in (24..=96).step_by(8) {
        let result = fit
            .solve(
                LONG,
                &TextConstraints {
                    max_font,
                    min_font: 24,
                    max_lines: None,
                },
                FitBox {
                    width: 960.0,
                    height: 300.0,
                },
                &FontSpec::new("Helvetica", 400, max_font as f64),
                1.2,
            )
            .unwrap();
        assert!(result.font_size >= previous);
        assert!((24..=max_font).contains(&result.font_size));
        previous = result.font_size;
    }
}

// ─── Rendering paths ────────────────────────────────────────────

#[test]
fn test_editor_and_export_agree_on_layout() {
    let registry = Arc::new(FontRegistry::new());
    let ctx = FontContext::with_registry(Arc::clone(&registry));
    let slide = slide(LONG);
    let kit = StyleKit::default();

    let mut renderer = LayerRenderer::new(&ctx);
    let editor = renderer
        .render(&slide, &kit, None, &mut DisplayList::new())
        .unwrap()
        .clone();
    let export = SlideRasterizer::new(registry).layout(&slide, &kit, None).unwrap();
    assert_eq!(editor, export);
}

#[test]
fn test_numbered_list_layout() {
    let mut s = slide("Agenda");
    s.blueprint.layers.push(Layer::TextBox(TextBoxLayer {
        bullet_style: Some(BulletStyle::Numbered),
        ..match text_box("body", 600.0, 600.0, 40, 20) {
            Layer::TextBox(t) => t,
            Layer::Background => unreachable!(),
        }
    }));
    s.content.insert(
        "body".to_string(),
        ContentValue::Items(vec!["A".to_string(), "B".to_string()]),
    );

    let ctx = FontContext::new();
    let mut canvas = DisplayList::new();
    LayerRenderer::new(&ctx)
        .render(&s, &StyleKit::default(), None, &mut canvas)
        .unwrap();
    let texts: Vec<&str> = canvas
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillText { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["Agenda", "1. A", "2. B"]);
}

#[test]
fn test_png_slides_full_size_and_deterministic() {
    let job = job(vec![slide("One"), slide(LONG)]);
    let first = carousel::render_slides(&job, Arc::new(FontRegistry::new())).unwrap();
    let second = carousel::render_slides(&job, Arc::new(FontRegistry::new())).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    for png in &first {
        let img = image::load_from_memory(png).unwrap();
        assert_eq!((img.width(), img.height()), (1080, 1350));
    }
}

#[test]
fn test_brand_background_in_png() {
    let mut job = job(vec![slide("Brand")]);
    job.brand_kit = Some(BrandKit {
        colors: BrandColors {
            background: Some(Color::from_hex("#0a66c2").unwrap()),
            ..Default::default()
        },
    });
    let pngs = carousel::render_slides(&job, Arc::new(FontRegistry::new())).unwrap();
    let img = image::load_from_memory(&pngs[0]).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(5, 1345).0, [0x0a, 0x66, 0xc2, 255]);
}

#[test]
fn test_custom_font_draws_outlines() {
    let Some(data) = dejavu() else { return };
    let registry = Arc::new(FontRegistry::new());
    registry.register("Helvetica", 700, data).unwrap();

    let png = SlideRasterizer::new(registry)
        .render_png(&slide("Hi"), &StyleKit::default(), None)
        .unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    let inked = (100..200)
        .flat_map(|y| (60..200).map(move |x| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0[0] < 100)
        .count();
    assert!(inked > 200, "expected glyph coverage, got {} dark pixels", inked);
}

// ─── PDF ────────────────────────────────────────────────────────

#[test]
fn test_json_job_to_pdf() {
    let json = serde_json::to_string(&job(vec![slide("One"), slide("Two"), slide("Three")])).unwrap();
    let pdf = carousel::render_json(&json).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.7"));
    assert_eq!(count(&pdf, b"/Count 3"), 1);
    assert_eq!(count(&pdf, b"/MediaBox [0 0 1080 1350]"), 3);
    assert!(pdf.ends_with(b"%%EOF\n"));
}

#[test]
fn test_example_style_json_parses() {
    let json = r##"{
        "slides": [{
            "blueprint": { "layers": [
                { "type": "background" },
                { "type": "text_box", "id": "body",
                  "position": { "x": 60, "y": 600, "width": 960, "height": 600 },
                  "constraints": { "max_font": 44, "min_font": 24, "max_lines": 6 },
                  "bulletStyle": "disc", "align": "center" }
            ]},
            "content": { "body": ["One", "Two"] }
        }],
        "styleKit": {
            "typography": { "headlineFont": "Inter", "bodyFont": "Inter" },
            "colors": { "background": "#fff", "foreground": "#111111", "accent": "#3b82f6" },
            "spacingRules": { "lineHeight": 1.3 }
        },
        "options": { "maxLinesPolicy": "enforce", "scale": 0.5 }
    }"##;
    let job = carousel::parse_job(json).unwrap();
    assert_eq!(job.style_kit.typography.body_weight, 400);
    let pngs = carousel::render_slides(&job, Arc::new(FontRegistry::new())).unwrap();
    let img = image::load_from_memory(&pngs[0]).unwrap();
    assert_eq!((img.width(), img.height()), (540, 675));
}

// ─── Fonts ──────────────────────────────────────────────────────

#[test]
fn test_concurrent_registration_is_idempotent() {
    let Some(data) = dejavu() else { return };
    use base64::Engine;
    let entry = FontEntry {
        family: "DejaVu Sans".to_string(),
        src: base64::engine::general_purpose::STANDARD.encode(&data),
        weight: 400,
    };
    let registry = Arc::new(FontRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let entry = entry.clone();
            thread::spawn(move || registry.register_entry(&entry).unwrap())
        })
        .collect();
    let inserted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&inserted| inserted)
        .count();

    assert_eq!(inserted, 1);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&FontKey::new("DejaVu Sans", 400)));
}

// ─── Export ─────────────────────────────────────────────────────

struct AlwaysDown;

impl ArtifactStore for AlwaysDown {
    fn upload(&self, _: &str, _: &[u8], _: &str) -> carousel::error::Result<String> {
        Err(CarouselError::StorageError("connection refused".to_string()))
    }
}

#[test]
fn test_export_pdf_round_trip() {
    let store = MemoryStore::new();
    let export = ExportJob {
        id: "deck-42".to_string(),
        format: ExportFormat::Pdf,
        job: job(vec![slide("One"), slide("Two")]),
    };
    let status = Exporter::new(Arc::new(FontRegistry::new())).run(&export, &store);
    assert_eq!(
        status,
        ExportStatus::Done {
            urls: vec!["memory://exports/deck-42/carousel.pdf".to_string()]
        }
    );
    let (_, _, pdf) = &store.artifacts()[0];
    assert_eq!(count(pdf, b"/Type /Page "), 2);
}

#[test]
fn test_export_gives_up_after_max_attempts() {
    let export = ExportJob {
        id: "deck-7".to_string(),
        format: ExportFormat::Png,
        job: job(vec![slide("One")]),
    };
    let status = Exporter::new(Arc::new(FontRegistry::new())).run(&export, &AlwaysDown);
    match status {
        ExportStatus::Failed { message, attempts } => {
            assert_eq!(attempts, 3);
            assert!(message.contains("connection refused"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}
