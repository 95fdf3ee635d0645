//! # Slide Rasterizer
//!
//! Paints a laid-out slide onto an offscreen RGBA bitmap and encodes it as
//! PNG. This is the export path: same layout as the editor, no overflow
//! indicator, no interactivity.
//!
//! Glyphs come from the registered TrueType outlines. Text set in the
//! built-in fallback face (metrics only) is greeked: each glyph becomes a bar
//! of its advance width so the layout stays visible in previews.

use std::sync::Arc;

use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Transform};
use ttf_parser::{GlyphId, OutlineBuilder};

use crate::error::{CarouselError, Result};
use crate::font::{FontContext, FontData, FontRegistry};
use crate::layout::{LayoutItem, SlideLayout, SlideLayoutEngine, TextBoxLayout};
use crate::model::{Slide, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::style::{BrandKit, Color, StyleKit};
use crate::text::fit::MaxLinesPolicy;

/// Height of a greeked bar, as a fraction of the font size (Helvetica x-height).
const GREEK_HEIGHT: f64 = 0.523;
/// Share of each advance covered by a greeked bar.
const GREEK_COVERAGE: f64 = 0.85;

/// Renders slides to PNG bytes.
pub struct SlideRasterizer {
    fonts: FontContext,
    policy: MaxLinesPolicy,
}

impl SlideRasterizer {
    pub fn new(registry: Arc<FontRegistry>) -> Self {
        Self {
            fonts: FontContext::with_registry(registry),
            policy: MaxLinesPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MaxLinesPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Lay a slide out with the registry's metrics.
    pub fn layout(&self, slide: &Slide, kit: &StyleKit, brand: Option<&BrandKit>) -> Result<SlideLayout> {
        SlideLayoutEngine::new(&self.fonts)
            .with_policy(self.policy)
            .layout(slide, kit, brand)
    }

    /// Render a slide at full 1080×1350 size.
    pub fn render_png(&self, slide: &Slide, kit: &StyleKit, brand: Option<&BrandKit>) -> Result<Vec<u8>> {
        self.render_scaled(slide, kit, brand, 1.0)
    }

    /// Render a reduced-size preview, e.g. `scale = 0.25` for a 270×338 thumbnail.
    pub fn render_thumbnail(
        &self,
        slide: &Slide,
        kit: &StyleKit,
        brand: Option<&BrandKit>,
        scale: f64,
    ) -> Result<Vec<u8>> {
        self.render_scaled(slide, kit, brand, scale)
    }

    fn render_scaled(
        &self,
        slide: &Slide,
        kit: &StyleKit,
        brand: Option<&BrandKit>,
        scale: f64,
    ) -> Result<Vec<u8>> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CarouselError::Precondition(format!(
                "raster scale must be positive, got {}",
                scale
            )));
        }
        let layout = self.layout(slide, kit, brand)?;
        let pixmap = self.paint(&layout, scale)?;
        pixmap
            .encode_png()
            .map_err(|e| CarouselError::RenderError(format!("png encode failed: {}", e)))
    }

    /// Paint a layout onto a fresh bitmap.
    pub fn paint(&self, layout: &SlideLayout, scale: f64) -> Result<Pixmap> {
        let width_px = (CANVAS_WIDTH as f64 * scale).round().max(1.0) as u32;
        let height_px = (CANVAS_HEIGHT as f64 * scale).round().max(1.0) as u32;
        let mut pixmap = Pixmap::new(width_px, height_px).ok_or_else(|| {
            CarouselError::RenderError(format!("invalid raster size {}x{}", width_px, height_px))
        })?;
        let base = Transform::from_scale(scale as f32, scale as f32);

        for item in &layout.items {
            match item {
                LayoutItem::Background { color } => {
                    pixmap.fill(to_sk_color(*color));
                }
                LayoutItem::TextBox(text_box) => {
                    self.draw_text_box(&mut pixmap, text_box, base);
                }
            }
        }
        Ok(pixmap)
    }

    fn draw_text_box(&self, pixmap: &mut Pixmap, text_box: &TextBoxLayout, base: Transform) {
        let font = self.fonts.resolve(&text_box.font);
        let size = text_box.font.size;
        let ascent = font.ascent(size);
        let paint = fill_paint(text_box.color);

        // Parse once per box; the Arc keeps the bytes alive for the borrow.
        let custom = match font.as_ref() {
            FontData::Custom(custom) => Some(Arc::clone(&custom.data)),
            FontData::Standard(_) => None,
        };
        let face = custom
            .as_deref()
            .and_then(|data| ttf_parser::Face::parse(data, 0).ok());
        if custom.is_some() && face.is_none() {
            log::warn!("registered face for {} failed to re-parse, greeking text", text_box.font.family);
        }

        for line in &text_box.lines {
            let baseline = line.y + ascent;
            match (&face, font.as_ref()) {
                (Some(face), FontData::Custom(custom)) => {
                    let upem = custom.metrics.units_per_em.max(1) as f64;
                    let k = size / upem;
                    let mut pen_x = line.x;
                    for ch in line.text.chars() {
                        if let Some(&gid) = custom.metrics.glyph_ids.get(&ch) {
                            if let Some(path) = glyph_path(face, gid) {
                                let local = Transform::from_row(
                                    k as f32,
                                    0.0,
                                    0.0,
                                    -k as f32,
                                    pen_x as f32,
                                    baseline as f32,
                                );
                                pixmap.fill_path(&path, &paint, FillRule::Winding, base.pre_concat(local), None);
                            }
                        }
                        pen_x += font.char_width(ch, size);
                    }
                }
                _ => {
                    let mut pen_x = line.x;
                    for ch in line.text.chars() {
                        let advance = font.char_width(ch, size);
                        if !ch.is_whitespace() {
                            let height = GREEK_HEIGHT * size;
                            if let Some(rect) = Rect::from_xywh(
                                pen_x as f32,
                                (baseline - height) as f32,
                                (advance * GREEK_COVERAGE) as f32,
                                height as f32,
                            ) {
                                pixmap.fill_rect(rect, &paint, base, None);
                            }
                        }
                        pen_x += advance;
                    }
                }
            }
        }
    }
}

fn glyph_path(face: &ttf_parser::Face<'_>, gid: u16) -> Option<Path> {
    let mut builder = GlyphPathBuilder {
        builder: PathBuilder::new(),
    };
    face.outline_glyph(GlyphId(gid), &mut builder)?;
    builder.builder.finish()
}

/// Collects a glyph outline in font units.
struct GlyphPathBuilder {
    builder: PathBuilder,
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn fill_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_sk_color(color));
    paint.anti_alias = true;
    paint
}

fn to_sk_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}
