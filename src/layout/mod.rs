//! # Slide Layout
//!
//! Resolves a slide (blueprint + content) against a style kit into positioned
//! lines. Both the interactive [`LayerRenderer`](crate::canvas::LayerRenderer)
//! and the headless [`SlideRasterizer`](crate::raster::SlideRasterizer) paint
//! from the same [`SlideLayout`], so they can only differ in how glyphs are
//! shaped, never in where lines go.
//!
//! ```text
//! Slide + StyleKit (+ BrandKit)
//!       ↓
//!   per layer: resolve content → bullets → font (headline/body) → AutoFit
//!       ↓
//!   SlideLayout { background, text boxes with positioned lines }
//! ```

use serde::Serialize;

use crate::error::{CarouselError, Result};
use crate::model::{Layer, LayerPosition, Slide, TextBoxLayer, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::style::{BrandKit, Color, ResolvedColors, StyleKit, TextAlign};
use crate::text::fit::{AutoFit, FitBox, MaxLinesPolicy, TextFitResult};
use crate::text::{checked_width, FontSpec, TextMeasure};

/// A slide laid out on the 1080×1350 canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideLayout {
    pub width: f64,
    pub height: f64,
    pub colors: ResolvedColors,
    /// Drawable items in blueprint order.
    pub items: Vec<LayoutItem>,
}

impl SlideLayout {
    pub fn text_boxes(&self) -> impl DoubleEndedIterator<Item = &TextBoxLayout> {
        self.items.iter().filter_map(|item| match item {
            LayoutItem::TextBox(text_box) => Some(text_box),
            LayoutItem::Background { .. } => None,
        })
    }

    pub fn text_box(&self, id: &str) -> Option<&TextBoxLayout> {
        self.text_boxes().find(|text_box| text_box.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutItem {
    Background { color: Color },
    TextBox(TextBoxLayout),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBoxLayout {
    pub id: String,
    pub position: LayerPosition,
    pub align: TextAlign,
    /// Font at the fitted size.
    pub font: FontSpec,
    pub color: Color,
    /// Distance between consecutive line tops, in pixels.
    pub line_advance: f64,
    pub fit: TextFitResult,
    pub lines: Vec<PositionedLine>,
    /// True when the fit was skipped because no measurement was available.
    pub unmeasured: bool,
}

/// One wrapped line. `y` is the top of the line box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

/// Lays out slides with one measurement backend.
pub struct SlideLayoutEngine<'m> {
    metrics: &'m dyn TextMeasure,
    policy: MaxLinesPolicy,
    degrade_unmeasured: bool,
}

impl<'m> SlideLayoutEngine<'m> {
    pub fn new(metrics: &'m dyn TextMeasure) -> Self {
        Self {
            metrics,
            policy: MaxLinesPolicy::default(),
            degrade_unmeasured: false,
        }
    }

    pub fn with_policy(mut self, policy: MaxLinesPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Lay text out at `max_font` without fitting when the backend reports
    /// [`CarouselError::MeasurementUnavailable`], instead of failing.
    pub fn degrade_when_unmeasured(mut self, degrade: bool) -> Self {
        self.degrade_unmeasured = degrade;
        self
    }

    pub fn layout(
        &self,
        slide: &Slide,
        kit: &StyleKit,
        brand: Option<&BrandKit>,
    ) -> Result<SlideLayout> {
        let colors = ResolvedColors::resolve(kit, brand);
        let mut items = Vec::with_capacity(slide.blueprint.layers.len());

        for layer in &slide.blueprint.layers {
            match layer {
                Layer::Background => items.push(LayoutItem::Background {
                    color: colors.background,
                }),
                Layer::TextBox(text_box) => {
                    if let Some(laid_out) = self.layout_text_box(slide, text_box, kit, colors)? {
                        items.push(LayoutItem::TextBox(laid_out));
                    }
                }
            }
        }

        Ok(SlideLayout {
            width: CANVAS_WIDTH as f64,
            height: CANVAS_HEIGHT as f64,
            colors,
            items,
        })
    }

    fn layout_text_box(
        &self,
        slide: &Slide,
        layer: &TextBoxLayer,
        kit: &StyleKit,
        colors: ResolvedColors,
    ) -> Result<Option<TextBoxLayout>> {
        let Some(content) = slide.content.get(&layer.id) else {
            log::trace!("layer {} has no content, skipping", layer.id);
            return Ok(None);
        };

        let (family, weight) = kit.font_for_layer(&layer.id);
        let base_font = FontSpec::new(family, weight, layer.constraints.max_font as f64);
        let line_height = kit.spacing_rules.line_height;
        let bounds = FitBox {
            width: layer.position.width,
            height: layer.position.height,
        };

        let fitted = AutoFit::new(self.metrics)
            .with_policy(self.policy)
            .fit_content(
                content,
                layer.bullet_style,
                &layer.constraints,
                bounds,
                &base_font,
                line_height,
            );

        let (fit, lines, unmeasured) = match fitted {
            Ok(fitted) => (fitted.result, fitted.lines, false),
            Err(CarouselError::MeasurementUnavailable(reason)) if self.degrade_unmeasured => {
                log::warn!(
                    "no text metrics for layer {} ({}), drawing at max_font unfitted",
                    layer.id,
                    reason
                );
                let text = content.to_text(layer.bullet_style);
                let lines = if content.is_blank() {
                    Vec::new()
                } else {
                    text.split('\n').map(str::to_string).collect()
                };
                let fit = TextFitResult {
                    font_size: layer.constraints.max_font,
                    overflow: false,
                };
                (fit, lines, true)
            }
            Err(e) => return Err(e),
        };

        let font = base_font.at_size(fit.font_size as f64);
        let line_advance = font.size * line_height;
        let mut unmeasured = unmeasured;
        let mut positioned = Vec::with_capacity(lines.len());
        for (i, text) in lines.into_iter().enumerate() {
            let measured = if unmeasured {
                None
            } else {
                match checked_width(self.metrics, &text, &font) {
                    Ok(width) => Some(width),
                    Err(CarouselError::MeasurementUnavailable(_)) if self.degrade_unmeasured => {
                        unmeasured = true;
                        None
                    }
                    Err(e) => return Err(e),
                }
            };
            // unmeasured lines cannot be aligned, they start at the box edge
            let (x, width) = match measured {
                Some(width) => (
                    layer.align.line_x(layer.position.x, layer.position.width, width),
                    width,
                ),
                None => (layer.position.x, 0.0),
            };
            positioned.push(PositionedLine {
                text,
                x,
                y: layer.position.y + i as f64 * line_advance,
                width,
            });
        }

        Ok(Some(TextBoxLayout {
            id: layer.id.clone(),
            position: layer.position,
            align: layer.align,
            font,
            color: colors.foreground,
            line_advance,
            fit,
            lines: positioned,
            unmeasured,
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::model::{ContentValue, LayersBlueprint, TextConstraints};
    use crate::style::{BrandColors, BulletStyle};

    pub(crate) fn text_box(id: &str, y: f64, height: f64) -> TextBoxLayer {
        TextBoxLayer {
            id: id.to_string(),
            position: LayerPosition {
                x: 60.0,
                y,
                width: 960.0,
                height,
            },
            constraints: TextConstraints {
                max_font: 72,
                min_font: 24,
                max_lines: None,
            },
            align: TextAlign::Left,
            bullet_style: None,
        }
    }

    pub(crate) fn sample_slide() -> Slide {
        let mut body = text_box("body", 600.0, 600.0);
        body.bullet_style = Some(BulletStyle::Disc);
        body.constraints = TextConstraints {
            max_font: 40,
            min_font: 20,
            max_lines: None,
        };
        let mut content = crate::model::SlideContent::new();
        content.insert(
            "headline".to_string(),
            ContentValue::Text("Hi".to_string()),
        );
        content.insert(
            "body".to_string(),
            ContentValue::Items(vec!["A".to_string(), "B".to_string()]),
        );
        Slide {
            blueprint: LayersBlueprint {
                layers: vec![
                    Layer::Background,
                    Layer::TextBox(text_box("headline", 100.0, 400.0)),
                    Layer::TextBox(body),
                    Layer::TextBox(text_box("footer", 1250.0, 60.0)),
                ],
            },
            content,
        }
    }

    #[test]
    fn test_layout_order_and_missing_content() {
        let ctx = FontContext::new();
        let layout = SlideLayoutEngine::new(&ctx)
            .layout(&sample_slide(), &StyleKit::default(), None)
            .unwrap();
        assert_eq!(layout.items.len(), 3, "footer has no content");
        assert!(matches!(layout.items[0], LayoutItem::Background { .. }));
        let ids: Vec<&str> = layout.text_boxes().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["headline", "body"]);
    }

    #[test]
    fn test_headline_uses_headline_face() {
        let ctx = FontContext::new();
        let layout = SlideLayoutEngine::new(&ctx)
            .layout(&sample_slide(), &StyleKit::default(), None)
            .unwrap();
        let headline = layout.text_box("headline").unwrap();
        assert_eq!(headline.font.weight, 700);
        assert_eq!(headline.fit.font_size, 72);
        let body = layout.text_box("body").unwrap();
        assert_eq!(body.font.weight, 400);
    }

    #[test]
    fn test_line_positions() {
        let ctx = FontContext::new();
        let layout = SlideLayoutEngine::new(&ctx)
            .layout(&sample_slide(), &StyleKit::default(), None)
            .unwrap();
        let body = layout.text_box("body").unwrap();
        assert_eq!(body.lines.len(), 2);
        assert_eq!(body.lines[0].text, "\u{2022} A");
        assert_eq!(body.lines[0].y, 600.0);
        let expected = 600.0 + body.fit.font_size as f64 * 1.2;
        assert!((body.lines[1].y - expected).abs() < 1e-9);
        assert_eq!(body.lines[0].x, 60.0);
    }

    #[test]
    fn test_alignment_uses_measured_width() {
        let ctx = FontContext::new();
        let mut slide = sample_slide();
        if let Layer::TextBox(headline) = &mut slide.blueprint.layers[1] {
            headline.align = TextAlign::Right;
        }
        let layout = SlideLayoutEngine::new(&ctx)
            .layout(&slide, &StyleKit::default(), None)
            .unwrap();
        let line = &layout.text_box("headline").unwrap().lines[0];
        // "Hi" in Helvetica-Bold is exactly one em wide
        assert!((line.width - 72.0).abs() < 1e-9);
        assert!((line.x - (60.0 + 960.0 - 72.0)).abs() < 1e-9);
    }

    #[test]
    fn test_brand_background_wins() {
        let ctx = FontContext::new();
        let brand = BrandKit {
            colors: BrandColors {
                background: Some(Color::rgb(0.0, 0.0, 0.0)),
                ..Default::default()
            },
        };
        let layout = SlideLayoutEngine::new(&ctx)
            .layout(&sample_slide(), &StyleKit::default(), Some(&brand))
            .unwrap();
        assert_eq!(
            layout.items[0],
            LayoutItem::Background {
                color: Color::rgb(0.0, 0.0, 0.0)
            }
        );
    }

    struct NoMetrics;

    impl TextMeasure for NoMetrics {
        fn measure_width(&self, _: &str, _: &FontSpec) -> Result<f64> {
            Err(CarouselError::MeasurementUnavailable(
                "canvas context not ready".to_string(),
            ))
        }
    }

    #[test]
    fn test_unavailable_metrics_propagate_by_default() {
        let mut slide = sample_slide();
        slide.content.insert(
            "headline".to_string(),
            ContentValue::Text("Two words".to_string()),
        );
        let err = SlideLayoutEngine::new(&NoMetrics)
            .layout(&slide, &StyleKit::default(), None)
            .unwrap_err();
        assert!(matches!(err, CarouselError::MeasurementUnavailable(_)));
    }

    #[test]
    fn test_unavailable_metrics_degrade_to_max_font() {
        let mut slide = sample_slide();
        slide.content.insert(
            "headline".to_string(),
            ContentValue::Text("Two words".to_string()),
        );
        let layout = SlideLayoutEngine::new(&NoMetrics)
            .degrade_when_unmeasured(true)
            .layout(&slide, &StyleKit::default(), None)
            .unwrap();
        let headline = layout.text_box("headline").unwrap();
        assert!(headline.unmeasured);
        assert_eq!(headline.fit.font_size, 72);
        assert_eq!(headline.lines[0].text, "Two words");
    }
}
