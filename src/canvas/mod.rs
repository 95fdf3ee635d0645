//! # Interactive Canvas Rendering
//!
//! Draws a laid-out slide onto any [`Canvas`] (the browser's 2D context via
//! the wasm bridge, or a [`DisplayList`] in tests and previews). Unlike the
//! rasterizer, this path marks overflowing text boxes with a red border so
//! the editor can warn the user, and it remembers the last frame so a click
//! can be mapped back to the text box under the pointer.

use serde::Serialize;

use crate::error::{CarouselError, Result};
use crate::layout::{LayoutItem, SlideLayout, SlideLayoutEngine};
use crate::model::Slide;
use crate::style::{BrandKit, Color, StyleKit};
use crate::text::fit::MaxLinesPolicy;
use crate::text::{FontSpec, TextMeasure};

/// Stroke width of the overflow border, in canvas pixels.
const OVERFLOW_BORDER_WIDTH: f64 = 4.0;

/// The drawing operations the renderer needs from a backend.
///
/// Coordinates are already scaled to the target surface. `fill_text` places
/// the top of the em box at `y`, like a canvas with `textBaseline = "top"`.
pub trait Canvas {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color, line_width: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec, color: Color);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        line_width: f64,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        font: FontSpec,
        color: Color,
    },
}

/// A canvas that records what was drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for DisplayList {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            color,
            line_width,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
            color,
        });
    }
}

/// Renders slides for the editor and for thumbnails.
pub struct LayerRenderer<'m> {
    metrics: &'m dyn TextMeasure,
    policy: MaxLinesPolicy,
    scale: f64,
    interactive: bool,
    on_select: Option<Box<dyn FnMut(&str) + 'm>>,
    last_frame: Option<SlideLayout>,
}

impl<'m> LayerRenderer<'m> {
    /// Full-size editor renderer with overflow indicators.
    pub fn new(metrics: &'m dyn TextMeasure) -> Self {
        Self {
            metrics,
            policy: MaxLinesPolicy::default(),
            scale: 1.0,
            interactive: true,
            on_select: None,
            last_frame: None,
        }
    }

    /// Non-interactive renderer at reduced scale. No overflow indicator and
    /// clicks never select anything.
    pub fn preview(metrics: &'m dyn TextMeasure, scale: f64) -> Self {
        Self {
            scale,
            interactive: false,
            ..Self::new(metrics)
        }
    }

    pub fn with_policy(mut self, policy: MaxLinesPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Called with the layer id when a click lands on a text box.
    pub fn on_select(mut self, callback: impl FnMut(&str) + 'm) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    /// Lay the slide out and draw it. Returns the frame that was drawn.
    ///
    /// Missing text metrics do not fail the render: text is drawn at
    /// `max_font` unfitted until a measuring context is available.
    pub fn render(
        &mut self,
        slide: &Slide,
        kit: &StyleKit,
        brand: Option<&BrandKit>,
        canvas: &mut dyn Canvas,
    ) -> Result<&SlideLayout> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(CarouselError::Precondition(format!(
                "preview scale must be positive, got {}",
                self.scale
            )));
        }
        let layout = SlideLayoutEngine::new(self.metrics)
            .with_policy(self.policy)
            .degrade_when_unmeasured(true)
            .layout(slide, kit, brand)?;

        self.paint(&layout, canvas);
        Ok(&*self.last_frame.insert(layout))
    }

    fn paint(&self, layout: &SlideLayout, canvas: &mut dyn Canvas) {
        let s = self.scale;
        for item in &layout.items {
            match item {
                LayoutItem::Background { color } => {
                    canvas.fill_rect(0.0, 0.0, layout.width * s, layout.height * s, *color);
                }
                LayoutItem::TextBox(text_box) => {
                    let font = text_box.font.at_size(text_box.font.size * s);
                    for line in &text_box.lines {
                        canvas.fill_text(&line.text, line.x * s, line.y * s, &font, text_box.color);
                    }
                    if self.interactive && text_box.fit.overflow {
                        let p = text_box.position;
                        canvas.stroke_rect(
                            p.x * s,
                            p.y * s,
                            p.width * s,
                            p.height * s,
                            Color::OVERFLOW,
                            OVERFLOW_BORDER_WIDTH * s,
                        );
                    }
                }
            }
        }
    }

    /// The topmost text box at a point in surface coordinates.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&str> {
        let frame = self.last_frame.as_ref()?;
        let (cx, cy) = (x / self.scale, y / self.scale);
        frame
            .text_boxes()
            .rev()
            .find(|text_box| text_box.position.contains(cx, cy))
            .map(|text_box| text_box.id.as_str())
    }

    /// Handle a click: hit-test and report the selected layer to the callback.
    pub fn click(&mut self, x: f64, y: f64) -> Option<String> {
        if !self.interactive {
            return None;
        }
        let id = self.hit_test(x, y)?.to_string();
        log::debug!("selected text box {}", id);
        if let Some(callback) = self.on_select.as_mut() {
            callback(&id);
        }
        Some(id)
    }

    pub fn last_frame(&self) -> Option<&SlideLayout> {
        self.last_frame.as_ref()
    }
}
