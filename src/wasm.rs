//! Browser bindings. Text is measured by a JavaScript callback, normally a
//! thin wrapper over `CanvasRenderingContext2D.measureText`, so the editor
//! fits text with the exact fonts the browser will draw.
//!
//! ```js
//! const measure = (text, font) => { ctx.font = font; return ctx.measureText(text).width; };
//! const { fontSize, overflow } = fitText(request, measure);
//! ```

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::canvas::{DisplayList, LayerRenderer};
use crate::error::{CarouselError, Result};
use crate::font::FontContext;
use crate::layout::SlideLayoutEngine;
use crate::model::{ContentValue, Slide, TextConstraints};
use crate::style::{BrandKit, BulletStyle, StyleKit};
use crate::text::fit::{AutoFit, FitBox, MaxLinesPolicy};
use crate::text::{FontSpec, TextMeasure};

/// `measureFn(text, cssFont) -> number`.
struct JsMeasure<'f> {
    func: &'f js_sys::Function,
}

impl TextMeasure for JsMeasure<'_> {
    fn measure_width(&self, text: &str, font: &FontSpec) -> Result<f64> {
        let value = self
            .func
            .call2(&JsValue::NULL, &JsValue::from_str(text), &JsValue::from_str(&font.css()))
            .map_err(|e| CarouselError::MeasurementUnavailable(format!("measureFn threw: {:?}", e)))?;
        value.as_f64().ok_or_else(|| {
            CarouselError::MeasurementUnavailable("measureFn did not return a number".to_string())
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitRequest {
    content: ContentValue,
    constraints: TextConstraints,
    width: f64,
    height: f64,
    font_family: String,
    #[serde(default = "default_weight")]
    font_weight: u32,
    #[serde(default = "default_line_height")]
    line_height: f64,
    #[serde(default)]
    bullet_style: Option<BulletStyle>,
    #[serde(default)]
    max_lines_policy: MaxLinesPolicy,
}

fn default_weight() -> u32 {
    400
}

fn default_line_height() -> f64 {
    1.2
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FitResponse {
    font_size: u32,
    overflow: bool,
    lines: Vec<String>,
}

fn to_js(e: CarouselError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn with_measure<T>(measure_fn: Option<js_sys::Function>, f: impl FnOnce(&dyn TextMeasure) -> T) -> T {
    match measure_fn.as_ref() {
        Some(func) => f(&JsMeasure { func }),
        None => f(&FontContext::new()),
    }
}

/// Fit one text box. Without `measureFn` the built-in Helvetica metrics are used.
#[wasm_bindgen(js_name = fitText)]
pub fn fit_text(request: JsValue, measure_fn: Option<js_sys::Function>) -> std::result::Result<JsValue, JsValue> {
    let req: FitRequest = serde_wasm_bindgen::from_value(request)?;
    let fitted = with_measure(measure_fn, |metrics| {
        AutoFit::new(metrics).with_policy(req.max_lines_policy).fit_content(
            &req.content,
            req.bullet_style,
            &req.constraints,
            FitBox {
                width: req.width,
                height: req.height,
            },
            &FontSpec::new(&req.font_family, req.font_weight, req.constraints.max_font as f64),
            req.line_height,
        )
    })
    .map_err(to_js)?;

    Ok(serde_wasm_bindgen::to_value(&FitResponse {
        font_size: fitted.result.font_size,
        overflow: fitted.result.overflow,
        lines: fitted.lines,
    })?)
}

/// Lay a slide out and return the positioned lines of every text box.
#[wasm_bindgen(js_name = layoutSlide)]
pub fn layout_slide(
    slide: JsValue,
    style_kit: JsValue,
    brand_kit: JsValue,
    measure_fn: Option<js_sys::Function>,
) -> std::result::Result<JsValue, JsValue> {
    let slide: Slide = serde_wasm_bindgen::from_value(slide)?;
    let kit: StyleKit = serde_wasm_bindgen::from_value(style_kit)?;
    let brand: Option<BrandKit> = serde_wasm_bindgen::from_value(brand_kit)?;

    let layout = with_measure(measure_fn, |metrics| {
        SlideLayoutEngine::new(metrics).layout(&slide, &kit, brand.as_ref())
    })
    .map_err(to_js)?;
    Ok(serde_wasm_bindgen::to_value(&layout)?)
}

/// Draw commands for one slide, to be replayed onto a 2D context.
/// `interactive` adds the overflow border; previews pass `false` and a scale.
#[wasm_bindgen(js_name = renderSlide)]
pub fn render_slide(
    slide: JsValue,
    style_kit: JsValue,
    brand_kit: JsValue,
    measure_fn: Option<js_sys::Function>,
    scale: f64,
    interactive: bool,
) -> std::result::Result<JsValue, JsValue> {
    let slide: Slide = serde_wasm_bindgen::from_value(slide)?;
    let kit: StyleKit = serde_wasm_bindgen::from_value(style_kit)?;
    let brand: Option<BrandKit> = serde_wasm_bindgen::from_value(brand_kit)?;

    let mut canvas = DisplayList::new();
    with_measure(measure_fn, |metrics| {
        let mut renderer = if interactive {
            LayerRenderer::new(metrics)
        } else {
            LayerRenderer::preview(metrics, scale)
        };
        renderer
            .render(&slide, &kit, brand.as_ref(), &mut canvas)
            .map(|_| ())
    })
    .map_err(to_js)?;
    Ok(serde_wasm_bindgen::to_value(&canvas.commands)?)
}

/// Render a job JSON to PDF bytes with the built-in metrics.
#[wasm_bindgen(js_name = renderPdf)]
pub fn render_pdf(json: &str) -> std::result::Result<Vec<u8>, JsValue> {
    crate::render_json(json).map_err(to_js)
}
