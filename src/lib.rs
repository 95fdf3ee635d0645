//! # Carousel
//!
//! The auto-fit text layout and rendering core behind a carousel slide
//! editor.
//!
//! A slide is a fixed 1080×1350 canvas with a stack of layers. Text boxes
//! have a fixed size and a min/max font range; the engine finds the largest
//! size at which the wrapped content fits, and flags overflow when even the
//! minimum does not. The same fitting code runs in three places: the
//! interactive editor canvas, the headless PNG rasterizer, and the PDF
//! export built from those PNGs.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Slides, layers, content, fonts
//!       ↓
//!   [style]    — Style kit + brand kit → resolved colors and faces
//!       ↓
//!   [text]     — TextMeasure, line breaking, auto-fit solver
//!       ↓
//!   [layout]   — Positioned lines per text box
//!       ↓
//!   [canvas]   — Interactive renderer (overflow border, hit testing)
//!   [raster]   — Headless PNG via tiny-skia
//!       ↓
//!   [pdf]      — One page per slide image
//!       ↓
//!   [export]   — Upload, status, retry
//! ```

pub mod canvas;
pub mod config;
pub mod error;
pub mod export;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod raster;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::sync::Arc;

use error::{CarouselError, Result};
use font::FontRegistry;
use model::RenderJob;
use pdf::PdfWriter;
use raster::SlideRasterizer;

/// Parse a render job from JSON.
pub fn parse_job(json: &str) -> Result<RenderJob> {
    Ok(serde_json::from_str(json)?)
}

/// Rasterize every slide of a job, in order, to PNG bytes.
///
/// Fonts listed in the job are registered first; registration is idempotent
/// so a shared registry can serve many jobs.
pub fn render_slides(job: &RenderJob, registry: Arc<FontRegistry>) -> Result<Vec<Vec<u8>>> {
    job.options.validate()?;
    for entry in &job.fonts {
        registry.register_entry(entry)?;
    }

    let rasterizer = SlideRasterizer::new(registry).with_policy(job.options.max_lines_policy);
    job.slides
        .iter()
        .enumerate()
        .map(|(i, slide)| {
            log::debug!("rasterizing slide {}/{}", i + 1, job.slides.len());
            rasterizer.render_thumbnail(slide, &job.style_kit, job.brand_kit.as_ref(), job.options.scale)
        })
        .collect()
}

/// Render a job to a multi-page PDF.
pub fn render_pdf(job: &RenderJob, registry: Arc<FontRegistry>) -> Result<Vec<u8>> {
    if job.slides.is_empty() {
        return Err(CarouselError::Precondition(
            "render job has no slides".to_string(),
        ));
    }
    let images = render_slides(job, registry)?;
    PdfWriter::new().assemble(&images, &job.options.metadata)
}

/// Render a job described as JSON to PDF bytes, with a fresh font registry.
pub fn render_json(json: &str) -> Result<Vec<u8>> {
    let job = parse_job(json)?;
    render_pdf(&job, Arc::new(FontRegistry::new()))
}
