//! Auto-fit: the largest font size at which wrapped text fits a box.
//!
//! Binary search over the integer range `[min_font, max_font]`. A candidate
//! size fits when `lines * size * line_height <= box.height`; width is already
//! guaranteed by the line breaker, so height is the binding constraint.
//! Overflow is reported separately by re-wrapping at `min_font`.

use serde::{Deserialize, Serialize};

use super::{break_lines, FontSpec, TextMeasure};
use crate::error::{CarouselError, Result};
use crate::model::{ContentValue, TextConstraints};
use crate::style::BulletStyle;

/// How `max_lines` in [`TextConstraints`] is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaxLinesPolicy {
    /// Only height decides the fit; `max_lines` is informational.
    #[default]
    Advisory,
    /// A size also has to wrap into at most `max_lines` lines.
    Enforce,
}

/// Outcome of fitting one text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFitResult {
    pub font_size: u32,
    /// The text still exceeds the box at `min_font`.
    pub overflow: bool,
}

/// A fit result together with the lines wrapped at the chosen size.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub result: TextFitResult,
    /// Empty when there was no content.
    pub lines: Vec<String>,
}

/// Width and height of the box to fill, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBox {
    pub width: f64,
    pub height: f64,
}

/// Fits text into boxes using one measurement backend.
pub struct AutoFit<'m> {
    metrics: &'m dyn TextMeasure,
    policy: MaxLinesPolicy,
}

impl<'m> AutoFit<'m> {
    pub fn new(metrics: &'m dyn TextMeasure) -> Self {
        Self {
            metrics,
            policy: MaxLinesPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MaxLinesPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fit plain text and return only the size/overflow pair.
    pub fn solve(
        &self,
        text: &str,
        constraints: &TextConstraints,
        bounds: FitBox,
        font: &FontSpec,
        line_height: f64,
    ) -> Result<TextFitResult> {
        self.fit(text, constraints, bounds, font, line_height)
            .map(|fitted| fitted.result)
    }

    /// Fit layer content, applying the bullet transform to array content.
    pub fn fit_content(
        &self,
        content: &ContentValue,
        bullet: Option<BulletStyle>,
        constraints: &TextConstraints,
        bounds: FitBox,
        font: &FontSpec,
        line_height: f64,
    ) -> Result<FittedText> {
        validate(constraints, bounds, line_height)?;
        if content.is_blank() {
            return Ok(empty_fit(constraints));
        }
        self.fit(&content.to_text(bullet), constraints, bounds, font, line_height)
    }

    /// Fit plain text and keep the wrapped lines.
    pub fn fit(
        &self,
        text: &str,
        constraints: &TextConstraints,
        bounds: FitBox,
        font: &FontSpec,
        line_height: f64,
    ) -> Result<FittedText> {
        validate(constraints, bounds, line_height)?;
        if text.trim().is_empty() {
            return Ok(empty_fit(constraints));
        }

        let fits = |lines: &[String], size: u32| {
            let total_height = lines.len() as f64 * size as f64 * line_height;
            let within_lines = match (self.policy, constraints.max_lines) {
                (MaxLinesPolicy::Enforce, Some(max_lines)) => lines.len() <= max_lines as usize,
                _ => true,
            };
            total_height <= bounds.height && within_lines
        };
        let wrap = |size: u32| break_lines(text, bounds.width, self.metrics, &font.at_size(size as f64));

        let mut lo = constraints.min_font;
        let mut hi = constraints.max_font;
        let mut best: Option<(u32, Vec<String>)> = None;
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let lines = wrap(mid)?;
            let ok = fits(&lines, mid);
            log::trace!("fit {}px -> {} lines, fits={}", mid, lines.len(), ok);
            if ok {
                best = Some((mid, lines));
                match mid.checked_add(1) {
                    Some(next) => lo = next,
                    None => break,
                }
            } else {
                // mid >= min_font >= 1, so this cannot underflow
                hi = mid - 1;
            }
        }

        let min_lines = match &best {
            Some((size, lines)) if *size == constraints.min_font => lines.clone(),
            _ => wrap(constraints.min_font)?,
        };
        let overflow = !fits(&min_lines, constraints.min_font);

        let (font_size, lines) = best.unwrap_or((constraints.min_font, min_lines));
        log::debug!(
            "fitted {} chars at {}px ({} lines, overflow={})",
            text.len(),
            font_size,
            lines.len(),
            overflow
        );
        Ok(FittedText {
            result: TextFitResult {
                font_size,
                overflow,
            },
            lines,
        })
    }
}

fn empty_fit(constraints: &TextConstraints) -> FittedText {
    FittedText {
        result: TextFitResult {
            font_size: constraints.max_font,
            overflow: false,
        },
        lines: Vec::new(),
    }
}

fn validate(constraints: &TextConstraints, bounds: FitBox, line_height: f64) -> Result<()> {
    if constraints.min_font == 0 {
        return Err(CarouselError::Precondition(
            "min_font must be at least 1".to_string(),
        ));
    }
    if constraints.min_font > constraints.max_font {
        return Err(CarouselError::Precondition(format!(
            "min_font {} > max_font {}",
            constraints.min_font, constraints.max_font
        )));
    }
    if !bounds.width.is_finite() || bounds.width <= 0.0 {
        return Err(CarouselError::Precondition(format!(
            "box width must be positive and finite, got {}",
            bounds.width
        )));
    }
    if !bounds.height.is_finite() || bounds.height < 0.0 {
        return Err(CarouselError::Precondition(format!(
            "box height must be finite and non-negative, got {}",
            bounds.height
        )));
    }
    if !line_height.is_finite() || line_height <= 0.0 {
        return Err(CarouselError::Precondition(format!(
            "line height multiplier must be positive, got {}",
            line_height
        )));
    }
    Ok(())
}
