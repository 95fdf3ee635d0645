//! # Text Layout
//!
//! Backend-agnostic line breaking and measurement.
//!
//! Everything here is parameterized by [`TextMeasure`], the one capability a
//! rendering backend has to supply. The headless backend implements it with
//! real glyph metrics ([`FontContext`](crate::font::FontContext)); the browser
//! build implements it by calling the canvas `measureText`. Both therefore
//! share the exact same wrapping and fitting code.

pub mod fit;

use crate::error::{CarouselError, Result};
use serde::{Deserialize, Serialize};

/// A font at a concrete size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub weight: u32,
}

impl FontSpec {
    pub fn new(family: &str, weight: u32, size: f64) -> Self {
        Self {
            family: family.to_string(),
            size,
            weight,
        }
    }

    /// The same face at another size.
    pub fn at_size(&self, size: f64) -> Self {
        Self {
            family: self.family.clone(),
            size,
            weight: self.weight,
        }
    }

    /// CSS `font` shorthand, as accepted by a 2D canvas context.
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight, self.size, self.family)
    }
}

/// Width measurement for a single line of text.
///
/// Implementations must be deterministic for a given text/font pair.
pub trait TextMeasure {
    fn measure_width(&self, text: &str, font: &FontSpec) -> Result<f64>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure_width(&self, text: &str, font: &FontSpec) -> Result<f64> {
        (**self).measure_width(text, font)
    }
}

/// Measure and reject widths a backend should never produce.
pub(crate) fn checked_width(
    metrics: &dyn TextMeasure,
    text: &str,
    font: &FontSpec,
) -> Result<f64> {
    let width = metrics.measure_width(text, font)?;
    if !width.is_finite() || width < 0.0 {
        return Err(CarouselError::MeasurementUnavailable(format!(
            "backend returned width {} for {:?} at {}",
            width,
            text,
            font.css()
        )));
    }
    Ok(width)
}

/// Break text into lines no wider than `max_width`.
///
/// Explicit newlines start a new paragraph. Within a paragraph words are
/// accumulated greedily; a word wider than `max_width` is kept whole on its
/// own line. Runs of whitespace collapse to a single space. Empty input
/// yields a single empty line.
pub fn break_lines(
    text: &str,
    max_width: f64,
    metrics: &dyn TextMeasure,
    font: &FontSpec,
) -> Result<Vec<String>> {
    if !max_width.is_finite() || max_width <= 0.0 {
        return Err(CarouselError::Precondition(format!(
            "line width must be positive and finite, got {}",
            max_width
        )));
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if checked_width(metrics, &candidate, font)? > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }

    Ok(lines)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every character is `size * 0.5` wide.
    pub(crate) struct FixedWidth;

    impl TextMeasure for FixedWidth {
        fn measure_width(&self, text: &str, font: &FontSpec) -> Result<f64> {
            Ok(text.chars().count() as f64 * font.size * 0.5)
        }
    }

    fn font() -> FontSpec {
        FontSpec::new("Test", 400, 10.0)
    }

    #[test]
    fn test_single_line() {
        let lines = break_lines("Hello", 200.0, &FixedWidth, &font()).unwrap();
        assert_eq!(lines, vec!["Hello"]);
    }

    #[test]
    fn test_greedy_wrap() {
        // 5 px per char, 40 px fits 8 chars
        let lines = break_lines("aaa bbb ccc dd", 40.0, &FixedWidth, &font()).unwrap();
        assert_eq!(lines, vec!["aaa bbb", "ccc dd"]);
    }

    #[test]
    fn test_explicit_newline() {
        let lines = break_lines("Hello\nWorld", 200.0, &FixedWidth, &font()).unwrap();
        assert_eq!(lines, vec!["Hello", "World"]);
    }

    #[test]
    fn test_blank_paragraph_kept() {
        let lines = break_lines("a\n\nb", 200.0, &FixedWidth, &font()).unwrap();
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_empty_string() {
        let lines = break_lines("", 200.0, &FixedWidth, &font()).unwrap();
        assert_eq!(lines, vec![""]);
    }

    #[test]
    fn test_long_word_not_split() {
        let lines = break_lines("a supercalifragilistic b", 30.0, &FixedWidth, &font()).unwrap();
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_whitespace_collapses() {
        let lines = break_lines("  a \t  b  ", 200.0, &FixedWidth, &font()).unwrap();
        assert_eq!(lines, vec!["a b"]);
    }

    #[test]
    fn test_no_words_lost() {
        let text = "The quick brown fox jumps over the lazy dog and keeps running far away";
        let lines = break_lines(text, 60.0, &FixedWidth, &font()).unwrap();
        assert!(lines.len() > 1);
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_rejects_bad_width() {
        for width in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = break_lines("x", width, &FixedWidth, &font()).unwrap_err();
            assert!(matches!(err, CarouselError::Precondition(_)));
        }
    }

    #[test]
    fn test_non_finite_measurement_is_an_error() {
        struct Broken;
        impl TextMeasure for Broken {
            fn measure_width(&self, _: &str, _: &FontSpec) -> Result<f64> {
                Ok(f64::NAN)
            }
        }
        let err = break_lines("a b", 100.0, &Broken, &font()).unwrap_err();
        assert!(matches!(err, CarouselError::MeasurementUnavailable(_)));
    }

    #[test]
    fn test_css_font() {
        assert_eq!(FontSpec::new("Inter", 700, 48.0).css(), "700 48px Inter");
    }
}
