//! Structured error types for the carousel rendering core.
//!
//! Overflow is deliberately absent: it is a computed flag on
//! [`TextFitResult`](crate::text::fit::TextFitResult), never a failure.

use thiserror::Error;

/// The unified error type returned by all public carousel API functions.
#[derive(Debug, Error)]
pub enum CarouselError {
    /// JSON input failed to parse as a valid render job.
    #[error("Failed to parse render job: {source}{}", format_hint(.hint))]
    ParseError {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// The caller broke a documented contract (bad width, min > max, ...).
    #[error("Precondition violated: {0}")]
    Precondition(String),
    /// Text measurement was requested without a usable metrics backend.
    #[error("Measurement backend unavailable: {0}")]
    MeasurementUnavailable(String),
    /// A font could not be decoded, parsed, or registered.
    #[error("Font error: {0}")]
    FontError(String),
    /// A slide image could not be decoded for PDF embedding.
    #[error("Image error: {0}")]
    ImageError(String),
    /// Drawing, PNG encoding, or PDF writing failed.
    #[error("Render error: {0}")]
    RenderError(String),
    /// Uploading an export artifact failed.
    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, CarouselError>;

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for CarouselError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the render job schema. Check layer types and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        CarouselError::ParseError { source: e, hint }
    }
}
