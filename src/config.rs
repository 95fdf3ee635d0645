//! Render options carried by a job and overridable from the CLI.

use serde::{Deserialize, Serialize};

use crate::error::{CarouselError, Result};
use crate::text::fit::MaxLinesPolicy;

/// Document metadata embedded in the PDF Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Output scale relative to the 1080×1350 canvas. Below 1.0 for thumbnails.
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub max_lines_policy: MaxLinesPolicy,
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            max_lines_policy: MaxLinesPolicy::default(),
            metadata: Metadata::default(),
        }
    }
}

impl RenderOptions {
    /// Reject option values no renderer can honour.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 || self.scale > 4.0 {
            return Err(CarouselError::Precondition(format!(
                "scale must be in (0, 4], got {}",
                self.scale
            )));
        }
        Ok(())
    }
}
