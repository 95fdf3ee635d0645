//! # Export Orchestration
//!
//! Runs one export job end to end: rasterize every slide, assemble a PDF if
//! one was asked for, upload the result, report status. The queue transport
//! and the storage backend are collaborators behind [`ArtifactStore`] and the
//! status observer; this module only owns the retry contract.
//!
//! A failed attempt is retried from scratch, never resumed. Uploads are keyed
//! by job id and slide index, so a retry overwrites what an earlier attempt
//! left behind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CarouselError, Result};
use crate::font::FontRegistry;
use crate::model::RenderJob;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Pdf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub id: String,
    pub format: ExportFormat,
    pub job: RenderJob,
}

/// Lifecycle of an export as seen by the status observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportPhase {
    Pending,
    Processing,
    Done,
    Failed,
}

/// Final outcome of [`Exporter::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExportStatus {
    Done { urls: Vec<String> },
    Failed { message: String, attempts: u32 },
}

/// "Upload a buffer, get back a URL."
pub trait ArtifactStore {
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String>;
}

type Observer = Box<dyn Fn(&str, ExportPhase) + Send + Sync>;

pub struct Exporter {
    registry: Arc<FontRegistry>,
    max_attempts: u32,
    observer: Option<Observer>,
}

impl Exporter {
    pub fn new(registry: Arc<FontRegistry>) -> Self {
        Self {
            registry,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            observer: None,
        }
    }

    /// Total attempts per job, at least one.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn on_status(mut self, observer: impl Fn(&str, ExportPhase) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn run(&self, export: &ExportJob, store: &dyn ArtifactStore) -> ExportStatus {
        self.report(&export.id, ExportPhase::Pending);
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            self.report(&export.id, ExportPhase::Processing);
            match self.attempt(export, store) {
                Ok(urls) => {
                    log::info!("export {} done after {} attempt(s)", export.id, attempt);
                    self.report(&export.id, ExportPhase::Done);
                    return ExportStatus::Done { urls };
                }
                Err(e) => {
                    log::warn!(
                        "export {} attempt {}/{} failed: {}",
                        export.id,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        self.report(&export.id, ExportPhase::Failed);
        ExportStatus::Failed {
            message: last_error.map(|e| e.to_string()).unwrap_or_default(),
            attempts: self.max_attempts,
        }
    }

    fn attempt(&self, export: &ExportJob, store: &dyn ArtifactStore) -> Result<Vec<String>> {
        let slides = crate::render_slides(&export.job, Arc::clone(&self.registry))?;
        match export.format {
            ExportFormat::Png => slides
                .iter()
                .enumerate()
                .map(|(i, png)| {
                    let key = format!("exports/{}/slide-{}.png", export.id, i + 1);
                    store.upload(&key, png, "image/png")
                })
                .collect(),
            ExportFormat::Pdf => {
                let pdf = crate::pdf::PdfWriter::new()
                    .assemble(&slides, &export.job.options.metadata)?;
                let key = format!("exports/{}/carousel.pdf", export.id);
                Ok(vec![store.upload(&key, &pdf, "application/pdf")?])
            }
        }
    }

    fn report(&self, id: &str, phase: ExportPhase) {
        log::debug!("export {} -> {:?}", id, phase);
        if let Some(observer) = &self.observer {
            observer(id, phase);
        }
    }
}

/// Keeps artifacts in memory. Handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: std::sync::Mutex<Vec<(String, String, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored `(key, content_type, bytes)` triples in upload order.
    pub fn artifacts(&self) -> Vec<(String, String, Vec<u8>)> {
        self.artifacts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}

impl ArtifactStore for MemoryStore {
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let mut artifacts = self
            .artifacts
            .lock()
            .map_err(|_| CarouselError::StorageError("memory store poisoned".to_string()))?;
        artifacts.retain(|(k, _, _)| k != key);
        artifacts.push((key.to_string(), content_type.to_string(), bytes.to_vec()));
        Ok(format!("memory://{}", key))
    }
}
