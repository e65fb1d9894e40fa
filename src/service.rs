//! Request-to-artifact pipeline with storage, backup and cleanup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use base64::Engine as _;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::cleanup::CleanupQueue;
use crate::model::{ReceiptDocument, ReceiptRequest, RenderedArtifact};
use crate::normalize::{Clock, Normalizer, SystemClock};
use crate::rendering::font::FontResource;
use crate::rendering::{render, CanvasTarget};
use crate::store::ArtifactStore;
use crate::{Error, RenderConfig, Result};

/// How a PNG is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    /// Render the PDF, then rasterize its first page
    #[default]
    FromPdf,
    /// Lay out straight onto a pixel canvas
    Direct,
}

/// What the caller receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Path of the file in the output directory
    #[default]
    File,
    /// The encoded bytes as base64; the file is removed sooner
    Base64,
}

/// Result of one generate call
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReceipt {
    pub id: String,
    pub file_name: String,
    pub size: usize,
    /// Lowercase hex sha-256 of the artifact
    pub sha256: String,
    pub content_type: String,
    pub generated_at: DateTime<Local>,
    pub elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

pub struct ReceiptService {
    config: RenderConfig,
    normalizer: Normalizer,
    store: ArtifactStore,
    cleanup: Option<CleanupQueue>,
}

impl ReceiptService {
    /// Service on the system clock. Cleanup is enabled when called inside a
    /// tokio runtime.
    pub fn new(config: RenderConfig) -> Self {
        let cleanup = CleanupQueue::current().ok();
        if cleanup.is_none() {
            log::debug!("no tokio runtime; temporary files will not be removed");
        }
        Self {
            normalizer: Normalizer::new(Arc::new(SystemClock), config.default_purpose.clone()),
            store: ArtifactStore::from_config(&config),
            config,
            cleanup,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.normalizer = Normalizer::new(clock, self.config.default_purpose.clone());
        self
    }

    pub fn with_cleanup(mut self, cleanup: Option<CleanupQueue>) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Canonical data for `req` without rendering anything.
    pub fn preview(&self, req: &ReceiptRequest) -> Result<ReceiptDocument> {
        req.validate()?;
        Ok(self.normalizer.normalize(req))
    }

    pub fn generate_pdf(&self, req: &ReceiptRequest, delivery: Delivery) -> Result<GeneratedReceipt> {
        let started = Instant::now();
        let doc = self.preview(req)?;
        let artifact = self.render_pdf(&doc)?;
        self.deliver(&doc, artifact, delivery, started)
    }

    pub fn generate_image(
        &self,
        req: &ReceiptRequest,
        mode: ImageMode,
        delivery: Delivery,
    ) -> Result<GeneratedReceipt> {
        let started = Instant::now();
        let doc = self.preview(req)?;
        let artifact = self.render_image(&doc, mode)?;
        self.deliver(&doc, artifact, delivery, started)
    }

    /// Render the vector document. A missing font fails the render.
    pub fn render_pdf(&self, doc: &ReceiptDocument) -> Result<RenderedArtifact> {
        let font = FontResource::load_configured(self.config.font_path.as_deref())
            .map_err(|e| Error::GenerationError(e.to_string()))?;
        render(doc, CanvasTarget::vector(&self.config), Some(&font))
    }

    #[cfg(feature = "raster")]
    pub fn render_image(&self, doc: &ReceiptDocument, mode: ImageMode) -> Result<RenderedArtifact> {
        match mode {
            ImageMode::FromPdf => {
                let pdf = self.render_pdf(doc)?;
                Ok(crate::rasterize_pdf(&pdf.data, 0, self.config.dpi)?.into_artifact())
            }
            ImageMode::Direct => {
                let font = match FontResource::load_configured(self.config.font_path.as_deref()) {
                    Ok(font) => Some(font),
                    Err(e) => {
                        log::warn!("{}; falling back to placeholder text", e);
                        None
                    }
                };
                render(doc, CanvasTarget::raster(&self.config), font.as_ref())
            }
        }
    }

    #[cfg(not(feature = "raster"))]
    pub fn render_image(&self, _doc: &ReceiptDocument, _mode: ImageMode) -> Result<RenderedArtifact> {
        Err(Error::ConfigError("image output requires the `raster` feature".to_string()))
    }

    fn deliver(
        &self,
        doc: &ReceiptDocument,
        artifact: RenderedArtifact,
        delivery: Delivery,
        started: Instant,
    ) -> Result<GeneratedReceipt> {
        let path = self.store.write(&artifact, &doc.room_number, &doc.created_at)?;
        self.store.backup(&artifact, &doc.id, &doc.created_at);

        let delay = match delivery {
            Delivery::File => self.config.file_cleanup_delay,
            Delivery::Base64 => self.config.base64_cleanup_delay,
        };
        if let Some(queue) = &self.cleanup {
            queue.schedule(path.clone(), delay);
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (path, base64) = match delivery {
            Delivery::File => (Some(path), None),
            Delivery::Base64 => (
                None,
                Some(base64::engine::general_purpose::STANDARD.encode(&artifact.data)),
            ),
        };

        let elapsed_ms = started.elapsed().as_millis();
        log::info!("generated {} for {} in {} ms", file_name, doc.id, elapsed_ms);
        Ok(GeneratedReceipt {
            id: doc.id.clone(),
            file_name,
            size: artifact.data.len(),
            sha256: artifact.sha256_hex(),
            content_type: artifact.kind.content_type().to_string(),
            generated_at: doc.created_at,
            elapsed_ms,
            path,
            base64,
        })
    }
}
