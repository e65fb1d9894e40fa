//! Receipt generation engine
//!
//! Turns a rent-payment request into a fixed-layout receipt: canonical data
//! with the amount in formal Chinese numerals, a single-page PDF with an
//! embedded TrueType font, and PNG images either rasterized from that PDF or
//! drawn directly.
//!
//! # Features
//!
//! - **raster** (default): PNG output via `tiny-skia`, PDF rasterization via `lopdf`
//!
//! # Example
//!
//! ```no_run
//! use receiptgen::{ReceiptRequest, RenderConfig, ReceiptService, Delivery};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RenderConfig {
//!     font_path: Some("fonts/receipt.ttf".into()),
//!     ..Default::default()
//! };
//! let service = ReceiptService::new(config);
//! let req = ReceiptRequest::from_json(
//!     r#"{"rent": 1500, "room_number": "101", "recipient": "张三", "payer": "李四"}"#,
//! )?;
//! let receipt = service.generate_pdf(&req, Delivery::File)?;
//! println!("{} -> {:?}", receipt.id, receipt.path);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod cleanup;
pub mod identifier;
pub mod model;
pub mod normalize;
pub mod numeral;
pub mod rendering;
pub mod service;
pub mod store;

pub use cleanup::CleanupQueue;
pub use identifier::receipt_id;
pub use model::{ArtifactKind, ReceiptDocument, ReceiptRequest, RenderedArtifact};
pub use normalize::{normalize, Clock, FixedClock, Normalizer, SystemClock};
pub use numeral::amount_to_chinese;
pub use rendering::{render, CanvasTarget};
pub use service::{Delivery, GeneratedReceipt, ImageMode, ReceiptService};
pub use store::{ArtifactStore, BackupEntry};

#[cfg(feature = "raster")]
pub use rendering::rasterize::rasterize_pdf;

/// Outer margin in points
pub const DEFAULT_MARGIN: f32 = 8.0;
/// Top and bottom margin in points
pub const DEFAULT_TOP_MARGIN: f32 = 10.0;

const MM_PER_INCH: f32 = 25.4;

/// Physical page size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Default for PageSize {
    /// 176mm x 85mm receipt slip
    fn default() -> Self {
        Self {
            width_mm: 176.0,
            height_mm: 85.0,
        }
    }
}

impl PageSize {
    /// Size in PDF points
    pub fn to_points(&self) -> (f32, f32) {
        (self.width_mm * 72.0 / MM_PER_INCH, self.height_mm * 72.0 / MM_PER_INCH)
    }

    /// Size in whole pixels at `dpi`
    pub fn to_pixels(&self, dpi: f32) -> (u32, u32) {
        (
            (self.width_mm * dpi / MM_PER_INCH).round().max(1.0) as u32,
            (self.height_mm * dpi / MM_PER_INCH).round().max(1.0) as u32,
        )
    }
}

/// Configuration for receipt rendering and storage
///
/// # Examples
///
/// ```
/// let cfg = receiptgen::RenderConfig::default();
/// assert_eq!(cfg.page.to_pixels(cfg.dpi), (2079, 1004));
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// TrueType font embedded in every receipt
    pub font_path: Option<PathBuf>,
    /// Directory for generated artifacts
    pub output_dir: PathBuf,
    /// Directory for durable copies; `None` disables backups
    pub backup_dir: Option<PathBuf>,
    pub page: PageSize,
    /// Raster resolution
    pub dpi: f32,
    /// Side margin in points
    pub margin: f32,
    /// Top and bottom margin in points
    pub top_margin: f32,
    /// Purpose used when a request leaves it blank
    pub default_purpose: String,
    /// Delay before a generated file is removed from `output_dir`
    pub file_cleanup_delay: Duration,
    /// Delay before the temporary file behind a base64 response is removed
    pub base64_cleanup_delay: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            output_dir: PathBuf::from("output"),
            backup_dir: Some(PathBuf::from("output/backup")),
            page: PageSize::default(),
            dpi: 300.0,
            margin: DEFAULT_MARGIN,
            top_margin: DEFAULT_TOP_MARGIN,
            default_purpose: normalize::DEFAULT_PURPOSE.to_string(),
            file_cleanup_delay: Duration::from_secs(5 * 60),
            base64_cleanup_delay: Duration::from_secs(60),
        }
    }
}

impl RenderConfig {
    /// Reject values no render can succeed with.
    pub fn validate(&self) -> Result<()> {
        if !(self.page.width_mm > 0.0 && self.page.height_mm > 0.0) {
            return Err(Error::ConfigError(format!("invalid page size {:?}", self.page)));
        }
        if !(self.dpi > 0.0) {
            return Err(Error::ConfigError(format!("invalid dpi {}", self.dpi)));
        }
        let (width, height) = self.page.to_points();
        if self.margin < 0.0 || self.top_margin < 0.0 || 2.0 * self.margin >= width || 2.0 * self.top_margin >= height {
            return Err(Error::ConfigError("margins do not fit the page".to_string()));
        }
        Ok(())
    }
}
