//! Receipt rendering: layout, vector and raster canvases.
//!
//! `layout` turns a `ReceiptDocument` into paint commands; a `ReceiptCanvas`
//! implementation turns those into encoded bytes. The canvas is chosen by
//! `CanvasTarget`, so the PDF path and the direct raster path share one
//! layout.

pub mod font;
pub mod layout;
pub mod paint;
pub mod pdf;
#[cfg(feature = "raster")]
pub mod raster;
#[cfg(feature = "raster")]
pub mod rasterize;

use crate::model::{ReceiptDocument, RenderedArtifact};
use crate::{PageSize, RenderConfig, Result};

use font::FontResource;
use layout::{layout_receipt, LayoutMetrics};
use paint::PaintCommand;

/// A drawing surface owned by a single render call
pub trait ReceiptCanvas {
    fn draw(&mut self, cmd: &PaintCommand) -> Result<()>;

    /// Encode the finished canvas.
    fn finish(self) -> Result<RenderedArtifact>
    where
        Self: Sized;
}

/// Which canvas a render produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasTarget {
    /// PDF page of the physical size, margins in points
    Vector { page: PageSize, margin: f32, top_margin: f32 },
    /// PNG of the physical size at `dpi`, margins in points
    Raster { page: PageSize, dpi: f32, margin: f32, top_margin: f32 },
}

impl CanvasTarget {
    pub fn vector(config: &RenderConfig) -> Self {
        CanvasTarget::Vector {
            page: config.page,
            margin: config.margin,
            top_margin: config.top_margin,
        }
    }

    pub fn raster(config: &RenderConfig) -> Self {
        CanvasTarget::Raster {
            page: config.page,
            dpi: config.dpi,
            margin: config.margin,
            top_margin: config.top_margin,
        }
    }

    pub fn metrics(&self) -> LayoutMetrics {
        match *self {
            CanvasTarget::Vector { page, margin, top_margin } => {
                LayoutMetrics::vector(page, margin, top_margin)
            }
            CanvasTarget::Raster { page, dpi, margin, top_margin } => {
                LayoutMetrics::raster(page, dpi).with_margins(margin, top_margin)
            }
        }
    }
}

/// Lay out `doc` and paint it onto a fresh canvas for `target`.
///
/// The vector target needs `font`; the raster target falls back to
/// placeholder boxes without one.
pub fn render(
    doc: &ReceiptDocument,
    target: CanvasTarget,
    font: Option<&FontResource>,
) -> Result<RenderedArtifact> {
    let metrics = target.metrics();
    let commands = layout_receipt(doc, &metrics);
    log::debug!("rendering {} with {} paint commands to {:?}", doc.id, commands.len(), target);

    match target {
        CanvasTarget::Vector { .. } => {
            let font = font.ok_or_else(|| {
                crate::Error::GenerationError("no font available for the vector document".to_string())
            })?;
            let canvas = pdf::PdfCanvas::new(font, metrics.width, metrics.height, doc.id.as_str(), doc.created_at);
            paint_all(canvas, &commands)
        }
        #[cfg(feature = "raster")]
        CanvasTarget::Raster { .. } => {
            if font.is_none() {
                log::warn!("no font available, drawing text placeholders for {}", doc.id);
            }
            let (width, height) = metrics.pixel_size();
            let canvas = raster::RasterCanvas::new(width, height, font)?;
            paint_all(canvas, &commands)
        }
        #[cfg(not(feature = "raster"))]
        CanvasTarget::Raster { .. } => Err(crate::Error::ConfigError(
            "raster output requires the `raster` feature".to_string(),
        )),
    }
}

fn paint_all<C: ReceiptCanvas>(mut canvas: C, commands: &[PaintCommand]) -> Result<RenderedArtifact> {
    for cmd in commands {
        canvas.draw(cmd)?;
    }
    canvas.finish()
}
