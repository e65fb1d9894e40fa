//! TrueType font resource shared by both canvases.
//!
//! The program bytes are read once and parsed with `ttf-parser`; the face is
//! re-borrowed per operation since `Face` holds a reference into the bytes.

use std::path::Path;

use ttf_parser::{Face, GlyphId};

use crate::{Error, Result};

/// Vertical and bounding metrics in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub cap_height: i16,
    pub bbox: [i16; 4],
    pub glyph_count: u16,
}

/// One positioned glyph of a shaped string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub id: u16,
    pub ch: char,
    /// Horizontal advance in font units
    pub advance: u16,
}

#[derive(Debug, Clone)]
pub struct FontResource {
    data: Vec<u8>,
    name: String,
    metrics: FontMetrics,
}

impl FontResource {
    /// Read and validate a TrueType file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::FontError(format!("{}: {}", path.display(), e)))?;
        log::debug!("loaded font {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(data)
    }

    /// Load the configured font, failing when none is configured.
    pub fn load_configured(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Err(Error::FontError("no font configured".to_string())),
        }
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let face = Face::parse(&data, 0).map_err(|e| Error::FontError(e.to_string()))?;
        let bbox = face.global_bounding_box();
        let metrics = FontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            cap_height: face.capital_height().unwrap_or(face.ascender()),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            glyph_count: face.number_of_glyphs(),
        };
        let name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string())
            .map(|n| n.replace(|c: char| !c.is_ascii_alphanumeric() && c != '-', ""))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "ReceiptFont".to_string());
        drop(face);
        Ok(Self { data, name, metrics })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// PostScript name with characters outside `[A-Za-z0-9-]` removed
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    pub fn face(&self) -> Result<Face<'_>> {
        Face::parse(&self.data, 0).map_err(|e| Error::FontError(e.to_string()))
    }

    /// Map `text` to glyphs. Characters the font lacks become `.notdef`.
    pub fn shape(&self, text: &str) -> Result<Vec<ShapedGlyph>> {
        let face = self.face()?;
        Ok(text
            .chars()
            .map(|ch| {
                let id = face.glyph_index(ch).unwrap_or(GlyphId(0));
                ShapedGlyph {
                    id: id.0,
                    ch,
                    advance: face.glyph_hor_advance(id).unwrap_or(0),
                }
            })
            .collect())
    }

    /// Convert font units to canvas units at `size`.
    pub fn scale(&self, size: f32) -> f32 {
        size / self.metrics.units_per_em.max(1) as f32
    }

    /// Advance width of `text` at `size`, in canvas units.
    pub fn text_width(&self, text: &str, size: f32) -> Result<f32> {
        let total: u32 = self.shape(text)?.iter().map(|g| g.advance as u32).sum();
        Ok(total as f32 * self.scale(size))
    }
}

/// Width guess used when no font is available: full-width for CJK, half for
/// everything else.
pub fn estimate_text_width(text: &str, size: f32) -> f32 {
    text.chars()
        .map(|c| if c.is_ascii() { 0.5 } else { 1.0 })
        .sum::<f32>()
        * size
}
