/// Raster canvas on a tiny-skia pixmap.
///
/// Lines and rectangles are written pixel by pixel (axis aligned, no
/// anti-aliasing). Text is filled from TrueType glyph outlines. Without a
/// font, text regions become gray placeholder boxes so the render still
/// completes.

use tiny_skia::{ColorU8, FillRule, Paint, PathBuilder, Pixmap, Transform};
use ttf_parser::{GlyphId, OutlineBuilder};

use crate::model::{ArtifactKind, RenderedArtifact};
use crate::rendering::font::{estimate_text_width, FontResource};
use crate::rendering::paint::{Color, PaintCommand};
use crate::rendering::ReceiptCanvas;
use crate::{Error, Result};

/// Encoded raster output
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl RasterImage {
    pub fn into_artifact(self) -> RenderedArtifact {
        RenderedArtifact::new(ArtifactKind::Png, self.png_data)
    }
}

pub struct RasterCanvas<'f> {
    pixmap: Pixmap,
    font: Option<&'f FontResource>,
}

impl<'f> RasterCanvas<'f> {
    /// White canvas of `width` x `height` pixels.
    pub fn new(width: u32, height: u32, font: Option<&'f FontResource>) -> Result<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::GenerationError(format!("invalid raster size {}x{}", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self { pixmap, font })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// RGB of the pixel at (`x`, `y`), if inside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.pixmap.width() || y >= self.pixmap.height() {
            return None;
        }
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Color::rgb(c.red(), c.green(), c.blue())
        })
    }

    fn put(&mut self, x: i32, y: i32, color: Color) {
        let (w, h) = (self.pixmap.width() as i32, self.pixmap.height() as i32);
        if x < 0 || y < 0 || x >= w || y >= h {
            return;
        }
        let idx = (y * w + x) as usize;
        self.pixmap.pixels_mut()[idx] = ColorU8::from_rgba(color.r, color.g, color.b, 255).premultiply();
    }

    /// One-pixel horizontal segment from `x0` to `x1` inclusive.
    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Color) {
        for x in x0.min(x1)..=x0.max(x1) {
            self.put(x, y, color);
        }
    }

    /// One-pixel vertical segment from `y0` to `y1` inclusive.
    pub fn vline(&mut self, x: i32, y0: i32, y1: i32, color: Color) {
        for y in y0.min(y1)..=y0.max(y1) {
            self.put(x, y, color);
        }
    }

    /// Rectangle outline from four one-pixel segments.
    pub fn outline_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (right, bottom) = (x + w - 1, y + h - 1);
        self.hline(x, right, y, color);
        self.hline(x, right, bottom, color);
        self.vline(x, y, bottom, color);
        self.vline(right, y, bottom, color);
    }

    /// Outline `thickness` pixels wide, drawn as nested one-pixel rectangles
    /// growing inward.
    pub fn border_rect(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: u32, color: Color) {
        for i in 0..thickness.max(1) as i32 {
            self.outline_rect(x + i, y + i, w - 2 * i, h - 2 * i, color);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        for row in y..y + h {
            self.hline(x, x + w - 1, row, color);
        }
    }

    /// Fill `glyphs` of `font` starting at baseline origin (`x`, `y`) and
    /// return the horizontal advance in pixels.
    pub fn fill_glyphs(
        &mut self,
        font: &FontResource,
        glyphs: &[u16],
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    ) -> Result<f32> {
        let face = font.face()?;
        let scale = font.scale(size);
        let mut outline = GlyphOutline { builder: PathBuilder::new(), x, y, scale };
        for &id in glyphs {
            let gid = GlyphId(id);
            face.outline_glyph(gid, &mut outline);
            outline.x += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
        }
        let advance = outline.x - x;

        if let Some(path) = outline.builder.finish() {
            let mut paint = Paint::default();
            paint.set_color_rgba8(color.r, color.g, color.b, 255);
            paint.anti_alias = true;
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
        Ok(advance)
    }

    fn placeholder(&mut self, text: &str, x: f32, y: f32, size: f32) -> f32 {
        let width = estimate_text_width(text, size);
        let height = size * 0.8;
        self.fill_rect(
            x.round() as i32,
            (y - height).round() as i32,
            width.round() as i32,
            height.round() as i32,
            Color::PLACEHOLDER,
        );
        width
    }

    pub fn encode(&self) -> Result<RasterImage> {
        let png_data = self
            .pixmap
            .encode_png()
            .map_err(|e| Error::EncodeError(e.to_string()))?;
        Ok(RasterImage {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
            png_data,
        })
    }
}

impl ReceiptCanvas for RasterCanvas<'_> {
    fn draw(&mut self, cmd: &PaintCommand) -> Result<()> {
        match cmd {
            PaintCommand::StrokeRect { rect, width, color } => {
                self.border_rect(
                    rect.x.round() as i32,
                    rect.y.round() as i32,
                    rect.width.round() as i32,
                    rect.height.round() as i32,
                    width.round().max(1.0) as u32,
                    *color,
                );
            }
            PaintCommand::Text { origin, size, runs } => {
                let mut x = origin.x;
                for run in runs {
                    x += match self.font {
                        Some(font) => {
                            let ids: Vec<u16> = font.shape(&run.text)?.iter().map(|g| g.id).collect();
                            self.fill_glyphs(font, &ids, x, origin.y, *size, run.color)?
                        }
                        None => self.placeholder(&run.text, x, origin.y, *size),
                    };
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<RenderedArtifact> {
        Ok(self.encode()?.into_artifact())
    }
}

/// Glyph outline sink translating font units to canvas pixels (y flipped)
struct GlyphOutline {
    builder: PathBuilder,
    x: f32,
    y: f32,
    scale: f32,
}

impl GlyphOutline {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y - y * self.scale)
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
