//! Rasterize a generated receipt PDF.
//!
//! The document is parsed with `lopdf`. The page's MediaBox fixes the pixel
//! size at the requested DPI, the Type0 fonts are resolved down to their
//! embedded FontFile2 programs, and the content stream is replayed onto a
//! [`RasterCanvas`]. Only the operators the vector canvas emits are
//! interpreted; anything else is skipped.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

use crate::rendering::font::FontResource;
use crate::rendering::paint::Color;
use crate::rendering::raster::{RasterCanvas, RasterImage};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    line_width: f32,
    fill: Color,
    stroke: Color,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self { line_width: 1.0, fill: Color::BLACK, stroke: Color::BLACK }
    }
}

#[derive(Debug, Default)]
struct TextState {
    font: Option<Vec<u8>>,
    size: f32,
    /// Start of the current line in PDF space
    line: (f32, f32),
    x: f32,
}

/// Rasterize page `page_index` (zero based) of `pdf` at `dpi`.
pub fn rasterize_pdf(pdf: &[u8], page_index: usize, dpi: f32) -> Result<RasterImage> {
    let doc = Document::load_mem(pdf)?;
    let pages = doc.get_pages();
    let page_id = *pages
        .get(&(page_index as u32 + 1))
        .ok_or(Error::PageOutOfRange(page_index))?;
    let page = doc.get_dictionary(page_id)?;

    let [x0, y0, x1, y1] = media_box(&doc, page)?;
    let scale = dpi / 72.0;
    let width = ((x1 - x0) * scale).round().max(1.0) as u32;
    let height = ((y1 - y0) * scale).round().max(1.0) as u32;
    log::debug!("rasterizing page {} at {} dpi into {}x{}", page_index, dpi, width, height);

    let fonts = page_fonts(&doc, page)?;
    let operations = Content::decode(&doc.get_page_content(page_id)?)?.operations;

    let mut canvas = RasterCanvas::new(width, height, None)?;
    let to_px = |x: f32, y: f32| ((x - x0) * scale, (y1 - y) * scale);

    let mut state = GraphicsState::default();
    let mut saved = Vec::new();
    let mut text = TextState::default();
    let mut path: Vec<[f32; 4]> = Vec::new();

    for op in &operations {
        match op.operator.as_str() {
            "q" => saved.push(state),
            "Q" => state = saved.pop().unwrap_or_default(),
            "w" => state.line_width = number(op, 0)?,
            "rg" => state.fill = rgb(op)?,
            "RG" => state.stroke = rgb(op)?,
            "re" => path.push([number(op, 0)?, number(op, 1)?, number(op, 2)?, number(op, 3)?]),
            "S" => {
                let thickness = (state.line_width * scale).round().max(1.0) as u32;
                for [x, y, w, h] in path.drain(..) {
                    let (left, top) = to_px(x, y + h);
                    canvas.border_rect(
                        left.round() as i32,
                        top.round() as i32,
                        (w * scale).round() as i32,
                        (h * scale).round() as i32,
                        thickness,
                        state.stroke,
                    );
                }
            }
            "n" => path.clear(),
            "BT" => text = TextState { font: text.font.take(), size: text.size, ..Default::default() },
            "ET" => {}
            "Tf" => {
                let name = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .ok_or_else(|| malformed(op))?;
                text.font = Some(name.to_vec());
                text.size = number(op, 1)?;
            }
            "Td" => {
                text.line = (text.line.0 + number(op, 0)?, text.line.1 + number(op, 1)?);
                text.x = text.line.0;
            }
            "Tj" => {
                let bytes = op
                    .operands
                    .first()
                    .and_then(|o| o.as_str().ok())
                    .ok_or_else(|| malformed(op))?;
                let font = text
                    .font
                    .as_ref()
                    .and_then(|name| fonts.get(name))
                    .ok_or_else(|| Error::ConversionError("text shown without a font".to_string()))?;
                let glyphs: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                let (px, py) = to_px(text.x, text.line.1);
                let advance = canvas.fill_glyphs(font, &glyphs, px, py, text.size * scale, state.fill)?;
                text.x += advance / scale;
            }
            other => log::debug!("skipping unsupported operator {:?}", other),
        }
    }

    canvas.encode()
}

fn media_box(doc: &Document, page: &Dictionary) -> Result<[f32; 4]> {
    let (_, obj) = doc.dereference(page.get(b"MediaBox")?)?;
    let values = obj
        .as_array()?
        .iter()
        .map(|v| doc.dereference(v).and_then(|(_, v)| v.as_float()))
        .collect::<std::result::Result<Vec<f32>, _>>()?;
    match values[..] {
        [x0, y0, x1, y1] if x1 > x0 && y1 > y0 => Ok([x0, y0, x1, y1]),
        _ => Err(Error::ConversionError(format!("invalid MediaBox {:?}", values))),
    }
}

/// Resolve every font in the page resources to its embedded program.
fn page_fonts(doc: &Document, page: &Dictionary) -> Result<HashMap<Vec<u8>, FontResource>> {
    let mut fonts = HashMap::new();
    let Ok(resources) = page.get(b"Resources") else {
        return Ok(fonts);
    };
    let resources = dict(doc, resources)?;
    let Ok(font_dict) = resources.get(b"Font") else {
        return Ok(fonts);
    };
    for (name, font) in dict(doc, font_dict)?.iter() {
        let type0 = dict(doc, font)?;
        let descendant = match doc.dereference(type0.get(b"DescendantFonts")?)?.1 {
            Object::Array(items) => items
                .first()
                .ok_or_else(|| Error::ConversionError("empty DescendantFonts".to_string()))?,
            other => other,
        };
        let descriptor = dict(doc, dict(doc, descendant)?.get(b"FontDescriptor")?)?;
        let program = stream_bytes(doc.dereference(descriptor.get(b"FontFile2")?)?.1.as_stream()?)?;
        let font = FontResource::from_bytes(program)
            .map_err(|e| Error::ConversionError(format!("embedded font: {}", e)))?;
        fonts.insert(name.clone(), font);
    }
    Ok(fonts)
}

fn dict<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Dictionary> {
    Ok(doc.dereference(obj)?.1.as_dict()?)
}

fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        Ok(stream.decompressed_content()?)
    } else {
        Ok(stream.content.clone())
    }
}

fn number(op: &Operation, index: usize) -> Result<f32> {
    op.operands
        .get(index)
        .and_then(|o| o.as_float().ok())
        .ok_or_else(|| malformed(op))
}

fn rgb(op: &Operation) -> Result<Color> {
    Ok(Color::from_unit(number(op, 0)?, number(op, 1)?, number(op, 2)?))
}

fn malformed(op: &Operation) -> Error {
    Error::ConversionError(format!("malformed `{}` operands {:?}", op.operator, op.operands))
}
