//! Vector canvas producing a single-page PDF with an embedded TrueType font.
//!
//! Text is written with a Type0 / CIDFontType2 font using Identity-H, so each
//! glyph is a big-endian glyph id in the content stream. A ToUnicode CMap
//! keeps the text extractable.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Local, Timelike};
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Date, Finish, Name, Pdf, Rect as PdfRect, Ref, Str, TextStr};

use crate::model::{ArtifactKind, RenderedArtifact};
use crate::rendering::font::FontResource;
use crate::rendering::paint::{Color, PaintCommand};
use crate::rendering::ReceiptCanvas;
use crate::Result;

/// Resource name of the single page font
pub const FONT_RESOURCE: &[u8] = b"F1";
pub const PRODUCER: &str = concat!("receiptgen ", env!("CARGO_PKG_VERSION"));

const CATALOG_ID: Ref = Ref::new(1);
const PAGE_TREE_ID: Ref = Ref::new(2);
const PAGE_ID: Ref = Ref::new(3);
const CONTENT_ID: Ref = Ref::new(4);
const TYPE0_ID: Ref = Ref::new(5);
const CID_FONT_ID: Ref = Ref::new(6);
const DESCRIPTOR_ID: Ref = Ref::new(7);
const FONT_FILE_ID: Ref = Ref::new(8);
const CMAP_ID: Ref = Ref::new(9);
const INFO_ID: Ref = Ref::new(10);

const SYSTEM_INFO: SystemInfo = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

pub struct PdfCanvas<'f> {
    font: &'f FontResource,
    width: f32,
    height: f32,
    content: Content,
    /// Every glyph id shown, `.notdef` included
    glyphs: BTreeSet<u16>,
    /// Glyph id to the character it was shaped from; never holds `.notdef`
    unicode: BTreeMap<u16, char>,
    fill: Color,
    stroke: Color,
    title: String,
    created_at: DateTime<Local>,
}

impl<'f> PdfCanvas<'f> {
    /// Page of `width` x `height` points.
    pub fn new(
        font: &'f FontResource,
        width: f32,
        height: f32,
        title: impl Into<String>,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            font,
            width,
            height,
            content: Content::new(),
            glyphs: BTreeSet::new(),
            unicode: BTreeMap::new(),
            fill: Color::BLACK,
            stroke: Color::BLACK,
            title: title.into(),
            created_at,
        }
    }

    fn set_fill(&mut self, color: Color) {
        if self.fill != color {
            let [r, g, b] = color.to_unit();
            self.content.set_fill_rgb(r, g, b);
            self.fill = color;
        }
    }

    fn set_stroke(&mut self, color: Color) {
        if self.stroke != color {
            let [r, g, b] = color.to_unit();
            self.content.set_stroke_rgb(r, g, b);
            self.stroke = color;
        }
    }

    fn encode(&mut self, text: &str) -> Result<Vec<u8>> {
        let shaped = self.font.shape(text)?;
        let mut out = Vec::with_capacity(shaped.len() * 2);
        let mut missing = String::new();
        for g in shaped {
            self.glyphs.insert(g.id);
            if g.id == 0 {
                missing.push(g.ch);
            } else {
                self.unicode.entry(g.id).or_insert(g.ch);
            }
            out.extend_from_slice(&g.id.to_be_bytes());
        }
        if !missing.is_empty() {
            log::warn!("font {} has no glyphs for {:?}; drawing .notdef", self.font.name(), missing);
        }
        Ok(out)
    }

    /// Scale font units to the 1000-unit glyph space.
    fn glyph_space(&self, v: f32) -> f32 {
        v * 1000.0 / self.font.metrics().units_per_em.max(1) as f32
    }

    fn write_font(&self, pdf: &mut Pdf) -> Result<()> {
        let metrics = self.font.metrics();
        let base_font = self.font.name().to_string();
        let face = self.font.face()?;

        pdf.type0_font(TYPE0_ID)
            .base_font(Name(base_font.as_bytes()))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(CID_FONT_ID)
            .to_unicode(CMAP_ID);

        let mut cid = pdf.cid_font(CID_FONT_ID);
        cid.subtype(CidFontType::Type2)
            .base_font(Name(base_font.as_bytes()))
            .system_info(SYSTEM_INFO)
            .font_descriptor(DESCRIPTOR_ID)
            .default_width(0.0)
            .cid_to_gid_map_predefined(Name(b"Identity"));
        {
            let mut widths = cid.widths();
            for &id in &self.glyphs {
                let advance = face.glyph_hor_advance(ttf_parser::GlyphId(id)).unwrap_or(0);
                widths.consecutive(id, [self.glyph_space(advance as f32)]);
            }
        }
        cid.finish();

        let [x0, y0, x1, y1] = metrics.bbox;
        pdf.font_descriptor(DESCRIPTOR_ID)
            .name(Name(base_font.as_bytes()))
            .flags(FontFlags::NON_SYMBOLIC)
            .bbox(PdfRect::new(
                self.glyph_space(x0 as f32),
                self.glyph_space(y0 as f32),
                self.glyph_space(x1 as f32),
                self.glyph_space(y1 as f32),
            ))
            .italic_angle(0.0)
            .ascent(self.glyph_space(metrics.ascender as f32))
            .descent(self.glyph_space(metrics.descender as f32))
            .cap_height(self.glyph_space(metrics.cap_height as f32))
            .stem_v(80.0)
            .font_file2(FONT_FILE_ID);

        let data = self.font.data();
        pdf.stream(FONT_FILE_ID, data)
            .pair(Name(b"Length1"), data.len() as i32);

        let mut cmap = UnicodeCmap::new(Name(b"Receipt-UTF16"), SYSTEM_INFO);
        for (&id, &ch) in &self.unicode {
            cmap.pair(id, ch);
        }
        let cmap = cmap.finish();
        pdf.cmap(CMAP_ID, &cmap);
        Ok(())
    }
}

impl ReceiptCanvas for PdfCanvas<'_> {
    fn draw(&mut self, cmd: &PaintCommand) -> Result<()> {
        match cmd {
            PaintCommand::StrokeRect { rect, width, color } => {
                self.set_stroke(*color);
                self.content.set_line_width(*width);
                self.content
                    .rect(rect.x, self.height - rect.bottom(), rect.width, rect.height);
                self.content.stroke();
            }
            PaintCommand::Text { origin, size, runs } => {
                self.content.begin_text();
                self.content.set_font(Name(FONT_RESOURCE), *size);
                self.content.next_line(origin.x, self.height - origin.y);
                for run in runs {
                    let encoded = self.encode(&run.text)?;
                    self.set_fill(run.color);
                    self.content.show(Str(&encoded));
                    self.set_fill(Color::BLACK);
                }
                self.content.end_text();
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<RenderedArtifact> {
        let mut pdf = Pdf::new();
        pdf.catalog(CATALOG_ID).pages(PAGE_TREE_ID);
        pdf.pages(PAGE_TREE_ID).kids([PAGE_ID]).count(1);

        let mut page = pdf.page(PAGE_ID);
        page.media_box(PdfRect::new(0.0, 0.0, self.width, self.height));
        page.parent(PAGE_TREE_ID);
        page.contents(CONTENT_ID);
        page.resources().fonts().pair(Name(FONT_RESOURCE), TYPE0_ID);
        page.finish();

        self.write_font(&mut pdf)?;

        let at = self.created_at;
        pdf.document_info(INFO_ID)
            .title(TextStr(&self.title))
            .producer(TextStr(PRODUCER))
            .creation_date(
                Date::new(at.year().clamp(0, 9999) as u16)
                    .month(at.month() as u8)
                    .day(at.day() as u8)
                    .hour(at.hour() as u8)
                    .minute(at.minute() as u8)
                    .second(at.second() as u8),
            );

        let content = self.content.finish();
        pdf.stream(CONTENT_ID, &content);

        log::debug!("pdf canvas finished with {} distinct glyphs", self.glyphs.len());
        Ok(RenderedArtifact::new(ArtifactKind::Pdf, pdf.finish()))
    }
}
