/// Fixed receipt layout.
///
/// The receipt is described once, in points, and scaled by
/// `LayoutMetrics::unit` for the target canvas. The vector path uses
/// `unit == 1`; the direct raster path uses `dpi / 72` so both canvases share
/// relative positions while the raster gets proportionally larger type.

use crate::model::ReceiptDocument;
use crate::rendering::paint::{Color, PaintCommand, Point, Rect, TextRun};
use crate::{PageSize, DEFAULT_MARGIN, DEFAULT_TOP_MARGIN};

pub const TITLE: &str = "收款收据";
pub const RECEIPT_NO_LABEL: &str = "收据号:";
pub const DATE_LABEL: &str = "日期:";
pub const RECEIVED_FROM: &str = "今收到 ";
pub const PAYMENT_OPTIONS: [&str; 2] = ["现金 □     转账 □", "支票 □  微信支付宝 □"];
pub const SEAL: &str = "(盖章)";

/// Point sizes per region before scaling
pub const TITLE_SIZE: f32 = 14.0;
pub const HEADER_SIZE: f32 = 8.0;
pub const BODY_SIZE: f32 = 9.0;
pub const AMOUNT_SIZE: f32 = 12.0;
pub const FOOTNOTE_SIZE: f32 = 7.0;

const OUTER_STROKE: f32 = 1.5;
const ROW_STROKE: f32 = 1.0;
const ROW_HEIGHT: f32 = 18.0;
const ROW_SPACING: f32 = 22.0;

/// Canvas extent and the scale every fixed offset is multiplied by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub width: f32,
    pub height: f32,
    pub unit: f32,
    pub margin: f32,
    pub top_margin: f32,
}

impl LayoutMetrics {
    /// Metrics in PDF points for the physical page.
    pub fn vector(page: PageSize, margin: f32, top_margin: f32) -> Self {
        let (width, height) = page.to_points();
        Self { width, height, unit: 1.0, margin, top_margin }
    }

    /// Metrics in pixels for `page` at `dpi`, with the default margins.
    pub fn raster(page: PageSize, dpi: f32) -> Self {
        let (width, height) = page.to_pixels(dpi);
        let unit = dpi / 72.0;
        Self {
            width: width as f32,
            height: height as f32,
            unit,
            margin: DEFAULT_MARGIN * unit,
            top_margin: DEFAULT_TOP_MARGIN * unit,
        }
    }

    /// Replace the margins, given in points.
    pub fn with_margins(mut self, margin: f32, top_margin: f32) -> Self {
        self.margin = margin * self.unit;
        self.top_margin = top_margin * self.unit;
        self
    }

    /// Canvas size rounded to whole pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width.round().max(1.0) as u32, self.height.round().max(1.0) as u32)
    }
}

/// Lay out `doc` as an ordered list of paint commands.
pub fn layout_receipt(doc: &ReceiptDocument, m: &LayoutMetrics) -> Vec<PaintCommand> {
    let u = |v: f32| v * m.unit;
    let (w, h) = (m.width, m.height);
    let mut out = Vec::with_capacity(17);

    out.push(PaintCommand::StrokeRect {
        rect: Rect::new(m.margin, m.top_margin, w - 2.0 * m.margin, h - 2.0 * m.top_margin),
        width: u(OUTER_STROKE),
        color: Color::BLACK,
    });

    text(&mut out, w / 2.0 - u(35.0), m.top_margin + u(12.0), u(TITLE_SIZE), vec![TextRun::plain(TITLE)]);

    let number_y = m.top_margin + u(20.0);
    let date_y = number_y + u(10.0);
    for (y, label, value) in [(number_y, RECEIPT_NO_LABEL, &doc.id), (date_y, DATE_LABEL, &doc.date)] {
        text(&mut out, w - u(110.0), y, u(HEADER_SIZE), vec![TextRun::plain(label)]);
        text(&mut out, w - u(75.0), y, u(HEADER_SIZE), vec![TextRun::plain(value.as_str())]);
    }

    let rows = [
        vec![TextRun::plain(RECEIVED_FROM), TextRun::accent(doc.payer.as_str())],
        vec![TextRun::plain(format!("交来: {} {}", doc.month, doc.purpose))],
        vec![TextRun::plain(format!("金额(大写) 人民币 {}", doc.rent_zh))],
    ];
    let first_row = m.top_margin + u(45.0);
    let mut y = first_row;
    for runs in rows {
        out.push(PaintCommand::StrokeRect {
            rect: Rect::new(m.margin + u(5.0), y, w - 2.0 * m.margin - u(10.0), u(ROW_HEIGHT)),
            width: u(ROW_STROKE),
            color: Color::BLACK,
        });
        text(&mut out, m.margin + u(10.0), y + u(11.0), u(BODY_SIZE), runs);
        y += u(ROW_SPACING);
    }

    let bottom_y = first_row + u(2.0 * ROW_SPACING + 30.0);
    text(
        &mut out,
        m.margin + u(10.0),
        bottom_y,
        u(AMOUNT_SIZE),
        vec![TextRun::accent(format!("人民币¥ {}", doc.rent))],
    );

    let payment_y = bottom_y + u(3.0);
    text(&mut out, w / 2.0 - u(50.0), payment_y, u(FOOTNOTE_SIZE), vec![TextRun::plain(PAYMENT_OPTIONS[0])]);
    text(&mut out, w / 2.0 - u(50.0), payment_y + u(8.0), u(FOOTNOTE_SIZE), vec![TextRun::plain(PAYMENT_OPTIONS[1])]);
    text(&mut out, w - u(50.0), payment_y + u(3.0), u(FOOTNOTE_SIZE), vec![TextRun::plain(SEAL)]);

    text(
        &mut out,
        w - u(90.0),
        h - u(40.0),
        u(BODY_SIZE),
        vec![TextRun::plain(format!("经手人： {}", doc.recipient))],
    );

    out
}

fn text(out: &mut Vec<PaintCommand>, x: f32, y: f32, size: f32, runs: Vec<TextRun>) {
    out.push(PaintCommand::Text { origin: Point::new(x, y), size, runs });
}
