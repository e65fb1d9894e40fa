/// Paint command set shared by the vector and raster canvases.
///
/// Coordinates use a top-left origin; `Text::origin` is the left end of the
/// baseline. Units are whatever the producing `LayoutMetrics` uses (points
/// for PDF, pixels for raster).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Accent used for payer name and digit amount
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Fill of the text placeholder boxes on a raster canvas without a font
    pub const PLACEHOLDER: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `0.0..=1.0`
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(c(r), c(g), c(b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// A run of text drawn in one color, continuing where the previous run ended
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub color: Color,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), color: Color::BLACK }
    }

    pub fn accent(text: impl Into<String>) -> Self {
        Self { text: text.into(), color: Color::BLUE }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Axis-aligned outline; `width` is the stroke width in canvas units
    StrokeRect { rect: Rect, width: f32, color: Color },
    Text { origin: Point, size: f32, runs: Vec<TextRun> },
}

impl PaintCommand {
    /// Concatenated text of a `Text` command
    pub fn text(&self) -> Option<String> {
        match self {
            PaintCommand::Text { runs, .. } => Some(runs.iter().map(|r| r.text.as_str()).collect()),
            PaintCommand::StrokeRect { .. } => None,
        }
    }
}
