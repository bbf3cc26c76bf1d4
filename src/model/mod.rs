//! # Layout Model
//!
//! The input representation for the layout engine. A job is one user action
//! in the converter front end: a set of images to put on pages, a workbook of
//! sheets to render as tables, or a block of extracted text. Every job carries
//! its own page configuration; nothing here is shared between jobs.
//!
//! All lengths are in page units. The presets in [`PageSize`] are in
//! millimetres, so in practice page units are millimetres.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

// ── Page geometry ───────────────────────────────────────────────

/// Standard page sizes in millimetres (portrait).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[serde(alias = "a3")]
    A3,
    #[default]
    #[serde(alias = "a4")]
    A4,
    #[serde(alias = "a5")]
    A5,
    #[serde(alias = "letter")]
    Letter,
    #[serde(alias = "legal")]
    Legal,
    #[serde(alias = "tabloid")]
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in millimetres, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A3 => (297.0, 420.0),
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Tabloid => (279.4, 431.8),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page configuration as it arrives from the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
    /// Margin applied to all four sides.
    #[serde(default = "default_margin")]
    pub margin: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin: default_margin(),
        }
    }
}

fn default_margin() -> f64 {
    10.0
}

impl PageConfig {
    /// Resolve size and orientation into validated page geometry.
    /// Landscape puts the longer side horizontally.
    pub fn geometry(&self) -> Result<PageGeometry> {
        let (w, h) = self.size.dimensions();
        let (width, height) = match self.orientation {
            Orientation::Portrait => (w.min(h), w.max(h)),
            Orientation::Landscape => (w.max(h), w.min(h)),
        };
        PageGeometry::new(width, height, self.margin)
    }
}

/// Validated page dimensions plus a uniform margin.
///
/// The usable area is the page minus the margin on every side; it is
/// guaranteed to be positive in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    width: f64,
    height: f64,
    margin: f64,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64, margin: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && margin.is_finite()) {
            return Err(LayoutError::InvalidDimensions(format!(
                "page {width}x{height} with margin {margin} is not finite"
            )));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(LayoutError::InvalidDimensions(format!(
                "page {width}x{height} must be positive"
            )));
        }
        if margin < 0.0 {
            return Err(LayoutError::InvalidDimensions(format!(
                "margin {margin} must not be negative"
            )));
        }
        if width - 2.0 * margin <= 0.0 || height - 2.0 * margin <= 0.0 {
            return Err(LayoutError::InvalidDimensions(format!(
                "margin {margin} leaves no usable area on a {width}x{height} page"
            )));
        }
        Ok(Self {
            width,
            height,
            margin,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    /// Y coordinate of the bottom edge of the usable area.
    pub fn bottom(&self) -> f64 {
        self.height - self.margin
    }
}

// ── Images ──────────────────────────────────────────────────────

/// Pixel dimensions of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageSpec {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_px as f64 / self.height_px as f64
    }
}

/// An axis-aligned box in page units, origin at the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Grow the box outward by `by` on all four sides.
    pub fn expand(&self, by: f64) -> Placement {
        Placement {
            x: self.x - by,
            y: self.y - by,
            width: self.width + 2.0 * by,
            height: self.height + 2.0 * by,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    None,
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl BorderStyle {
    /// Dash array (on, off) in page units. Empty means a continuous stroke.
    pub fn dash_pattern(&self) -> &'static [f64] {
        match self {
            BorderStyle::None | BorderStyle::Solid => &[],
            BorderStyle::Dashed => &[3.0, 3.0],
            BorderStyle::Dotted => &[1.0, 1.0],
        }
    }
}

/// An sRGB colour, written as `#rrggbb` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const GREY: Color = Color {
        r: 0xc0,
        g: 0xc0,
        b: 0xc0,
    };

    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let invalid = || LayoutError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        match hex.len() {
            6 => Ok(Color {
                r: channel(0..2)?,
                g: channel(2..4)?,
                b: channel(4..6)?,
            }),
            3 => {
                let r = channel(0..1)?;
                let g = channel(1..2)?;
                let b = channel(2..3)?;
                Ok(Color {
                    r: r * 17,
                    g: g * 17,
                    b: b * 17,
                })
            }
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// How a border is stroked around a placed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderSpec {
    #[serde(default)]
    pub style: BorderStyle,
    #[serde(default = "default_border_color")]
    pub color: Color,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for BorderSpec {
    fn default() -> Self {
        Self {
            style: BorderStyle::Solid,
            color: default_border_color(),
            stroke_width: default_stroke_width(),
        }
    }
}

impl BorderSpec {
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(LayoutError::InvalidDimensions(format!(
                "stroke width {} must not be negative",
                self.stroke_width
            )));
        }
        Ok(())
    }
}

fn default_border_color() -> Color {
    Color::BLACK
}

fn default_stroke_width() -> f64 {
    1.0
}

// ── Text and grids ──────────────────────────────────────────────

/// Font size and line spacing, both in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetrics {
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_line_height_factor")]
    pub line_height_factor: f64,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            line_height_factor: default_line_height_factor(),
        }
    }
}

/// 12pt expressed in millimetres.
fn default_font_size() -> f64 {
    4.2
}

fn default_line_height_factor() -> f64 {
    1.15
}

impl FontMetrics {
    pub fn new(font_size: f64, line_height_factor: f64) -> Self {
        Self {
            font_size,
            line_height_factor,
        }
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * self.line_height_factor
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let lh = self.line_height();
        if !(self.font_size.is_finite() && lh.is_finite()) || self.font_size <= 0.0 || lh <= 0.0 {
            return Err(LayoutError::InvalidDimensions(format!(
                "font size {} with line height factor {} does not give a positive line height",
                self.font_size, self.line_height_factor
            )));
        }
        Ok(())
    }
}

/// Rows of cell strings. Rows may have different lengths.
pub type Grid = Vec<Vec<String>>;

/// One spreadsheet sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rows: Grid,
}

/// How grid column widths are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "camelCase")]
pub enum ColumnPolicy {
    /// Every column gets the same share of the usable width.
    #[default]
    Equal,
    /// Columns are sized from their widest unwrapped line, then scaled to
    /// the usable width.
    Content {
        #[serde(rename = "minWidth", default = "default_min_column_width")]
        min_width: f64,
    },
}

fn default_min_column_width() -> f64 {
    8.0
}

/// What to do with a row taller than the whole usable page height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Place it on its own page anyway and report a notice.
    #[default]
    Place,
    /// Fail the layout.
    Reject,
}

/// Grid rendering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    #[serde(default)]
    pub columns: ColumnPolicy,
    /// Horizontal inset of cell text from the cell edges.
    #[serde(default = "default_cell_padding")]
    pub cell_padding: f64,
    /// Stroke drawn around each cell. `None` draws no cell rectangles.
    #[serde(default = "default_cell_border")]
    pub cell_border: Option<BorderSpec>,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            columns: ColumnPolicy::Equal,
            cell_padding: default_cell_padding(),
            cell_border: default_cell_border(),
            overflow: OverflowPolicy::Place,
        }
    }
}

impl GridOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.cell_padding.is_finite() || self.cell_padding < 0.0 {
            return Err(LayoutError::InvalidDimensions(format!(
                "cell padding {} must not be negative",
                self.cell_padding
            )));
        }
        match &self.cell_border {
            Some(border) => border.validate(),
            None => Ok(()),
        }
    }
}

fn default_cell_padding() -> f64 {
    1.0
}

fn default_cell_border() -> Option<BorderSpec> {
    Some(BorderSpec {
        style: BorderStyle::Solid,
        color: Color::GREY,
        stroke_width: 0.2,
    })
}

// ── Jobs ────────────────────────────────────────────────────────

/// Which glyph advances to measure text with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Typeface {
    /// Every character advances by `advance_ratio` × font size.
    Uniform {
        #[serde(rename = "advanceRatio", default = "default_advance_ratio")]
        advance_ratio: f64,
    },
    /// Advances read from a TrueType/OpenType font (data URI, base64 or path).
    TrueType { src: String },
}

impl Default for Typeface {
    fn default() -> Self {
        Typeface::Uniform {
            advance_ratio: default_advance_ratio(),
        }
    }
}

fn default_advance_ratio() -> f64 {
    0.5
}

/// Text settings shared by the workbook and text jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default)]
    pub font: FontMetrics,
    #[serde(default)]
    pub typeface: Typeface,
    /// Split overlong words at syllable boundaries instead of characters.
    #[serde(default)]
    pub hyphenate: bool,
    /// BCP 47 tag picking the hyphenation patterns. English when absent.
    #[serde(default)]
    pub lang: Option<String>,
}

/// An image to place. Either the pixel size is known up front or it is
/// decoded from `src`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub width_px: Option<u32>,
    #[serde(default)]
    pub height_px: Option<u32>,
}

impl ImageSource {
    pub fn from_spec(spec: ImageSpec) -> Self {
        Self {
            src: None,
            width_px: Some(spec.width_px),
            height_px: Some(spec.height_px),
        }
    }

    /// The pixel size when both dimensions were supplied.
    pub fn known_spec(&self) -> Option<ImageSpec> {
        match (self.width_px, self.height_px) {
            (Some(w), Some(h)) => Some(ImageSpec::new(w, h)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageJob {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub border: Option<BorderSpec>,
    pub images: Vec<ImageSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookJob {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub typography: Typography,
    #[serde(default)]
    pub grid: GridOptions,
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextJob {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub typography: Typography,
    pub text: String,
}

/// One conversion requested by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Job {
    Images(ImageJob),
    Workbook(WorkbookJob),
    Text(TextJob),
}

impl Job {
    pub fn page(&self) -> &PageConfig {
        match self {
            Job::Images(job) => &job.page,
            Job::Workbook(job) => &job.page,
            Job::Text(job) => &job.page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_usable_area() {
        let page = PageConfig::default().geometry().unwrap();
        assert_eq!(page.width(), 210.0);
        assert_eq!(page.height(), 297.0);
        assert_eq!(page.usable_width(), 190.0);
        assert_eq!(page.usable_height(), 277.0);
        assert_eq!(page.bottom(), 287.0);
    }

    #[test]
    fn landscape_swaps_sides() {
        let config = PageConfig {
            size: PageSize::Letter,
            orientation: Orientation::Landscape,
            margin: 0.0,
        };
        let page = config.geometry().unwrap();
        assert_eq!(page.width(), 279.4);
        assert_eq!(page.height(), 215.9);
    }

    #[test]
    fn margin_too_large_is_rejected() {
        assert!(matches!(
            PageGeometry::new(100.0, 100.0, 50.0),
            Err(LayoutError::InvalidDimensions(_))
        ));
        assert!(PageGeometry::new(100.0, 100.0, -1.0).is_err());
        assert!(PageGeometry::new(0.0, 100.0, 0.0).is_err());
        assert!(PageGeometry::new(f64::NAN, 100.0, 0.0).is_err());
    }

    #[test]
    fn color_hex_forms() {
        assert_eq!(
            Color::from_hex("#ff8000").unwrap(),
            Color { r: 255, g: 128, b: 0 }
        );
        assert_eq!(Color::from_hex("#fff").unwrap(), Color { r: 255, g: 255, b: 255 });
        assert_eq!(Color::from_hex("#C0C0C0").unwrap().to_hex(), "#c0c0c0");
        assert!(Color::from_hex("ff0000").is_err());
        assert!(Color::from_hex("#ff00").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn dash_patterns() {
        assert!(BorderStyle::Solid.dash_pattern().is_empty());
        assert_eq!(BorderStyle::Dashed.dash_pattern(), &[3.0, 3.0]);
        assert_eq!(BorderStyle::Dotted.dash_pattern(), &[1.0, 1.0]);
    }

    #[test]
    fn job_json_defaults() {
        let job: Job = serde_json::from_str(
            r##"{
                "type": "images",
                "page": { "size": "letter", "orientation": "landscape" },
                "border": { "style": "dashed", "color": "#336699" },
                "images": [{ "widthPx": 800, "heightPx": 600 }]
            }"##,
        )
        .unwrap();
        match job {
            Job::Images(job) => {
                assert_eq!(job.page.size, PageSize::Letter);
                assert_eq!(job.page.margin, 10.0);
                let border = job.border.unwrap();
                assert_eq!(border.style, BorderStyle::Dashed);
                assert_eq!(border.stroke_width, 1.0);
                assert_eq!(border.color.to_hex(), "#336699");
                assert_eq!(job.images[0].known_spec(), Some(ImageSpec::new(800, 600)));
            }
            other => panic!("expected an images job, got {other:?}"),
        }
    }

    #[test]
    fn workbook_json_policies() {
        let job: Job = serde_json::from_str(
            r#"{
                "type": "workbook",
                "grid": { "columns": { "policy": "content", "minWidth": 12 }, "overflow": "reject" },
                "sheets": [{ "name": "Q1", "rows": [["a", "b"], ["c"]] }]
            }"#,
        )
        .unwrap();
        let Job::Workbook(job) = job else {
            panic!("expected a workbook job");
        };
        assert_eq!(job.grid.columns, ColumnPolicy::Content { min_width: 12.0 });
        assert_eq!(job.grid.overflow, OverflowPolicy::Reject);
        assert_eq!(job.grid.cell_padding, 1.0);
        assert!(job.grid.cell_border.is_some());
        assert_eq!(job.typography.font, FontMetrics::default());
        assert_eq!(job.sheets[0].rows.len(), 2);
    }

    #[test]
    fn negative_strokes_and_padding_are_rejected() {
        let border = BorderSpec {
            stroke_width: -1.0,
            ..BorderSpec::default()
        };
        assert!(matches!(border.validate(), Err(LayoutError::InvalidDimensions(_))));
        assert!(BorderSpec::default().validate().is_ok());

        let padded = GridOptions {
            cell_padding: -0.5,
            ..GridOptions::default()
        };
        assert!(matches!(padded.validate(), Err(LayoutError::InvalidDimensions(_))));

        let stroked = GridOptions {
            cell_border: Some(BorderSpec {
                stroke_width: f64::NAN,
                ..BorderSpec::default()
            }),
            ..GridOptions::default()
        };
        assert!(stroked.validate().is_err());
        assert!(GridOptions::default().validate().is_ok());
    }

    #[test]
    fn bad_color_fails_the_job() {
        let result: std::result::Result<Job, _> = serde_json::from_str(
            r#"{ "type": "images", "border": { "color": "red" }, "images": [] }"#,
        );
        assert!(result.is_err());
    }
}
