//! Tool request types.
//!
//! These are the wire shapes of every operation, with the defaults callers
//! can rely on when they omit a field. Geometry is in inches, type sizes and
//! line widths in points.

use deckhand_types::{CellInput, ColorInput, SeriesInput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::compose::SlideContent;

fn default_filename() -> String {
    "presentation".into()
}
fn default_layout() -> i64 {
    1
}
fn default_left() -> f64 {
    1.0
}
fn default_top() -> f64 {
    2.0
}
fn default_width() -> f64 {
    8.0
}
fn default_text_height() -> f64 {
    1.0
}
fn default_block_height() -> f64 {
    3.0
}
fn default_chart_height() -> f64 {
    4.0
}
fn default_shape_extent() -> f64 {
    2.0
}
fn default_font_size() -> f64 {
    18.0
}
fn default_body_font_size() -> f64 {
    16.0
}
fn default_font_name() -> String {
    "Calibri".into()
}
fn default_color() -> ColorInput {
    ColorInput::Components([0, 0, 0])
}
fn default_alignment() -> String {
    "LEFT".into()
}
fn default_one() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}

/// A chart category label. Numbers are accepted and shown as written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Number(f64),
}

impl Label {
    pub fn into_text(self) -> String {
        match self {
            Label::Text(s) => s,
            Label::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_string())
    }
}

/// Create a new, empty presentation.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreatePresentationRequest {
    #[schemars(description = "File name used when saving without an explicit name (default: presentation)")]
    #[serde(default = "default_filename")]
    pub filename: String,
}

impl Default for CreatePresentationRequest {
    fn default() -> Self {
        Self {
            filename: default_filename(),
        }
    }
}

/// Append a slide.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddSlideRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Layout: 0 Title Slide, 1 Title and Content, 2 Section Header, 3 Two Content, 4 Comparison, 5 Title Only, 6 Blank, 7 Content with Caption, 8 Picture with Caption (default: 1)")]
    #[serde(default = "default_layout")]
    pub layout_index: i64,
    #[schemars(description = "Slide title, written into the layout's title placeholder")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "Background color as [r, g, b] or \"#RRGGBB\"")]
    #[serde(default)]
    pub background_color: Option<ColorInput>,
}

/// Add a single-run text box.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddTextRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Slide ID")]
    pub slide_id: String,
    #[schemars(description = "Text content; newlines become line breaks")]
    pub text: String,
    #[schemars(description = "Left edge in inches (default: 1)")]
    #[serde(default = "default_left")]
    pub left: f64,
    #[schemars(description = "Top edge in inches (default: 2)")]
    #[serde(default = "default_top")]
    pub top: f64,
    #[schemars(description = "Width in inches (default: 8)")]
    #[serde(default = "default_width")]
    pub width: f64,
    #[schemars(description = "Height in inches (default: 1)")]
    #[serde(default = "default_text_height")]
    pub height: f64,
    #[schemars(description = "Font size in points (default: 18)")]
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[schemars(description = "Font family (default: Calibri)")]
    #[serde(default = "default_font_name")]
    pub font_name: String,
    #[schemars(description = "Text color as [r, g, b] or \"#RRGGBB\" (default: black)")]
    #[serde(default = "default_color")]
    pub color: ColorInput,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[schemars(description = "LEFT, CENTER, RIGHT or JUSTIFY (default: LEFT)")]
    #[serde(default = "default_alignment")]
    pub alignment: String,
}

/// Add a word-wrapped paragraph.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddParagraphRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Slide ID")]
    pub slide_id: String,
    #[schemars(description = "Paragraph text")]
    pub text: String,
    #[serde(default = "default_left")]
    pub left: f64,
    #[serde(default = "default_top")]
    pub top: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[schemars(description = "Height in inches (default: 3)")]
    #[serde(default = "default_block_height")]
    pub height: f64,
    #[schemars(description = "Font size in points (default: 16)")]
    #[serde(default = "default_body_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_name")]
    pub font_name: String,
    #[serde(default = "default_color")]
    pub color: ColorInput,
    #[schemars(description = "LEFT, CENTER, RIGHT or JUSTIFY (default: LEFT)")]
    #[serde(default = "default_alignment")]
    pub alignment: String,
    #[schemars(description = "Line spacing as a multiple of single spacing (default: 1.0)")]
    #[serde(default = "default_one")]
    pub line_spacing: f64,
}

/// Add a bulleted list, one paragraph per item.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddBulletListRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Slide ID")]
    pub slide_id: String,
    #[schemars(description = "Bullet items, in order")]
    pub items: Vec<String>,
    #[serde(default = "default_left")]
    pub left: f64,
    #[serde(default = "default_top")]
    pub top: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_block_height")]
    pub height: f64,
    #[serde(default = "default_body_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_name")]
    pub font_name: String,
    #[serde(default = "default_color")]
    pub color: ColorInput,
    #[schemars(description = "Indent level 0-8 (default: 0)")]
    #[serde(default)]
    pub level: i64,
    #[schemars(description = "Single bullet character (default: •)")]
    #[serde(default)]
    pub bullet_character: Option<String>,
}

/// Place a picture from a local file.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddImageRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Slide ID")]
    pub slide_id: String,
    #[schemars(description = "Path to a PNG, JPEG, GIF or BMP file")]
    pub image_path: String,
    #[serde(default = "default_left")]
    pub left: f64,
    #[serde(default = "default_top")]
    pub top: f64,
    #[schemars(description = "Width in inches; omit both to get 4x3, omit one to keep the aspect ratio")]
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// Add a chart.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddChartRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Slide ID")]
    pub slide_id: String,
    #[schemars(description = "Chart type, e.g. COLUMN_CLUSTERED, LINE, PIE, XY_SCATTER")]
    pub chart_type: String,
    #[schemars(description = "Category labels")]
    pub categories: Vec<Label>,
    #[schemars(description = "Series as [name, [values...]] or {name, values}; one value per category")]
    pub data_series: Vec<SeriesInput>,
    #[serde(default = "default_left")]
    pub left: f64,
    #[serde(default = "default_top")]
    pub top: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[schemars(description = "Height in inches (default: 4)")]
    #[serde(default = "default_chart_height")]
    pub height: f64,
    #[serde(default)]
    pub chart_title: Option<String>,
}

/// Add a table.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddTableRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Slide ID")]
    pub slide_id: String,
    #[schemars(description = "Rows of cells; each cell is a string, number, boolean or {text, options}")]
    pub data: Vec<Vec<CellInput>>,
    #[serde(default = "default_left")]
    pub left: f64,
    #[serde(default = "default_top")]
    pub top: f64,
    #[schemars(description = "Width in inches (default: sum of column_widths, else 8)")]
    #[serde(default)]
    pub width: Option<f64>,
    #[schemars(description = "Height in inches (default: 0.5 per row)")]
    #[serde(default)]
    pub height: Option<f64>,
    #[schemars(description = "Column widths in inches, one per column")]
    #[serde(default)]
    pub column_widths: Option<Vec<f64>>,
    #[schemars(description = "Bold the first row (default: true)")]
    #[serde(default = "default_true")]
    pub first_row_is_header: bool,
}

/// Add an auto shape.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddShapeRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Slide ID")]
    pub slide_id: String,
    #[schemars(description = "Shape type, e.g. RECTANGLE, OVAL, RIGHT_ARROW, STAR_5_POINT")]
    pub shape_type: String,
    #[serde(default = "default_shape_extent")]
    pub left: f64,
    #[serde(default = "default_shape_extent")]
    pub top: f64,
    #[serde(default = "default_shape_extent")]
    pub width: f64,
    #[serde(default = "default_shape_extent")]
    pub height: f64,
    #[serde(default)]
    pub fill_color: Option<ColorInput>,
    #[schemars(description = "Outline color; the outline is only drawn when this is set")]
    #[serde(default)]
    pub line_color: Option<ColorInput>,
    #[schemars(description = "Outline width in points (default: 1.0)")]
    #[serde(default = "default_one")]
    pub line_width: f64,
}

/// Decorate every slide with header, footer, slide number and date.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddHeaderFooterRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Header text, shown on every slide but the first")]
    #[serde(default)]
    pub header_text: Option<String>,
    #[serde(default)]
    pub footer_text: Option<String>,
    #[serde(default = "default_true")]
    pub slide_number: bool,
    #[serde(default = "default_true")]
    pub date: bool,
}

/// Write a presentation to disk.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct SavePresentationRequest {
    #[schemars(description = "Presentation ID")]
    pub presentation_id: String,
    #[schemars(description = "Output file name; .pptx is appended when missing (default: the name given at creation)")]
    #[serde(default)]
    pub filename: Option<String>,
}

/// Build a whole deck in one call.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateCompletePresentationRequest {
    #[schemars(description = "Presentation title, shown on the title slide")]
    pub title: String,
    #[schemars(description = "Content slides, in order")]
    pub slides_content: Vec<SlideContent>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[schemars(description = "Save to this file name when given")]
    #[serde(default)]
    pub filename: Option<String>,
    #[schemars(description = "Title slide background as [r, g, b] or \"#RRGGBB\"")]
    #[serde(default)]
    pub title_slide_color: Option<ColorInput>,
}

// Constructors with the wire defaults, for callers that build requests in code.

impl AddSlideRequest {
    pub fn new(presentation_id: impl Into<String>, layout_index: i64) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            layout_index,
            title: None,
            background_color: None,
        }
    }
}

impl AddTextRequest {
    pub fn new(
        presentation_id: impl Into<String>,
        slide_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            slide_id: slide_id.into(),
            text: text.into(),
            left: default_left(),
            top: default_top(),
            width: default_width(),
            height: default_text_height(),
            font_size: default_font_size(),
            font_name: default_font_name(),
            color: default_color(),
            bold: false,
            italic: false,
            underline: false,
            alignment: default_alignment(),
        }
    }
}

impl AddParagraphRequest {
    pub fn new(
        presentation_id: impl Into<String>,
        slide_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            slide_id: slide_id.into(),
            text: text.into(),
            left: default_left(),
            top: default_top(),
            width: default_width(),
            height: default_block_height(),
            font_size: default_body_font_size(),
            font_name: default_font_name(),
            color: default_color(),
            alignment: default_alignment(),
            line_spacing: default_one(),
        }
    }
}

impl AddBulletListRequest {
    pub fn new(
        presentation_id: impl Into<String>,
        slide_id: impl Into<String>,
        items: Vec<String>,
    ) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            slide_id: slide_id.into(),
            items,
            left: default_left(),
            top: default_top(),
            width: default_width(),
            height: default_block_height(),
            font_size: default_body_font_size(),
            font_name: default_font_name(),
            color: default_color(),
            level: 0,
            bullet_character: None,
        }
    }
}

impl AddImageRequest {
    pub fn new(
        presentation_id: impl Into<String>,
        slide_id: impl Into<String>,
        image_path: impl Into<String>,
    ) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            slide_id: slide_id.into(),
            image_path: image_path.into(),
            left: default_left(),
            top: default_top(),
            width: None,
            height: None,
        }
    }
}

impl AddChartRequest {
    pub fn new(
        presentation_id: impl Into<String>,
        slide_id: impl Into<String>,
        chart_type: impl Into<String>,
        categories: Vec<Label>,
        data_series: Vec<SeriesInput>,
    ) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            slide_id: slide_id.into(),
            chart_type: chart_type.into(),
            categories,
            data_series,
            left: default_left(),
            top: default_top(),
            width: default_width(),
            height: default_chart_height(),
            chart_title: None,
        }
    }
}

impl AddTableRequest {
    pub fn new(
        presentation_id: impl Into<String>,
        slide_id: impl Into<String>,
        data: Vec<Vec<CellInput>>,
    ) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            slide_id: slide_id.into(),
            data,
            left: default_left(),
            top: default_top(),
            width: None,
            height: None,
            column_widths: None,
            first_row_is_header: true,
        }
    }
}
