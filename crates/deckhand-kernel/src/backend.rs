//! Document backend capability trait.
//!
//! The registry never touches a document library directly. Everything it
//! needs goes through [`DocumentBackend`], which takes already-validated,
//! unit-normalized arguments (inches for geometry, points for type and line
//! widths) and returns keys into the presentation's object tree.
//!
//! A presentation object is owned by its registry entry and only reached
//! through that entry's lock, so backend methods take `&mut Self::Presentation`
//! and need no interior synchronization.

use std::path::{Path, PathBuf};

use deckhand_types::{Alignment, ChartType, Rect, Rgb, Series, ShapeType, TableCell, TextStyle};
use serde::Serialize;

use crate::error::Result;

/// Slide key within one presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SlideKey(pub u32);

/// Shape key within one slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ShapeKey(pub u32);

/// Single-run text box.
#[derive(Clone, Debug)]
pub struct TextBoxSpec {
    pub text: String,
    pub rect: Rect,
    pub style: TextStyle,
    pub alignment: Alignment,
}

/// Word-wrapped paragraph with line spacing.
#[derive(Clone, Debug)]
pub struct ParagraphSpec {
    pub text: String,
    pub rect: Rect,
    pub style: TextStyle,
    pub alignment: Alignment,
    /// Multiple of single spacing.
    pub line_spacing: f64,
}

/// One paragraph per item, all at the same indent level.
#[derive(Clone, Debug)]
pub struct BulletListSpec {
    pub items: Vec<String>,
    pub rect: Rect,
    pub style: TextStyle,
    pub level: u8,
    pub bullet_char: Option<char>,
}

/// Picture placement. Size policy is the backend's:
/// neither dimension given means 4 x 3 inches, one given means the other
/// follows the source aspect ratio.
#[derive(Clone, Debug)]
pub struct ImageSpec {
    pub path: PathBuf,
    pub left: f64,
    pub top: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub rect: Rect,
    pub title: Option<String>,
}

/// Rectangular grid of cells. Width falls back to the sum of the column
/// widths, then 8 inches; height falls back to half an inch per row.
#[derive(Clone, Debug)]
pub struct TableSpec {
    pub rows: Vec<Vec<TableCell>>,
    pub left: f64,
    pub top: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub column_widths: Option<Vec<f64>>,
    pub header_styled: bool,
}

#[derive(Clone, Debug)]
pub struct AutoShapeSpec {
    pub shape_type: ShapeType,
    pub rect: Rect,
    pub fill: Option<Rgb>,
    pub line: Option<Rgb>,
    /// Points.
    pub line_width: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderFooterSpec {
    pub header: Option<String>,
    pub footer: Option<String>,
    pub slide_number: bool,
    pub date: bool,
}

/// What a shape is, for read-back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    TextBox,
    Paragraph,
    BulletList,
    Picture,
    Chart,
    Table,
    AutoShape,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub text: String,
    /// Effective boldness after header styling.
    pub bold: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<CellSnapshot>>,
}

/// Read-back view of one shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShapeSnapshot {
    #[serde(skip)]
    pub key: ShapeKey,
    pub kind: ShapeKind,
    pub rect: Rect,
    /// One entry per paragraph for text shapes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paragraphs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<&'static str>,
}

/// Read-back view of one slide.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlideSnapshot {
    #[serde(skip)]
    pub key: SlideKey,
    pub layout_index: usize,
    pub layout_name: &'static str,
    pub title: Option<String>,
    pub background: Option<String>,
    pub shapes: Vec<ShapeSnapshot>,
    pub header: Option<String>,
    pub footer: Option<String>,
}

/// Capability interface over a document library.
///
/// One implementation exists per supported library. New backends implement
/// this trait; the registry and dispatcher never branch on backend type.
pub trait DocumentBackend: Send + Sync + 'static {
    /// Mutable in-memory document.
    type Presentation: Send + 'static;

    /// Number of slide layouts; valid layout indices are `0..layout_count()`.
    fn layout_count(&self) -> usize;

    fn new_presentation(&self) -> Result<Self::Presentation>;

    fn add_slide(
        &self,
        pres: &mut Self::Presentation,
        layout_index: usize,
        title: Option<&str>,
        background: Option<Rgb>,
    ) -> Result<SlideKey>;

    fn add_text_box(
        &self,
        pres: &mut Self::Presentation,
        slide: SlideKey,
        spec: TextBoxSpec,
    ) -> Result<ShapeKey>;

    fn add_paragraph(
        &self,
        pres: &mut Self::Presentation,
        slide: SlideKey,
        spec: ParagraphSpec,
    ) -> Result<ShapeKey>;

    fn add_bullet_list(
        &self,
        pres: &mut Self::Presentation,
        slide: SlideKey,
        spec: BulletListSpec,
    ) -> Result<ShapeKey>;

    /// Check that `path` is an image this backend can embed, without
    /// touching any document. Same errors as [`add_image`](Self::add_image).
    fn check_image(&self, path: &Path) -> Result<()>;

    /// Fails with `ResourceNotFound` when the file is missing.
    fn add_image(
        &self,
        pres: &mut Self::Presentation,
        slide: SlideKey,
        spec: ImageSpec,
    ) -> Result<ShapeKey>;

    fn add_chart(
        &self,
        pres: &mut Self::Presentation,
        slide: SlideKey,
        spec: ChartSpec,
    ) -> Result<ShapeKey>;

    fn add_table(
        &self,
        pres: &mut Self::Presentation,
        slide: SlideKey,
        spec: TableSpec,
    ) -> Result<ShapeKey>;

    fn add_shape(
        &self,
        pres: &mut Self::Presentation,
        slide: SlideKey,
        spec: AutoShapeSpec,
    ) -> Result<ShapeKey>;

    /// Decorate `slides`. The header is left off the deck's first slide.
    fn apply_header_footer(
        &self,
        pres: &mut Self::Presentation,
        slides: &[SlideKey],
        spec: &HeaderFooterSpec,
    ) -> Result<()>;

    fn save(&self, pres: &Self::Presentation, path: &Path) -> Result<()>;

    fn slide_snapshot(&self, pres: &Self::Presentation, slide: SlideKey) -> Result<SlideSnapshot>;

    fn shape_snapshot(
        &self,
        pres: &Self::Presentation,
        slide: SlideKey,
        shape: ShapeKey,
    ) -> Result<ShapeSnapshot>;
}
