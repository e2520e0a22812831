//! In-memory PresentationML object tree.
//!
//! IDs follow PowerPoint's conventions: slide IDs start at 256; within a slide,
//! 1 is the shape tree and 2 the title placeholder, so content shapes start
//! at 3.

use deckhand_types::{
    Alignment, ChartType, Rect, Rgb, SLIDE_HEIGHT_IN, SLIDE_WIDTH_IN, Series, TableCell, TextStyle,
    geometry::inches_to_emu,
};

use crate::backend::{AutoShapeSpec, HeaderFooterSpec, ShapeKey, ShapeKind, SlideKey};
use crate::error::{DeckError, Result};

use super::media::MediaPart;

const FIRST_SLIDE_ID: u32 = 256;
const FIRST_SHAPE_ID: u32 = 3;

/// A mutable presentation.
#[derive(Debug)]
pub struct PptxPresentation {
    pub(crate) slides: Vec<SlidePart>,
    pub(crate) media: Vec<MediaPart>,
    /// EMU.
    pub(crate) slide_width: i64,
    /// EMU.
    pub(crate) slide_height: i64,
    next_slide_id: u32,
}

impl PptxPresentation {
    pub(crate) fn new() -> Self {
        Self {
            slides: Vec::new(),
            media: Vec::new(),
            slide_width: inches_to_emu(SLIDE_WIDTH_IN),
            slide_height: inches_to_emu(SLIDE_HEIGHT_IN),
            next_slide_id: FIRST_SLIDE_ID,
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub(crate) fn push_slide(
        &mut self,
        layout: usize,
        title: Option<String>,
        background: Option<Rgb>,
    ) -> SlideKey {
        let id = self.next_slide_id;
        self.next_slide_id += 1;
        self.slides.push(SlidePart {
            id,
            layout,
            title,
            background,
            shapes: Vec::new(),
            chrome: None,
            next_shape_id: FIRST_SHAPE_ID,
        });
        SlideKey(id)
    }

    pub(crate) fn slide(&self, key: SlideKey) -> Result<&SlidePart> {
        self.slides
            .iter()
            .find(|s| s.id == key.0)
            .ok_or_else(|| DeckError::backend(format!("no slide with id {}", key.0)))
    }

    pub(crate) fn slide_mut(&mut self, key: SlideKey) -> Result<&mut SlidePart> {
        self.slides
            .iter_mut()
            .find(|s| s.id == key.0)
            .ok_or_else(|| DeckError::backend(format!("no slide with id {}", key.0)))
    }

    /// Zero-based position of a slide in show order.
    pub(crate) fn position(&self, key: SlideKey) -> Option<usize> {
        self.slides.iter().position(|s| s.id == key.0)
    }

    pub(crate) fn push_media(&mut self, media: MediaPart) -> usize {
        self.media.push(media);
        self.media.len() - 1
    }
}

/// One slide.
#[derive(Debug)]
pub(crate) struct SlidePart {
    pub id: u32,
    pub layout: usize,
    pub title: Option<String>,
    pub background: Option<Rgb>,
    pub shapes: Vec<ShapePart>,
    pub chrome: Option<Chrome>,
    next_shape_id: u32,
}

impl SlidePart {
    pub fn push_shape(&mut self, rect: Rect, body: ShapeBody) -> ShapeKey {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        self.shapes.push(ShapePart { id, rect, body });
        ShapeKey(id)
    }

    pub fn shape(&self, key: ShapeKey) -> Result<&ShapePart> {
        self.shapes
            .iter()
            .find(|s| s.id == key.0)
            .ok_or_else(|| DeckError::backend(format!("no shape with id {} on slide {}", key.0, self.id)))
    }

    /// First free shape id, for chrome written after content shapes.
    pub fn next_id(&self) -> u32 {
        self.next_shape_id
    }
}

/// Header/footer decoration resolved for one slide.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Chrome {
    pub header: Option<String>,
    pub footer: Option<String>,
    pub slide_number: bool,
    pub date: bool,
}

impl Chrome {
    /// The header is left off the first slide of the deck.
    pub fn for_position(spec: &HeaderFooterSpec, position: usize) -> Self {
        Self {
            header: if position > 0 { spec.header.clone() } else { None },
            footer: spec.footer.clone(),
            slide_number: spec.slide_number,
            date: spec.date,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ShapePart {
    pub id: u32,
    pub rect: Rect,
    pub body: ShapeBody,
}

#[derive(Debug)]
pub(crate) enum ShapeBody {
    Text(TextBody),
    Picture { media: usize, descr: String },
    Chart(ChartPart),
    Table(TablePart),
    Auto(AutoShapeSpec),
}

impl ShapeBody {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeBody::Text(t) => t.kind,
            ShapeBody::Picture { .. } => ShapeKind::Picture,
            ShapeBody::Chart(_) => ShapeKind::Chart,
            ShapeBody::Table(_) => ShapeKind::Table,
            ShapeBody::Auto(_) => ShapeKind::AutoShape,
        }
    }
}

/// Text box content. Every paragraph shares the same style.
#[derive(Debug)]
pub(crate) struct TextBody {
    pub kind: ShapeKind,
    pub paragraphs: Vec<String>,
    pub style: TextStyle,
    pub alignment: Alignment,
    pub line_spacing: Option<f64>,
    pub bullet: Option<Bullet>,
    pub wrap: bool,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Bullet {
    pub level: u8,
    pub char: char,
}

#[derive(Debug)]
pub(crate) struct ChartPart {
    pub chart_type: ChartType,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub title: Option<String>,
}

#[derive(Debug)]
pub(crate) struct TablePart {
    pub rows: Vec<Vec<TableCell>>,
    /// Inches, one per column.
    pub column_widths: Vec<f64>,
    /// Inches.
    pub row_height: f64,
    pub header: bool,
}

impl TablePart {
    pub fn cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Header styling overrides per-cell options on the first row.
    pub fn effective_bold(&self, row: usize, cell: &TableCell) -> bool {
        if self.header && row == 0 {
            true
        } else {
            cell.options.bold.unwrap_or(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_and_shape_ids() {
        let mut pres = PptxPresentation::new();
        let a = pres.push_slide(1, None, None);
        let b = pres.push_slide(6, None, None);
        assert_eq!(a, SlideKey(256));
        assert_eq!(b, SlideKey(257));
        assert_eq!(pres.position(b), Some(1));
        assert_eq!(pres.slide_width, 9_144_000);
        assert_eq!(pres.slide_height, 6_858_000);

        let slide = pres.slide_mut(a).unwrap();
        let s1 = slide.push_shape(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            ShapeBody::Picture {
                media: 0,
                descr: String::new(),
            },
        );
        assert_eq!(s1, ShapeKey(3));
        assert_eq!(slide.next_id(), 4);
        assert!(slide.shape(ShapeKey(99)).is_err());
        assert!(pres.slide(SlideKey(999)).is_err());
    }

    #[test]
    fn header_skips_first_slide() {
        let spec = HeaderFooterSpec {
            header: Some("Q3".into()),
            footer: Some("ACME".into()),
            slide_number: true,
            date: false,
        };
        let first = Chrome::for_position(&spec, 0);
        assert_eq!(first.header, None);
        assert_eq!(first.footer.as_deref(), Some("ACME"));
        let later = Chrome::for_position(&spec, 3);
        assert_eq!(later.header.as_deref(), Some("Q3"));
    }

    #[test]
    fn header_row_bold_overrides_cell() {
        let mut cell = TableCell::plain("x");
        cell.options.bold = Some(false);
        let table = TablePart {
            rows: vec![vec![cell.clone()], vec![cell.clone()]],
            column_widths: vec![1.0],
            row_height: 0.5,
            header: true,
        };
        assert!(table.effective_bold(0, &cell));
        assert!(!table.effective_bold(1, &cell));
    }
}
