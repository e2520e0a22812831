//! PresentationML backend.
//!
//! An in-memory object tree ([`PptxPresentation`]) that serializes to an
//! Office Open XML `.pptx` package on save. Nothing touches disk until
//! [`DocumentBackend::save`].

mod chart;
mod media;
mod model;
mod package;
mod slide;
mod template;
mod xml;

use std::path::Path;

use deckhand_types::{Rect, Rgb};
use tracing::debug;

use crate::backend::{
    AutoShapeSpec, BulletListSpec, CellSnapshot, ChartSpec, DocumentBackend, HeaderFooterSpec,
    ImageSpec, ParagraphSpec, ShapeKey, ShapeKind, ShapeSnapshot, SlideKey, SlideSnapshot,
    TableSnapshot, TableSpec, TextBoxSpec,
};
use crate::error::{DeckError, Result};

use media::{MediaPart, fit};
use model::{Bullet, ChartPart, Chrome, ShapeBody, TablePart, TextBody};
use template::LAYOUTS;

pub use model::PptxPresentation;

const DEFAULT_BULLET: char = '\u{2022}';
const DEFAULT_TABLE_WIDTH: f64 = 8.0;
const DEFAULT_ROW_HEIGHT: f64 = 0.5;

/// Writes `.pptx` packages.
#[derive(Clone, Debug, Default)]
pub struct PptxBackend;

impl PptxBackend {
    pub fn new() -> Self {
        Self
    }

    /// Serialize without writing to disk.
    pub fn to_bytes(&self, pres: &PptxPresentation) -> Result<Vec<u8>> {
        package::to_bytes(pres, None)
    }

    fn push(
        &self,
        pres: &mut PptxPresentation,
        slide: SlideKey,
        rect: Rect,
        body: ShapeBody,
    ) -> Result<ShapeKey> {
        let kind = body.kind();
        let key = pres.slide_mut(slide)?.push_shape(rect, body);
        debug!(slide = slide.0, shape = key.0, ?kind, "pptx shape added");
        Ok(key)
    }
}

impl DocumentBackend for PptxBackend {
    type Presentation = PptxPresentation;

    fn layout_count(&self) -> usize {
        LAYOUTS.len()
    }

    fn new_presentation(&self) -> Result<PptxPresentation> {
        Ok(PptxPresentation::new())
    }

    fn add_slide(
        &self,
        pres: &mut PptxPresentation,
        layout_index: usize,
        title: Option<&str>,
        background: Option<Rgb>,
    ) -> Result<SlideKey> {
        if layout_index >= LAYOUTS.len() {
            return Err(DeckError::invalid_argument(format!(
                "layout index {layout_index} out of range 0..{}",
                LAYOUTS.len()
            )));
        }
        let key = pres.push_slide(layout_index, title.map(String::from), background);
        debug!(slide = key.0, layout_index, "pptx slide added");
        Ok(key)
    }

    fn add_text_box(
        &self,
        pres: &mut PptxPresentation,
        slide: SlideKey,
        spec: TextBoxSpec,
    ) -> Result<ShapeKey> {
        let body = TextBody {
            kind: ShapeKind::TextBox,
            paragraphs: vec![spec.text],
            style: spec.style,
            alignment: spec.alignment,
            line_spacing: None,
            bullet: None,
            wrap: false,
        };
        self.push(pres, slide, spec.rect, ShapeBody::Text(body))
    }

    fn add_paragraph(
        &self,
        pres: &mut PptxPresentation,
        slide: SlideKey,
        spec: ParagraphSpec,
    ) -> Result<ShapeKey> {
        let body = TextBody {
            kind: ShapeKind::Paragraph,
            paragraphs: vec![spec.text],
            style: spec.style,
            alignment: spec.alignment,
            line_spacing: Some(spec.line_spacing),
            bullet: None,
            wrap: true,
        };
        self.push(pres, slide, spec.rect, ShapeBody::Text(body))
    }

    fn add_bullet_list(
        &self,
        pres: &mut PptxPresentation,
        slide: SlideKey,
        spec: BulletListSpec,
    ) -> Result<ShapeKey> {
        let body = TextBody {
            kind: ShapeKind::BulletList,
            paragraphs: spec.items,
            style: spec.style,
            alignment: Default::default(),
            line_spacing: None,
            bullet: Some(Bullet {
                level: spec.level,
                char: spec.bullet_char.unwrap_or(DEFAULT_BULLET),
            }),
            wrap: true,
        };
        self.push(pres, slide, spec.rect, ShapeBody::Text(body))
    }

    fn check_image(&self, path: &Path) -> Result<()> {
        MediaPart::load(path).map(|_| ())
    }

    fn add_image(
        &self,
        pres: &mut PptxPresentation,
        slide: SlideKey,
        spec: ImageSpec,
    ) -> Result<ShapeKey> {
        pres.slide(slide)?;
        let part = MediaPart::load(&spec.path)?;
        let (width, height) = fit(spec.width, spec.height, part.aspect());
        let descr = spec
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media = pres.push_media(part);
        let rect = Rect::new(spec.left, spec.top, width, height);
        self.push(pres, slide, rect, ShapeBody::Picture { media, descr })
    }

    fn add_chart(
        &self,
        pres: &mut PptxPresentation,
        slide: SlideKey,
        spec: ChartSpec,
    ) -> Result<ShapeKey> {
        let body = ChartPart {
            chart_type: spec.chart_type,
            categories: spec.categories,
            series: spec.series,
            title: spec.title,
        };
        self.push(pres, slide, spec.rect, ShapeBody::Chart(body))
    }

    fn add_table(
        &self,
        pres: &mut PptxPresentation,
        slide: SlideKey,
        spec: TableSpec,
    ) -> Result<ShapeKey> {
        let rows = spec.rows.len();
        let cols = spec.rows.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(DeckError::invalid_argument("table must have at least one cell"));
        }
        let width = spec.width.unwrap_or_else(|| match &spec.column_widths {
            Some(w) => w.iter().sum(),
            None => DEFAULT_TABLE_WIDTH,
        });
        let height = spec.height.unwrap_or(DEFAULT_ROW_HEIGHT * rows as f64);
        let column_widths = match spec.column_widths {
            Some(w) => w,
            None => vec![width / cols as f64; cols],
        };
        let body = TablePart {
            rows: spec.rows,
            column_widths,
            row_height: height / rows as f64,
            header: spec.header_styled,
        };
        let rect = Rect::new(spec.left, spec.top, width, height);
        self.push(pres, slide, rect, ShapeBody::Table(body))
    }

    fn add_shape(
        &self,
        pres: &mut PptxPresentation,
        slide: SlideKey,
        spec: AutoShapeSpec,
    ) -> Result<ShapeKey> {
        let rect = spec.rect;
        self.push(pres, slide, rect, ShapeBody::Auto(spec))
    }

    fn apply_header_footer(
        &self,
        pres: &mut PptxPresentation,
        slides: &[SlideKey],
        spec: &HeaderFooterSpec,
    ) -> Result<()> {
        for &key in slides {
            let position = pres
                .position(key)
                .ok_or_else(|| DeckError::backend(format!("no slide with id {}", key.0)))?;
            pres.slide_mut(key)?.chrome = Some(Chrome::for_position(spec, position));
        }
        debug!(slides = slides.len(), "pptx header/footer applied");
        Ok(())
    }

    fn save(&self, pres: &PptxPresentation, path: &Path) -> Result<()> {
        let title = pres
            .slides
            .first()
            .and_then(|s| s.title.as_deref());
        package::save(pres, title, path)?;
        debug!(path = %path.display(), slides = pres.slide_count(), "pptx saved");
        Ok(())
    }

    fn slide_snapshot(&self, pres: &PptxPresentation, slide: SlideKey) -> Result<SlideSnapshot> {
        let part = pres.slide(slide)?;
        let layout = LAYOUTS
            .get(part.layout)
            .ok_or_else(|| DeckError::backend(format!("slide {} has no layout", part.id)))?;
        let shapes = part
            .shapes
            .iter()
            .map(|s| self.shape_snapshot(pres, slide, ShapeKey(s.id)))
            .collect::<Result<Vec<_>>>()?;
        let chrome = part.chrome.clone().unwrap_or_default();
        Ok(SlideSnapshot {
            key: slide,
            layout_index: part.layout,
            layout_name: layout.name,
            title: layout.title_ph.and(part.title.clone()),
            background: part.background.map(|c| c.to_string()),
            shapes,
            header: chrome.header,
            footer: chrome.footer,
        })
    }

    fn shape_snapshot(
        &self,
        pres: &PptxPresentation,
        slide: SlideKey,
        shape: ShapeKey,
    ) -> Result<ShapeSnapshot> {
        let part = pres.slide(slide)?.shape(shape)?;
        let mut snap = ShapeSnapshot {
            key: shape,
            kind: part.body.kind(),
            rect: part.rect,
            paragraphs: Vec::new(),
            table: None,
            chart_type: None,
            preset: None,
        };
        match &part.body {
            ShapeBody::Text(t) => snap.paragraphs = t.paragraphs.clone(),
            ShapeBody::Picture { .. } => {}
            ShapeBody::Chart(c) => snap.chart_type = Some(c.chart_type.as_str()),
            ShapeBody::Table(t) => {
                let cells = t
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(r, row)| {
                        row.iter()
                            .map(|cell| CellSnapshot {
                                text: cell.text.clone(),
                                bold: t.effective_bold(r, cell),
                            })
                            .collect()
                    })
                    .collect();
                snap.table = Some(TableSnapshot {
                    rows: t.rows.len(),
                    cols: t.cols(),
                    cells,
                });
            }
            ShapeBody::Auto(a) => snap.preset = Some(a.shape_type.preset()),
        }
        Ok(snap)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use deckhand_types::{ChartType, Series, ShapeType, TableCell, TextStyle};

    use super::*;

    fn backend_with_slide() -> (PptxBackend, PptxPresentation, SlideKey) {
        let backend = PptxBackend::new();
        let mut pres = backend.new_presentation().unwrap();
        let slide = backend.add_slide(&mut pres, 1, Some("Agenda"), None).unwrap();
        (backend, pres, slide)
    }

    fn png_file(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(w, h).save(&path).unwrap();
        path
    }

    #[test]
    fn layout_out_of_range() {
        let backend = PptxBackend::new();
        let mut pres = backend.new_presentation().unwrap();
        let err = backend.add_slide(&mut pres, 9, None, None).unwrap_err();
        assert!(matches!(err, DeckError::InvalidArgument(_)));
        assert_eq!(pres.slide_count(), 0);
    }

    #[test]
    fn text_shapes_snapshot() {
        let (backend, mut pres, slide) = backend_with_slide();
        let key = backend
            .add_bullet_list(
                &mut pres,
                slide,
                BulletListSpec {
                    items: vec!["a".into(), "b".into()],
                    rect: Rect::new(1.0, 2.0, 8.0, 3.0),
                    style: TextStyle::default().with_size(16.0),
                    level: 0,
                    bullet_char: None,
                },
            )
            .unwrap();
        let snap = backend.shape_snapshot(&pres, slide, key).unwrap();
        assert_eq!(snap.kind, ShapeKind::BulletList);
        assert_eq!(snap.paragraphs, vec!["a", "b"]);

        let slide_snap = backend.slide_snapshot(&pres, slide).unwrap();
        assert_eq!(slide_snap.title.as_deref(), Some("Agenda"));
        assert_eq!(slide_snap.layout_name, "Title and Content");
        assert_eq!(slide_snap.shapes.len(), 1);
    }

    #[test]
    fn image_sizes_follow_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = png_file(dir.path(), "wide.png", 200, 100);
        let (backend, mut pres, slide) = backend_with_slide();

        let spec = |width, height| ImageSpec {
            path: path.clone(),
            left: 1.0,
            top: 2.0,
            width,
            height,
        };
        let a = backend.add_image(&mut pres, slide, spec(None, None)).unwrap();
        let b = backend.add_image(&mut pres, slide, spec(Some(4.0), None)).unwrap();
        let c = backend.add_image(&mut pres, slide, spec(None, Some(1.0))).unwrap();

        let rect = |k| backend.shape_snapshot(&pres, slide, k).unwrap().rect;
        assert_eq!((rect(a).width, rect(a).height), (4.0, 3.0));
        assert_eq!((rect(b).width, rect(b).height), (4.0, 2.0));
        assert_eq!((rect(c).width, rect(c).height), (2.0, 1.0));
    }

    #[test]
    fn missing_image_leaves_slide_untouched() {
        let (backend, mut pres, slide) = backend_with_slide();
        let err = backend
            .add_image(
                &mut pres,
                slide,
                ImageSpec {
                    path: "missing.png".into(),
                    left: 1.0,
                    top: 2.0,
                    width: None,
                    height: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, DeckError::ResourceNotFound(_)));
        assert!(backend.slide_snapshot(&pres, slide).unwrap().shapes.is_empty());
    }

    #[test]
    fn table_size_defaults() {
        let (backend, mut pres, slide) = backend_with_slide();
        let rows = vec![
            vec![TableCell::plain("A"), TableCell::plain("B")],
            vec![TableCell::plain("1"), TableCell::plain("2")],
            vec![TableCell::plain("3"), TableCell::plain("4")],
        ];
        let spec = |widths: Option<Vec<f64>>| TableSpec {
            rows: rows.clone(),
            left: 1.0,
            top: 2.0,
            width: None,
            height: None,
            column_widths: widths,
            header_styled: true,
        };
        let plain = backend.add_table(&mut pres, slide, spec(None)).unwrap();
        let sized = backend
            .add_table(&mut pres, slide, spec(Some(vec![1.5, 2.5])))
            .unwrap();

        let p = backend.shape_snapshot(&pres, slide, plain).unwrap();
        assert_eq!((p.rect.width, p.rect.height), (8.0, 1.5));
        let table = p.table.unwrap();
        assert_eq!((table.rows, table.cols), (3, 2));
        assert!(table.cells[0].iter().all(|c| c.bold));
        assert!(table.cells[1].iter().all(|c| !c.bold));

        let s = backend.shape_snapshot(&pres, slide, sized).unwrap();
        assert_eq!(s.rect.width, 4.0);
    }

    #[test]
    fn header_footer_tracks_slide_position() {
        let (backend, mut pres, first) = backend_with_slide();
        let second = backend.add_slide(&mut pres, 1, None, None).unwrap();
        let spec = HeaderFooterSpec {
            header: Some("H".into()),
            footer: Some("F".into()),
            slide_number: true,
            date: true,
        };
        backend
            .apply_header_footer(&mut pres, &[first, second], &spec)
            .unwrap();
        let one = backend.slide_snapshot(&pres, first).unwrap();
        let two = backend.slide_snapshot(&pres, second).unwrap();
        assert_eq!(one.header, None);
        assert_eq!(one.footer.as_deref(), Some("F"));
        assert_eq!(two.header.as_deref(), Some("H"));
    }

    #[test]
    fn save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, mut pres, slide) = backend_with_slide();
        backend
            .add_chart(
                &mut pres,
                slide,
                ChartSpec {
                    chart_type: ChartType::Pie,
                    categories: vec!["x".into(), "y".into()],
                    series: vec![Series {
                        name: "share".into(),
                        values: vec![60.0, 40.0],
                    }],
                    rect: Rect::new(1.0, 2.0, 8.0, 4.0),
                    title: None,
                },
            )
            .unwrap();
        backend
            .add_shape(
                &mut pres,
                slide,
                AutoShapeSpec {
                    shape_type: ShapeType::Star5Point,
                    rect: Rect::new(2.0, 2.0, 2.0, 2.0),
                    fill: None,
                    line: Some(Rgb::BLACK),
                    line_width: 2.0,
                },
            )
            .unwrap();
        let path = dir.path().join("deck.pptx");
        backend.save(&pres, &path).unwrap();
        // still mutable after save
        backend
            .add_text_box(
                &mut pres,
                slide,
                TextBoxSpec {
                    text: "after".into(),
                    rect: Rect::new(1.0, 1.0, 2.0, 1.0),
                    style: TextStyle::default(),
                    alignment: Default::default(),
                },
            )
            .unwrap();
        backend.save(&pres, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut slide_xml = String::new();
        archive
            .by_name("ppt/slides/slide1.xml")
            .unwrap()
            .read_to_string(&mut slide_xml)
            .unwrap();
        assert!(slide_xml.contains("Agenda"));
        assert!(slide_xml.contains(r#"prst="star5""#));
        assert!(slide_xml.contains("after"));
        assert!(archive.by_name("ppt/charts/chart1.xml").is_ok());
    }
}
