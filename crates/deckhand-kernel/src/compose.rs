//! Composite builder: a whole deck from one structured request.
//!
//! Everything here goes through the [`Dispatcher`]'s primitives. Placement is
//! best-effort: each element lands below the previous one using the height
//! estimates in [`LayoutConfig`], and an explicit `top` in an element's options
//! replaces the cursor for that element.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use deckhand_types::{CellInput, ColorInput, Handle, SeriesInput};

use crate::backend::DocumentBackend;
use crate::config::LayoutConfig;
use crate::dispatch::Dispatcher;
use crate::error::{DeckError, Result};
use crate::requests::{
    AddBulletListRequest, AddChartRequest, AddHeaderFooterRequest, AddImageRequest,
    AddParagraphRequest, AddSlideRequest, AddTableRequest, AddTextRequest,
    CreateCompletePresentationRequest, CreatePresentationRequest, Label,
    SavePresentationRequest,
};
use crate::validate;

const TITLE_LAYOUT: i64 = 0;
const CONTENT_LAYOUT: i64 = 1;
const CONTENT_LEFT: f64 = 1.0;
const CONTENT_WIDTH: f64 = 8.0;
const IMAGE_WIDTH: f64 = 4.0;
const WHITE: [i64; 3] = [255, 255, 255];

/// Position and size overrides for a composite image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageOptions {
    pub left: Option<f64>,
    pub top: Option<f64>,
    /// Inches (default: 4).
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Position, size and title for a composite chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartOptions {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub title: Option<String>,
}

/// Placement and styling for a composite table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableOptions {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub column_widths: Option<Vec<f64>>,
    /// Bold the first row (default: true).
    pub first_row_is_header: Option<bool>,
}

/// One content slide. Elements are placed top to bottom in the order
/// text, bullets, image, chart, table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SlideContent {
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "Layout index (default: 1, Title and Content)")]
    #[serde(default)]
    pub layout_index: Option<i64>,
    #[schemars(description = "Paragraph text")]
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub bullets: Option<Vec<String>>,
    #[schemars(description = "Path to an image file")]
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_options: ImageOptions,
    #[schemars(description = "Chart type; the chart is drawn only with chart_categories and chart_data")]
    #[serde(default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub chart_categories: Option<Vec<Label>>,
    #[serde(default)]
    pub chart_data: Option<Vec<SeriesInput>>,
    #[serde(default)]
    pub chart_options: ChartOptions,
    #[schemars(description = "Table rows; the first row is a header unless table_options says otherwise")]
    #[serde(default)]
    pub table_data: Option<Vec<Vec<CellInput>>>,
    #[serde(default)]
    pub table_options: TableOptions,
}

impl SlideContent {
    fn layout(&self) -> i64 {
        self.layout_index.unwrap_or(CONTENT_LAYOUT)
    }

    /// Chart pieces, only when all three are present.
    fn chart(&self) -> Option<(&str, &[Label], &[SeriesInput])> {
        match (&self.chart_type, &self.chart_categories, &self.chart_data) {
            (Some(t), Some(c), Some(d)) => Some((t.as_str(), c.as_slice(), d.as_slice())),
            _ => None,
        }
    }

    fn has_partial_chart(&self) -> bool {
        self.chart().is_none()
            && (self.chart_type.is_some()
                || self.chart_categories.is_some()
                || self.chart_data.is_some())
    }
}

/// What a composite call built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompositeOutcome {
    pub presentation_id: Handle,
    /// Title slide first, then one per content entry.
    pub slide_ids: Vec<Handle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Running vertical position on a content slide, in inches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutCursor {
    top: f64,
}

impl LayoutCursor {
    pub fn start(layout: &LayoutConfig) -> Self {
        Self {
            top: layout.start_top,
        }
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    /// Move past an element placed at the cursor.
    pub fn advance(self, height: f64, gap: f64) -> Self {
        Self {
            top: self.top + height + gap,
        }
    }

    /// Continue below an element whose bottom edge is known.
    pub fn after(self, bottom: f64, gap: f64) -> Self {
        Self { top: bottom + gap }
    }
}

/// Check the whole payload before anything is created.
///
/// Covers everything the per-element tools would reject, including option
/// geometry and whether each image decodes. The cursor position is not known
/// yet, so an element without an explicit `top` is checked at zero.
fn precheck<B: DocumentBackend>(
    backend: &B,
    layout: &LayoutConfig,
    req: &CreateCompletePresentationRequest,
    title_color: &ColorInput,
) -> Result<()> {
    validate::color(title_color)?;
    for (i, content) in req.slides_content.iter().enumerate() {
        let at = |e: DeckError| match e {
            DeckError::InvalidArgument(msg) => {
                DeckError::invalid_argument(format!("slides_content[{i}]: {msg}"))
            }
            other => other,
        };
        validate::layout_index(content.layout(), backend.layout_count()).map_err(at)?;
        if let Some(items) = &content.bullets {
            validate::bullet_items(items).map_err(at)?;
        }
        if let Some(image) = &content.image {
            let opts = &content.image_options;
            validate::position(opts.left.unwrap_or(CONTENT_LEFT), opts.top.unwrap_or(0.0))
                .map_err(at)?;
            validate::optional_extent("image width", opts.width).map_err(at)?;
            validate::optional_extent("image height", opts.height).map_err(at)?;
            backend.check_image(Path::new(image)).map_err(at)?;
        }
        if let Some((chart_type, categories, series)) = content.chart() {
            let opts = &content.chart_options;
            let chart_type = validate::chart_type(chart_type).map_err(at)?;
            validate::chart_data(chart_type, categories, series).map_err(at)?;
            validate::rect(
                opts.left.unwrap_or(CONTENT_LEFT),
                opts.top.unwrap_or(0.0),
                opts.width.unwrap_or(CONTENT_WIDTH),
                opts.height.unwrap_or(layout.chart_default_height),
            )
            .map_err(at)?;
        }
        if let Some(data) = &content.table_data {
            let opts = &content.table_options;
            let rows = validate::table_rows(data).map_err(at)?;
            validate::column_widths(opts.column_widths.as_deref(), rows[0].len()).map_err(at)?;
            validate::position(opts.left.unwrap_or(CONTENT_LEFT), opts.top.unwrap_or(0.0))
                .map_err(at)?;
            validate::optional_extent("table width", opts.width).map_err(at)?;
            validate::optional_extent("table height", opts.height).map_err(at)?;
        }
    }
    Ok(())
}

/// Build the whole deck or nothing.
///
/// Bad input is caught by [`precheck`] before the presentation exists. A
/// failure after that point (an I/O error while saving, say) removes the
/// presentation and every handle created under it before returning.
pub(crate) fn build<B: DocumentBackend>(
    d: &Dispatcher<B>,
    req: &CreateCompletePresentationRequest,
) -> Result<CompositeOutcome> {
    let title_color = req
        .title_slide_color
        .clone()
        .unwrap_or_else(|| d.config().title_slide.background.clone());
    precheck(d.backend(), &d.config().layout, req, &title_color)?;
    for (i, content) in req.slides_content.iter().enumerate() {
        if content.has_partial_chart() {
            warn!(
                slide = i,
                "chart skipped: chart_type, chart_categories and chart_data are all required"
            );
        }
    }

    let presentation = d.create_presentation(&CreatePresentationRequest {
        filename: req
            .filename
            .clone()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| "presentation".into()),
    })?;

    match populate(d, presentation, req, title_color) {
        Ok(outcome) => {
            info!(%presentation, slides = outcome.slide_ids.len(), "built presentation");
            Ok(outcome)
        }
        Err(e) => {
            let removed = d.registry().remove_tree(&presentation);
            warn!(%presentation, removed, "composite build failed, rolled back: {e}");
            Err(e)
        }
    }
}

fn populate<B: DocumentBackend>(
    d: &Dispatcher<B>,
    presentation: Handle,
    req: &CreateCompletePresentationRequest,
    title_color: ColorInput,
) -> Result<CompositeOutcome> {
    let pid = presentation.to_string();

    let mut slide_ids = Vec::with_capacity(req.slides_content.len() + 1);
    slide_ids.push(title_slide(d, &pid, req, title_color)?);
    for content in &req.slides_content {
        slide_ids.push(content_slide(d, &pid, content)?);
    }

    if req.header.is_some() || req.footer.is_some() {
        d.add_header_footer(&AddHeaderFooterRequest {
            presentation_id: pid.clone(),
            header_text: req.header.clone(),
            footer_text: req.footer.clone(),
            slide_number: true,
            date: true,
        })?;
    }

    let path = match &req.filename {
        Some(name) if !name.trim().is_empty() => Some(d.save_presentation(&SavePresentationRequest {
            presentation_id: pid.clone(),
            filename: Some(name.clone()),
        })?),
        _ => None,
    };

    Ok(CompositeOutcome {
        presentation_id: presentation,
        slide_ids,
        path,
    })
}

fn title_slide<B: DocumentBackend>(
    d: &Dispatcher<B>,
    pid: &str,
    req: &CreateCompletePresentationRequest,
    background: ColorInput,
) -> Result<Handle> {
    let slide = d.add_slide(&AddSlideRequest {
        background_color: Some(background),
        ..AddSlideRequest::new(pid, TITLE_LAYOUT)
    })?;
    let sid = slide.to_string();

    d.add_text(&AddTextRequest {
        left: 1.0,
        top: 2.5,
        width: 8.0,
        height: 1.5,
        font_size: 44.0,
        color: ColorInput::Components(WHITE),
        bold: true,
        alignment: "CENTER".into(),
        ..AddTextRequest::new(pid, &sid, &req.title)
    })?;
    if let Some(subtitle) = &req.subtitle {
        d.add_text(&AddTextRequest {
            left: 1.0,
            top: 4.0,
            width: 8.0,
            height: 1.0,
            font_size: 24.0,
            color: ColorInput::Components(WHITE),
            alignment: "CENTER".into(),
            ..AddTextRequest::new(pid, &sid, subtitle)
        })?;
    }
    Ok(slide)
}

fn content_slide<B: DocumentBackend>(
    d: &Dispatcher<B>,
    pid: &str,
    content: &SlideContent,
) -> Result<Handle> {
    let layout = &d.config().layout;
    let slide = d.add_slide(&AddSlideRequest {
        title: content.title.clone(),
        ..AddSlideRequest::new(pid, content.layout())
    })?;
    let sid = slide.to_string();
    let mut cursor = LayoutCursor::start(layout);

    if let Some(text) = &content.text {
        let height = layout.paragraph_height(text);
        d.add_paragraph(&AddParagraphRequest {
            left: CONTENT_LEFT,
            top: cursor.top(),
            width: CONTENT_WIDTH,
            height,
            ..AddParagraphRequest::new(pid, &sid, text)
        })?;
        cursor = cursor.advance(height, layout.gap);
    }

    if let Some(items) = &content.bullets {
        let height = layout.bullets_height(items.len());
        d.add_bullet_list(&AddBulletListRequest {
            left: CONTENT_LEFT,
            top: cursor.top(),
            width: CONTENT_WIDTH,
            height,
            ..AddBulletListRequest::new(pid, &sid, items.clone())
        })?;
        cursor = cursor.advance(height, layout.gap);
    }

    if let Some(image) = &content.image {
        let opts = &content.image_options;
        let top = opts.top.unwrap_or(cursor.top());
        d.add_image(&AddImageRequest {
            left: opts.left.unwrap_or(CONTENT_LEFT),
            top,
            width: Some(opts.width.unwrap_or(IMAGE_WIDTH)),
            height: opts.height,
            ..AddImageRequest::new(pid, &sid, image)
        })?;
        cursor = match opts.height {
            Some(h) => cursor.after(top + h, layout.gap),
            None => cursor.advance(layout.image_estimated_height, layout.gap),
        };
    }

    if let Some((chart_type, categories, series)) = content.chart() {
        let opts = &content.chart_options;
        let top = opts.top.unwrap_or(cursor.top());
        let height = opts.height.unwrap_or(layout.chart_default_height);
        d.add_chart(&AddChartRequest {
            left: opts.left.unwrap_or(CONTENT_LEFT),
            top,
            width: opts.width.unwrap_or(CONTENT_WIDTH),
            height,
            chart_title: opts.title.clone(),
            ..AddChartRequest::new(pid, &sid, chart_type, categories.to_vec(), series.to_vec())
        })?;
        cursor = cursor.after(top + height, layout.gap);
    }

    if let Some(data) = &content.table_data {
        let opts = &content.table_options;
        d.add_table(&AddTableRequest {
            left: opts.left.unwrap_or(CONTENT_LEFT),
            top: opts.top.unwrap_or(cursor.top()),
            width: opts.width,
            height: opts.height,
            column_widths: opts.column_widths.clone(),
            first_row_is_header: opts.first_row_is_header.unwrap_or(true),
            ..AddTableRequest::new(pid, &sid, data.clone())
        })?;
    }

    Ok(slide)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::ShapeKind;
    use crate::config::DeckConfig;
    use crate::error::ErrorKind;
    use crate::pptx::PptxBackend;

    fn dispatcher(dir: &Path) -> Dispatcher<PptxBackend> {
        let config = DeckConfig::default().with_output_dir_override(Some(dir));
        Dispatcher::new(PptxBackend::new(), config)
    }

    fn request(value: serde_json::Value) -> CreateCompletePresentationRequest {
        serde_json::from_value(value).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn cursor_threads_through_steps() {
        let layout = LayoutConfig::default();
        let c = LayoutCursor::start(&layout);
        assert_eq!(c.top(), 1.5);
        let c = c.advance(layout.bullets_height(2), layout.gap);
        assert!(approx(c.top(), 2.5));
        let c = c.after(6.0, layout.gap);
        assert!(approx(c.top(), 6.2));
    }

    #[test]
    fn title_and_single_bullet_slide() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher(dir.path());
        let out = build(
            &d,
            &request(json!({
                "title": "T",
                "slides_content": [{"bullets": ["a", "b"]}]
            })),
        )
        .unwrap();
        assert_eq!(out.slide_ids.len(), 2);
        assert!(out.path.is_none());

        let outline = d.outline(&out.presentation_id.to_string()).unwrap();
        let title = &outline.slides[0];
        assert_eq!(title.layout_index, 0);
        assert_eq!(title.background.as_deref(), Some("#0088CC"));
        assert_eq!(title.shapes.len(), 1);
        assert_eq!(title.shapes[0].snapshot.paragraphs, vec!["T"]);

        let content = &outline.slides[1];
        assert_eq!(content.layout_index, 1);
        assert_eq!(content.shapes.len(), 1);
        let bullets = &content.shapes[0].snapshot;
        assert_eq!(bullets.kind, ShapeKind::BulletList);
        assert_eq!(bullets.paragraphs, vec!["a", "b"]);
        assert!(approx(bullets.rect.top, 1.5));
        assert!(approx(bullets.rect.height, 0.8));
    }

    #[test]
    fn elements_stack_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("pic.png");
        image::RgbImage::new(40, 30).save(&img).unwrap();
        let d = dispatcher(dir.path());
        let out = build(
            &d,
            &request(json!({
                "title": "Report",
                "subtitle": "Q3",
                "title_slide_color": "#112233",
                "slides_content": [{
                    "title": "Numbers",
                    "text": "x".repeat(150),
                    "bullets": ["one", "two", "three"],
                    "image": img.display().to_string(),
                    "image_options": {"height": 1.0},
                    "chart_type": "LINE",
                    "chart_categories": ["a", "b"],
                    "chart_data": [["s", [1, 2]]],
                    "chart_options": {"height": 2.0, "title": "Trend"},
                    "table_data": [["h1", "h2"], [1, 2]]
                }]
            })),
        )
        .unwrap();

        let outline = d.outline(&out.presentation_id.to_string()).unwrap();
        assert_eq!(outline.slides[0].background.as_deref(), Some("#112233"));
        assert_eq!(outline.slides[0].shapes.len(), 2);

        let shapes: Vec<_> = outline.slides[1].shapes.iter().map(|s| &s.snapshot).collect();
        let kinds: Vec<ShapeKind> = shapes.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ShapeKind::Paragraph,
                ShapeKind::BulletList,
                ShapeKind::Picture,
                ShapeKind::Chart,
                ShapeKind::Table
            ]
        );
        // paragraph 1.5 + 2.0 high, bullets 1.1 high, image 1.0, chart 2.0
        assert!(approx(shapes[0].rect.top, 1.5));
        assert!(approx(shapes[0].rect.height, 2.0));
        assert!(approx(shapes[1].rect.top, 3.7));
        assert!(approx(shapes[2].rect.top, 5.0));
        assert!(approx(shapes[2].rect.width, 4.0));
        assert!(approx(shapes[3].rect.top, 6.2));
        assert!(approx(shapes[4].rect.top, 8.4));
        assert!(shapes[4].table.as_ref().unwrap().cells[0][0].bold);
    }

    #[test]
    fn header_footer_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher(dir.path());
        let out = build(
            &d,
            &request(json!({
                "title": "T",
                "slides_content": [{"text": "hi"}, {"title": "Two"}],
                "header": "Confidential",
                "footer": "ACME",
                "filename": "deck"
            })),
        )
        .unwrap();
        assert_eq!(out.path.as_deref(), Some(dir.path().join("deck.pptx").as_path()));
        assert!(dir.path().join("deck.pptx").is_file());

        let outline = d.outline(&out.presentation_id.to_string()).unwrap();
        assert_eq!(outline.slides.len(), 3);
        assert_eq!(outline.slides[0].header, None);
        assert_eq!(outline.slides[1].header.as_deref(), Some("Confidential"));
        assert!(outline.slides.iter().all(|s| s.footer.as_deref() == Some("ACME")));
        assert_eq!(outline.slides[2].title.as_deref(), Some("Two"));
    }

    #[test]
    fn bad_payload_builds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher(dir.path());
        let missing = dir.path().join("missing.png").display().to_string();
        let not_image = dir.path().join("notimg.png");
        std::fs::write(&not_image, "plain text").unwrap();
        let not_image = not_image.display().to_string();
        let pic = dir.path().join("pic.png");
        image::RgbImage::new(4, 4).save(&pic).unwrap();
        let pic = pic.display().to_string();
        let chart = |opts: serde_json::Value| {
            json!([{
                "text": "before",
                "chart_type": "LINE",
                "chart_categories": ["a"],
                "chart_data": [["s", [1]]],
                "chart_options": opts
            }])
        };
        let cases = [
            (json!([{"image": missing}]), ErrorKind::ResourceNotFound),
            (json!([{"image": not_image}]), ErrorKind::BackendFailure),
            (json!([{"image": pic, "image_options": {"width": -1.0}}]), ErrorKind::InvalidArgument),
            (chart(json!({"width": 0.0})), ErrorKind::InvalidArgument),
            (chart(json!({"height": -2.0})), ErrorKind::InvalidArgument),
            (
                json!([{"title": "ok"}, {"table_data": [["a"]], "table_options": {"height": 0.0}}]),
                ErrorKind::InvalidArgument,
            ),
            (
                json!([{"chart_type": "NOT_A_TYPE", "chart_categories": ["a"], "chart_data": [["s", [1]]]}]),
                ErrorKind::InvalidArgument,
            ),
            (json!([{"table_data": [["a", "b"], ["c"]]}]), ErrorKind::InvalidArgument),
            (json!([{"layout_index": 42}]), ErrorKind::InvalidArgument),
        ];
        for (slides, kind) in cases {
            let err = build(&d, &request(json!({"title": "T", "slides_content": slides}))).unwrap_err();
            assert_eq!(err.kind(), kind, "{err}");
        }
        assert!(d.registry().is_empty());

        let err = build(
            &d,
            &request(json!({"title": "T", "slides_content": [], "title_slide_color": [1, 2, 300]})),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(d.registry().is_empty());
    }

    #[test]
    fn late_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), b"x").unwrap();
        let d = dispatcher(dir.path());
        let kept = d
            .create_presentation(&CreatePresentationRequest {
                filename: "kept".into(),
            })
            .unwrap();

        // Everything validates; only the save at the end fails.
        let err = build(
            &d,
            &request(json!({
                "title": "T",
                "slides_content": [{"bullets": ["a"]}, {"text": "b"}],
                "footer": "ACME",
                "filename": "blocker/deck"
            })),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BackendFailure, "{err}");

        assert_eq!(d.registry().len(), 1);
        let listed: Vec<_> = d.list_presentations().into_iter().map(|p| p.presentation_id).collect();
        assert_eq!(listed, vec![kept]);
    }

    #[test]
    fn partial_chart_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let d = dispatcher(dir.path());
        let out = build(
            &d,
            &request(json!({
                "title": "T",
                "slides_content": [{"chart_type": "PIE", "text": "only text"}]
            })),
        )
        .unwrap();
        let outline = d.outline(&out.presentation_id.to_string()).unwrap();
        assert_eq!(outline.slides[1].shapes.len(), 1);
        assert_eq!(outline.slides[1].shapes[0].snapshot.kind, ShapeKind::Paragraph);
    }
}
