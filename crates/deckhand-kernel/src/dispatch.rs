//! Tool dispatcher.
//!
//! One method per tool. Each validates its request, resolves handles through
//! the registry, runs the backend call under the presentation's lock, and
//! registers the result. A request that fails validation or resolution never
//! reaches the backend; a backend failure registers nothing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use deckhand_types::{Handle, HandleKind};

use crate::backend::{
    AutoShapeSpec, BulletListSpec, ChartSpec, DocumentBackend, HeaderFooterSpec, ImageSpec,
    ParagraphSpec, ShapeKey, ShapeSnapshot, SlideKey, TableSpec, TextBoxSpec,
};
use crate::compose::{self, CompositeOutcome};
use crate::config::DeckConfig;
use crate::error::{DeckError, Result};
use crate::registry::{Object, Registry, ShapeRef, SharedPresentation, SharedRegistry, SlideRef};
use crate::requests::{
    AddBulletListRequest, AddChartRequest, AddHeaderFooterRequest, AddImageRequest,
    AddParagraphRequest, AddShapeRequest, AddSlideRequest, AddTableRequest, AddTextRequest,
    CreateCompletePresentationRequest, CreatePresentationRequest, SavePresentationRequest,
};
use crate::validate;

const DEFAULT_FILENAME: &str = "presentation";

/// Resolved presentation + slide pair for a shape operation.
struct SlideTarget<P> {
    presentation: Handle,
    doc: SharedPresentation<P>,
    slide: Handle,
    key: SlideKey,
}

/// Validated, registry-backed tool operations.
pub struct Dispatcher<B: DocumentBackend> {
    registry: SharedRegistry<B::Presentation>,
    backend: Arc<B>,
    config: Arc<DeckConfig>,
}

impl<B: DocumentBackend> Clone for Dispatcher<B> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            backend: Arc::clone(&self.backend),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B: DocumentBackend> Dispatcher<B> {
    /// A dispatcher over a fresh registry.
    pub fn new(backend: B, config: DeckConfig) -> Self {
        Self::with_registry(Arc::new(Registry::new()), Arc::new(backend), Arc::new(config))
    }

    pub fn with_registry(
        registry: SharedRegistry<B::Presentation>,
        backend: Arc<B>,
        config: Arc<DeckConfig>,
    ) -> Self {
        Self {
            registry,
            backend,
            config,
        }
    }

    pub fn registry(&self) -> &SharedRegistry<B::Presentation> {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Presentations and slides
    // ------------------------------------------------------------------

    pub fn create_presentation(&self, req: &CreatePresentationRequest) -> Result<Handle> {
        let filename = req.filename.trim();
        let label = if filename.is_empty() {
            DEFAULT_FILENAME
        } else {
            filename
        };
        let doc = self.backend.new_presentation()?;
        let handle = self.registry.register_labeled(
            HandleKind::Presentation,
            None,
            Object::Presentation(Arc::new(parking_lot::Mutex::new(doc))),
            Some(label.to_string()),
        )?;
        info!(%handle, filename = label, "created presentation");
        Ok(handle)
    }

    pub fn add_slide(&self, req: &AddSlideRequest) -> Result<Handle> {
        let presentation = self.registry.parse_handle(&req.presentation_id)?;
        let doc = self.registry.resolve_presentation(&presentation)?;
        let layout = validate::layout_index(req.layout_index, self.backend.layout_count())?;
        let background = validate::optional_color(req.background_color.as_ref())?;

        let mut guard = doc.lock();
        let key = self
            .backend
            .add_slide(&mut guard, layout, req.title.as_deref(), background)?;
        let handle = self.registry.register_labeled(
            HandleKind::Slide,
            Some(presentation),
            Object::Slide(SlideRef { presentation, key }),
            req.title.clone(),
        )?;
        debug!(%handle, %presentation, layout, "added slide");
        Ok(handle)
    }

    // ------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------

    pub fn add_text(&self, req: &AddTextRequest) -> Result<Handle> {
        let target = self.target(&req.presentation_id, &req.slide_id)?;
        let mut style = validate::style(req.font_size, &req.font_name, &req.color)?;
        style.bold = req.bold;
        style.italic = req.italic;
        style.underline = req.underline;
        let spec = TextBoxSpec {
            text: req.text.clone(),
            rect: validate::rect(req.left, req.top, req.width, req.height)?,
            style,
            alignment: validate::alignment(&req.alignment)?,
        };
        self.insert_shape(target, "text", |b, doc, slide| b.add_text_box(doc, slide, spec))
    }

    pub fn add_paragraph(&self, req: &AddParagraphRequest) -> Result<Handle> {
        let target = self.target(&req.presentation_id, &req.slide_id)?;
        let spec = ParagraphSpec {
            text: req.text.clone(),
            rect: validate::rect(req.left, req.top, req.width, req.height)?,
            style: validate::style(req.font_size, &req.font_name, &req.color)?,
            alignment: validate::alignment(&req.alignment)?,
            line_spacing: validate::line_spacing(req.line_spacing)?,
        };
        self.insert_shape(target, "paragraph", |b, doc, slide| {
            b.add_paragraph(doc, slide, spec)
        })
    }

    pub fn add_bullet_list(&self, req: &AddBulletListRequest) -> Result<Handle> {
        let target = self.target(&req.presentation_id, &req.slide_id)?;
        validate::bullet_items(&req.items)?;
        let spec = BulletListSpec {
            items: req.items.clone(),
            rect: validate::rect(req.left, req.top, req.width, req.height)?,
            style: validate::style(req.font_size, &req.font_name, &req.color)?,
            level: validate::level(req.level)?,
            bullet_char: validate::bullet_char(req.bullet_character.as_deref())?,
        };
        self.insert_shape(target, "bullet list", |b, doc, slide| {
            b.add_bullet_list(doc, slide, spec)
        })
    }

    pub fn add_image(&self, req: &AddImageRequest) -> Result<Handle> {
        let target = self.target(&req.presentation_id, &req.slide_id)?;
        let (left, top) = validate::position(req.left, req.top)?;
        let spec = ImageSpec {
            path: PathBuf::from(&req.image_path),
            left,
            top,
            width: validate::optional_extent("width", req.width)?,
            height: validate::optional_extent("height", req.height)?,
        };
        self.insert_shape(target, "image", |b, doc, slide| b.add_image(doc, slide, spec))
    }

    pub fn add_chart(&self, req: &AddChartRequest) -> Result<Handle> {
        let target = self.target(&req.presentation_id, &req.slide_id)?;
        let chart_type = validate::chart_type(&req.chart_type)?;
        let (categories, series) =
            validate::chart_data(chart_type, &req.categories, &req.data_series)?;
        let spec = ChartSpec {
            chart_type,
            categories,
            series,
            rect: validate::rect(req.left, req.top, req.width, req.height)?,
            title: req.chart_title.clone().filter(|t| !t.is_empty()),
        };
        self.insert_shape(target, "chart", |b, doc, slide| b.add_chart(doc, slide, spec))
    }

    pub fn add_table(&self, req: &AddTableRequest) -> Result<Handle> {
        let target = self.target(&req.presentation_id, &req.slide_id)?;
        let rows = validate::table_rows(&req.data)?;
        let cols = rows[0].len();
        let (left, top) = validate::position(req.left, req.top)?;
        let spec = TableSpec {
            rows,
            left,
            top,
            width: validate::optional_extent("width", req.width)?,
            height: validate::optional_extent("height", req.height)?,
            column_widths: validate::column_widths(req.column_widths.as_deref(), cols)?,
            header_styled: req.first_row_is_header,
        };
        self.insert_shape(target, "table", |b, doc, slide| b.add_table(doc, slide, spec))
    }

    pub fn add_shape(&self, req: &AddShapeRequest) -> Result<Handle> {
        let target = self.target(&req.presentation_id, &req.slide_id)?;
        let spec = AutoShapeSpec {
            shape_type: validate::shape_type(&req.shape_type)?,
            rect: validate::rect(req.left, req.top, req.width, req.height)?,
            fill: validate::optional_color(req.fill_color.as_ref())?,
            line: validate::optional_color(req.line_color.as_ref())?,
            line_width: validate::line_width(req.line_width)?,
        };
        self.insert_shape(target, "shape", |b, doc, slide| b.add_shape(doc, slide, spec))
    }

    // ------------------------------------------------------------------
    // Whole-presentation operations
    // ------------------------------------------------------------------

    /// Decorate every current slide. Returns how many slides were touched.
    pub fn add_header_footer(&self, req: &AddHeaderFooterRequest) -> Result<usize> {
        let presentation = self.registry.parse_handle(&req.presentation_id)?;
        let doc = self.registry.resolve_presentation(&presentation)?;
        let spec = HeaderFooterSpec {
            header: req.header_text.clone().filter(|t| !t.is_empty()),
            footer: req.footer_text.clone().filter(|t| !t.is_empty()),
            slide_number: req.slide_number,
            date: req.date,
        };

        let mut guard = doc.lock();
        let slides = self.slide_keys(&presentation)?;
        self.backend.apply_header_footer(&mut guard, &slides, &spec)?;
        debug!(%presentation, slides = slides.len(), "applied header/footer");
        Ok(slides.len())
    }

    /// Write the presentation to disk. The presentation stays open for edits.
    pub fn save_presentation(&self, req: &SavePresentationRequest) -> Result<PathBuf> {
        let presentation = self.registry.parse_handle(&req.presentation_id)?;
        let doc = self.registry.resolve_presentation(&presentation)?;
        let filename = match req.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .registry
                .label(&presentation)?
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        };
        let path = self.config.resolve_output(&filename);

        let guard = doc.lock();
        self.backend.save(&guard, &path)?;
        info!(%presentation, path = %path.display(), "saved presentation");
        Ok(path)
    }

    pub fn create_complete_presentation(
        &self,
        req: &CreateCompletePresentationRequest,
    ) -> Result<CompositeOutcome> {
        compose::build(self, req)
    }

    // ------------------------------------------------------------------
    // Read-back
    // ------------------------------------------------------------------

    pub fn list_presentations(&self) -> Vec<PresentationSummary> {
        self.registry
            .handles(HandleKind::Presentation)
            .into_iter()
            .map(|h| PresentationSummary {
                presentation_id: h,
                filename: self.registry.label(&h).ok().flatten(),
                slide_count: self.registry.children(&h).map_or(0, |c| c.len()),
            })
            .collect()
    }

    /// Slides and shapes of one presentation, with their handles.
    pub fn outline(&self, presentation_id: &str) -> Result<PresentationOutline> {
        let presentation = self.registry.parse_handle(presentation_id)?;
        let doc = self.registry.resolve_presentation(&presentation)?;
        let guard = doc.lock();

        let mut slides = Vec::new();
        for slide in self.registry.children(&presentation)? {
            let slide_ref = self.registry.resolve_slide(&slide)?;
            let snap = self.backend.slide_snapshot(&guard, slide_ref.key)?;
            let by_key: HashMap<ShapeKey, Handle> = self
                .registry
                .children(&slide)?
                .into_iter()
                .map(|h| self.registry.resolve_shape(&h).map(|s| (s.key, h)))
                .collect::<Result<_>>()?;
            let shapes = snap
                .shapes
                .into_iter()
                .filter_map(|shape| {
                    by_key.get(&shape.key).map(|&shape_id| ShapeOutline {
                        shape_id,
                        snapshot: shape,
                    })
                })
                .collect();
            slides.push(SlideOutline {
                slide_id: slide,
                layout_index: snap.layout_index,
                layout_name: snap.layout_name,
                title: snap.title,
                background: snap.background,
                header: snap.header,
                footer: snap.footer,
                shapes,
            });
        }
        Ok(PresentationOutline {
            presentation_id: presentation,
            filename: self.registry.label(&presentation)?,
            slides,
        })
    }

    /// Read back one shape.
    pub fn shape(&self, shape_id: &str) -> Result<ShapeSnapshot> {
        let handle = self.registry.parse_handle(shape_id)?;
        let shape = self.registry.resolve_shape(&handle)?;
        let doc = self.registry.resolve_presentation(&shape.presentation)?;
        let guard = doc.lock();
        self.backend.shape_snapshot(&guard, shape.slide_key, shape.key)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn target(
        &self,
        presentation_id: &str,
        slide_id: &str,
    ) -> Result<SlideTarget<B::Presentation>> {
        let presentation = self.registry.parse_handle(presentation_id)?;
        let slide = self.registry.parse_handle(slide_id)?;
        let doc = self.registry.resolve_presentation(&presentation)?;
        let slide_ref = self.registry.resolve_slide(&slide)?;
        if slide_ref.presentation != presentation {
            return Err(DeckError::invalid_argument(format!(
                "slide {slide} belongs to {}, not {presentation}",
                slide_ref.presentation
            )));
        }
        Ok(SlideTarget {
            presentation,
            doc,
            slide,
            key: slide_ref.key,
        })
    }

    fn insert_shape<F>(
        &self,
        target: SlideTarget<B::Presentation>,
        what: &str,
        op: F,
    ) -> Result<Handle>
    where
        F: FnOnce(&B, &mut B::Presentation, SlideKey) -> Result<ShapeKey>,
    {
        let mut guard = target.doc.lock();
        let key = op(self.backend.as_ref(), &mut *guard, target.key)?;
        let handle = self.registry.register(
            HandleKind::Shape,
            Some(target.slide),
            Object::Shape(ShapeRef {
                presentation: target.presentation,
                slide: target.slide,
                slide_key: target.key,
                key,
            }),
        )?;
        debug!(%handle, slide = %target.slide, "added {what}");
        Ok(handle)
    }

    fn slide_keys(&self, presentation: &Handle) -> Result<Vec<SlideKey>> {
        self.registry
            .children(presentation)?
            .iter()
            .map(|h| self.registry.resolve_slide(h).map(|s| s.key))
            .collect()
    }
}

/// One row of the presentation listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PresentationSummary {
    pub presentation_id: Handle,
    pub filename: Option<String>,
    pub slide_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PresentationOutline {
    pub presentation_id: Handle,
    pub filename: Option<String>,
    pub slides: Vec<SlideOutline>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlideOutline {
    pub slide_id: Handle,
    pub layout_index: usize,
    pub layout_name: &'static str,
    pub title: Option<String>,
    pub background: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub shapes: Vec<ShapeOutline>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShapeOutline {
    pub shape_id: Handle,
    #[serde(flatten)]
    pub snapshot: ShapeSnapshot,
}
