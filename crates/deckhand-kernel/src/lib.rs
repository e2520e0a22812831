//! # deckhand-kernel
//!
//! Session state and tool semantics for deckhand.
//!
//! The kernel owns every live presentation. A caller:
//! - Creates a presentation and gets back an opaque handle
//! - Appends slides and shapes by handle, each returning a new handle
//! - Saves to disk any number of times while continuing to edit
//! - Can build a whole deck in one composite call
//!
//! Document libraries sit behind [`DocumentBackend`]; [`PptxBackend`] writes
//! PresentationML packages directly.

pub mod backend;
pub mod compose;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod pptx;
pub mod registry;
pub mod requests;
mod validate;

pub use backend::{
    AutoShapeSpec, BulletListSpec, CellSnapshot, ChartSpec, DocumentBackend, HeaderFooterSpec,
    ImageSpec, ParagraphSpec, ShapeKey, ShapeKind, ShapeSnapshot, SlideKey, SlideSnapshot,
    TableSnapshot, TableSpec, TextBoxSpec,
};
pub use compose::{ChartOptions, CompositeOutcome, ImageOptions, LayoutCursor, SlideContent, TableOptions};
pub use config::{ConfigError, DeckConfig, LayoutConfig, TitleSlideConfig, OUTPUT_DIR_ENV};
pub use dispatch::{Dispatcher, PresentationOutline, PresentationSummary, ShapeOutline, SlideOutline};
pub use error::{DeckError, ErrorKind, Result};
pub use pptx::{PptxBackend, PptxPresentation};
pub use registry::{Object, Registry, SharedPresentation, SharedRegistry};
pub use requests::{
    AddBulletListRequest, AddChartRequest, AddHeaderFooterRequest, AddImageRequest,
    AddParagraphRequest, AddShapeRequest, AddSlideRequest, AddTableRequest, AddTextRequest,
    CreateCompletePresentationRequest, CreatePresentationRequest, Label, SavePresentationRequest,
};

/// The dispatcher the server runs.
pub type PptxDispatcher = Dispatcher<PptxBackend>;
