//! Shared vocabulary for deckhand.
//!
//! A leaf crate with **no internal deckhand dependencies**: handles, geometry,
//! colors, and the fixed enumerations of chart and shape types that tool
//! arguments are validated against.
//!
//! # Ownership Overview
//!
//! ```text
//! Presentation (pres-…)
//!     └── Slide (slide-…)
//!             └── Shape (shape-…)   text box, paragraph, bullets,
//!                                   picture, chart, table, auto shape
//! ```
//!
//! # Key Types
//!
//! |-----------------|-------------------------------------------------|
//! | Type            | Purpose                                         |
//! |-----------------|-------------------------------------------------|
//! | [`Handle`]      | Opaque `{kind}-{registry}-{seq}` identifier     |
//! | [`HandleKind`]  | Presentation, slide, or shape                   |
//! | [`Rect`]        | Position and size in inches                     |
//! | [`Rgb`]         | Validated color                                 |
//! | [`ChartType`]   | Supported chart types                           |
//! | [`ShapeType`]   | Supported auto shape presets                    |
//! | [`TableCell`]   | Cell text plus optional [`CellOptions`]         |
//! |-----------------|-------------------------------------------------|

pub mod chart;
pub mod geometry;
pub mod ids;
pub mod shape;
pub mod style;
pub mod table;

pub use chart::{ChartType, Series, SeriesInput};
pub use geometry::{EMU_PER_INCH, EMU_PER_POINT, Rect, SLIDE_HEIGHT_IN, SLIDE_WIDTH_IN};
pub use ids::{Handle, HandleAllocator, HandleKind, HandleParseError, RegistryId};
pub use shape::ShapeType;
pub use style::{Alignment, ColorInput, Rgb, TextStyle};
pub use table::{CellInput, CellOptions, CellOptionsInput, TableCell};

/// A caller-supplied value that is well-typed but out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("invalid color: {0}")]
    Color(String),
    #[error("{0}")]
    Range(String),
}
