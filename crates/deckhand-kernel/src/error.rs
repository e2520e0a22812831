//! Error taxonomy for registry, backend, and dispatch failures.
//!
//! Every failure the kernel produces is one of these variants. Callers across
//! the tool boundary see the coarser [`ErrorKind`] plus the message.

use std::path::PathBuf;

use deckhand_types::{HandleKind, ValueError};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the registry, the document backend, and the dispatcher.
#[derive(Debug, Error)]
pub enum DeckError {
    /// The handle was never issued by this registry.
    #[error("handle not found: {0}")]
    NotFound(String),

    /// The handle exists but names a different kind of object.
    #[error("handle {handle} is a {actual}, expected a {expected}")]
    KindMismatch {
        handle: String,
        expected: HandleKind,
        actual: HandleKind,
    },

    /// A registration named a parent that is missing or of the wrong kind.
    #[error("invalid parent: {0}")]
    InvalidParent(String),

    /// Malformed or out-of-range input, rejected before any mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced file does not exist.
    #[error("resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// The document backend failed while building or serializing.
    #[error("backend failure: {0}")]
    Backend(String),

    /// Writing the output package failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Caller-visible failure category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    ResourceNotFound,
    BackendFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::ResourceNotFound => "resource_not_found",
            ErrorKind::BackendFailure => "backend_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl DeckError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn not_found(handle: impl Into<String>) -> Self {
        Self::NotFound(handle.into())
    }

    /// Category reported to callers. Kind mismatches and bad parents are
    /// argument errors from the caller's point of view.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeckError::NotFound(_) => ErrorKind::NotFound,
            DeckError::KindMismatch { .. }
            | DeckError::InvalidParent(_)
            | DeckError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DeckError::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            DeckError::Backend(_) | DeckError::Io { .. } => ErrorKind::BackendFailure,
        }
    }
}

impl From<ValueError> for DeckError {
    fn from(e: ValueError) -> Self {
        DeckError::InvalidArgument(e.to_string())
    }
}

impl From<zip::result::ZipError> for DeckError {
    fn from(e: zip::result::ZipError) -> Self {
        DeckError::Backend(format!("zip: {e}"))
    }
}

impl From<image::ImageError> for DeckError {
    fn from(e: image::ImageError) -> Self {
        DeckError::Backend(format!("image: {e}"))
    }
}

impl From<std::fmt::Error> for DeckError {
    fn from(_: std::fmt::Error) -> Self {
        DeckError::Backend("failed to format part XML".into())
    }
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, DeckError>;
