//! Editor error types

use thiserror::Error;

use uuid::Uuid;

use crate::document::{ElementKind, Path};

/// Errors that can occur while reading or mutating a document
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("No node at path {0}")]
    NotFound(Path),

    #[error("Node at path {0} is not an element")]
    NotAnElement(Path),

    #[error("Node at path {0} is not a text node")]
    NotText(Path),

    #[error("Path {0} is not inside a block")]
    NoBlock(Path),

    #[error("Editor has no selection")]
    NoSelection,

    #[error("Node at path {path} is {found:?}, expected {expected:?}")]
    WrongKind {
        path: Path,
        expected: ElementKind,
        found: ElementKind,
    },

    #[error("Invalid clipboard fragment: {0}")]
    InvalidFragment(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors raised by canvas graph edits
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CanvasError {
    #[error("No node with id {0} on this canvas")]
    UnknownNode(Uuid),

    #[error("No edge {0} on this canvas")]
    UnknownEdge(String),

    #[error("Cannot connect node {0} to itself")]
    SelfLoop(Uuid),
}

/// Result type for canvas operations
pub type CanvasResult<T> = Result<T, CanvasError>;
