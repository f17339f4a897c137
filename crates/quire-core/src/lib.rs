//! Quire Core Library
//!
//! This crate provides the core functionality for Quire, a block-based
//! knowledge base: the page document model, the editing pipeline that turns
//! keystrokes and clipboard data into document changes, and the canvas graph
//! used to lay pages out visually.
//!
//! # Architecture
//!
//! - **Document**: an ordered tree of block elements holding inline text runs
//! - **Editor**: selection-scoped primitives over the document
//! - **Pipeline**: ordered plugins (links, ids, shortcuts, images, embeds)
//!   that may claim an input event before the default handler runs
//! - **Canvas**: nodes, edges, viewport and gestures of a graph view
//!
//! # Quick Start
//!
//! ```text
//! let mut editor = BlockEditor::new(Document::default());
//!
//! editor.type_text("# Title")?;
//! editor.insert_break()?;
//! editor.paste_text("https://example.com/photo.jpg")?;
//!
//! let text = serialize::to_plain_text(editor.document().children());
//! ```
//!
//! # Modules
//!
//! - `document`: block/inline node types, paths, points and ranges
//! - `editor`: editor primitives, pipeline and plugins
//! - `outline`: toggle and indent over the block hierarchy
//! - `serialize`: plain text and HTML conversion
//! - `canvas`: graph explorer model
//! - `models`: persisted pages and graph views
//! - `storage`: local page and graph-view persistence
//! - `config`: application configuration

pub mod canvas;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod models;
pub mod outline;
pub mod serialize;
pub mod storage;

pub use config::Config;
pub use document::{BlockId, Document, Element, ElementKind, Node, Path, Point, Range, Text};
pub use editor::{BlockEditor, DataTransfer, Editor, InputEvent, Outcome, Pipeline, Plugin};
pub use error::{CanvasError, CanvasResult, EditorError, EditorResult};
pub use models::{GraphView, Page};
pub use storage::{PageStore, StorageError};
