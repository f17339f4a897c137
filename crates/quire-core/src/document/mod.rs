//! Block document model
//!
//! A page body is an ordered forest of [`Element`]s whose leaves are
//! [`Text`] runs. Everything is addressed by [`Path`]s (child indices from
//! the document root) and [`Point`]s (a text leaf path plus a character
//! offset).

pub mod node;
pub mod path;
pub mod tree;

pub use node::{BlockId, Element, ElementKind, Mark, Marks, Node, Text};
pub use path::{Affinity, Path, Point, Range};
pub use tree::{level_of, Document, Schema};
