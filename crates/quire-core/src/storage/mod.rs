//! Storage layer
//!
//! Pages and graph views are kept as one JSON file each under the data
//! directory:
//!
//! - `pages/<id>.json`
//! - `graph_views/<id>.json`
//!
//! Writes are atomic. There is no conflict detection: the last save wins.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::PageStore;
