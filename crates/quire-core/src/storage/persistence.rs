//! Page and graph view persistence
//!
//! Uses atomic writes (write to temp file, then rename) to prevent
//! corruption. A file that no longer parses is moved aside to
//! `<name>.json.corrupt` the first time it is read.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use crate::config::Config;
use crate::models::{GraphView, Page};

/// File-backed store for pages and graph views
#[derive(Debug, Clone)]
pub struct PageStore {
    pages_dir: PathBuf,
    graph_views_dir: PathBuf,
}

impl PageStore {
    /// Open the store under the configured data directory
    pub fn new(config: &Config) -> Self {
        Self {
            pages_dir: config.pages_dir(),
            graph_views_dir: config.graph_views_dir(),
        }
    }

    /// Open a store rooted at an arbitrary directory
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            pages_dir: data_dir.join("pages"),
            graph_views_dir: data_dir.join("graph_views"),
        }
    }

    fn page_path(&self, id: Uuid) -> PathBuf {
        self.pages_dir.join(format!("{id}.json"))
    }

    fn graph_view_path(&self, id: Uuid) -> PathBuf {
        self.graph_views_dir.join(format!("{id}.json"))
    }

    /// Save a page, re-deriving its text body first
    pub fn save_page(&self, page: &mut Page) -> StorageResult<()> {
        page.refresh_text();
        write_json(&self.page_path(page.id), page)?;
        debug!(id = %page.id, "Saved page");
        Ok(())
    }

    pub fn load_page(&self, id: Uuid) -> StorageResult<Option<Page>> {
        read_json(&self.page_path(id))
    }

    /// All readable pages, most recently updated first
    ///
    /// Corrupted files are moved aside and skipped.
    pub fn list_pages(&self) -> StorageResult<Vec<Page>> {
        let mut pages: Vec<Page> = read_all(&self.pages_dir)?;
        pages.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(pages)
    }

    /// Remove a page; returns false if it did not exist
    pub fn delete_page(&self, id: Uuid) -> StorageResult<bool> {
        remove(&self.page_path(id))
    }

    /// Save a graph view, stamping it as updated now
    pub fn save_graph_view(&self, view: &mut GraphView) -> StorageResult<()> {
        view.touch();
        write_json(&self.graph_view_path(view.id), view)?;
        debug!(id = %view.id, nodes = view.graph.nodes().len(), "Saved graph view");
        Ok(())
    }

    pub fn load_graph_view(&self, id: Uuid) -> StorageResult<Option<GraphView>> {
        read_json(&self.graph_view_path(id))
    }

    /// All readable graph views, most recently updated first
    pub fn list_graph_views(&self) -> StorageResult<Vec<GraphView>> {
        let mut views: Vec<GraphView> = read_all(&self.graph_views_dir)?;
        views.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(views)
    }

    pub fn delete_graph_view(&self, id: Uuid) -> StorageResult<bool> {
        remove(&self.graph_view_path(id))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, &bytes)
}

/// Read and parse a JSON file
///
/// Returns `None` if the file doesn't exist. A file that exists but does not
/// parse is renamed with a `.corrupt` suffix.
fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let backup_path = backup_corrupt(path)?;
            warn!(path = ?path, backup = ?backup_path, error = %e, "Moved corrupted file aside");
            Err(StorageError::Corrupt {
                path: path.to_path_buf(),
                backup: backup_path,
                details: e.to_string(),
            })
        }
    }
}

fn read_all<T: DeserializeOwned>(dir: &Path) -> StorageResult<Vec<T>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| StorageError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match read_json(&path) {
            Ok(Some(value)) => out.push(value),
            Ok(None) => {}
            Err(StorageError::Corrupt { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

fn remove(path: &Path) -> StorageResult<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).map_err(|e| StorageError::from_io(e, path.to_path_buf()))?;
    Ok(true)
}

fn backup_corrupt(path: &Path) -> StorageResult<PathBuf> {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    let backup = PathBuf::from(name);
    fs::rename(path, &backup).map_err(|source| StorageError::Rename {
        from: path.to_path_buf(),
        to: backup.clone(),
        source,
    })?;
    Ok(backup)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Directory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::Rename {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
