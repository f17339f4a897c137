//! Clipboard payloads
//!
//! Paste and copy exchange a [`DataTransfer`]: text flavours keyed by MIME
//! type plus any attached files. The editor's own flavour carries copied
//! nodes as base64-encoded JSON so they survive a round trip unchanged.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::document::Node;
use crate::error::{EditorError, EditorResult};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
/// Internal fragment flavour
pub const FRAGMENT: &str = "application/x-slate-fragment";

/// A file attached to a paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ClipboardFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Whether the top-level MIME type is `image`
    pub fn is_image(&self) -> bool {
        self.mime.split('/').next() == Some("image")
    }

    /// Inline `data:` URL of the file contents
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Clipboard contents of a paste or copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    items: BTreeMap<String, String>,
    files: Vec<ClipboardFile>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, mime: &str, value: impl Into<String>) -> Self {
        self.items.insert(mime.to_string(), value.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_data(TEXT_PLAIN, text)
    }

    pub fn with_html(self, html: impl Into<String>) -> Self {
        self.with_data(TEXT_HTML, html)
    }

    pub fn with_file(mut self, file: ClipboardFile) -> Self {
        self.files.push(file);
        self
    }

    /// Attach `nodes` in the internal fragment flavour
    pub fn with_fragment(self, nodes: &[Node]) -> EditorResult<Self> {
        let encoded = encode_fragment(nodes)?;
        Ok(self.with_data(FRAGMENT, encoded))
    }

    /// Value for `mime`; empty values count as absent
    pub fn get(&self, mime: &str) -> Option<&str> {
        self.items
            .get(mime)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn text(&self) -> Option<&str> {
        self.get(TEXT_PLAIN)
    }

    pub fn html(&self) -> Option<&str> {
        self.get(TEXT_HTML)
    }

    pub fn fragment(&self) -> Option<&str> {
        self.get(FRAGMENT)
    }

    pub fn files(&self) -> &[ClipboardFile] {
        &self.files
    }

    /// MIME types present, in sorted order
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}

/// Encode nodes for the fragment flavour
pub fn encode_fragment(nodes: &[Node]) -> EditorResult<String> {
    let json = serde_json::to_vec(nodes)?;
    Ok(STANDARD.encode(json))
}

/// Decode a fragment flavour value
pub fn decode_fragment(encoded: &str) -> EditorResult<Vec<Node>> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| EditorError::InvalidFragment(e.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}
