//! Document tree and path-addressed reads and writes
//!
//! A *text block* is a non-inline element whose children are inline content
//! (text runs and inline elements). Paragraphs, headings and list items are
//! text blocks; list containers are not. Block traversal (`next_block`,
//! `previous_block`, the outline) walks text blocks in document order.

use serde::{Deserialize, Serialize};

use crate::document::node::{BlockId, Element, ElementKind, Node, Text};
use crate::document::path::{Affinity, Path, Point};
use crate::error::{EditorError, EditorResult};

/// Which element kinds render inline or have no editable content
///
/// Contributed by the pipeline's plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    inline: Vec<ElementKind>,
    void: Vec<ElementKind>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inline(mut self, kind: ElementKind) -> Self {
        if !self.inline.contains(&kind) {
            self.inline.push(kind);
        }
        self
    }

    pub fn with_void(mut self, kind: ElementKind) -> Self {
        if !self.void.contains(&kind) {
            self.void.push(kind);
        }
        self
    }

    pub fn is_inline(&self, el: &Element) -> bool {
        self.inline.contains(&el.kind)
    }

    pub fn is_void(&self, el: &Element) -> bool {
        self.void.contains(&el.kind)
    }

    /// Whether `el` is a block holding inline content
    pub fn is_text_block(&self, el: &Element) -> bool {
        !self.is_inline(el) && (el.children.is_empty() || el.has_text_children())
    }
}

/// A page body: the ordered top-level nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Parse a stored `json_body`
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Give every childless element an empty text run
    pub fn fill_empty(&mut self) {
        fn fill(nodes: &mut [Node]) {
            for node in nodes {
                if let Node::Element(el) = node {
                    if el.children.is_empty() {
                        el.children.push(Node::Text(Text::default()));
                    } else {
                        fill(&mut el.children);
                    }
                }
            }
        }
        fill(&mut self.children);
    }

    // ==================== Node access ====================

    /// Get the node at `path`
    ///
    /// Fails with `NotFound` when the path does not resolve.
    pub fn node_at(&self, path: &Path) -> EditorResult<&Node> {
        let not_found = || EditorError::NotFound(path.clone());
        let (first, rest) = path.as_slice().split_first().ok_or_else(not_found)?;
        let mut node = self.children.get(*first).ok_or_else(not_found)?;
        for &index in rest {
            node = match node {
                Node::Element(el) => el.children.get(index),
                Node::Text(_) => None,
            }
            .ok_or_else(not_found)?;
        }
        Ok(node)
    }

    pub fn node_at_mut(&mut self, path: &Path) -> EditorResult<&mut Node> {
        let not_found = || EditorError::NotFound(path.clone());
        let (first, rest) = path.as_slice().split_first().ok_or_else(not_found)?;
        let mut node = self.children.get_mut(*first).ok_or_else(not_found)?;
        for &index in rest {
            node = match node {
                Node::Element(el) => el.children.get_mut(index),
                Node::Text(_) => None,
            }
            .ok_or_else(not_found)?;
        }
        Ok(node)
    }

    pub fn has_node(&self, path: &Path) -> bool {
        self.node_at(path).is_ok()
    }

    pub fn element_at(&self, path: &Path) -> EditorResult<&Element> {
        self.node_at(path)?
            .as_element()
            .ok_or_else(|| EditorError::NotAnElement(path.clone()))
    }

    pub fn element_at_mut(&mut self, path: &Path) -> EditorResult<&mut Element> {
        self.node_at_mut(path)?
            .as_element_mut()
            .ok_or_else(|| EditorError::NotAnElement(path.clone()))
    }

    pub fn text_at(&self, path: &Path) -> EditorResult<&Text> {
        self.node_at(path)?
            .as_text()
            .ok_or_else(|| EditorError::NotText(path.clone()))
    }

    pub fn text_at_mut(&mut self, path: &Path) -> EditorResult<&mut Text> {
        match self.node_at_mut(path)? {
            Node::Text(t) => Ok(t),
            Node::Element(_) => Err(EditorError::NotText(path.clone())),
        }
    }

    /// Find the path of the element carrying `id`
    pub fn path_of(&self, id: &BlockId) -> Option<Path> {
        fn search(nodes: &[Node], prefix: &Path, id: &BlockId) -> Option<Path> {
            for (index, node) in nodes.iter().enumerate() {
                if let Node::Element(el) = node {
                    let path = prefix.child(index);
                    if el.id.as_ref() == Some(id) {
                        return Some(path);
                    }
                    if let Some(found) = search(&el.children, &path, id) {
                        return Some(found);
                    }
                }
            }
            None
        }
        search(&self.children, &Path::root(), id)
    }

    // ==================== Structural edits ====================

    fn children_of_mut(&mut self, parent: &Path) -> EditorResult<&mut Vec<Node>> {
        if parent.is_empty() {
            Ok(&mut self.children)
        } else {
            Ok(&mut self.element_at_mut(parent)?.children)
        }
    }

    /// Insert `node` so that it ends up at `path`
    pub fn insert_node(&mut self, path: &Path, node: Node) -> EditorResult<()> {
        let not_found = || EditorError::NotFound(path.clone());
        let parent = path.parent().ok_or_else(not_found)?;
        let index = path.last().ok_or_else(not_found)?;
        let children = self.children_of_mut(&parent)?;
        if index > children.len() {
            return Err(not_found());
        }
        children.insert(index, node);
        Ok(())
    }

    /// Remove and return the node at `path`
    pub fn remove_node(&mut self, path: &Path) -> EditorResult<Node> {
        let not_found = || EditorError::NotFound(path.clone());
        let parent = path.parent().ok_or_else(not_found)?;
        let index = path.last().ok_or_else(not_found)?;
        let children = self.children_of_mut(&parent)?;
        if index >= children.len() {
            return Err(not_found());
        }
        Ok(children.remove(index))
    }

    /// Remove the node at `path`, then any ancestors left without children
    ///
    /// Returns the path of the topmost node removed.
    pub fn remove_pruned(&mut self, path: &Path) -> EditorResult<Path> {
        self.remove_node(path)?;
        let mut removed = path.clone();
        while let Some(parent) = removed.parent() {
            if parent.is_empty() || !self.element_at(&parent)?.children.is_empty() {
                break;
            }
            self.remove_node(&parent)?;
            removed = parent;
        }
        Ok(removed)
    }

    // ==================== Leaves and points ====================

    /// Paths of the text leaves under `path`, in document order
    pub fn leaves(&self, path: &Path) -> EditorResult<Vec<Path>> {
        let mut out = Vec::new();
        collect_leaves(self.node_at(path)?, path, &mut out);
        Ok(out)
    }

    /// Every text leaf in the document
    pub fn all_leaves(&self) -> Vec<Path> {
        let mut out = Vec::new();
        for (index, node) in self.children.iter().enumerate() {
            collect_leaves(node, &Path::new(vec![index]), &mut out);
        }
        out
    }

    /// First point inside the node at `path`
    pub fn start_of(&self, path: &Path) -> EditorResult<Point> {
        let leaf = self
            .leaves(path)?
            .into_iter()
            .next()
            .ok_or_else(|| EditorError::NotText(path.clone()))?;
        Ok(Point::new(leaf, 0))
    }

    /// Last point inside the node at `path`
    pub fn end_of(&self, path: &Path) -> EditorResult<Point> {
        let leaf = self
            .leaves(path)?
            .pop()
            .ok_or_else(|| EditorError::NotText(path.clone()))?;
        let offset = self.text_at(&leaf)?.len();
        Ok(Point::new(leaf, offset))
    }

    /// Text between two points, in document order
    pub fn string_between(&self, a: &Point, b: &Point) -> EditorResult<String> {
        let (start, end) = if b < a { (b, a) } else { (a, b) };
        let mut out = String::new();
        for leaf in self.all_leaves() {
            if leaf < start.path || leaf > end.path {
                continue;
            }
            let text = &self.text_at(&leaf)?.text;
            let from = if leaf == start.path { start.offset } else { 0 };
            let to = if leaf == end.path {
                end.offset
            } else {
                text.chars().count()
            };
            out.push_str(char_slice(text, from, to));
        }
        Ok(out)
    }

    /// Text content of the node at `path`
    pub fn string(&self, path: &Path) -> EditorResult<String> {
        Ok(self.node_at(path)?.string())
    }

    /// Character offset of `point` from the start of the block at `block`
    pub fn block_offset(&self, block: &Path, point: &Point) -> EditorResult<usize> {
        let mut offset = 0;
        for leaf in self.leaves(block)? {
            if leaf == point.path {
                return Ok(offset + point.offset);
            }
            offset += self.text_at(&leaf)?.len();
        }
        Err(EditorError::NoBlock(point.path.clone()))
    }

    /// Point `offset` characters into the block at `block`
    pub fn point_at_offset(
        &self,
        block: &Path,
        offset: usize,
        affinity: Affinity,
    ) -> EditorResult<Point> {
        let leaves = self.leaves(block)?;
        let last = leaves.len().saturating_sub(1);
        let mut remaining = offset;
        for (i, leaf) in leaves.iter().enumerate() {
            let len = self.text_at(leaf)?.len();
            let fits = remaining < len
                || (remaining == len && (affinity == Affinity::Backward || i == last));
            if fits {
                return Ok(Point::new(leaf.clone(), remaining));
            }
            remaining -= len;
        }
        self.end_of(block)
    }

    // ==================== Blocks ====================

    /// Paths of all text blocks in document order
    pub fn blocks(&self, schema: &Schema) -> Vec<Path> {
        fn walk(nodes: &[Node], prefix: &Path, schema: &Schema, out: &mut Vec<Path>) {
            for (index, node) in nodes.iter().enumerate() {
                if let Node::Element(el) = node {
                    let path = prefix.child(index);
                    if schema.is_text_block(el) {
                        out.push(path);
                    } else if !schema.is_inline(el) {
                        walk(&el.children, &path, schema, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &Path::root(), schema, &mut out);
        out
    }

    /// Path of the text block containing (or equal to) `path`
    pub fn block_above(&self, path: &Path, schema: &Schema) -> Option<Path> {
        (1..=path.len()).rev().find_map(|len| {
            let prefix = Path::from(&path.as_slice()[..len]);
            match self.node_at(&prefix) {
                Ok(Node::Element(el)) if schema.is_text_block(el) => Some(prefix),
                _ => None,
            }
        })
    }

    /// The next text block after `path` in document order
    pub fn next_block(&self, path: &Path, schema: &Schema) -> Option<(Path, &Element)> {
        let next = self
            .blocks(schema)
            .into_iter()
            .find(|p| p > path && !path.is_ancestor_of(p))?;
        let el = self.element_at(&next).ok()?;
        Some((next, el))
    }

    /// The text block before `path` in document order
    pub fn previous_block(&self, path: &Path, schema: &Schema) -> Option<(Path, &Element)> {
        let previous = self
            .blocks(schema)
            .into_iter()
            .filter(|p| p < path && !p.contains(path))
            .last()?;
        let el = self.element_at(&previous).ok()?;
        Some((previous, el))
    }
}

fn collect_leaves(node: &Node, path: &Path, out: &mut Vec<Path>) {
    match node {
        Node::Text(_) => out.push(path.clone()),
        Node::Element(el) => {
            for (index, child) in el.children.iter().enumerate() {
                collect_leaves(child, &path.child(index), out);
            }
        }
    }
}

/// Outline level of a block
///
/// List and checklist items use their stored `level` (default 1). Paragraphs
/// are one level deeper per leading tab in their first text run. Every other
/// kind sits at level 1.
pub fn level_of(el: &Element) -> u32 {
    match el.kind {
        ElementKind::ListItem | ElementKind::ChecklistItem => el.level.unwrap_or(1),
        ElementKind::Paragraph => {
            let tabs = el
                .children
                .first()
                .and_then(Node::as_text)
                .map(|t| t.text.chars().take_while(|c| *c == '\t').count())
                .unwrap_or(0);
            tabs as u32 + 1
        }
        _ => 1,
    }
}

/// Total characters of inline content
pub fn inline_len(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::char_len).sum()
}

/// Copy the inline content between two character offsets
///
/// `to: None` slices to the end. Zero-length nodes at offset `s` are kept
/// when `from <= s < to`, or `from <= s` for an open end. Inline elements
/// cut by a boundary are split, each half keeping the element's fields.
pub fn slice_inlines(nodes: &[Node], from: usize, to: Option<usize>) -> Vec<Node> {
    let upper = to.unwrap_or(usize::MAX);
    let mut out = Vec::new();
    let mut pos = 0;
    for node in nodes {
        let len = node.char_len();
        let start = pos;
        let end = pos + len;
        pos = end;

        let included = if len == 0 {
            from <= start && (to.is_none() || start < upper)
        } else {
            from.max(start) < upper.min(end)
        };
        if !included {
            continue;
        }

        let lo = from.max(start) - start;
        let hi = upper.min(end) - start;
        match node {
            Node::Text(t) => out.push(Node::Text(Text {
                text: char_slice(&t.text, lo, hi).to_string(),
                marks: t.marks.clone(),
            })),
            Node::Element(el) => {
                let inner_to = if upper >= end { None } else { Some(hi) };
                let mut part = el.clone();
                part.children = slice_inlines(&el.children, lo, inner_to);
                out.push(Node::Element(part));
            }
        }
    }
    out
}

/// Canonical form of inline content
///
/// Adjacent runs with equal marks merge, empty runs are absorbed by their
/// neighbours, every inline element has a text run on each side, and the
/// result is never empty.
pub fn normalize_inlines(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(t) => {
                if let Some(Node::Text(last)) = merged.last_mut() {
                    if last.marks == t.marks || t.text.is_empty() {
                        last.text.push_str(&t.text);
                        continue;
                    }
                    if last.text.is_empty() {
                        *last = t;
                        continue;
                    }
                }
                merged.push(Node::Text(t));
            }
            Node::Element(mut el) => {
                el.children = normalize_inlines(el.children);
                merged.push(Node::Element(el));
            }
        }
    }

    let mut out = Vec::with_capacity(merged.len() + 2);
    for node in merged {
        if node.as_element().is_some() && !matches!(out.last(), Some(Node::Text(_))) {
            out.push(Node::Text(Text::default()));
        }
        out.push(node);
    }
    if !matches!(out.last(), Some(Node::Text(_))) {
        out.push(Node::Text(Text::default()));
    }
    out
}

/// Substring by character offsets, clamped to the string
pub fn char_slice(s: &str, from: usize, to: usize) -> &str {
    let start = byte_index(s, from);
    let end = byte_index(s, to.max(from));
    &s[start..end]
}

/// Byte index of the character at `offset`, clamped to the string length
pub fn byte_index(s: &str, offset: usize) -> usize {
    s.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
