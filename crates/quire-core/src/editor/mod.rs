//! Editor primitives and the input pipeline
//!
//! [`Editor`] owns a document plus a selection and implements the base
//! operations (typing, splitting, deleting, pasting) that pipeline stages
//! build on. Every operation leaves the selection collapsed where a user
//! would expect the caret after the edit, unless it says otherwise.
//!
//! [`Pipeline`] runs [`InputEvent`]s through the ordered [`Plugin`] stages
//! before falling back to these primitives; [`BlockEditor`] ties the two
//! together.

pub mod clipboard;
pub mod pipeline;
pub mod plugins;
pub mod session;

pub use clipboard::{ClipboardFile, DataTransfer};
pub use pipeline::{InputEvent, Outcome, Pipeline, Plugin};
pub use session::BlockEditor;

use tracing::warn;

use crate::document::tree::{byte_index, inline_len, normalize_inlines, slice_inlines};
use crate::document::{
    Affinity, Document, Element, ElementKind, Mark, Marks, Node, Path, Point, Range, Schema,
};
use crate::error::{EditorError, EditorResult};

/// The part of a range that falls inside one text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub block: Path,
    pub from: usize,
    pub to: usize,
}

/// A document with a selection
#[derive(Debug, Clone)]
pub struct Editor {
    document: Document,
    selection: Option<Range>,
    schema: Schema,
}

impl Editor {
    pub fn new(mut document: Document, schema: Schema) -> Self {
        document.fill_empty();
        Self {
            document,
            selection: None,
            schema,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    // ==================== Selection ====================

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, range: Range) {
        self.selection = Some(range);
    }

    pub fn set_cursor(&mut self, point: Point) {
        self.selection = Some(Range::collapsed(point));
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    fn range(&self) -> EditorResult<Range> {
        self.selection.clone().ok_or(EditorError::NoSelection)
    }

    /// The focus point of the selection
    pub fn cursor(&self) -> EditorResult<Point> {
        Ok(self.range()?.focus)
    }

    pub fn is_collapsed(&self) -> bool {
        self.selection.as_ref().is_some_and(Range::is_collapsed)
    }

    /// Path of the text block holding `point`
    pub fn block_of(&self, point: &Point) -> EditorResult<Path> {
        self.document
            .block_above(&point.path, &self.schema)
            .ok_or_else(|| EditorError::NoBlock(point.path.clone()))
    }

    /// The block holding the start of the selection
    pub fn current_block(&self) -> EditorResult<(Path, &Element)> {
        let path = self.block_of(&self.range()?.start())?;
        let el = self.document.element_at(&path)?;
        Ok((path, el))
    }

    /// Text from the start of the current block up to the cursor
    pub fn text_before_cursor(&self) -> EditorResult<String> {
        let cursor = self.cursor()?;
        let start = self.document.start_of(&self.block_of(&cursor)?)?;
        self.document.string_between(&start, &cursor)
    }

    /// Whether the selection is a caret at the very start of its block
    pub fn at_block_start(&self) -> EditorResult<bool> {
        let range = self.range()?;
        if !range.is_collapsed() {
            return Ok(false);
        }
        let (_, offset) = self.block_point(&range.focus)?;
        Ok(offset == 0)
    }

    fn block_point(&self, point: &Point) -> EditorResult<(Path, usize)> {
        let block = self.block_of(point)?;
        let offset = self.document.block_offset(&block, point)?;
        Ok((block, offset))
    }

    /// Split `range` into per-block character spans, in document order
    pub fn spans(&self, range: &Range) -> EditorResult<Vec<Span>> {
        let (start, end) = range.edges();
        let (start_block, from) = self.block_point(&start)?;
        let (end_block, to) = self.block_point(&end)?;
        let mut spans = Vec::new();
        for block in self.document.blocks(&self.schema) {
            if block < start_block || block > end_block {
                continue;
            }
            let len = inline_len(&self.document.element_at(&block)?.children);
            spans.push(Span {
                from: if block == start_block { from } else { 0 },
                to: if block == end_block { to } else { len },
                block,
            });
        }
        Ok(spans)
    }

    /// Text leaves touched by `range`
    pub fn selected_leaves(&self, range: &Range) -> Vec<Path> {
        let (start, end) = range.edges();
        self.document
            .all_leaves()
            .into_iter()
            .filter(|leaf| *leaf >= start.path && *leaf <= end.path)
            .collect()
    }

    fn place_cursor(&mut self, block: &Path, offset: usize, affinity: Affinity) -> EditorResult<()> {
        let point = self.document.point_at_offset(block, offset, affinity)?;
        self.set_cursor(point);
        Ok(())
    }

    fn set_block_children(&mut self, block: &Path, children: Vec<Node>) -> EditorResult<()> {
        self.document.element_at_mut(block)?.children = normalize_inlines(children);
        Ok(())
    }

    fn is_inline_node(&self, node: &Node) -> bool {
        match node {
            Node::Text(_) => true,
            Node::Element(el) => self.schema.is_inline(el),
        }
    }

    // ==================== Text ====================

    /// Insert `text` at the cursor, replacing any selected content
    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.delete_selection()?;
        let point = self.cursor()?;
        let block = self.block_of(&point)?;
        if self.schema.is_void(self.document.element_at(&block)?) {
            return Ok(());
        }
        let leaf = &mut self.document.text_at_mut(&point.path)?.text;
        let at = byte_index(leaf, point.offset);
        leaf.insert_str(at, text);
        let offset = point.offset + text.chars().count();
        self.set_cursor(Point::new(point.path, offset));
        Ok(())
    }

    /// Insert multi-line text, splitting the block at each line break
    pub fn insert_plain_text(&mut self, text: &str) -> EditorResult<()> {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.split_block()?;
            }
            self.insert_text(line.strip_suffix('\r').unwrap_or(line))?;
        }
        Ok(())
    }

    /// Delete the selected content, if any
    pub fn delete_selection(&mut self) -> EditorResult<()> {
        match &self.selection {
            Some(range) if !range.is_collapsed() => {
                let range = range.clone();
                self.delete_range(&range)
            }
            _ => Ok(()),
        }
    }

    /// Delete the content covered by `range`
    ///
    /// Across blocks, the first and last blocks are joined and everything
    /// between them is removed, along with any container left empty.
    pub fn delete_range(&mut self, range: &Range) -> EditorResult<()> {
        let (start, end) = range.edges();
        let (start_block, from) = self.block_point(&start)?;
        let (end_block, to) = self.block_point(&end)?;

        let mut content = slice_inlines(
            &self.document.element_at(&start_block)?.children,
            0,
            Some(from),
        );
        content.extend(slice_inlines(
            &self.document.element_at(&end_block)?.children,
            to,
            None,
        ));

        if start_block != end_block {
            let doomed: Vec<Path> = self
                .document
                .blocks(&self.schema)
                .into_iter()
                .filter(|p| *p > start_block && *p <= end_block)
                .collect();
            for path in doomed.iter().rev() {
                self.document.remove_pruned(path)?;
            }
        }

        self.set_block_children(&start_block, content)?;
        self.place_cursor(&start_block, from, Affinity::Backward)
    }

    /// Split the current block at the cursor
    ///
    /// The new block copies every property of the old one. At a void block
    /// an empty paragraph is added after it instead.
    pub fn split_block(&mut self) -> EditorResult<()> {
        self.delete_selection()?;
        let point = self.cursor()?;
        let (block, offset) = self.block_point(&point)?;
        let next = block.next();
        let el = self.document.element_at(&block)?;

        if self.schema.is_void(el) {
            self.document
                .insert_node(&next, Element::new(ElementKind::Paragraph).into())?;
        } else {
            let head = slice_inlines(&el.children, 0, Some(offset));
            let mut tail = el.clone();
            tail.children = normalize_inlines(slice_inlines(&el.children, offset, None));
            self.set_block_children(&block, head)?;
            self.document.insert_node(&next, tail.into())?;
        }

        let start = self.document.start_of(&next)?;
        self.set_cursor(start);
        Ok(())
    }

    /// Delete one character before the cursor
    ///
    /// At the start of a block the block is merged into the previous one, or
    /// a previous void block is removed.
    pub fn delete_backward(&mut self) -> EditorResult<()> {
        if !self.is_collapsed() {
            return self.delete_selection();
        }
        let point = self.cursor()?;
        let (block, offset) = self.block_point(&point)?;
        if offset > 0 {
            return self.delete_char_before(&block, &point);
        }

        let Some((previous, prev_el)) = self.document.previous_block(&block, &self.schema) else {
            return Ok(());
        };

        if self.schema.is_void(prev_el) {
            let removed = self.document.remove_pruned(&previous)?;
            let block = block
                .transform_remove(&removed)
                .ok_or_else(|| EditorError::NotFound(block.clone()))?;
            let start = self.document.start_of(&block)?;
            self.set_cursor(start);
            return Ok(());
        }

        let joint = inline_len(&prev_el.children);
        let mut merged = prev_el.children.clone();
        merged.extend(self.document.element_at(&block)?.children.iter().cloned());
        self.document.remove_pruned(&block)?;
        self.set_block_children(&previous, merged)?;
        self.place_cursor(&previous, joint, Affinity::Backward)
    }

    fn delete_char_before(&mut self, block: &Path, point: &Point) -> EditorResult<()> {
        let target = if point.offset > 0 {
            point.clone()
        } else {
            // caret sits at the start of a leaf; step back to the last
            // non-empty leaf in the block
            let mut found = None;
            for leaf in self.document.leaves(block)? {
                if leaf >= point.path {
                    break;
                }
                let len = self.document.text_at(&leaf)?.len();
                if len > 0 {
                    found = Some(Point::new(leaf, len));
                }
            }
            match found {
                Some(target) => target,
                None => return Ok(()),
            }
        };

        let text = &mut self.document.text_at_mut(&target.path)?.text;
        let from = byte_index(text, target.offset - 1);
        let to = byte_index(text, target.offset);
        text.replace_range(from..to, "");
        self.set_cursor(Point::new(target.path, target.offset - 1));
        Ok(())
    }

    // ==================== Nodes ====================

    /// Insert an inline element at the cursor and place the caret after it
    pub fn insert_inline(&mut self, inline: Element) -> EditorResult<()> {
        self.splice_inlines(vec![inline.into()], Affinity::Forward)
    }

    fn splice_inlines(&mut self, nodes: Vec<Node>, affinity: Affinity) -> EditorResult<()> {
        self.delete_selection()?;
        let point = self.cursor()?;
        let (block, offset) = self.block_point(&point)?;
        let inserted = inline_len(&nodes);
        let children = &self.document.element_at(&block)?.children;
        let mut content = slice_inlines(children, 0, Some(offset));
        content.extend(nodes);
        content.extend(slice_inlines(children, offset, None));
        self.set_block_children(&block, content)?;
        self.place_cursor(&block, offset + inserted, affinity)
    }

    /// Insert block nodes at the cursor
    ///
    /// At the end of a block (or in an empty one) the nodes go after it, at
    /// the start of a non-empty block they go before it, and anywhere else
    /// the block is split and they go between the halves. The caret ends up
    /// at the end of the last inserted node.
    pub fn insert_blocks(&mut self, nodes: Vec<Node>) -> EditorResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        self.delete_selection()?;
        let point = self.cursor()?;
        let (block, offset) = self.block_point(&point)?;
        let len = inline_len(&self.document.element_at(&block)?.children);

        let at = if offset >= len {
            block.next()
        } else if offset == 0 {
            block
        } else {
            self.split_block()?;
            block.next()
        };
        self.insert_blocks_at(&at, nodes)
    }

    fn insert_blocks_at(&mut self, at: &Path, nodes: Vec<Node>) -> EditorResult<()> {
        let mut path = at.clone();
        for node in nodes {
            self.document.insert_node(&path, node)?;
            path = path.next();
        }
        let last = path
            .previous()
            .ok_or_else(|| EditorError::NotFound(path.clone()))?;
        self.select_after(&last)
    }

    fn select_after(&mut self, last: &Path) -> EditorResult<()> {
        let is_void = match self.document.node_at(last)? {
            Node::Element(el) => self.schema.is_void(el),
            Node::Text(_) => false,
        };
        let point = match self.document.next_block(last, &self.schema) {
            Some((next, _)) if is_void => self.document.start_of(&next)?,
            _ => self.document.end_of(last)?,
        };
        self.set_cursor(point);
        Ok(())
    }

    /// Insert a detached fragment at the cursor
    ///
    /// A fragment of inline nodes is spliced into the current block. Anything
    /// else is inserted as blocks, with loose inline runs wrapped in
    /// paragraphs; an empty current block is replaced by the fragment.
    pub fn insert_fragment(&mut self, nodes: Vec<Node>) -> EditorResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        if nodes.iter().all(|n| self.is_inline_node(n)) {
            return self.splice_inlines(nodes, Affinity::Backward);
        }

        let blocks = self.wrap_loose_inlines(nodes);
        if blocks.is_empty() {
            return Ok(());
        }
        self.delete_selection()?;
        let (block, el) = self.current_block()?;
        let replace = el.string().is_empty()
            && !self.schema.is_void(el)
            && el.children.iter().all(Node::is_text);
        if replace {
            self.document.remove_node(&block)?;
            self.insert_blocks_at(&block, blocks)
        } else {
            self.insert_blocks(blocks)
        }
    }

    fn wrap_loose_inlines(&self, nodes: Vec<Node>) -> Vec<Node> {
        fn flush(run: &mut Vec<Node>, blocks: &mut Vec<Node>) {
            let inlines = std::mem::take(run);
            let meaningful = inlines
                .iter()
                .any(|n| !n.is_text() || !n.string().trim().is_empty());
            if meaningful {
                blocks.push(
                    Element::with_children(ElementKind::Paragraph, normalize_inlines(inlines))
                        .into(),
                );
            }
        }

        let mut blocks = Vec::new();
        let mut run = Vec::new();
        for node in nodes {
            if self.is_inline_node(&node) {
                run.push(node);
            } else {
                flush(&mut run, &mut blocks);
                blocks.push(node);
            }
        }
        flush(&mut run, &mut blocks);
        blocks
    }

    /// Default paste: an internal fragment if readable, else plain text
    pub fn insert_data(&mut self, data: &DataTransfer) -> EditorResult<()> {
        if let Some(encoded) = data.fragment() {
            match clipboard::decode_fragment(encoded) {
                Ok(nodes) => return self.insert_fragment(nodes),
                Err(err) => warn!(error = %err, "Ignoring unreadable clipboard fragment"),
            }
        }
        if let Some(text) = data.text() {
            self.insert_plain_text(text)?;
        }
        Ok(())
    }

    /// Remove every top-level node in `paths`
    pub fn remove_blocks(&mut self, paths: &[Path]) -> EditorResult<()> {
        let mut sorted = paths.to_vec();
        sorted.sort();
        sorted.dedup();
        for path in sorted.iter().rev() {
            self.document.remove_pruned(path)?;
        }
        Ok(())
    }

    // ==================== Block properties ====================

    /// Update the current block in place
    pub fn set_block(&mut self, update: impl FnOnce(&mut Element)) -> EditorResult<()> {
        let (path, _) = self.current_block()?;
        update(self.document.element_at_mut(&path)?);
        Ok(())
    }

    pub fn set_block_kind(&mut self, kind: ElementKind) -> EditorResult<()> {
        self.set_block(|el| el.kind = kind)
    }

    /// The element at `path`, which must be of `kind`
    pub fn element_of_kind_mut(
        &mut self,
        path: &Path,
        kind: ElementKind,
    ) -> EditorResult<&mut Element> {
        let el = self.document.element_at_mut(path)?;
        if el.kind != kind {
            return Err(EditorError::WrongKind {
                path: path.clone(),
                expected: kind,
                found: el.kind,
            });
        }
        Ok(el)
    }

    /// Turn the selected blocks into code blocks, or back into paragraphs
    /// when any of them already is one
    ///
    /// Void blocks are left alone. Returns whether the blocks are now code.
    pub fn toggle_code_block(&mut self) -> EditorResult<bool> {
        let range = self.range()?;
        let mut blocks = Vec::new();
        for span in self.spans(&range)? {
            let el = self.document.element_at(&span.block)?;
            if !self.schema.is_void(el) {
                blocks.push((span.block, el.kind == ElementKind::Code));
            }
        }
        let to_code = !blocks.iter().any(|(_, is_code)| *is_code);
        let kind = if to_code {
            ElementKind::Code
        } else {
            ElementKind::Paragraph
        };
        for (block, _) in &blocks {
            self.document.element_at_mut(block)?.kind = kind;
        }
        Ok(to_code)
    }

    // ==================== Inline wrappers ====================

    /// Whether an inline element of `kind` contains part of the selection
    pub fn is_inline_active(&self, kind: ElementKind) -> bool {
        let Some(range) = &self.selection else {
            return false;
        };
        self.selected_leaves(range).iter().any(|leaf| {
            (1..leaf.len()).any(|len| {
                let prefix = Path::from(&leaf.as_slice()[..len]);
                matches!(self.document.element_at(&prefix), Ok(el) if el.kind == kind)
            })
        })
    }

    /// Replace inline elements of `kind` touching the selection with their
    /// content
    pub fn unwrap_inline(&mut self, kind: ElementKind) -> EditorResult<()> {
        let range = self.range()?;
        let leaves = self.selected_leaves(&range);
        let anchor = self.block_point(&range.anchor)?;
        let focus = self.block_point(&range.focus)?;

        for span in self.spans(&range)? {
            let el = self.document.element_at(&span.block)?;
            let mut changed = false;
            let mut content = Vec::with_capacity(el.children.len());
            for (index, child) in el.children.iter().enumerate() {
                let child_path = span.block.child(index);
                match child {
                    Node::Element(inner)
                        if inner.kind == kind
                            && leaves.iter().any(|l| child_path.is_ancestor_of(l)) =>
                    {
                        content.extend(inner.children.iter().cloned());
                        changed = true;
                    }
                    other => content.push(other.clone()),
                }
            }
            if changed {
                self.set_block_children(&span.block, content)?;
            }
        }

        let anchor = self
            .document
            .point_at_offset(&anchor.0, anchor.1, Affinity::Backward)?;
        let focus = self
            .document
            .point_at_offset(&focus.0, focus.1, Affinity::Backward)?;
        self.select(Range::new(anchor, focus));
        Ok(())
    }

    /// Wrap the selected content of each block in a copy of `wrapper`, then
    /// collapse to the end of the selection
    pub fn wrap_inline(&mut self, wrapper: Element) -> EditorResult<()> {
        let range = self.range()?;
        if range.is_collapsed() {
            return Ok(());
        }
        let mut end = None;
        for span in self.spans(&range)? {
            if span.from >= span.to {
                continue;
            }
            let children = &self.document.element_at(&span.block)?.children;
            let mut wrapped = wrapper.clone();
            wrapped.children = slice_inlines(children, span.from, Some(span.to));
            let mut content = slice_inlines(children, 0, Some(span.from));
            content.push(wrapped.into());
            content.extend(slice_inlines(children, span.to, None));
            self.set_block_children(&span.block, content)?;
            end = Some((span.block, span.to));
        }
        match end {
            Some((block, offset)) => self.place_cursor(&block, offset, Affinity::Backward),
            None => Ok(()),
        }
    }

    // ==================== Marks ====================

    /// Marks of the leaf under the cursor
    pub fn marks(&self) -> EditorResult<Marks> {
        let cursor = self.cursor()?;
        Ok(self.document.text_at(&cursor.path)?.marks.clone())
    }

    /// Whether every selected, non-empty text run carries `mark`
    pub fn is_mark_active(&self, mark: Mark) -> bool {
        let Some(range) = &self.selection else {
            return false;
        };
        if range.is_collapsed() {
            return self.marks().map(|m| m.has(mark)).unwrap_or(false);
        }
        let mut runs = self
            .selected_leaves(range)
            .into_iter()
            .filter_map(|leaf| self.document.text_at(&leaf).ok())
            .filter(|t| !t.is_empty())
            .peekable();
        runs.peek().is_some() && runs.all(|t| t.marks.has(mark))
    }

    /// Set `mark` on the selection, or clear it if already fully applied
    ///
    /// With a caret the whole run under it changes.
    pub fn toggle_mark(&mut self, mark: Mark) -> EditorResult<()> {
        let value = if self.is_mark_active(mark) {
            None
        } else {
            Some(true)
        };
        self.update_marks(|marks| marks.set(mark, value))
    }

    /// Unset bold, italic, underline and strikethrough on the selection
    pub fn clear_formatting(&mut self) -> EditorResult<()> {
        self.update_marks(|marks| {
            for mark in [
                Mark::Bold,
                Mark::Italic,
                Mark::Underline,
                Mark::Strikethrough,
            ] {
                marks.set(mark, None);
            }
        })
    }

    fn update_marks(&mut self, update: impl Fn(&mut Marks)) -> EditorResult<()> {
        let range = self.range()?;
        if range.is_collapsed() {
            update(&mut self.document.text_at_mut(&range.focus.path)?.marks);
            return Ok(());
        }

        let spans = self.spans(&range)?;
        for span in &spans {
            let children = &self.document.element_at(&span.block)?.children;
            let mut middle = slice_inlines(children, span.from, Some(span.to));
            apply_marks(&mut middle, &update);
            let mut content = slice_inlines(children, 0, Some(span.from));
            content.extend(middle);
            content.extend(slice_inlines(children, span.to, None));
            self.set_block_children(&span.block, content)?;
        }

        if let (Some(first), Some(last)) = (spans.first(), spans.last()) {
            let start = self
                .document
                .point_at_offset(&first.block, first.from, Affinity::Forward)?;
            let end = self
                .document
                .point_at_offset(&last.block, last.to, Affinity::Backward)?;
            self.select(if range.is_backward() {
                Range::new(end, start)
            } else {
                Range::new(start, end)
            });
        }
        Ok(())
    }

    // ==================== Fragments ====================

    /// Copy of the blocks covered by `range`, trimmed to the range edges
    pub fn fragment(&self, range: &Range) -> EditorResult<Vec<Node>> {
        if range.is_collapsed() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for span in self.spans(range)? {
            let el = self.document.element_at(&span.block)?;
            let mut copy = el.clone();
            copy.children = normalize_inlines(slice_inlines(&el.children, span.from, Some(span.to)));
            out.push(copy.into());
        }
        Ok(out)
    }
}

fn apply_marks(nodes: &mut [Node], update: &impl Fn(&mut Marks)) {
    for node in nodes {
        match node {
            Node::Text(t) => update(&mut t.marks),
            Node::Element(el) => apply_marks(&mut el.children, update),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Text;

    fn schema() -> Schema {
        Schema::new()
            .with_inline(ElementKind::Link)
            .with_inline(ElementKind::Date)
            .with_void(ElementKind::Image)
    }

    fn editor(blocks: &[&str]) -> Editor {
        let doc = Document::new(blocks.iter().map(|t| Element::paragraph(*t).into()).collect());
        Editor::new(doc, schema())
    }

    fn strings(editor: &Editor) -> Vec<String> {
        editor.document().children().iter().map(Node::string).collect()
    }

    #[test]
    fn test_insert_text_at_cursor() {
        let mut ed = editor(&["hello"]);
        ed.set_cursor(Point::new(vec![0, 0], 5));
        ed.insert_text(" wörld").unwrap();
        assert_eq!(strings(&ed), vec!["hello wörld"]);
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![0, 0], 11));
    }

    #[test]
    fn test_insert_text_without_selection_fails() {
        let mut ed = editor(&["x"]);
        assert!(matches!(ed.insert_text("a"), Err(EditorError::NoSelection)));
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let mut ed = editor(&["hello world"]);
        ed.select(Range::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 0], 5)));
        ed.insert_text("howdy").unwrap();
        assert_eq!(strings(&ed), vec!["howdy world"]);
    }

    #[test]
    fn test_split_block_copies_properties() {
        let mut ed = Editor::new(
            Document::new(vec![Element::with_children(
                ElementKind::HeadingTwo,
                vec![Node::text("title rest")],
            )
            .into()]),
            schema(),
        );
        ed.set_cursor(Point::new(vec![0, 0], 5));
        ed.split_block().unwrap();

        assert_eq!(strings(&ed), vec!["title", " rest"]);
        let second = ed.document().element_at(&Path::new(vec![1])).unwrap();
        assert_eq!(second.kind, ElementKind::HeadingTwo);
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![1, 0], 0));
    }

    #[test]
    fn test_split_void_block_adds_paragraph() {
        let mut ed = Editor::new(
            Document::new(vec![Element::new(ElementKind::Image)
                .with_url("https://example.com/a.png")
                .into()]),
            schema(),
        );
        ed.set_cursor(Point::new(vec![0, 0], 0));
        ed.split_block().unwrap();
        assert_eq!(ed.document().children().len(), 2);
        let second = ed.document().element_at(&Path::new(vec![1])).unwrap();
        assert_eq!(second.kind, ElementKind::Paragraph);
    }

    #[test]
    fn test_delete_range_across_blocks() {
        let mut ed = editor(&["alpha", "beta", "gamma"]);
        ed.select(Range::new(Point::new(vec![0, 0], 2), Point::new(vec![2, 0], 3)));
        ed.delete_selection().unwrap();
        assert_eq!(strings(&ed), vec!["alma"]);
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![0, 0], 2));
    }

    #[test]
    fn test_delete_backward_character_and_merge() {
        let mut ed = editor(&["ab", "cd"]);
        ed.set_cursor(Point::new(vec![1, 0], 1));
        ed.delete_backward().unwrap();
        assert_eq!(strings(&ed), vec!["ab", "d"]);

        ed.delete_backward().unwrap();
        assert_eq!(strings(&ed), vec!["abd"]);
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![0, 0], 2));

        ed.set_cursor(Point::new(vec![0, 0], 0));
        ed.delete_backward().unwrap();
        assert_eq!(strings(&ed), vec!["abd"]);
    }

    #[test]
    fn test_delete_backward_removes_previous_void() {
        let mut ed = Editor::new(
            Document::new(vec![
                Element::new(ElementKind::Image).into(),
                Element::paragraph("after").into(),
            ]),
            schema(),
        );
        ed.set_cursor(Point::new(vec![1, 0], 0));
        ed.delete_backward().unwrap();
        assert_eq!(strings(&ed), vec!["after"]);
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![0, 0], 0));
    }

    #[test]
    fn test_delete_backward_steps_out_of_link() {
        let mut ed = Editor::new(
            Document::new(vec![Element::with_children(
                ElementKind::Paragraph,
                vec![
                    Node::text("a"),
                    Element::link("https://example.com", "go").into(),
                    Node::text(""),
                ],
            )
            .into()]),
            schema(),
        );
        ed.set_cursor(Point::new(vec![0, 2], 0));
        ed.delete_backward().unwrap();
        assert_eq!(strings(&ed), vec!["ag"]);
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![0, 1, 0], 1));
    }

    #[test]
    fn test_insert_inline_places_cursor_after() {
        let mut ed = editor(&["ab"]);
        ed.set_cursor(Point::new(vec![0, 0], 1));
        ed.insert_inline(Element::link("https://example.com", "x"))
            .unwrap();
        let block = ed.document().element_at(&Path::new(vec![0])).unwrap();
        assert_eq!(block.children.len(), 3);
        assert_eq!(block.string(), "axb");
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![0, 2], 0));
    }

    #[test]
    fn test_insert_blocks_positions() {
        let mut ed = editor(&["abcd"]);
        ed.set_cursor(Point::new(vec![0, 0], 4));
        ed.insert_blocks(vec![Element::paragraph("end").into()])
            .unwrap();
        assert_eq!(strings(&ed), vec!["abcd", "end"]);
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![1, 0], 3));

        ed.set_cursor(Point::new(vec![0, 0], 0));
        ed.insert_blocks(vec![Element::paragraph("start").into()])
            .unwrap();
        assert_eq!(strings(&ed), vec!["start", "abcd", "end"]);

        ed.set_cursor(Point::new(vec![1, 0], 2));
        ed.insert_blocks(vec![Element::paragraph("mid").into()])
            .unwrap();
        assert_eq!(strings(&ed), vec!["start", "ab", "mid", "cd", "end"]);
    }

    #[test]
    fn test_insert_fragment_replaces_empty_block() {
        let mut ed = editor(&[""]);
        ed.set_cursor(Point::new(vec![0, 0], 0));
        ed.insert_fragment(vec![
            Node::text("  \n"),
            Element::paragraph("one").into(),
            Element::paragraph("two").into(),
        ])
        .unwrap();
        assert_eq!(strings(&ed), vec!["one", "two"]);
        assert_eq!(ed.cursor().unwrap(), Point::new(vec![1, 0], 3));
    }

    #[test]
    fn test_insert_fragment_inline() {
        let mut ed = editor(&["ac"]);
        ed.set_cursor(Point::new(vec![0, 0], 1));
        ed.insert_fragment(vec![Node::Text(Text::marked("b", Mark::Bold))])
            .unwrap();
        let block = ed.document().element_at(&Path::new(vec![0])).unwrap();
        assert_eq!(block.string(), "abc");
        assert_eq!(block.children.len(), 3);
    }

    #[test]
    fn test_insert_plain_text_lines() {
        let mut ed = editor(&[""]);
        ed.set_cursor(Point::new(vec![0, 0], 0));
        ed.insert_plain_text("one\r\ntwo\nthree").unwrap();
        assert_eq!(strings(&ed), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_toggle_mark_on_range() {
        let mut ed = editor(&["hello world"]);
        ed.select(Range::new(Point::new(vec![0, 0], 6), Point::new(vec![0, 0], 11)));
        ed.toggle_mark(Mark::Bold).unwrap();

        let block = ed.document().element_at(&Path::new(vec![0])).unwrap();
        assert_eq!(block.children.len(), 2);
        assert!(block.children[1].as_text().unwrap().marks.has(Mark::Bold));
        assert!(ed.is_mark_active(Mark::Bold));

        ed.toggle_mark(Mark::Bold).unwrap();
        let block = ed.document().element_at(&Path::new(vec![0])).unwrap();
        assert_eq!(block.children.len(), 1);
    }

    #[test]
    fn test_clear_formatting_at_cursor() {
        let mut ed = Editor::new(
            Document::new(vec![Element::with_children(
                ElementKind::Paragraph,
                vec![Node::Text(Text::marked("bold", Mark::Bold))],
            )
            .into()]),
            schema(),
        );
        ed.set_cursor(Point::new(vec![0, 0], 2));
        ed.clear_formatting().unwrap();
        assert!(ed.marks().unwrap().is_plain());
    }

    #[test]
    fn test_fragment_trims_edges() {
        let ed = editor(&["alpha", "beta"]);
        let range = Range::new(Point::new(vec![0, 0], 3), Point::new(vec![1, 0], 2));
        let fragment = ed.fragment(&range).unwrap();
        let texts: Vec<String> = fragment.iter().map(Node::string).collect();
        assert_eq!(texts, vec!["ha", "be"]);
    }

    #[test]
    fn test_wrap_and_unwrap_inline() {
        let mut ed = editor(&["see docs here"]);
        ed.select(Range::new(Point::new(vec![0, 0], 4), Point::new(vec![0, 0], 8)));
        ed.wrap_inline(Element::link("https://docs.rs", "")).unwrap();

        let block = ed.document().element_at(&Path::new(vec![0])).unwrap();
        let link = block.children[1].as_element().unwrap();
        assert_eq!(link.string(), "docs");
        assert!(ed.is_inline_active(ElementKind::Link));

        ed.unwrap_inline(ElementKind::Link).unwrap();
        let block = ed.document().element_at(&Path::new(vec![0])).unwrap();
        assert_eq!(block.children.len(), 1);
        assert_eq!(block.string(), "see docs here");
    }

    #[test]
    fn test_insert_data_bad_fragment_falls_back_to_text() {
        let mut ed = editor(&[""]);
        ed.set_cursor(Point::new(vec![0, 0], 0));
        let data = DataTransfer::new()
            .with_data(clipboard::FRAGMENT, "%%% not base64")
            .with_text("plain");
        ed.insert_data(&data).unwrap();
        assert_eq!(strings(&ed), vec!["plain"]);
    }

    #[test]
    fn test_toggle_code_block_round_trip() {
        let mut ed = editor(&["let x = 1;", "let y = 2;", "prose"]);
        ed.select(Range::new(Point::new(vec![0, 0], 2), Point::new(vec![1, 0], 3)));
        assert!(ed.toggle_code_block().unwrap());
        let kinds: Vec<ElementKind> = ed
            .document()
            .children()
            .iter()
            .filter_map(Node::as_element)
            .map(|el| el.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Code, ElementKind::Code, ElementKind::Paragraph]
        );

        // one code block in the selection is enough to turn them all back
        ed.select(Range::new(Point::new(vec![1, 0], 0), Point::new(vec![2, 0], 1)));
        assert!(!ed.toggle_code_block().unwrap());
        let second = ed.document().element_at(&Path::new(vec![1])).unwrap();
        assert_eq!(second.kind, ElementKind::Paragraph);
        let first = ed.document().element_at(&Path::new(vec![0])).unwrap();
        assert_eq!(first.kind, ElementKind::Code);
    }

    #[test]
    fn test_element_of_kind_mut_checks_kind() {
        let mut ed = editor(&["text"]);
        let err = ed
            .element_of_kind_mut(&Path::new(vec![0]), ElementKind::Image)
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::WrongKind {
                expected: ElementKind::Image,
                found: ElementKind::Paragraph,
                ..
            }
        ));
    }
}
