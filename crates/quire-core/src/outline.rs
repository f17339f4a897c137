//! Block outline: toggling and indentation
//!
//! Nesting is not stored as tree structure. A block's depth comes from
//! [`level_of`], and a block's parent is the nearest preceding block with a
//! smaller level. [`Outline`] materialises that hierarchy as an arena so
//! parent, children and descendant queries are direct lookups.

use std::ops::Range as IndexRange;

use tracing::debug;

use crate::document::{level_of, Document, ElementKind, Node, Path, Point, Range, Schema};
use crate::editor::Editor;
use crate::error::{EditorError, EditorResult};

/// One text block in the outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: Path,
    pub level: u32,
    pub parent: Option<usize>,
}

/// Parent-indexed view of a document's text blocks
#[derive(Debug, Clone, Default)]
pub struct Outline {
    entries: Vec<Entry>,
}

impl Outline {
    pub fn build(document: &Document, schema: &Schema) -> EditorResult<Self> {
        let mut entries: Vec<Entry> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        for path in document.blocks(schema) {
            let level = level_of(document.element_at(&path)?);
            while let Some(&top) = stack.last() {
                if entries[top].level < level {
                    break;
                }
                stack.pop();
            }
            entries.push(Entry {
                path,
                level,
                parent: stack.last().copied(),
            });
            stack.push(entries.len() - 1);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path == *path)
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.entries.get(index)?.parent
    }

    pub fn children(&self, index: usize) -> Vec<usize> {
        self.descendants(index)
            .filter(|&i| self.entries[i].parent == Some(index))
            .collect()
    }

    /// Indices of everything nested under `index`; always contiguous
    pub fn descendants(&self, index: usize) -> IndexRange<usize> {
        let Some(entry) = self.entries.get(index) else {
            return index..index;
        };
        let end = (index + 1..self.entries.len())
            .find(|&i| self.entries[i].level <= entry.level)
            .unwrap_or(self.entries.len());
        index + 1..end
    }

    /// Number of ancestors
    pub fn depth(&self, index: usize) -> usize {
        std::iter::successors(self.parent(index), |&p| self.parent(p)).count()
    }

    pub fn previous_sibling(&self, index: usize) -> Option<usize> {
        let parent = self.entries.get(index)?.parent;
        let floor = parent.map_or(0, |p| p + 1);
        (floor..index)
            .rev()
            .find(|&i| self.entries[i].parent == parent)
    }
}

fn set_subtree_visibility(
    document: &mut Document,
    outline: &Outline,
    index: usize,
    showing: bool,
) -> EditorResult<()> {
    document.element_at_mut(&outline.entries[index].path)?.is_showing = Some(showing);
    for i in outline.descendants(index) {
        document.element_at_mut(&outline.entries[i].path)?.is_visible = Some(showing);
    }
    Ok(())
}

/// Flip whether the block at `path` shows its nested content
///
/// Every descendant's `isVisible` follows the new state. Returns the new
/// `isShowing`.
pub fn toggle(document: &mut Document, schema: &Schema, path: &Path) -> EditorResult<bool> {
    let outline = Outline::build(document, schema)?;
    let index = outline
        .index_of(path)
        .ok_or_else(|| EditorError::NoBlock(path.clone()))?;
    let showing = document.element_at(path)?.is_collapsed();
    set_subtree_visibility(document, &outline, index, showing)?;
    debug!(%path, showing, hidden = outline.descendants(index).len(), "Toggled block");
    Ok(showing)
}

/// Expand every collapsed ancestor of the block at `path`
///
/// Returns whether anything changed.
pub fn reveal(document: &mut Document, schema: &Schema, path: &Path) -> EditorResult<bool> {
    let outline = Outline::build(document, schema)?;
    let index = outline
        .index_of(path)
        .ok_or_else(|| EditorError::NoBlock(path.clone()))?;

    let mut changed = false;
    let mut ancestor = outline.parent(index);
    while let Some(a) = ancestor {
        if document.element_at(&outline.entries[a].path)?.is_collapsed() {
            set_subtree_visibility(document, &outline, a, true)?;
            changed = true;
        }
        ancestor = outline.parent(a);
    }

    let el = document.element_at_mut(path)?;
    if el.is_hidden() {
        el.is_visible = Some(true);
        changed = true;
    }
    Ok(changed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    In,
    Out,
}

/// Move each selected subtree one level deeper
///
/// A subtree moves only if its root has a previous sibling to nest under.
/// Returns how many blocks moved.
pub fn indent(editor: &mut Editor) -> EditorResult<usize> {
    shift(editor, Shift::In)
}

/// Move each selected subtree one level shallower
///
/// A subtree moves only if its root is below level 1. Returns how many
/// blocks moved.
pub fn outdent(editor: &mut Editor) -> EditorResult<usize> {
    shift(editor, Shift::Out)
}

fn shift(editor: &mut Editor, direction: Shift) -> EditorResult<usize> {
    let range = editor
        .selection()
        .cloned()
        .ok_or(EditorError::NoSelection)?;
    let (start, end) = range.edges();
    let first_block = editor.block_of(&start)?;
    let last_block = editor.block_of(&end)?;

    let outline = Outline::build(editor.document(), editor.schema())?;
    let first = outline
        .index_of(&first_block)
        .ok_or_else(|| EditorError::NoBlock(first_block.clone()))?;
    let last = outline
        .index_of(&last_block)
        .ok_or_else(|| EditorError::NoBlock(last_block.clone()))?;

    let mut roots = Vec::new();
    let mut covered = first;
    for index in first..=last {
        if index < covered {
            continue;
        }
        roots.push(index);
        covered = outline.descendants(index).end;
    }

    let mut anchor = range.anchor.clone();
    let mut focus = range.focus.clone();
    let mut moved = 0;

    for root in roots {
        let entry = &outline.entries[root];
        let kind = editor.document().element_at(&entry.path)?.kind;
        let allowed = kind.is_nestable()
            && match direction {
                Shift::In => outline.previous_sibling(root).is_some(),
                Shift::Out => entry.level > 1,
            };
        if !allowed {
            continue;
        }
        for index in root..outline.descendants(root).end {
            let path = &outline.entries[index].path;
            if shift_block(editor.document_mut(), path, direction, [&mut anchor, &mut focus])? {
                moved += 1;
            }
        }
    }

    editor.select(Range::new(anchor, focus));
    debug!(?direction, moved, "Shifted blocks");
    Ok(moved)
}

/// Shift one block, keeping carets inside its first run in place
fn shift_block(
    document: &mut Document,
    path: &Path,
    direction: Shift,
    points: [&mut Point; 2],
) -> EditorResult<bool> {
    let el = document.element_at_mut(path)?;
    match el.kind {
        ElementKind::ListItem | ElementKind::ChecklistItem => {
            let level = el.level.unwrap_or(1);
            el.level = Some(match direction {
                Shift::In => level + 1,
                Shift::Out => level.saturating_sub(1).max(1),
            });
            Ok(true)
        }
        ElementKind::Paragraph => {
            let Some(Node::Text(first)) = el.children.first_mut() else {
                return Ok(false);
            };
            let run = path.child(0);
            match direction {
                Shift::In => {
                    first.text.insert(0, '\t');
                    for point in points {
                        if point.path == run {
                            point.offset += 1;
                        }
                    }
                }
                Shift::Out => {
                    if !first.text.starts_with('\t') {
                        return Ok(false);
                    }
                    first.text.remove(0);
                    for point in points {
                        if point.path == run && point.offset > 0 {
                            point.offset -= 1;
                        }
                    }
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}
