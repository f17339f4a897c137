//! Paths, points and ranges
//!
//! Paths order nodes in document order: an ancestor sorts before its
//! descendants, and siblings sort by index.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Child indices from the document root down to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The empty path, addressing the document itself
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index within the parent
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the following sibling
    pub fn next(&self) -> Path {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last += 1;
        }
        Self(indices)
    }

    /// Path of the preceding sibling, if any
    pub fn previous(&self) -> Option<Path> {
        match self.0.last() {
            Some(&last) if last > 0 => {
                let mut indices = self.0.clone();
                *indices.last_mut()? = last - 1;
                Some(Self(indices))
            }
            _ => None,
        }
    }

    /// Whether `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Whether `self` equals `other` or is one of its ancestors
    pub fn contains(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Where this path points after the node at `removed` is deleted
    ///
    /// Returns `None` when this path was inside the removed node.
    pub fn transform_remove(&self, removed: &Path) -> Option<Path> {
        if removed.contains(self) {
            return None;
        }
        let depth = removed.len();
        if depth == 0 || depth > self.len() {
            return Some(self.clone());
        }
        let parent = &removed.0[..depth - 1];
        let at = depth - 1;
        if self.0.starts_with(parent) && removed.0[at] < self.0[at] {
            let mut indices = self.0.clone();
            indices[at] -= 1;
            return Some(Self(indices));
        }
        Some(self.clone())
    }

    /// Where this path points after a node is inserted at `inserted`
    pub fn transform_insert(&self, inserted: &Path) -> Path {
        let depth = inserted.len();
        if depth == 0 || depth > self.len() {
            return self.clone();
        }
        let parent = &inserted.0[..depth - 1];
        let at = depth - 1;
        if self.0.starts_with(parent) && inserted.0[at] <= self.0[at] {
            let mut indices = self.0.clone();
            indices[at] += 1;
            return Self(indices);
        }
        self.clone()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

/// A position inside a text leaf
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// Path of a text leaf
    pub path: Path,
    /// Character offset within the leaf
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// Which leaf a block offset resolves to when it falls on a leaf boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    /// End of the earlier leaf
    Backward,
    /// Start of the later leaf
    Forward,
}

/// A selection between two points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    /// A plain cursor
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    /// Whether anchor and focus coincide
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Whether the focus comes before the anchor
    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// Start and end in document order
    pub fn edges(&self) -> (Point, Point) {
        if self.is_backward() {
            (self.focus.clone(), self.anchor.clone())
        } else {
            (self.anchor.clone(), self.focus.clone())
        }
    }

    pub fn start(&self) -> Point {
        self.edges().0
    }

    pub fn end(&self) -> Point {
        self.edges().1
    }
}
