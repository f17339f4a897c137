//! Scene geometry

use serde::{Deserialize, Serialize};

/// A point in scene or screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two opposite corners, in any order
    pub fn from_corners(a: Position, b: Position) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (a.x - b.x).abs(),
            (a.y - b.y).abs(),
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the two rectangles share any point; touching edges count
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || other.right() < self.x
            || self.bottom() < other.y
            || other.bottom() < self.y)
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Where a directed edge drawn from `source` should end on `target`
///
/// The line from `source` towards the target's center is cut where it first
/// crosses the target's border, so the arrowhead touches the rectangle
/// instead of disappearing under it. Whichever of the horizontal or vertical
/// distance dominates (relative to the rectangle's half extents) picks the
/// side that is hit. If `source` is the target's center, the center is
/// returned.
pub fn edge_target_point(source: Position, target: &Rect) -> Position {
    let center = target.center();
    let dx = center.x - source.x;
    let dy = center.y - source.y;
    if dx == 0.0 && dy == 0.0 {
        return center;
    }

    let half_w = target.width / 2.0;
    let half_h = target.height / 2.0;
    // fraction of the (dx, dy) vector to back off from the center
    let tx = if dx == 0.0 { f64::INFINITY } else { half_w / dx.abs() };
    let ty = if dy == 0.0 { f64::INFINITY } else { half_h / dy.abs() };
    let t = tx.min(ty);

    Position::new(center.x - dx * t, center.y - dy * t)
}
