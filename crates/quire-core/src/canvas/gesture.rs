//! Pointer gesture state machine
//!
//! A press on a node starts moving it (or, with shift, drawing an edge from
//! it). A press on empty stage pans, or with ctrl starts a rubber band.
//! Positions are tracked in scene coordinates except while panning, which
//! works in screen pixels.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::geometry::Position;
use super::graph::Edge;

/// Modifier keys held during a press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    MovingNodes {
        ids: Vec<Uuid>,
        press: Position,
        last: Position,
    },
    DrawingEdge {
        source: Uuid,
        end: Position,
        hover: Option<Uuid>,
    },
    RubberBand {
        start: Position,
        end: Position,
    },
    Panning {
        press: Position,
        last: Position,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

/// What releasing the pointer did
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    None,
    Moved(Vec<Uuid>),
    Connected(Edge),
    Selected(BTreeSet<Uuid>),
    Panned,
}
