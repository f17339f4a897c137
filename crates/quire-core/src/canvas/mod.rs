//! Canvas graph explorer
//!
//! A graph view lays content nodes out on a pannable, zoomable stage.
//! [`Canvas`] owns the graph together with the viewport, the current
//! selection and the in-progress pointer gesture, and turns pointer input
//! into graph edits.

pub mod geometry;
pub mod gesture;
pub mod graph;
pub mod layout;
pub mod selection;
pub mod viewport;

use std::collections::BTreeSet;

use tracing::debug;
use uuid::Uuid;

pub use geometry::{edge_target_point, Position, Rect};
pub use gesture::{Gesture, GestureOutcome, Modifiers};
pub use graph::{
    Edge, EdgeKind, Graph, GraphNode, COLLECTION_CONTENT_TYPE, DEFAULT_NODE_HEIGHT,
    DEFAULT_NODE_WIDTH,
};
pub use layout::Axis;
pub use selection::{multi_select, CanvasSelection, CollectionAddition, Deletion};
pub use viewport::{Viewport, ZOOM_FACTOR};

use crate::error::{CanvasError, CanvasResult};

#[derive(Debug, Clone)]
pub struct Canvas {
    graph: Graph,
    selection: CanvasSelection,
    viewport: Viewport,
    gesture: Gesture,
}

impl Canvas {
    pub fn new(graph: Graph, viewport: Viewport) -> Self {
        Self {
            graph,
            selection: CanvasSelection::new(),
            viewport,
            gesture: Gesture::Idle,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn selection(&self) -> &CanvasSelection {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn select_node(&mut self, id: Uuid) -> CanvasResult<()> {
        if !self.graph.contains_node(id) {
            return Err(CanvasError::UnknownNode(id));
        }
        self.selection.select_node(id);
        Ok(())
    }

    /// Replace the selection with `ids`; fails without selecting if any is unknown
    pub fn select_nodes(&mut self, ids: impl IntoIterator<Item = Uuid>) -> CanvasResult<()> {
        let ids: BTreeSet<Uuid> = ids.into_iter().collect();
        if let Some(&missing) = ids.iter().find(|id| !self.graph.contains_node(**id)) {
            return Err(CanvasError::UnknownNode(missing));
        }
        self.selection.select_nodes(ids);
        Ok(())
    }

    pub fn select_edge(&mut self, source: Uuid, target: Uuid) -> CanvasResult<()> {
        if self.graph.edge(source, target).is_none() {
            return Err(CanvasError::UnknownEdge(graph::edge_key(source, target)));
        }
        self.selection.select_edge(source, target);
        Ok(())
    }

    /// Select every node overlapping the scene rectangle between two corners
    pub fn select_area(&mut self, start: Position, end: Position) -> usize {
        let picked = multi_select(self.graph.nodes(), start, end);
        let count = picked.len();
        self.selection.select_nodes(picked);
        count
    }

    /// Start a gesture at a screen position
    pub fn pointer_down(&mut self, screen: Position, modifiers: Modifiers) {
        let scene = self.viewport.to_scene(screen);
        let hit = self.graph.node_at(scene).map(|n| n.id);

        self.gesture = match hit {
            Some(source) if modifiers.shift => Gesture::DrawingEdge {
                source,
                end: scene,
                hover: None,
            },
            Some(id) => {
                if !self.selection.contains_node(id) {
                    self.selection.select_node(id);
                }
                Gesture::MovingNodes {
                    ids: self.selection.nodes().iter().copied().collect(),
                    press: scene,
                    last: scene,
                }
            }
            None if modifiers.ctrl => Gesture::RubberBand {
                start: scene,
                end: scene,
            },
            None => Gesture::Panning {
                press: screen,
                last: screen,
            },
        };
    }

    pub fn pointer_move(&mut self, screen: Position) {
        let scene = self.viewport.to_scene(screen);
        let hover = self.graph.node_at(scene).map(|n| n.id);

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::MovingNodes { ids, last, .. } => {
                self.graph.move_nodes(ids, scene.x - last.x, scene.y - last.y);
                *last = scene;
            }
            Gesture::DrawingEdge {
                source,
                end,
                hover: over,
            } => {
                *end = scene;
                *over = hover.filter(|h| *h != *source);
            }
            Gesture::RubberBand { end, .. } => *end = scene,
            Gesture::Panning { last, .. } => {
                self.viewport.pan_by(screen.x - last.x, screen.y - last.y);
                *last = screen;
            }
        }
    }

    /// Finish the current gesture
    ///
    /// A press and release on the same spot acts as a click: on a node it
    /// selects just that node, on the stage it clears the selection.
    pub fn pointer_up(&mut self, screen: Position) -> CanvasResult<GestureOutcome> {
        self.pointer_move(screen);

        let outcome = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::None,
            Gesture::MovingNodes { ids, press, last } => {
                if press == last {
                    if let Some(id) = self.graph.node_at(press).map(|n| n.id) {
                        self.selection.select_node(id);
                    }
                    GestureOutcome::None
                } else {
                    debug!(nodes = ids.len(), "Moved nodes");
                    GestureOutcome::Moved(ids)
                }
            }
            Gesture::DrawingEdge { source, hover, .. } => match hover {
                Some(target) => {
                    let edge = Edge::new(source, target);
                    if self.graph.insert_edge(edge.clone())? {
                        debug!(%source, %target, "Connected nodes");
                        GestureOutcome::Connected(edge)
                    } else {
                        GestureOutcome::None
                    }
                }
                None => GestureOutcome::None,
            },
            Gesture::RubberBand { start, end } => {
                let picked = multi_select(self.graph.nodes(), start, end);
                self.selection.select_nodes(picked.clone());
                debug!(selected = picked.len(), "Rubber band selection");
                GestureOutcome::Selected(picked)
            }
            Gesture::Panning { press, last } => {
                if press == last {
                    self.click_stage();
                    GestureOutcome::None
                } else {
                    GestureOutcome::Panned
                }
            }
        };
        Ok(outcome)
    }

    /// Zoom about the pointer; see [`Viewport::zoom_at`]
    pub fn wheel(&mut self, screen: Position, delta_y: f64) {
        self.viewport.zoom_at(screen, delta_y);
    }

    pub fn click_stage(&mut self) {
        self.selection.clear();
    }

    /// Create a node where the stage was double-clicked and return its id
    pub fn double_click_stage(&mut self, screen: Position) -> Uuid {
        let at = self.viewport.to_scene(screen);
        let node = GraphNode::new(at.x, at.y);
        let id = node.id;
        self.graph.insert_node(node);
        debug!(%id, x = at.x, y = at.y, "Created node");
        id
    }

    pub fn delete_selected(&mut self) -> Deletion {
        let deletion = selection::delete_selected(&mut self.graph, &mut self.selection);
        debug!(
            nodes = deletion.nodes.len(),
            edges = deletion.edges.len(),
            "Deleted selection"
        );
        deletion
    }

    /// Add the selected nodes to the collection `id`, keeping the selection
    pub fn add_to_collection(&mut self, id: Uuid) -> CollectionAddition {
        let addition = selection::add_to_collection(&mut self.graph, &self.selection, id);
        debug!(
            collection = %id,
            members = addition.members.len(),
            edges = addition.edges.len(),
            "Added selection to collection"
        );
        addition
    }

    /// Line up the selected nodes; returns how many moved
    pub fn line_up(&mut self, axis: Axis) -> usize {
        layout::line_up(&mut self.graph, self.selection.nodes(), axis)
    }

    /// Center the stage on a node at scale 1 and select it
    pub fn pan_to(&mut self, id: Uuid) -> CanvasResult<()> {
        let center = self
            .graph
            .node(id)
            .map(GraphNode::center)
            .ok_or(CanvasError::UnknownNode(id))?;
        self.viewport.center_on(center);
        self.selection.select_node(id);
        Ok(())
    }

    /// Scene coordinates an edge is drawn between
    ///
    /// Directed edges end on the target's border so the arrowhead stays
    /// visible; other edges run center to center.
    pub fn edge_endpoints(&self, edge: &Edge) -> Option<(Position, Position)> {
        let from = self.graph.node(edge.source)?.center();
        let to = self.graph.node(edge.target)?;
        let end = match edge.kind {
            EdgeKind::Directed => edge_target_point(from, &to.rect()),
            EdgeKind::Undirected | EdgeKind::Suggested => to.center(),
        };
        Some((from, end))
    }
}
