//! Canvas nodes and edges
//!
//! The wire shape is `{ nodes: [...], edges: [...] }`. Nodes reference
//! content stored elsewhere by id; a node id appears at most once and an edge
//! is identified by its `(source, target)` pair.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::geometry::{Position, Rect};
use crate::error::{CanvasError, CanvasResult};

pub const DEFAULT_NODE_WIDTH: f64 = 250.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 65.0;

/// Content type given to nodes created on the canvas
pub const DEFAULT_CONTENT_TYPE: &str = "Space";

/// Content type of a node other nodes have been added to
pub const COLLECTION_CONTENT_TYPE: &str = "Collection";

/// A node placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

impl GraphNode {
    /// A new node with a fresh id at the given scene position
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_id(Uuid::new_v4(), x, y)
    }

    /// A node for existing content
    pub fn with_id(id: Uuid, x: f64, y: f64) -> Self {
        Self {
            id,
            content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            x,
            y,
            width: None,
            height: None,
            fill: None,
        }
    }

    pub fn width(&self) -> f64 {
        self.width.unwrap_or(DEFAULT_NODE_WIDTH)
    }

    pub fn height(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_NODE_HEIGHT)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width(), self.height())
    }

    pub fn center(&self) -> Position {
        self.rect().center()
    }
}

/// How an edge is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Directed,
    Undirected,
    Suggested,
}

/// A connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: Uuid,
    pub target: Uuid,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: Uuid, target: Uuid) -> Self {
        Self {
            source,
            target,
            kind: EdgeKind::Directed,
        }
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Selection key, `source::target`
    pub fn key(&self) -> String {
        edge_key(self.source, self.target)
    }

    pub fn touches(&self, id: Uuid) -> bool {
        self.source == id || self.target == id
    }
}

pub fn edge_key(source: Uuid, target: Uuid) -> String {
    format!("{source}::{target}")
}

#[derive(Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<GraphNode>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl From<RawGraph> for Graph {
    fn from(raw: RawGraph) -> Self {
        let mut graph = Graph::new();
        for node in raw.nodes {
            graph.insert_node(node);
        }
        for edge in raw.edges {
            let key = edge.key();
            if let Err(err) = graph.insert_edge(edge) {
                warn!(edge = %key, error = %err, "Dropping stored edge");
            }
        }
        graph
    }
}

/// The nodes and edges of one canvas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGraph")]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: Uuid) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: Uuid) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: Uuid) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, source: Uuid, target: Uuid) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// Add a node; returns false if a node with the same id is present
    pub fn insert_node(&mut self, node: GraphNode) -> bool {
        if self.contains_node(node.id) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Add an edge between two existing nodes
    ///
    /// Returns `Ok(false)` if the `(source, target)` pair is already
    /// connected, whatever its kind.
    pub fn insert_edge(&mut self, edge: Edge) -> CanvasResult<bool> {
        if edge.source == edge.target {
            return Err(CanvasError::SelfLoop(edge.source));
        }
        for id in [edge.source, edge.target] {
            if !self.contains_node(id) {
                return Err(CanvasError::UnknownNode(id));
            }
        }
        if self.edge(edge.source, edge.target).is_some() {
            return Ok(false);
        }
        self.edges.push(edge);
        Ok(true)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: Uuid) -> Option<(GraphNode, Vec<Edge>)> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(index);
        let (removed, kept) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.touches(id));
        self.edges = kept;
        Some((node, removed))
    }

    pub fn remove_edge(&mut self, source: Uuid, target: Uuid) -> Option<Edge> {
        let index = self
            .edges
            .iter()
            .position(|e| e.source == source && e.target == target)?;
        Some(self.edges.remove(index))
    }

    /// Shift every listed node by `(dx, dy)`; unknown ids are ignored
    pub fn move_nodes(&mut self, ids: &[Uuid], dx: f64, dy: f64) -> usize {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let mut moved = 0;
        for node in self.nodes.iter_mut().filter(|n| wanted.contains(&n.id)) {
            node.x += dx;
            node.y += dy;
            moved += 1;
        }
        moved
    }

    /// Topmost node under a scene point; later nodes are drawn on top
    pub fn node_at(&self, p: Position) -> Option<&GraphNode> {
        self.nodes.iter().rev().find(|n| n.rect().contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> (Graph, Uuid, Uuid) {
        let mut graph = Graph::new();
        let a = GraphNode::new(0.0, 0.0);
        let b = GraphNode::new(400.0, 0.0);
        let (ia, ib) = (a.id, b.id);
        graph.insert_node(a);
        graph.insert_node(b);
        (graph, ia, ib)
    }

    #[test]
    fn test_node_defaults() {
        let node = GraphNode::new(10.0, 20.0);
        assert_eq!(node.width(), DEFAULT_NODE_WIDTH);
        assert_eq!(node.height(), DEFAULT_NODE_HEIGHT);
        assert_eq!(node.center(), Position::new(135.0, 52.5));
    }

    #[test]
    fn test_edges_have_set_semantics() {
        let (mut graph, a, b) = two_nodes();
        assert_eq!(graph.insert_edge(Edge::new(a, b)), Ok(true));
        assert_eq!(
            graph.insert_edge(Edge::new(a, b).with_kind(EdgeKind::Suggested)),
            Ok(false)
        );
        assert_eq!(graph.insert_edge(Edge::new(b, a)), Ok(true));
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_edge_validation() {
        let (mut graph, a, _) = two_nodes();
        let stranger = Uuid::new_v4();
        assert_eq!(
            graph.insert_edge(Edge::new(a, a)),
            Err(CanvasError::SelfLoop(a))
        );
        assert_eq!(
            graph.insert_edge(Edge::new(a, stranger)),
            Err(CanvasError::UnknownNode(stranger))
        );
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let (mut graph, a, b) = two_nodes();
        let c = GraphNode::new(0.0, 300.0);
        let ic = c.id;
        graph.insert_node(c);
        graph.insert_edge(Edge::new(a, b)).unwrap();
        graph.insert_edge(Edge::new(ic, a)).unwrap();
        graph.insert_edge(Edge::new(b, ic)).unwrap();

        let (node, removed) = graph.remove_node(a).unwrap();
        assert_eq!(node.id, a);
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.edges(), &[Edge::new(b, ic)]);
        assert!(graph.remove_node(a).is_none());
    }

    #[test]
    fn test_deserialize_dedupes() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let json = serde_json::json!({
            "nodes": [
                { "id": a, "x": 1.0, "y": 2.0 },
                { "id": a, "x": 9.0, "y": 9.0 },
                { "id": b, "x": 3.0, "y": 4.0, "content_type": "Space" }
            ],
            "edges": [
                { "source": a, "target": b },
                { "source": a, "target": b, "type": "undirected" },
                { "source": b, "target": b, "type": "suggested" }
            ]
        });
        let graph: Graph = serde_json::from_value(json).unwrap();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.node(a).unwrap().x, 1.0);
        assert_eq!(graph.edges(), &[Edge::new(a, b)]);

        let out = serde_json::to_value(&graph).unwrap();
        assert_eq!(out["edges"][0]["type"], "directed");
        assert!(out["nodes"][0].get("width").is_none());
    }

    #[test]
    fn test_deserialize_drops_dangling_edges() {
        let a = Uuid::new_v4();
        let json = serde_json::json!({
            "nodes": [{ "id": a, "x": 0.0, "y": 0.0 }],
            "edges": [{ "source": a, "target": Uuid::new_v4() }]
        });
        let graph: Graph = serde_json::from_value(json).unwrap();
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_move_and_hit_test() {
        let (mut graph, a, b) = two_nodes();
        assert_eq!(graph.move_nodes(&[a, b, Uuid::new_v4()], 10.0, -5.0), 2);
        assert_eq!(graph.node(b).unwrap().x, 410.0);
        assert_eq!(graph.node_at(Position::new(20.0, 0.0)).unwrap().id, a);
        assert!(graph.node_at(Position::new(300.0, 0.0)).is_none());
    }
}
