//! Node and edge selection

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use uuid::Uuid;

use super::geometry::{Position, Rect};
use super::graph::{edge_key, Edge, Graph, GraphNode, COLLECTION_CONTENT_TYPE};

/// Selected nodes and edges; a click selects one or the other, never both
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasSelection {
    nodes: BTreeSet<Uuid>,
    edges: BTreeSet<String>,
}

impl CanvasSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &BTreeSet<Uuid> {
        &self.nodes
    }

    pub fn edges(&self) -> &BTreeSet<String> {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: Uuid) -> bool {
        self.nodes.contains(&id)
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(&edge.key())
    }

    pub fn select_node(&mut self, id: Uuid) {
        self.nodes = BTreeSet::from([id]);
        self.edges.clear();
    }

    pub fn select_edge(&mut self, source: Uuid, target: Uuid) {
        self.edges = BTreeSet::from([edge_key(source, target)]);
        self.nodes.clear();
    }

    pub fn select_nodes(&mut self, ids: BTreeSet<Uuid>) {
        self.nodes = ids;
        self.edges.clear();
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

/// Nodes whose bounds overlap the rubber band dragged from `start` to `end`
///
/// The drag may run in any of the four diagonal directions. A drag with no
/// width or no height selects nothing.
pub fn multi_select(nodes: &[GraphNode], start: Position, end: Position) -> BTreeSet<Uuid> {
    if start.x == end.x || start.y == end.y {
        return BTreeSet::new();
    }
    let band = Rect::from_corners(start, end);
    nodes
        .iter()
        .filter(|n| n.rect().overlaps(&band))
        .map(|n| n.id)
        .collect()
}

/// What a delete removed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Deletion {
    pub nodes: Vec<Uuid>,
    pub edges: Vec<Edge>,
    /// Explicitly selected edges that were removed, as targets per source
    pub connections: BTreeMap<Uuid, Vec<Uuid>>,
}

/// Remove selected nodes (with their edges) and selected edges
///
/// The selection is cleared afterwards.
pub fn delete_selected(graph: &mut Graph, selection: &mut CanvasSelection) -> Deletion {
    let mut deletion = Deletion::default();

    let selected_edges: Vec<Edge> = graph
        .edges()
        .iter()
        .filter(|e| selection.contains_edge(e))
        .cloned()
        .collect();
    for edge in selected_edges {
        if let Some(edge) = graph.remove_edge(edge.source, edge.target) {
            deletion
                .connections
                .entry(edge.source)
                .or_default()
                .push(edge.target);
            deletion.edges.push(edge);
        }
    }

    for &id in selection.nodes() {
        if let Some((node, edges)) = graph.remove_node(id) {
            deletion.nodes.push(node.id);
            deletion.edges.extend(edges);
        }
    }

    selection.clear();
    deletion
}

/// Selected nodes recorded as members of a collection
///
/// `members` is what the content backend is asked to add; `edges` are the
/// connections drawn from the collection node when it is on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionAddition {
    pub collection: Uuid,
    pub members: Vec<Uuid>,
    pub edges: Vec<Edge>,
}

/// Add the selected nodes to `collection`
///
/// A collection node on the canvas is marked with the collection content
/// type and gets a directed edge to every member it is not yet connected
/// to. The collection never becomes a member of itself. The selection is
/// kept.
pub fn add_to_collection(
    graph: &mut Graph,
    selection: &CanvasSelection,
    collection: Uuid,
) -> CollectionAddition {
    let members: Vec<Uuid> = selection
        .nodes()
        .iter()
        .copied()
        .filter(|id| *id != collection)
        .collect();

    let mut edges = Vec::new();
    if let Some(node) = graph.node_mut(collection) {
        node.content_type = Some(COLLECTION_CONTENT_TYPE.to_string());
        for &member in &members {
            let edge = Edge::new(collection, member);
            if let Ok(true) = graph.insert_edge(edge.clone()) {
                edges.push(edge);
            }
        }
    }

    CollectionAddition {
        collection,
        members,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_at(x: f64, y: f64) -> GraphNode {
        GraphNode::new(x, y)
    }

    // a at (0,0), b at (400,0), c at (0,300), d far away; default 250x65
    fn layout() -> Vec<GraphNode> {
        vec![
            node_at(0.0, 0.0),
            node_at(400.0, 0.0),
            node_at(0.0, 300.0),
            node_at(2000.0, 2000.0),
        ]
    }

    #[test]
    fn test_add_to_collection_connects_members() {
        let mut graph = Graph::new();
        for node in layout() {
            graph.insert_node(node);
        }
        let ids: Vec<Uuid> = graph.nodes().iter().map(|n| n.id).collect();
        let (target, a, b) = (ids[0], ids[1], ids[2]);
        graph.insert_edge(Edge::new(target, a)).unwrap();

        let mut selection = CanvasSelection::new();
        selection.select_nodes(BTreeSet::from([target, a, b]));
        let added = add_to_collection(&mut graph, &selection, target);

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(added.members, expected);
        assert_eq!(added.edges, vec![Edge::new(target, b)]);
        assert_eq!(graph.edges().len(), 2);
        assert_eq!(
            graph.node(target).unwrap().content_type.as_deref(),
            Some(COLLECTION_CONTENT_TYPE)
        );
        assert_eq!(selection.nodes().len(), 3);
    }

    #[test]
    fn test_add_to_collection_off_canvas() {
        let mut graph = Graph::new();
        let node = node_at(0.0, 0.0);
        let id = node.id;
        graph.insert_node(node);
        let mut selection = CanvasSelection::new();
        selection.select_node(id);

        let elsewhere = Uuid::new_v4();
        let added = add_to_collection(&mut graph, &selection, elsewhere);
        assert_eq!(added.members, vec![id]);
        assert!(added.edges.is_empty());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_multi_select_all_directions() {
        let nodes = layout();
        let a = nodes[0].id;
        let b = nodes[1].id;
        let expected = BTreeSet::from([a, b]);

        // band from (100, -20) to (450, 40) in each drag direction
        let corners = [
            (Position::new(100.0, -20.0), Position::new(450.0, 40.0)),
            (Position::new(100.0, 40.0), Position::new(450.0, -20.0)),
            (Position::new(450.0, -20.0), Position::new(100.0, 40.0)),
            (Position::new(450.0, 40.0), Position::new(100.0, -20.0)),
        ];
        for (start, end) in corners {
            assert_eq!(multi_select(&nodes, start, end), expected, "{start:?} -> {end:?}");
        }
    }

    #[test]
    fn test_multi_select_touching_edge_counts() {
        let nodes = layout();
        let picked = multi_select(&nodes, Position::new(250.0, 65.0), Position::new(260.0, 80.0));
        assert_eq!(picked, BTreeSet::from([nodes[0].id]));
    }

    #[test]
    fn test_multi_select_misses_and_degenerate() {
        let nodes = layout();
        assert!(multi_select(&nodes, Position::new(260.0, 100.0), Position::new(390.0, 200.0))
            .is_empty());
        assert!(multi_select(&nodes, Position::new(10.0, 10.0), Position::new(10.0, 50.0))
            .is_empty());
    }

    #[test]
    fn test_clicks_are_exclusive() {
        let mut selection = CanvasSelection::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        selection.select_node(a);
        selection.select_edge(a, b);
        assert!(selection.nodes().is_empty());
        assert!(selection.contains_edge(&Edge::new(a, b)));
        selection.select_node(b);
        assert!(selection.edges().is_empty());
        assert!(selection.contains_node(b));
    }

    #[test]
    fn test_delete_selected() {
        let mut graph = Graph::new();
        let nodes = layout();
        let ids: Vec<Uuid> = nodes.iter().map(|n| n.id).collect();
        for node in nodes {
            graph.insert_node(node);
        }
        graph.insert_edge(Edge::new(ids[0], ids[1])).unwrap();
        graph.insert_edge(Edge::new(ids[0], ids[2])).unwrap();
        graph.insert_edge(Edge::new(ids[2], ids[3])).unwrap();
        graph.insert_edge(Edge::new(ids[1], ids[2])).unwrap();

        let mut selection = CanvasSelection::new();
        selection.select_edge(ids[0], ids[2]);
        let deletion = delete_selected(&mut graph, &mut selection);
        assert_eq!(deletion.connections, BTreeMap::from([(ids[0], vec![ids[2]])]));
        assert!(deletion.nodes.is_empty());

        selection.select_node(ids[3]);
        let deletion = delete_selected(&mut graph, &mut selection);
        assert_eq!(deletion.nodes, vec![ids[3]]);
        assert_eq!(deletion.edges, vec![Edge::new(ids[2], ids[3])]);
        assert!(deletion.connections.is_empty());

        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.edges().len(), 2);
        assert!(selection.is_empty());
    }
}
