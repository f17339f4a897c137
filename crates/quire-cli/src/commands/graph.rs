//! Graph view command handlers

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

use quire_core::canvas::{Axis, Canvas, Edge, EdgeKind, Graph, GraphNode, Position};
use quire_core::{Config, GraphView, PageStore};

use super::resolve_id;
use crate::output::Output;
use crate::EdgeKindArg;

impl From<EdgeKindArg> for EdgeKind {
    fn from(kind: EdgeKindArg) -> Self {
        match kind {
            EdgeKindArg::Directed => EdgeKind::Directed,
            EdgeKindArg::Undirected => EdgeKind::Undirected,
            EdgeKindArg::Suggested => EdgeKind::Suggested,
        }
    }
}

/// Find a graph view by full id or unique prefix
pub fn find_graph_view(store: &PageStore, key: &str) -> Result<GraphView> {
    let views = store
        .list_graph_views()
        .context("Failed to list graph views")?;
    resolve_id(key, "graph view", views, |v| v.id, |v| v.title.clone())
}

/// Find a node on a graph by full id or unique prefix
fn find_node(graph: &Graph, key: &str) -> Result<Uuid> {
    let nodes: Vec<&GraphNode> = graph.nodes().iter().collect();
    let node = resolve_id(
        key,
        "node",
        nodes,
        |n| n.id,
        |n| format!("({:.1}, {:.1})", n.x, n.y),
    )?;
    Ok(node.id)
}

fn open_canvas(view: &mut GraphView, config: &Config) -> Canvas {
    Canvas::new(std::mem::take(&mut view.graph), config.canvas.viewport())
}

fn save(store: &PageStore, view: &mut GraphView, graph: Graph) -> Result<()> {
    view.set_graph(graph);
    store
        .save_graph_view(view)
        .context("Failed to save graph view")
}

fn short(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub fn create(store: &PageStore, title: String, output: &Output) -> Result<()> {
    let mut view = GraphView::new(title);
    store
        .save_graph_view(&mut view)
        .context("Failed to save graph view")?;

    if output.is_quiet() {
        println!("{}", view.id);
    } else {
        output.success(&format!("Created graph view {}", short(view.id)));
    }
    Ok(())
}

pub fn list(store: &PageStore, output: &Output) -> Result<()> {
    let views = store
        .list_graph_views()
        .context("Failed to list graph views")?;
    output.print_graph_views(&views);
    Ok(())
}

pub fn show(store: &PageStore, config: &Config, key: &str, output: &Output) -> Result<()> {
    let view = find_graph_view(store, key)?;
    let canvas = Canvas::new(view.graph.clone(), config.canvas.viewport());
    output.print_graph_view(&view, &canvas);
    Ok(())
}

/// Add a node at a scene position
pub fn add_node(store: &PageStore, key: &str, x: f64, y: f64, output: &Output) -> Result<()> {
    let mut view = find_graph_view(store, key)?;
    let node = GraphNode::new(x, y);
    let id = node.id;

    let mut graph = std::mem::take(&mut view.graph);
    graph.insert_node(node);
    save(store, &mut view, graph)?;

    if output.is_quiet() {
        println!("{}", id);
    } else {
        output.success(&format!("Added node {} at ({:.1}, {:.1})", short(id), x, y));
    }
    Ok(())
}

pub fn connect(
    store: &PageStore,
    key: &str,
    source: &str,
    target: &str,
    kind: EdgeKindArg,
    output: &Output,
) -> Result<()> {
    let mut view = find_graph_view(store, key)?;
    let source = find_node(&view.graph, source)?;
    let target = find_node(&view.graph, target)?;

    let mut graph = std::mem::take(&mut view.graph);
    let edge = Edge::new(source, target).with_kind(kind.into());
    let added = graph.insert_edge(edge)?;
    save(store, &mut view, graph)?;

    if added {
        output.success(&format!("Connected {} -> {}", short(source), short(target)));
    } else {
        output.message(&format!(
            "{} and {} are already connected",
            short(source),
            short(target)
        ));
    }
    Ok(())
}

/// Line up the given nodes, or every node when none are named
pub fn line_up(
    store: &PageStore,
    config: &Config,
    key: &str,
    axis: Axis,
    nodes: &[String],
    output: &Output,
) -> Result<()> {
    let mut view = find_graph_view(store, key)?;
    let ids: Vec<Uuid> = if nodes.is_empty() {
        view.graph.nodes().iter().map(|n| n.id).collect()
    } else {
        nodes
            .iter()
            .map(|n| find_node(&view.graph, n))
            .collect::<Result<_>>()?
    };

    let mut canvas = open_canvas(&mut view, config);
    canvas.select_nodes(ids)?;
    let moved = canvas.line_up(axis);
    save(store, &mut view, canvas.into_graph())?;

    output.success(&format!("Lined up {} node(s)", moved));
    Ok(())
}

#[derive(Debug, Serialize)]
struct AreaSelection {
    nodes: Vec<Uuid>,
}

/// Report which nodes a rubber band between two scene points selects
pub fn select(
    store: &PageStore,
    config: &Config,
    key: &str,
    start: (f64, f64),
    end: (f64, f64),
    output: &Output,
) -> Result<()> {
    let mut view = find_graph_view(store, key)?;
    let mut canvas = open_canvas(&mut view, config);
    canvas.select_area(Position::new(start.0, start.1), Position::new(end.0, end.1));

    let picked = AreaSelection {
        nodes: canvas.selection().nodes().iter().copied().collect(),
    };
    if output.is_quiet() {
        for id in &picked.nodes {
            println!("{}", id);
        }
        return Ok(());
    }
    let human = if picked.nodes.is_empty() {
        "No nodes in that area.".to_string()
    } else {
        picked
            .nodes
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    };
    output.print_value(&picked, &human);
    Ok(())
}

/// Remove nodes along with every edge touching them
pub fn remove(
    store: &PageStore,
    config: &Config,
    key: &str,
    nodes: &[String],
    output: &Output,
) -> Result<()> {
    let mut view = find_graph_view(store, key)?;
    let ids = nodes
        .iter()
        .map(|n| find_node(&view.graph, n))
        .collect::<Result<Vec<_>>>()?;

    let mut canvas = open_canvas(&mut view, config);
    canvas.select_nodes(ids)?;
    let deletion = canvas.delete_selected();
    save(store, &mut view, canvas.into_graph())?;

    output.print_value(
        &deletion,
        &format!(
            "✓ Removed {} node(s) and {} edge(s)",
            deletion.nodes.len(),
            deletion.edges.len()
        ),
    );
    Ok(())
}

/// Add nodes to a collection node on the same graph view
pub fn collect(
    store: &PageStore,
    config: &Config,
    key: &str,
    collection: &str,
    nodes: &[String],
    output: &Output,
) -> Result<()> {
    let mut view = find_graph_view(store, key)?;
    let target = find_node(&view.graph, collection)?;
    let ids = nodes
        .iter()
        .map(|n| find_node(&view.graph, n))
        .collect::<Result<Vec<_>>>()?;

    let mut canvas = open_canvas(&mut view, config);
    canvas.select_nodes(ids)?;
    let addition = canvas.add_to_collection(target);
    save(store, &mut view, canvas.into_graph())?;

    output.print_value(
        &addition,
        &format!(
            "✓ Added {} node(s) to collection {}",
            addition.members.len(),
            short(target)
        ),
    );
    Ok(())
}

pub fn delete(store: &PageStore, key: &str, output: &Output) -> Result<()> {
    let view = find_graph_view(store, key)?;
    store
        .delete_graph_view(view.id)
        .context("Failed to delete graph view")?;
    output.success(&format!("Deleted graph view: {}", view.title));
    Ok(())
}
