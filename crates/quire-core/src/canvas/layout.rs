//! Line-up layout for selected nodes

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::graph::Graph;

/// A computed step below the minimum is replaced by the fallback
const MIN_X_INTERVAL: f64 = 100.0;
const FALLBACK_X_INTERVAL: f64 = 150.0;
const MIN_Y_INTERVAL: f64 = 50.0;
const FALLBACK_Y_INTERVAL: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Spread the listed nodes evenly along `axis`
///
/// Nodes keep their order along the axis and start from the smallest
/// coordinate. The step is the current span divided evenly; a step under the
/// axis minimum is replaced by the fallback spacing. On the other axis every
/// node moves to the average position. Returns how many nodes moved.
pub fn line_up(graph: &mut Graph, ids: &BTreeSet<Uuid>, axis: Axis) -> usize {
    let mut placed: Vec<(Uuid, f64, f64)> = graph
        .nodes()
        .iter()
        .filter(|n| ids.contains(&n.id))
        .map(|n| match axis {
            Axis::Horizontal => (n.id, n.x, n.y),
            Axis::Vertical => (n.id, n.y, n.x),
        })
        .collect();
    if placed.is_empty() {
        return 0;
    }
    placed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let count = placed.len();
    let first = placed[0].1;
    let last = placed[count - 1].1;
    let across = placed.iter().map(|p| p.2).sum::<f64>() / count as f64;

    let (min, fallback) = match axis {
        Axis::Horizontal => (MIN_X_INTERVAL, FALLBACK_X_INTERVAL),
        Axis::Vertical => (MIN_Y_INTERVAL, FALLBACK_Y_INTERVAL),
    };
    let mut interval = if count > 1 {
        (last - first) / (count - 1) as f64
    } else {
        0.0
    };
    if interval < min {
        interval = fallback;
    }

    for (index, (id, _, _)) in placed.iter().enumerate() {
        let along = first + interval * index as f64;
        if let Some(node) = graph.node_mut(*id) {
            match axis {
                Axis::Horizontal => {
                    node.x = along;
                    node.y = across;
                }
                Axis::Vertical => {
                    node.x = across;
                    node.y = along;
                }
            }
        }
    }
    count
}
