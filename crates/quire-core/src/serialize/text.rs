//! Plain text rendering

use crate::document::Node;

/// Concatenated text of each node, one line per node
pub fn to_plain_text(nodes: &[Node]) -> String {
    nodes.iter().map(Node::string).collect::<Vec<_>>().join("\n")
}
