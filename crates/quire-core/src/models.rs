//! Data models for Quire
//!
//! A [`Page`] is a titled block document; a [`GraphView`] is a titled canvas.
//! Both carry the body the backend stores verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canvas::Graph;
use crate::document::Document;
use crate::serialize::to_plain_text;

/// A page of block content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier
    pub id: Uuid,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// The block tree
    #[serde(default)]
    pub json_body: Document,
    /// Flattened text of `json_body`, kept for search
    #[serde(default)]
    pub text_body: String,
    /// When this page was created
    pub created_at: DateTime<Utc>,
    /// When this page was last updated
    pub updated_at: DateTime<Utc>,
}

/// Fields sent when saving a page
#[derive(Debug, Serialize)]
pub struct PageUpdate<'a> {
    pub title: &'a str,
    pub json_body: &'a Document,
    pub text_body: &'a str,
}

impl Page {
    /// Create an empty page
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Create a page with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            json_body: Document::default(),
            text_body: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    /// Replace the body; the text body is derived from it
    pub fn set_body(&mut self, body: Document) {
        self.text_body = to_plain_text(body.children());
        self.json_body = body;
        self.updated_at = Utc::now();
    }

    /// Re-derive `text_body` from `json_body`
    pub fn refresh_text(&mut self) {
        self.text_body = to_plain_text(self.json_body.children());
    }

    pub fn save_payload(&self) -> PageUpdate<'_> {
        PageUpdate {
            title: &self.title,
            json_body: &self.json_body,
            text_body: &self.text_body,
        }
    }
}

/// A saved canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub graph: Graph,
    pub updated_at: DateTime<Utc>,
}

/// Fields sent when saving a graph view: `{ title, graph: { nodes, edges } }`
#[derive(Debug, Serialize)]
pub struct GraphViewUpdate<'a> {
    pub title: &'a str,
    pub graph: &'a Graph,
}

impl GraphView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            graph: Graph::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn set_graph(&mut self, graph: Graph) {
        self.graph = graph;
        self.touch();
    }

    /// Mark the view as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn save_payload(&self) -> GraphViewUpdate<'_> {
        GraphViewUpdate {
            title: &self.title,
            graph: &self.graph,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Edge, GraphNode};
    use crate::document::Element;

    #[test]
    fn test_new_page() {
        let page = Page::new("Notes");
        assert_eq!(page.title, "Notes");
        assert!(page.json_body.is_empty());
        assert!(page.text_body.is_empty());
        assert_eq!(page.created_at, page.updated_at);
    }

    #[test]
    fn test_set_body_derives_text() {
        let mut page = Page::new("Notes");
        let before = page.updated_at;
        page.set_body(Document::new(vec![
            Element::paragraph("one").into(),
            Element::paragraph("two").into(),
        ]));
        assert_eq!(page.text_body, "one\ntwo");
        assert!(page.updated_at >= before);
    }

    #[test]
    fn test_page_payload_shape() {
        let mut page = Page::new("Notes");
        page.set_body(Document::new(vec![Element::paragraph("hi").into()]));
        let json = serde_json::to_value(page.save_payload()).unwrap();
        assert_eq!(json["title"], "Notes");
        assert_eq!(json["text_body"], "hi");
        assert_eq!(json["json_body"][0]["type"], "paragraph");
        assert_eq!(json["json_body"][0]["children"][0]["text"], "hi");
    }

    #[test]
    fn test_graph_view_payload_shape() {
        let mut view = GraphView::new("Map");
        let mut graph = Graph::new();
        let a = GraphNode::new(0.0, 0.0);
        let b = GraphNode::new(300.0, 0.0);
        let edge = Edge::new(a.id, b.id);
        graph.insert_node(a);
        graph.insert_node(b);
        graph.insert_edge(edge).unwrap();
        view.set_graph(graph);

        let json = serde_json::to_value(view.save_payload()).unwrap();
        assert_eq!(json["title"], "Map");
        assert_eq!(json["graph"]["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["graph"]["edges"][0]["type"], "directed");
    }

    #[test]
    fn test_page_round_trip() {
        let mut page = Page::new("Notes");
        page.set_body(Document::new(vec![Element::paragraph("body").into()]));
        let json = serde_json::to_string(&page).unwrap();
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
    }
}
