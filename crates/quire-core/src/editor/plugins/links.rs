//! Link stage
//!
//! Links and dates flow inline. A URL typed or pasted as plain text becomes
//! a link element instead of bare text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::document::{Element, ElementKind};
use crate::editor::{Editor, InputEvent, Outcome, Plugin};
use crate::error::EditorResult;

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\w+:)?//([^\s.]+\.\S{2}|localhost[:?\d]*)\S*$").expect("valid URL pattern")
});

/// Whether `text` is a single absolute or protocol-relative URL
pub fn is_url(text: &str) -> bool {
    URL.is_match(text)
}

pub struct Links;

impl Plugin for Links {
    fn name(&self) -> &'static str {
        "links"
    }

    fn is_inline(&self, kind: ElementKind) -> bool {
        matches!(kind, ElementKind::Link | ElementKind::Date)
    }

    fn handle(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<Outcome> {
        let url = match event {
            InputEvent::InsertText(text) => text.as_str(),
            InputEvent::InsertData(data) => data.text().unwrap_or_default(),
            _ => return Ok(Outcome::NotHandled),
        };
        if !is_url(url) {
            return Ok(Outcome::NotHandled);
        }
        debug!(url, "Wrapping URL in link");
        wrap_link(editor, url, None)?;
        Ok(Outcome::Handled)
    }
}

/// Turn the selection into a link to `url`
///
/// Any link already under the selection is unwrapped first. With a caret a
/// new link labelled `label` (or the URL) is inserted; otherwise the
/// selected content is wrapped.
pub fn wrap_link(editor: &mut Editor, url: &str, label: Option<&str>) -> EditorResult<()> {
    if editor.is_inline_active(ElementKind::Link) {
        editor.unwrap_inline(ElementKind::Link)?;
    }

    if editor.is_collapsed() {
        let label = format!("{} ", label.unwrap_or(url));
        return editor.insert_inline(Element::link(url, label));
    }
    editor.wrap_inline(Element::link(url, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Node, Path, Point, Range};
    use crate::editor::plugins::test_support::editor_with;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com"));
        assert!(is_url("http://localhost:8000/page"));
        assert!(is_url("//cdn.example.org/x.js"));
        assert!(!is_url("example.com"));
        assert!(!is_url("https://example.com has spaces"));
        assert!(!is_url("hello"));
    }

    #[test]
    fn test_typed_url_becomes_link() {
        let mut editor = editor_with(&[""]);
        editor.insert_text("https://example.com").unwrap();

        let block = editor.document().element_at(&Path::new(vec![0])).unwrap();
        let links: Vec<&Element> = block
            .children
            .iter()
            .filter_map(Node::as_element)
            .filter(|el| el.kind == ElementKind::Link)
            .collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url.as_deref(), Some("https://example.com"));
        assert_eq!(links[0].string().trim_end(), "https://example.com");
    }

    #[test]
    fn test_plain_text_is_not_linked() {
        let mut editor = editor_with(&[""]);
        editor.insert_text("example").unwrap();
        let block = editor.document().element_at(&Path::new(vec![0])).unwrap();
        assert!(block.children.iter().all(Node::is_text));
    }

    #[test]
    fn test_pasted_url_over_selection_wraps_it() {
        let mut editor = editor_with(&["read the docs"]);
        editor.select(Range::new(
            Point::new(vec![0, 0], 9),
            Point::new(vec![0, 0], 13),
        ));
        editor.paste_text("https://docs.rs").unwrap();

        let block = editor.document().element_at(&Path::new(vec![0])).unwrap();
        assert_eq!(block.string(), "read the docs");
        let link = block.children[1].as_element().unwrap();
        assert_eq!(link.url.as_deref(), Some("https://docs.rs"));
        assert_eq!(link.string(), "docs");
    }

    #[test]
    fn test_relinking_replaces_existing_link() {
        let mut editor = editor_with(&["docs"]);
        editor.select(Range::new(
            Point::new(vec![0, 0], 0),
            Point::new(vec![0, 0], 4),
        ));
        editor.paste_text("https://old.example.com").unwrap();
        editor.select(Range::new(
            Point::new(vec![0, 1, 0], 0),
            Point::new(vec![0, 1, 0], 4),
        ));
        editor.paste_text("https://new.example.com").unwrap();

        let block = editor.document().element_at(&Path::new(vec![0])).unwrap();
        let urls: Vec<&str> = block
            .children
            .iter()
            .filter_map(Node::as_element)
            .filter_map(|el| el.url.as_deref())
            .collect();
        assert_eq!(urls, vec!["https://new.example.com"]);
    }
}
