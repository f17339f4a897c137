//! Node types
//!
//! The JSON shape matches the stored `json_body`: elements carry a `type`
//! and `children`, text runs carry `text` plus optional mark flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a block, used for permalinks and outline bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlockId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for BlockId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Element type tag (`type` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    HeadingFour,
    HeadingFive,
    HeadingSix,
    ListItem,
    ChecklistItem,
    Blockquote,
    Quote,
    Code,
    CodeBlockStart,
    Plaintext,
    CodeBlockEnd,
    Divider,
    Image,
    Video,
    Tweet,
    Date,
    Link,
    NumberedList,
    BulletedList,
    /// Any type this version does not know about
    #[serde(other)]
    Unknown,
}

impl ElementKind {
    /// Every kind, in declaration order
    pub const ALL: [ElementKind; 24] = [
        ElementKind::Paragraph,
        ElementKind::HeadingOne,
        ElementKind::HeadingTwo,
        ElementKind::HeadingThree,
        ElementKind::HeadingFour,
        ElementKind::HeadingFive,
        ElementKind::HeadingSix,
        ElementKind::ListItem,
        ElementKind::ChecklistItem,
        ElementKind::Blockquote,
        ElementKind::Quote,
        ElementKind::Code,
        ElementKind::CodeBlockStart,
        ElementKind::Plaintext,
        ElementKind::CodeBlockEnd,
        ElementKind::Divider,
        ElementKind::Image,
        ElementKind::Video,
        ElementKind::Tweet,
        ElementKind::Date,
        ElementKind::Link,
        ElementKind::NumberedList,
        ElementKind::BulletedList,
        ElementKind::Unknown,
    ];

    /// Kinds that carry an explicit `level`
    pub fn is_list_item(self) -> bool {
        matches!(self, ElementKind::ListItem | ElementKind::ChecklistItem)
    }

    /// Kinds that can sit deeper than level 1 in the outline
    pub fn is_nestable(self) -> bool {
        self.is_list_item() || self == ElementKind::Paragraph
    }

    /// Heading kind for a 1-based heading level
    pub fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(ElementKind::HeadingOne),
            2 => Some(ElementKind::HeadingTwo),
            3 => Some(ElementKind::HeadingThree),
            4 => Some(ElementKind::HeadingFour),
            5 => Some(ElementKind::HeadingFive),
            6 => Some(ElementKind::HeadingSix),
            _ => None,
        }
    }
}

/// A character-level formatting flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

/// Formatting flags of a text run; `None` means unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<bool>,
}

impl Marks {
    /// Whether a mark is set to `true`
    pub fn has(&self, mark: Mark) -> bool {
        self.slot(mark) == Some(true)
    }

    /// Set or unset a mark
    pub fn set(&mut self, mark: Mark, value: Option<bool>) {
        *self.slot_mut(mark) = value;
    }

    /// Whether no mark is set to `true`
    pub fn is_plain(&self) -> bool {
        [
            Mark::Bold,
            Mark::Italic,
            Mark::Underline,
            Mark::Strikethrough,
            Mark::Code,
        ]
        .iter()
        .all(|m| !self.has(*m))
    }

    fn slot(&self, mark: Mark) -> Option<bool> {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
            Mark::Code => self.code,
        }
    }

    fn slot_mut(&mut self, mark: Mark) -> &mut Option<bool> {
        match mark {
            Mark::Bold => &mut self.bold,
            Mark::Italic => &mut self.italic,
            Mark::Underline => &mut self.underline,
            Mark::Strikethrough => &mut self.strikethrough,
            Mark::Code => &mut self.code,
        }
    }
}

/// An inline text run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl Text {
    /// Create an unformatted run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    /// Create a run with a single mark set
    pub fn marked(text: impl Into<String>, mark: Mark) -> Self {
        let mut run = Self::new(text);
        run.marks.set(mark, Some(true));
        run
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A block or inline element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BlockId>,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub children: Vec<Node>,
    /// Nesting depth of list and checklist items (absent means 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(
        default,
        rename = "dateISOString",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_iso_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// `Some(false)` when this block's nested content is collapsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_showing: Option<bool>,
    /// `Some(false)` when hidden under a collapsed toggle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

impl Element {
    /// Create an element holding a single empty text run
    pub fn new(kind: ElementKind) -> Self {
        Self::with_children(kind, vec![Node::Text(Text::default())])
    }

    /// Create an element with the given children
    pub fn with_children(kind: ElementKind, children: Vec<Node>) -> Self {
        Self {
            id: None,
            kind,
            children,
            level: None,
            url: None,
            checked: None,
            date_iso_string: None,
            width: None,
            height: None,
            is_showing: None,
            is_visible: None,
        }
    }

    /// Create a block with a fresh id
    pub fn block(kind: ElementKind) -> Self {
        Self::new(kind).with_id(BlockId::new())
    }

    /// A fresh, empty paragraph with its own id
    pub fn blank() -> Self {
        Self::block(ElementKind::Paragraph)
    }

    /// A paragraph with a fresh id holding `text`
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_children(ElementKind::Paragraph, vec![Node::Text(Text::new(text))])
            .with_id(BlockId::new())
    }

    /// An inline link wrapping `label`
    pub fn link(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_children(ElementKind::Link, vec![Node::Text(Text::new(label))]).with_url(url)
    }

    pub fn with_id(mut self, id: BlockId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Concatenated text of all descendant runs
    pub fn string(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_string(&mut out);
        }
        out
    }

    /// Whether any direct child is a text run
    pub fn has_text_children(&self) -> bool {
        self.children.iter().any(Node::is_text)
    }

    /// Whether this block's nested content is collapsed
    pub fn is_collapsed(&self) -> bool {
        self.is_showing == Some(false)
    }

    /// Whether this block is hidden under a collapsed toggle
    pub fn is_hidden(&self) -> bool {
        self.is_visible == Some(false)
    }
}

/// Any node in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    /// Shorthand for an unformatted text node
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Concatenated text content
    pub fn string(&self) -> String {
        let mut out = String::new();
        self.push_string(&mut out);
        out
    }

    /// Length of the text content in characters
    pub fn char_len(&self) -> usize {
        match self {
            Node::Text(t) => t.len(),
            Node::Element(el) => el.children.iter().map(Node::char_len).sum(),
        }
    }

    fn push_string(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(el) => {
                for child in &el.children {
                    child.push_string(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<Text> for Node {
    fn from(t: Text) -> Self {
        Node::Text(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_kind_wire_names() {
        let json = serde_json::to_string(&ElementKind::HeadingOne).unwrap();
        assert_eq!(json, "\"heading-one\"");
        let json = serde_json::to_string(&ElementKind::CodeBlockStart).unwrap();
        assert_eq!(json, "\"code-block-start\"");

        let kind: ElementKind = serde_json::from_str("\"checklist-item\"").unwrap();
        assert_eq!(kind, ElementKind::ChecklistItem);
    }

    #[test]
    fn test_unknown_kind_loads() {
        let kind: ElementKind = serde_json::from_str("\"kanban-board\"").unwrap();
        assert_eq!(kind, ElementKind::Unknown);
    }

    #[test]
    fn test_block_json_shape() {
        let json = r#"{
            "id": "6f1c2a64-3f0e-4a8e-9a77-2f9b7f0c1d11",
            "type": "checklist-item",
            "checked": true,
            "level": 2,
            "isShowing": false,
            "children": [{ "text": "ship it", "bold": true }]
        }"#;

        let node: Node = serde_json::from_str(json).unwrap();
        let el = node.as_element().unwrap();
        assert_eq!(el.kind, ElementKind::ChecklistItem);
        assert_eq!(el.checked, Some(true));
        assert_eq!(el.level, Some(2));
        assert!(el.is_collapsed());
        assert!(!el.is_hidden());

        let text = el.children[0].as_text().unwrap();
        assert_eq!(text.text, "ship it");
        assert!(text.marks.has(Mark::Bold));
        assert_eq!(text.marks.italic, None);
    }

    #[test]
    fn test_unset_marks_are_omitted() {
        let json = serde_json::to_value(Node::text("plain")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "plain" }));
    }

    #[test]
    fn test_date_field_name() {
        let mut el = Element::new(ElementKind::Date);
        el.date_iso_string = Some("2024-03-01T00:00:00.000Z".to_string());
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["dateISOString"], "2024-03-01T00:00:00.000Z");
    }

    #[test]
    fn test_string_concatenates_inline_content() {
        let el = Element::with_children(
            ElementKind::Paragraph,
            vec![
                Node::text("see "),
                Element::link("https://example.com", "here").into(),
                Node::text("!"),
            ],
        );
        assert_eq!(el.string(), "see here!");
        assert_eq!(Node::Element(el).char_len(), 9);
    }

    #[test]
    fn test_fresh_blocks_get_distinct_ids() {
        let a = Element::blank();
        let b = Element::blank();
        assert!(a.id.is_some());
        assert_ne!(a.id, b.id);
    }
}
