//! HTML rendering and parsing

use scraper::{ElementRef, Html};

use crate::document::tree::normalize_inlines;
use crate::document::{Element, ElementKind, Mark, Node, Schema};
use crate::editor::Pipeline;

/// Escape the five HTML-significant characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render nodes as HTML
///
/// Only quotes, paragraphs, links, list items and the first three heading
/// levels get a tag; every other element contributes just its children.
/// Marks are not rendered.
pub fn to_html(nodes: &[Node]) -> String {
    nodes.iter().map(render).collect()
}

fn render(node: &Node) -> String {
    let el = match node {
        Node::Text(text) => return escape_html(&text.text),
        Node::Element(el) => el,
    };
    let children = to_html(&el.children);
    match el.kind {
        ElementKind::Quote => format!("<blockquote><p>{children}</p></blockquote>"),
        ElementKind::Paragraph => format!("<p>{children}</p>"),
        ElementKind::Link => format!(
            "<a href=\"{}\">{children}</a>",
            escape_html(el.url.as_deref().unwrap_or_default())
        ),
        ElementKind::ListItem => format!("<li>{children}</li>"),
        ElementKind::HeadingOne => format!("<h1>{children}</h1>"),
        ElementKind::HeadingTwo => format!("<h2>{children}</h2>"),
        ElementKind::HeadingThree => format!("<h3>{children}</h3>"),
        _ => children,
    }
}

/// Block or inline element produced by a tag
fn element_for_tag(el: &ElementRef<'_>) -> Option<Element> {
    let kind = match el.value().name() {
        "a" => {
            let url = el.value().attr("href").unwrap_or_default();
            return Some(Element::with_children(ElementKind::Link, Vec::new()).with_url(url));
        }
        "img" => {
            let src = el.value().attr("src").unwrap_or_default();
            return Some(Element::with_children(ElementKind::Image, Vec::new()).with_url(src));
        }
        "blockquote" => ElementKind::Quote,
        "h1" => ElementKind::HeadingOne,
        "h2" => ElementKind::HeadingTwo,
        "h3" => ElementKind::HeadingThree,
        "h4" => ElementKind::HeadingFour,
        "h5" => ElementKind::HeadingFive,
        "h6" => ElementKind::HeadingSix,
        "li" => ElementKind::ListItem,
        "ol" => ElementKind::NumberedList,
        "p" => ElementKind::Paragraph,
        "pre" => ElementKind::Code,
        "ul" => ElementKind::BulletedList,
        _ => return None,
    };
    Some(Element::with_children(kind, Vec::new()))
}

/// Mark applied by a formatting tag
fn mark_for_tag(name: &str) -> Option<Mark> {
    match name {
        "code" => Some(Mark::Code),
        "del" | "s" => Some(Mark::Strikethrough),
        "em" | "i" => Some(Mark::Italic),
        "strong" => Some(Mark::Bold),
        "u" => Some(Mark::Underline),
        _ => None,
    }
}

/// Parse HTML using the standard pipeline's inline kinds
pub fn from_html(html: &str) -> Vec<Node> {
    from_html_with_schema(html, &Pipeline::standard().schema())
}

/// Parse an HTML document or snippet into document nodes
///
/// Tags without a mapping are flattened into their children. The result is
/// a loose fragment: it may mix blocks with bare text runs. `schema` decides
/// which elements count as inline when dropping whitespace between blocks.
pub fn from_html_with_schema(html: &str, schema: &Schema) -> Vec<Node> {
    let parsed = Html::parse_document(html);
    let root = parsed.root_element();
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .unwrap_or(root);
    let nodes = deserialize_children(&body, schema);
    if nodes.iter().any(|n| is_block(n, schema)) {
        nodes.into_iter().filter(|n| !is_blank_text(n)).collect()
    } else {
        nodes
    }
}

fn deserialize_children(el: &ElementRef<'_>, schema: &Schema) -> Vec<Node> {
    let mut parent = *el;
    if el.value().name() == "pre" {
        if let Some(code) = el
            .children()
            .next()
            .and_then(ElementRef::wrap)
            .filter(|c| c.value().name() == "code")
        {
            parent = code;
        }
    }

    let mut out = Vec::new();
    for child in parent.children() {
        match child.value() {
            scraper::Node::Text(text) => out.push(Node::text(&**text)),
            scraper::Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    out.extend(deserialize(&child, schema));
                }
            }
            _ => {}
        }
    }
    out
}

fn deserialize(el: &ElementRef<'_>, schema: &Schema) -> Vec<Node> {
    let name = el.value().name();
    match name {
        "br" => return vec![Node::text("\n")],
        "head" | "script" | "style" => return Vec::new(),
        _ => {}
    }

    let children = deserialize_children(el, schema);

    if let Some(mut element) = element_for_tag(el) {
        element.children = finish(children, schema);
        return vec![element.into()];
    }

    if let Some(mark) = mark_for_tag(name) {
        let mut children = children;
        for child in &mut children {
            apply_mark(child, mark);
        }
        return children;
    }

    children
}

fn apply_mark(node: &mut Node, mark: Mark) {
    match node {
        Node::Text(text) => text.marks.set(mark, Some(true)),
        Node::Element(el) => {
            for child in &mut el.children {
                apply_mark(child, mark);
            }
        }
    }
}

fn is_block(node: &Node, schema: &Schema) -> bool {
    node.as_element().is_some_and(|el| !schema.is_inline(el))
}

fn is_blank_text(node: &Node) -> bool {
    node.as_text().is_some_and(|t| t.text.trim().is_empty())
}

/// Children of a mapped element: whitespace between blocks is dropped, runs
/// of inline content are normalized, and an empty element gets one empty run
fn finish(children: Vec<Node>, schema: &Schema) -> Vec<Node> {
    if children.iter().any(|n| is_block(n, schema)) {
        let kept: Vec<Node> = children.into_iter().filter(|n| !is_blank_text(n)).collect();
        if kept.is_empty() {
            return vec![Node::text("")];
        }
        return kept;
    }
    normalize_inlines(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Text;

    fn kinds(nodes: &[Node]) -> Vec<ElementKind> {
        nodes
            .iter()
            .filter_map(Node::as_element)
            .map(|el| el.kind)
            .collect()
    }

    #[test]
    fn test_render_known_kinds() {
        let nodes: Vec<Node> = vec![
            Element::with_children(ElementKind::HeadingOne, vec![Node::text("Title")]).into(),
            Element::with_children(ElementKind::Quote, vec![Node::text("said")]).into(),
            Element::with_children(
                ElementKind::Paragraph,
                vec![
                    Node::text("go "),
                    Element::link("https://a.test/?x=1&y=\"2\"", "there").into(),
                    Node::text(""),
                ],
            )
            .into(),
            Element::with_children(ElementKind::ListItem, vec![Node::text("item")]).into(),
        ];
        assert_eq!(
            to_html(&nodes),
            "<h1>Title</h1>\
             <blockquote><p>said</p></blockquote>\
             <p>go <a href=\"https://a.test/?x=1&amp;y=&quot;2&quot;\">there</a></p>\
             <li>item</li>"
        );
    }

    #[test]
    fn test_every_kind_renders_its_children() {
        for kind in ElementKind::ALL {
            let node: Node =
                Element::with_children(kind, vec![Node::text("a < b"), Node::text(" & c")]).into();
            let html = to_html(&[node]);
            assert!(html.contains("a &lt; b &amp; c"), "{kind:?} rendered {html}");
        }
    }

    #[test]
    fn test_schema_decides_inline_whitespace() {
        let html = "<div> <a href=\"https://a.test\">l</a> </div>";

        let standard = from_html(html);
        assert_eq!(standard.len(), 3);
        assert!(standard[0].is_text());

        let bare = from_html_with_schema(html, &Schema::new());
        assert_eq!(kinds(&bare), vec![ElementKind::Link]);
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn test_unmapped_kinds_render_children_only() {
        let nodes: Vec<Node> = vec![
            Element::with_children(ElementKind::HeadingFour, vec![Node::text("deep")]).into(),
            Element::with_children(ElementKind::Code, vec![Node::text("a < b")]).into(),
        ];
        assert_eq!(to_html(&nodes), "deepa &lt; b");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn test_parse_blocks() {
        let nodes = from_html(
            "<h2>Title</h2>\n<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>\n<p>body</p>",
        );
        assert_eq!(
            kinds(&nodes),
            vec![
                ElementKind::HeadingTwo,
                ElementKind::BulletedList,
                ElementKind::Paragraph
            ]
        );
        assert_eq!(nodes.len(), 3);
        let list = nodes[1].as_element().unwrap();
        assert_eq!(kinds(&list.children), vec![ElementKind::ListItem; 2]);
        assert_eq!(list.children.len(), 2);
    }

    #[test]
    fn test_parse_marks_and_links() {
        let nodes = from_html(
            "<p>plain <strong>bold <em>both</em></strong> <a href=\"https://x.test\">link</a></p>",
        );
        let p = nodes[0].as_element().unwrap();
        assert_eq!(p.string(), "plain bold both link");

        let texts: Vec<&Text> = p.children.iter().filter_map(Node::as_text).collect();
        let both = texts.iter().find(|t| t.text == "both").unwrap();
        assert!(both.marks.has(Mark::Bold));
        assert!(both.marks.has(Mark::Italic));
        let bold = texts.iter().find(|t| t.text == "bold ").unwrap();
        assert!(bold.marks.has(Mark::Bold));
        assert!(!bold.marks.has(Mark::Italic));

        let link = p
            .children
            .iter()
            .filter_map(Node::as_element)
            .find(|el| el.kind == ElementKind::Link)
            .unwrap();
        assert_eq!(link.url.as_deref(), Some("https://x.test"));
    }

    #[test]
    fn test_parse_pre_code_and_breaks() {
        let nodes = from_html("<pre><code>let x;</code></pre><p>a<br>b</p>");
        let code = nodes[0].as_element().unwrap();
        assert_eq!(code.kind, ElementKind::Code);
        assert_eq!(code.string(), "let x;");
        assert!(code.children[0].as_text().unwrap().marks.is_plain());
        assert_eq!(nodes[1].string(), "a\nb");
    }

    #[test]
    fn test_parse_image_and_unknown_tags() {
        let nodes = from_html("<div><span>loose</span><img src=\"/p.png\"></div>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].string(), "loose");
        let img = nodes[1].as_element().unwrap();
        assert_eq!(img.kind, ElementKind::Image);
        assert_eq!(img.url.as_deref(), Some("/p.png"));
        assert_eq!(img.children, vec![Node::text("")]);
    }

    #[test]
    fn test_scripts_and_styles_are_skipped() {
        let nodes = from_html("<style>p{}</style><p>kept</p><script>x()</script>");
        assert_eq!(kinds(&nodes), vec![ElementKind::Paragraph]);
    }
}
