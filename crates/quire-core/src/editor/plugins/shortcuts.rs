//! Markdown-style shortcuts
//!
//! Typing a token such as `#` or `-` followed by a space at the start of a
//! block retypes the block. On enter, `____` makes a divider and a code
//! fence inserts a code section. Enter on a collapsed toggle adds a block
//! after its hidden content instead of splitting it.

use tracing::debug;

use crate::document::{level_of, BlockId, Element, ElementKind, Node, Path, Range};
use crate::editor::{Editor, InputEvent, Outcome, Plugin};
use crate::error::EditorResult;
use crate::outline;

/// Tokens recognised before a typed space
pub const SHORTCUTS: &[(&str, ElementKind)] = &[
    ("#", ElementKind::HeadingOne),
    ("##", ElementKind::HeadingTwo),
    ("###", ElementKind::HeadingThree),
    ("-", ElementKind::ListItem),
    ("*", ElementKind::ListItem),
    ("[]", ElementKind::ChecklistItem),
    ("\"", ElementKind::Blockquote),
];

/// Tokens recognised before a break
pub const SHORTCUTS_ENTER: &[(&str, ElementKind)] = &[("____", ElementKind::Divider)];

pub const CODE_FENCE: &str = "```";

/// Block kind for a space shortcut token
pub fn shortcut_for(token: &str) -> Option<ElementKind> {
    lookup(SHORTCUTS, token)
}

fn lookup(table: &[(&str, ElementKind)], token: &str) -> Option<ElementKind> {
    table
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, kind)| *kind)
}

pub struct Shortcuts;

impl Plugin for Shortcuts {
    fn name(&self) -> &'static str {
        "shortcuts"
    }

    fn handle(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<Outcome> {
        if !editor.is_collapsed() {
            return Ok(Outcome::NotHandled);
        }
        match event {
            InputEvent::InsertText(text) if text == " " => expand(editor),
            InputEvent::InsertBreak => on_break(editor),
            InputEvent::DeleteBackward => on_delete_backward(editor),
            _ => Ok(Outcome::NotHandled),
        }
    }

    fn after(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<()> {
        if *event != InputEvent::InsertBreak {
            return Ok(());
        }
        let (_, block) = editor.current_block()?;
        if block.kind == ElementKind::Plaintext {
            return Ok(());
        }
        remove_formatting(editor)
    }
}

fn delete_before_cursor(editor: &mut Editor) -> EditorResult<()> {
    let cursor = editor.cursor()?;
    let start = editor.document().start_of(&editor.block_of(&cursor)?)?;
    editor.delete_range(&Range::new(start, cursor))
}

fn expand(editor: &mut Editor) -> EditorResult<Outcome> {
    let before = editor.text_before_cursor()?;
    let Some(kind) = shortcut_for(before.trim()) else {
        return Ok(Outcome::NotHandled);
    };
    debug!(?kind, token = before.trim(), "Expanding block shortcut");
    delete_before_cursor(editor)?;
    editor.set_block_kind(kind)?;
    Ok(Outcome::Handled)
}

fn on_break(editor: &mut Editor) -> EditorResult<Outcome> {
    let before = editor.text_before_cursor()?;

    if let Some(kind) = lookup(SHORTCUTS_ENTER, &before) {
        debug!(?kind, "Expanding enter shortcut");
        delete_before_cursor(editor)?;
        editor.set_block_kind(kind)?;
        return Ok(Outcome::Handled);
    }

    if before == CODE_FENCE {
        debug!("Inserting code section");
        delete_before_cursor(editor)?;
        insert_code_section(editor)?;
        return Ok(Outcome::Handled);
    }

    let (block, el) = editor.current_block()?;
    if el.is_collapsed() {
        insert_after_toggle(editor, &block)?;
        return Ok(Outcome::Handled);
    }
    Ok(Outcome::NotHandled)
}

fn fenced(kind: ElementKind, text: &str) -> Node {
    Element::with_children(kind, vec![Node::text(text)])
        .with_id(BlockId::new())
        .into()
}

/// Insert a start sentinel, a plaintext body and an end sentinel, leaving
/// the caret at the end of the body
fn insert_code_section(editor: &mut Editor) -> EditorResult<()> {
    let body = fenced(ElementKind::Plaintext, "code");
    let body_id = body.as_element().and_then(|el| el.id);
    editor.insert_blocks(vec![
        fenced(ElementKind::CodeBlockStart, "---"),
        body,
        fenced(ElementKind::CodeBlockEnd, "---"),
    ])?;
    if let Some(path) = body_id.and_then(|id| editor.document().path_of(&id)) {
        let end = editor.document().end_of(&path)?;
        editor.set_cursor(end);
    }
    Ok(())
}

/// Add an empty paragraph after the last block nested under `toggle`
fn insert_after_toggle(editor: &mut Editor, toggle: &Path) -> EditorResult<()> {
    let document = editor.document();
    let schema = editor.schema();
    let level = level_of(document.element_at(toggle)?);

    let mut last = toggle.clone();
    while let Some((next, el)) = document.next_block(&last, schema) {
        if level_of(el) <= level {
            break;
        }
        last = next;
    }

    // insert as a sibling of the toggle, past any container holding the
    // last nested block
    let at = if last.len() >= toggle.len() {
        Path::from(&last.as_slice()[..toggle.len()]).next()
    } else {
        last.next()
    };
    debug!(%toggle, %at, "Inserting block after collapsed toggle");

    editor
        .document_mut()
        .insert_node(&at, Element::blank().into())?;
    let start = editor.document().start_of(&at)?;
    editor.set_cursor(start);
    Ok(())
}

fn on_delete_backward(editor: &mut Editor) -> EditorResult<Outcome> {
    if !editor.at_block_start()? {
        return Ok(Outcome::NotHandled);
    }
    let (block, el) = editor.current_block()?;
    let kind = el.kind;

    let hidden = editor
        .document()
        .previous_block(&block, editor.schema())
        .filter(|(_, prev)| prev.is_hidden())
        .map(|(path, _)| path);
    if let Some(previous) = hidden {
        // the first backspace only expands; the next one merges as usual
        debug!(%previous, "Backspace into collapsed content, expanding it");
        let schema = editor.schema().clone();
        outline::reveal(editor.document_mut(), &schema, &previous)?;
        return Ok(Outcome::Handled);
    }

    if kind != ElementKind::Paragraph {
        editor.set_block_kind(ElementKind::Paragraph)?;
        return Ok(Outcome::Handled);
    }
    Ok(Outcome::NotHandled)
}

/// Reset the block created by a break: plain marks, paragraph type (list
/// items keep theirs), checklist items unchecked
fn remove_formatting(editor: &mut Editor) -> EditorResult<()> {
    editor.clear_formatting()?;
    editor.set_block(|el| {
        if !el.kind.is_list_item() {
            el.kind = ElementKind::Paragraph;
        }
        if el.kind == ElementKind::ChecklistItem {
            el.checked = Some(false);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Mark, Point, Text};
    use crate::editor::plugins::test_support::{editor_with, kinds};
    use crate::editor::BlockEditor;

    fn first_string(editor: &BlockEditor) -> String {
        editor.document().children()[0].string()
    }

    #[test]
    fn test_heading_shortcut() {
        let mut editor = editor_with(&[""]);
        editor.type_text("# ").unwrap();
        assert_eq!(kinds(&editor), vec![ElementKind::HeadingOne]);
        assert_eq!(first_string(&editor), "");

        editor.type_text("Title").unwrap();
        assert_eq!(first_string(&editor), "Title");
    }

    #[test]
    fn test_list_and_checklist_shortcuts() {
        for (token, kind) in [
            ("- ", ElementKind::ListItem),
            ("* ", ElementKind::ListItem),
            ("[] ", ElementKind::ChecklistItem),
            ("## ", ElementKind::HeadingTwo),
            ("### ", ElementKind::HeadingThree),
            ("\" ", ElementKind::Blockquote),
        ] {
            let mut editor = editor_with(&[""]);
            editor.type_text(token).unwrap();
            assert_eq!(kinds(&editor), vec![kind], "token {token:?}");
            assert_eq!(first_string(&editor), "");
        }
    }

    #[test]
    fn test_unknown_token_is_typed() {
        let mut editor = editor_with(&[""]);
        editor.type_text("#### x").unwrap();
        assert_eq!(kinds(&editor), vec![ElementKind::Paragraph]);
        assert_eq!(first_string(&editor), "#### x");
    }

    #[test]
    fn test_divider_on_enter() {
        let mut editor = editor_with(&["____"]);
        editor.insert_break().unwrap();
        assert_eq!(kinds(&editor), vec![ElementKind::Divider]);
        assert_eq!(first_string(&editor), "");
    }

    #[test]
    fn test_code_fence_on_enter() {
        let mut editor = editor_with(&["```"]);
        editor.insert_break().unwrap();
        assert_eq!(
            kinds(&editor),
            vec![
                ElementKind::Paragraph,
                ElementKind::CodeBlockStart,
                ElementKind::Plaintext,
                ElementKind::CodeBlockEnd
            ]
        );
        assert_eq!(editor.editor().cursor().unwrap(), Point::new(vec![2, 0], 4));
    }

    #[test]
    fn test_break_in_plaintext_keeps_type() {
        let doc = Document::new(vec![Element::with_children(
            ElementKind::Plaintext,
            vec![Node::text("let x = 1;")],
        )
        .into()]);
        let mut editor = BlockEditor::new(doc);
        editor.set_cursor(Point::new(vec![0, 0], 10));
        editor.insert_break().unwrap();
        assert_eq!(
            kinds(&editor),
            vec![ElementKind::Plaintext, ElementKind::Plaintext]
        );
    }

    #[test]
    fn test_break_after_heading_resets_block() {
        let doc = Document::new(vec![Element::with_children(
            ElementKind::HeadingOne,
            vec![Node::Text(Text::marked("Title", Mark::Bold))],
        )
        .into()]);
        let mut editor = BlockEditor::new(doc);
        editor.set_cursor(Point::new(vec![0, 0], 5));
        editor.insert_break().unwrap();
        editor.insert_text("body").unwrap();

        assert_eq!(
            kinds(&editor),
            vec![ElementKind::HeadingOne, ElementKind::Paragraph]
        );
        let body = editor.document().element_at(&Path::new(vec![1])).unwrap();
        assert!(body.children[0].as_text().unwrap().marks.is_plain());
    }

    #[test]
    fn test_break_in_checklist_unchecks() {
        let mut item = Element::paragraph("done");
        item.kind = ElementKind::ChecklistItem;
        item.checked = Some(true);
        let mut editor = BlockEditor::new(Document::new(vec![item.into()]));
        editor.set_cursor(Point::new(vec![0, 0], 4));
        editor.insert_break().unwrap();

        let next = editor.document().element_at(&Path::new(vec![1])).unwrap();
        assert_eq!(next.kind, ElementKind::ChecklistItem);
        assert_eq!(next.checked, Some(false));
    }

    #[test]
    fn test_backspace_demotes_block() {
        let mut editor = editor_with(&[""]);
        editor.type_text("- ").unwrap();
        editor.delete_backward().unwrap();
        assert_eq!(kinds(&editor), vec![ElementKind::Paragraph]);
    }

    fn toggle_doc() -> Document {
        let item = |text: &str, level| {
            let mut el = Element::paragraph(text);
            el.kind = ElementKind::ListItem;
            el.level = Some(level);
            Node::from(el)
        };
        let mut toggle = Element::paragraph("toggle");
        toggle.is_showing = Some(false);
        let mut hidden = vec![item("a", 2), item("b", 2)];
        for node in &mut hidden {
            if let Some(el) = node.as_element_mut() {
                el.is_visible = Some(false);
            }
        }
        let mut children = vec![toggle.into()];
        children.extend(hidden);
        children.push(Element::paragraph("after").into());
        Document::new(children)
    }

    #[test]
    fn test_enter_on_collapsed_toggle_skips_hidden_blocks() {
        let mut editor = BlockEditor::new(toggle_doc());
        editor.set_cursor(Point::new(vec![0, 0], 3));
        editor.insert_break().unwrap();

        let texts: Vec<String> = editor
            .document()
            .children()
            .iter()
            .map(Node::string)
            .collect();
        assert_eq!(texts, vec!["toggle", "a", "b", "", "after"]);
        assert_eq!(editor.editor().cursor().unwrap(), Point::new(vec![3, 0], 0));
    }

    #[test]
    fn test_enter_on_collapsed_toggle_at_end_of_document() {
        let mut doc = toggle_doc();
        doc.remove_node(&Path::new(vec![3])).unwrap();
        let mut editor = BlockEditor::new(doc);
        editor.set_cursor(Point::new(vec![0, 0], 6));
        editor.insert_break().unwrap();

        assert_eq!(editor.document().children().len(), 4);
        assert_eq!(editor.document().children()[3].string(), "");
    }

    #[test]
    fn test_backspace_into_hidden_block_expands_toggle() {
        let mut editor = BlockEditor::new(toggle_doc());
        editor.set_cursor(Point::new(vec![3, 0], 0));
        editor.delete_backward().unwrap();

        let doc = editor.document();
        assert!(!doc.element_at(&Path::new(vec![0])).unwrap().is_collapsed());
        assert!(!doc.element_at(&Path::new(vec![1])).unwrap().is_hidden());
        assert!(!doc.element_at(&Path::new(vec![2])).unwrap().is_hidden());
        assert_eq!(doc.children().len(), 4);
    }

    #[test]
    fn test_second_backspace_merges_into_revealed_block() {
        let mut editor = BlockEditor::new(toggle_doc());
        editor.set_cursor(Point::new(vec![3, 0], 0));
        editor.delete_backward().unwrap();
        editor.delete_backward().unwrap();

        let texts: Vec<String> = editor
            .document()
            .children()
            .iter()
            .map(Node::string)
            .collect();
        assert_eq!(texts, vec!["toggle", "a", "bafter"]);
        assert_eq!(editor.editor().cursor().unwrap(), Point::new(vec![2, 0], 1));
    }
}
