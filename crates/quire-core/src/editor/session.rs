//! Editing session over one page body

use chrono::{DateTime, Utc};

use crate::document::{Document, Element, Mark, Path, Point, Range};
use crate::editor::plugins::{dates, images, links};
use crate::editor::{DataTransfer, Editor, InputEvent, Outcome, Pipeline};
use crate::error::EditorResult;
use crate::outline;
use crate::serialize;

/// An [`Editor`] driven through a [`Pipeline`]
#[derive(Debug)]
pub struct BlockEditor {
    editor: Editor,
    pipeline: Pipeline,
}

impl BlockEditor {
    /// Edit `document` with the standard pipeline
    pub fn new(document: Document) -> Self {
        Self::with_pipeline(document, Pipeline::standard())
    }

    /// Edit `document` with a custom pipeline
    ///
    /// An empty document gets one blank paragraph. The caret starts at the
    /// beginning of the first block.
    pub fn with_pipeline(mut document: Document, pipeline: Pipeline) -> Self {
        let schema = pipeline.schema();
        if document.blocks(&schema).is_empty() {
            document.children_mut().push(Element::blank().into());
        }
        let mut editor = Editor::new(document, schema);
        let start = editor
            .document()
            .blocks(editor.schema())
            .first()
            .and_then(|first| editor.document().start_of(first).ok());
        if let Some(start) = start {
            editor.set_cursor(start);
        }
        Self { editor, pipeline }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    pub fn into_document(self) -> Document {
        self.editor.into_document()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn select(&mut self, range: Range) {
        self.editor.select(range);
    }

    pub fn set_cursor(&mut self, point: Point) {
        self.editor.set_cursor(point);
    }

    /// Place the caret at the end of the document
    pub fn move_to_end(&mut self) -> EditorResult<()> {
        let last = self.document().blocks(self.editor.schema()).pop();
        if let Some(last) = last {
            let end = self.document().end_of(&last)?;
            self.editor.set_cursor(end);
        }
        Ok(())
    }

    /// Run one event through the pipeline
    pub fn dispatch(&mut self, event: InputEvent) -> EditorResult<Outcome> {
        self.pipeline.dispatch(&mut self.editor, &event)
    }

    /// Insert `text` as a single input event
    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        self.dispatch(InputEvent::InsertText(text.to_string()))?;
        Ok(())
    }

    /// Type `text` one character at a time
    pub fn type_text(&mut self, text: &str) -> EditorResult<()> {
        for ch in text.chars() {
            self.insert_text(ch.encode_utf8(&mut [0; 4]))?;
        }
        Ok(())
    }

    pub fn insert_break(&mut self) -> EditorResult<()> {
        self.dispatch(InputEvent::InsertBreak)?;
        Ok(())
    }

    pub fn delete_backward(&mut self) -> EditorResult<()> {
        self.dispatch(InputEvent::DeleteBackward)?;
        Ok(())
    }

    pub fn insert_data(&mut self, data: DataTransfer) -> EditorResult<()> {
        self.dispatch(InputEvent::InsertData(data))?;
        Ok(())
    }

    pub fn paste_text(&mut self, text: &str) -> EditorResult<()> {
        self.insert_data(DataTransfer::new().with_text(text))
    }

    pub fn paste_html(&mut self, html: &str) -> EditorResult<()> {
        self.insert_data(DataTransfer::new().with_html(html))
    }

    /// Clipboard contents for the current selection
    ///
    /// Empty when the selection is collapsed.
    pub fn copy(&self) -> EditorResult<DataTransfer> {
        let Some(range) = self.editor.selection() else {
            return Ok(DataTransfer::new());
        };
        let nodes = self.editor.fragment(range)?;
        if nodes.is_empty() {
            return Ok(DataTransfer::new());
        }
        DataTransfer::new()
            .with_text(serialize::to_plain_text(&nodes))
            .with_html(serialize::to_html(&nodes))
            .with_fragment(&nodes)
    }

    /// Copy the selection, then delete it
    pub fn cut(&mut self) -> EditorResult<DataTransfer> {
        let data = self.copy()?;
        self.editor.delete_selection()?;
        Ok(data)
    }

    pub fn toggle_mark(&mut self, mark: Mark) -> EditorResult<()> {
        self.editor.toggle_mark(mark)
    }

    /// Link the selection to `url`, or insert a link labelled `label` at the caret
    pub fn insert_link(&mut self, url: &str, label: Option<&str>) -> EditorResult<()> {
        links::wrap_link(&mut self.editor, url, label)
    }

    /// Replace the selection with a date element
    pub fn insert_date(&mut self, date: DateTime<Utc>) -> EditorResult<()> {
        dates::insert_date(&mut self.editor, date)
    }

    pub fn update_date(&mut self, path: &Path, date: DateTime<Utc>) -> EditorResult<()> {
        dates::update_date(&mut self.editor, path, date)
    }

    pub fn resize_image(&mut self, path: &Path, width: f64, height: f64) -> EditorResult<()> {
        images::resize_image(&mut self.editor, path, width, height)
    }

    /// Switch the selected blocks between code and paragraph
    pub fn toggle_code_block(&mut self) -> EditorResult<bool> {
        self.editor.toggle_code_block()
    }

    /// Collapse or expand the content nested under the block at `path`
    ///
    /// Returns the block's new `isShowing` value.
    pub fn toggle_block(&mut self, path: &Path) -> EditorResult<bool> {
        let schema = self.editor.schema().clone();
        outline::toggle(self.editor.document_mut(), &schema, path)
    }

    /// Indent the selected blocks; returns how many blocks moved
    pub fn indent(&mut self) -> EditorResult<usize> {
        outline::indent(&mut self.editor)
    }

    /// Outdent the selected blocks; returns how many blocks moved
    pub fn outdent(&mut self) -> EditorResult<usize> {
        outline::outdent(&mut self.editor)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::document::{BlockId, ElementKind, Node};
    use crate::editor::clipboard;

    #[test]
    fn test_empty_document_gets_paragraph() {
        let editor = BlockEditor::new(Document::default());
        assert_eq!(editor.document().children().len(), 1);
        assert_eq!(
            editor.editor().cursor().unwrap(),
            Point::new(vec![0, 0], 0)
        );
    }

    #[test]
    fn test_copy_produces_all_flavours() {
        let mut editor = BlockEditor::new(Document::new(vec![
            Element::paragraph("alpha").into(),
            Element::paragraph("beta").into(),
        ]));
        editor.select(Range::new(
            Point::new(vec![0, 0], 2),
            Point::new(vec![1, 0], 4),
        ));
        let data = editor.copy().unwrap();
        assert_eq!(data.text(), Some("pha\nbeta"));
        assert_eq!(data.html(), Some("<p>pha</p><p>beta</p>"));
        let nodes = clipboard::decode_fragment(data.fragment().unwrap()).unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_cut_then_paste_round_trip() {
        let mut editor = BlockEditor::new(Document::new(vec![
            Element::paragraph("one").into(),
            Element::with_children(ElementKind::HeadingTwo, vec![Node::text("two")]).into(),
        ]));
        editor.select(Range::new(
            Point::new(vec![0, 0], 0),
            Point::new(vec![1, 0], 3),
        ));
        let data = editor.cut().unwrap();
        assert_eq!(editor.document().children().len(), 1);
        assert_eq!(editor.document().children()[0].string(), "");

        editor.insert_data(data).unwrap();
        let kinds: Vec<ElementKind> = editor
            .document()
            .children()
            .iter()
            .filter_map(Node::as_element)
            .map(|el| el.kind)
            .collect();
        assert_eq!(kinds, vec![ElementKind::Paragraph, ElementKind::HeadingTwo]);
    }

    #[test]
    fn test_copy_then_paste_keeps_ids_unique() {
        let mut editor = BlockEditor::new(Document::new(vec![
            Element::paragraph("alpha").into(),
            Element::paragraph("beta").into(),
        ]));
        editor.select(Range::new(
            Point::new(vec![0, 0], 0),
            Point::new(vec![1, 0], 4),
        ));
        let data = editor.copy().unwrap();
        editor.move_to_end().unwrap();
        editor.insert_data(data).unwrap();

        let doc = editor.document();
        let texts: Vec<String> = doc.children().iter().map(Node::string).collect();
        assert_eq!(texts, vec!["alpha", "beta", "alpha", "beta"]);

        let ids: HashSet<BlockId> = doc
            .children()
            .iter()
            .filter_map(Node::as_element)
            .filter_map(|el| el.id)
            .collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_copy_without_selection_is_empty() {
        let editor = BlockEditor::new(Document::default());
        assert_eq!(editor.copy().unwrap(), DataTransfer::new());
    }

    #[test]
    fn test_insert_link_at_caret_uses_label() {
        let mut editor = BlockEditor::new(Document::new(vec![Element::paragraph("see ").into()]));
        editor.move_to_end().unwrap();
        editor.insert_link("https://docs.rs", Some("docs")).unwrap();

        let block = editor.document().element_at(&Path::new(vec![0])).unwrap();
        let link = block.children[1].as_element().unwrap();
        assert_eq!(link.kind, ElementKind::Link);
        assert_eq!(link.url.as_deref(), Some("https://docs.rs"));
        assert_eq!(link.string(), "docs ");
    }
}
