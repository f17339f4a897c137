//! Embed stage
//!
//! Videos are void blocks. A pasted YouTube watch, embed or short link
//! becomes a video block pointing at the embeddable player URL.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::document::{BlockId, Element, ElementKind, Path};
use crate::editor::{Editor, InputEvent, Outcome, Plugin};
use crate::error::{EditorError, EditorResult};

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:\S*&)?v=|embed/)|youtu\.be/)([\w-]{6,})",
    )
    .expect("valid YouTube pattern")
});

/// Player URL for a YouTube link
pub fn embed_url(text: &str) -> Option<String> {
    let caps = YOUTUBE.captures(text.trim())?;
    Some(format!("https://www.youtube.com/embed/{}", &caps[1]))
}

pub struct Embeds;

impl Plugin for Embeds {
    fn name(&self) -> &'static str {
        "embeds"
    }

    fn is_void(&self, kind: ElementKind) -> bool {
        kind == ElementKind::Video
    }

    fn handle(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<Outcome> {
        let InputEvent::InsertData(data) = event else {
            return Ok(Outcome::NotHandled);
        };
        let Some(url) = data.text().and_then(embed_url) else {
            return Ok(Outcome::NotHandled);
        };
        debug!(%url, "Embedding video");
        insert_video(editor, &url)?;
        Ok(Outcome::Handled)
    }
}

/// Insert a video block with an empty paragraph after it, and one before it
/// if it would otherwise open its container
pub fn insert_video(editor: &mut Editor, url: &str) -> EditorResult<()> {
    let video = Element::block(ElementKind::Video).with_url(url);
    let trailing = Element::blank();
    let (video_id, trailing_id) = (video.id, trailing.id);
    editor.insert_blocks(vec![video.into(), trailing.into()])?;

    let find = |editor: &Editor, id: Option<BlockId>| {
        id.and_then(|id| editor.document().path_of(&id))
            .ok_or_else(|| EditorError::NotFound(Path::root()))
    };
    let path = find(editor, video_id)?;
    if path.last() == Some(0) {
        editor
            .document_mut()
            .insert_node(&path, Element::blank().into())?;
        let end = editor.document().end_of(&find(editor, trailing_id)?)?;
        editor.set_cursor(end);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Point};
    use crate::editor::plugins::test_support::{editor_with, kinds};
    use crate::editor::BlockEditor;

    #[test]
    fn test_embed_url_forms() {
        let expected = Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_string());
        assert_eq!(embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(embed_url("https://www.youtube.com/embed/dQw4w9WgXcQ"), expected);
        assert_eq!(embed_url("https://youtu.be/dQw4w9WgXcQ"), expected);
        assert_eq!(
            embed_url("https://www.youtube.com/watch?list=x&v=dQw4w9WgXcQ&t=9"),
            expected
        );
        assert_eq!(embed_url("https://vimeo.com/12345678"), None);
    }

    #[test]
    fn test_paste_video_link() {
        let mut editor = editor_with(&["watch this"]);
        editor
            .paste_text("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .unwrap();

        assert_eq!(
            kinds(&editor),
            vec![
                ElementKind::Paragraph,
                ElementKind::Video,
                ElementKind::Paragraph
            ]
        );
        let video = editor.document().element_at(&Path::new(vec![1])).unwrap();
        assert_eq!(
            video.url.as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
        );
        assert_eq!(editor.editor().cursor().unwrap(), Point::new(vec![2, 0], 0));
    }

    #[test]
    fn test_video_never_opens_document() {
        let mut editor = BlockEditor::new(Document::new(vec![Element::paragraph("x").into()]));
        editor.set_cursor(Point::new(vec![0, 0], 0));
        editor.paste_text("https://youtu.be/dQw4w9WgXcQ").unwrap();

        assert_eq!(
            kinds(&editor),
            vec![
                ElementKind::Paragraph,
                ElementKind::Video,
                ElementKind::Paragraph,
                ElementKind::Paragraph
            ]
        );
        assert_eq!(editor.editor().cursor().unwrap(), Point::new(vec![2, 0], 0));
    }
}
