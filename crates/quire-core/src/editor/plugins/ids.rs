//! Id stage
//!
//! Every block created by a break gets a fresh [`BlockId`]. Pasted blocks,
//! whether from an internal fragment, HTML or multi-line plain text, are
//! given new ids too, so a block copied within a page never shares its id.

use tracing::{debug, warn};

use crate::document::{BlockId, Element, Node, Schema};
use crate::editor::plugins::links::is_url;
use crate::editor::clipboard::decode_fragment;
use crate::editor::{DataTransfer, Editor, InputEvent, Outcome, Plugin};
use crate::error::EditorResult;
use crate::serialize;

pub struct Ids;

impl Plugin for Ids {
    fn name(&self) -> &'static str {
        "ids"
    }

    fn handle(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<Outcome> {
        match event {
            InputEvent::InsertData(data) => paste(editor, data),
            _ => Ok(Outcome::NotHandled),
        }
    }

    fn after(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<()> {
        if *event == InputEvent::InsertBreak {
            editor.set_block(|el| el.id = Some(BlockId::new()))?;
        }
        Ok(())
    }
}

fn paste(editor: &mut Editor, data: &DataTransfer) -> EditorResult<Outcome> {
    if let Some(encoded) = data.fragment() {
        return match decode_fragment(encoded) {
            Ok(mut nodes) => {
                assign_ids(&mut nodes, editor.schema());
                debug!(nodes = nodes.len(), "Inserting pasted fragment");
                editor.insert_fragment(nodes)?;
                Ok(Outcome::Handled)
            }
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable clipboard fragment");
                Ok(Outcome::NotHandled)
            }
        };
    }

    if let Some(html) = data.html() {
        let mut fragment = serialize::from_html_with_schema(html, editor.schema());
        assign_ids(&mut fragment, editor.schema());
        debug!(nodes = fragment.len(), "Inserting pasted HTML");
        editor.insert_fragment(fragment)?;
        return Ok(Outcome::Handled);
    }

    // a lone URL is left for the link stage
    let Some(text) = data.text().filter(|t| !is_url(t)) else {
        return Ok(Outcome::NotHandled);
    };

    let blocks: Vec<Node> = text
        .split('\n')
        .map(|line| Element::paragraph(line.strip_suffix('\r').unwrap_or(line)).into())
        .collect();
    debug!(blocks = blocks.len(), "Inserting pasted text as paragraphs");
    editor.insert_blocks(blocks)?;
    Ok(Outcome::Handled)
}

/// Give every block element in `nodes` a new id, replacing any it had
pub fn assign_ids(nodes: &mut [Node], schema: &Schema) {
    for node in nodes {
        if let Node::Element(el) = node {
            if !schema.is_inline(el) {
                el.id = Some(BlockId::new());
            }
            assign_ids(&mut el.children, schema);
        }
    }
}
