//! Input pipeline
//!
//! Stages are declared innermost first. An event is offered to the
//! outermost stage first and travels inward until a stage claims it; if none
//! does, the editor's default handling runs. Stages that let the event pass
//! get their [`Plugin::after`] hook once it has been consumed, innermost
//! first.

use std::fmt;

use tracing::debug;

use crate::document::{ElementKind, Schema};
use crate::editor::plugins::{Embeds, Ids, Images, Links, Shortcuts};
use crate::editor::{DataTransfer, Editor};
use crate::error::EditorResult;

/// A mutation request coming from the keyboard or the clipboard
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    InsertText(String),
    InsertBreak,
    DeleteBackward,
    InsertData(DataTransfer),
}

impl InputEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InputEvent::InsertText(_) => "insert_text",
            InputEvent::InsertBreak => "insert_break",
            InputEvent::DeleteBackward => "delete_backward",
            InputEvent::InsertData(_) => "insert_data",
        }
    }
}

/// Whether a stage consumed an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    NotHandled,
}

/// One stage of the pipeline
pub trait Plugin {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether elements of `kind` flow inline with text
    fn is_inline(&self, _kind: ElementKind) -> bool {
        false
    }

    /// Whether elements of `kind` have no editable content
    fn is_void(&self, _kind: ElementKind) -> bool {
        false
    }

    /// Claim the event, or return [`Outcome::NotHandled`] to pass it inward
    fn handle(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<Outcome>;

    /// Runs after an event this stage passed on has been consumed
    fn after(&self, _editor: &mut Editor, _event: &InputEvent) -> EditorResult<()> {
        Ok(())
    }
}

/// Ordered stages plus the default handler
pub struct Pipeline {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// A pipeline with no stages
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Links, ids, shortcuts, images and embeds, innermost first
    pub fn standard() -> Self {
        Self::new()
            .with(Links)
            .with(Ids)
            .with(Shortcuts)
            .with(Images)
            .with(Embeds)
    }

    /// Add a stage outside all existing ones
    pub fn with(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Stage names, innermost first
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Inline and void kinds contributed by the stages
    pub fn schema(&self) -> Schema {
        ElementKind::ALL
            .iter()
            .fold(Schema::new(), |schema, &kind| {
                let schema = if self.plugins.iter().any(|p| p.is_inline(kind)) {
                    schema.with_inline(kind)
                } else {
                    schema
                };
                if self.plugins.iter().any(|p| p.is_void(kind)) {
                    schema.with_void(kind)
                } else {
                    schema
                }
            })
    }

    /// Run `event` through the stages, then the default handler if needed
    pub fn dispatch(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<Outcome> {
        let mut delegated = Vec::new();
        let mut outcome = Outcome::NotHandled;

        for (index, plugin) in self.plugins.iter().enumerate().rev() {
            match plugin.handle(editor, event)? {
                Outcome::Handled => {
                    debug!(stage = plugin.name(), event = event.name(), "Stage handled input");
                    outcome = Outcome::Handled;
                    break;
                }
                Outcome::NotHandled => delegated.push(index),
            }
        }

        if outcome == Outcome::NotHandled {
            debug!(event = event.name(), "No stage claimed input, using default");
            default_handle(editor, event)?;
        }

        for index in delegated.into_iter().rev() {
            self.plugins[index].after(editor, event)?;
        }
        Ok(outcome)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("plugins", &self.names())
            .finish()
    }
}

fn default_handle(editor: &mut Editor, event: &InputEvent) -> EditorResult<()> {
    match event {
        InputEvent::InsertText(text) => editor.insert_text(text),
        InputEvent::InsertBreak => editor.split_block(),
        InputEvent::DeleteBackward => editor.delete_backward(),
        InputEvent::InsertData(data) => editor.insert_data(data),
    }
}
