//! Replay scripted input against a page
//!
//! A script is one step per line. Blank lines and lines starting with `//`
//! are skipped.
//!
//! ```text
//! type # Title         type characters one at a time
//! text hello           insert text as one input event
//! enter                split the block
//! backspace 3          delete backward (count optional)
//! paste https://...    paste plain text
//! paste-html <p>x</p>  paste HTML
//! tab / shift-tab      indent / outdent the selected blocks
//! toggle 2             collapse or expand under top-level block 2
//! cursor 1 4           caret at block 1, character 4
//! select 0 2 1 3       select from block 0 char 2 to block 1 char 3
//! end                  caret at the end of the page
//! mark bold            toggle a mark (bold, italic, underline, strikethrough, code)
//! clear-formatting     drop every mark in the selection
//! code                 switch the selected blocks between code and paragraph
//! link URL [LABEL]     link the selection, or insert a labelled link
//! date 2024-03-01      replace the selection with a date
//! redate 0 1 2024-03-02  change the date at block 0, child 1
//! resize 2 320 180     set the size of the image at block 2
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use quire_core::document::{Affinity, Mark, Point};
use quire_core::{BlockEditor, PageStore, Path, Range};

use super::page::find_page;
use crate::output::Output;

/// One scripted input
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Type(String),
    Text(String),
    Enter,
    Backspace(usize),
    Paste(String),
    PasteHtml(String),
    Indent,
    Outdent,
    Toggle(usize),
    Cursor(usize, usize),
    Select(usize, usize, usize, usize),
    End,
    Mark(Mark),
    ClearFormatting,
    CodeBlock,
    Link(String, Option<String>),
    Date(NaiveDate),
    Redate(usize, usize, NaiveDate),
    Resize(usize, f64, f64),
}

/// Parse a script, reporting the first bad line
pub fn parse_script(script: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, raw) in script.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with("//") {
            continue;
        }
        let step = parse_step(line).with_context(|| format!("Line {}: {}", index + 1, line))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Step> {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest),
        None => (line, ""),
    };
    let numbers = || -> Result<Vec<usize>> {
        rest.split_whitespace()
            .map(|n| n.parse().map_err(|_| anyhow!("Expected a number, got '{}'", n)))
            .collect()
    };

    let date = |text: &str| -> Result<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map_err(|_| anyhow!("Expected a YYYY-MM-DD date, got '{}'", text.trim()))
    };

    let step = match command {
        "type" => Step::Type(rest.to_string()),
        "text" => Step::Text(rest.to_string()),
        "paste" => Step::Paste(rest.to_string()),
        "paste-html" => Step::PasteHtml(rest.to_string()),
        "enter" => Step::Enter,
        "tab" => Step::Indent,
        "shift-tab" => Step::Outdent,
        "end" => Step::End,
        "clear-formatting" => Step::ClearFormatting,
        "code" => Step::CodeBlock,
        "link" => match rest.trim().split_once(' ') {
            Some((url, label)) => Step::Link(url.to_string(), Some(label.trim().to_string())),
            None if !rest.trim().is_empty() => Step::Link(rest.trim().to_string(), None),
            None => bail!("link takes a URL"),
        },
        "date" => Step::Date(date(rest)?),
        "redate" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
            [block, child, day] => Step::Redate(
                block.parse().map_err(|_| anyhow!("Expected a number, got '{}'", block))?,
                child.parse().map_err(|_| anyhow!("Expected a number, got '{}'", child))?,
                date(day)?,
            ),
            _ => bail!("redate takes a block index, a child index and a date"),
        },
        "resize" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
            [block, width, height] => Step::Resize(
                block.parse().map_err(|_| anyhow!("Expected a number, got '{}'", block))?,
                width.parse().map_err(|_| anyhow!("Expected a width, got '{}'", width))?,
                height.parse().map_err(|_| anyhow!("Expected a height, got '{}'", height))?,
            ),
            _ => bail!("resize takes a block index, a width and a height"),
        },
        "backspace" => match numbers()?.as_slice() {
            [] => Step::Backspace(1),
            [n] => Step::Backspace(*n),
            _ => bail!("backspace takes at most one count"),
        },
        "toggle" => match numbers()?.as_slice() {
            [n] => Step::Toggle(*n),
            _ => bail!("toggle takes a block index"),
        },
        "cursor" => match numbers()?.as_slice() {
            [block, offset] => Step::Cursor(*block, *offset),
            _ => bail!("cursor takes a block index and an offset"),
        },
        "select" => match numbers()?.as_slice() {
            [b1, o1, b2, o2] => Step::Select(*b1, *o1, *b2, *o2),
            _ => bail!("select takes two block/offset pairs"),
        },
        "mark" => Step::Mark(match rest.trim() {
            "bold" => Mark::Bold,
            "italic" => Mark::Italic,
            "underline" => Mark::Underline,
            "strikethrough" => Mark::Strikethrough,
            "code" => Mark::Code,
            other => bail!("Unknown mark '{}'", other),
        }),
        other => bail!("Unknown step '{}'", other),
    };
    Ok(step)
}

fn point_in_block(editor: &BlockEditor, block: usize, offset: usize) -> Result<Point> {
    let point = editor
        .document()
        .point_at_offset(&Path::new(vec![block]), offset, Affinity::Forward)
        .with_context(|| format!("No block {}", block))?;
    Ok(point)
}

/// Local midnight at the start of `day`
fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(Local).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => midnight.and_utc(),
    }
}

/// Apply steps in order
pub fn apply(editor: &mut BlockEditor, steps: &[Step]) -> Result<()> {
    for step in steps {
        debug!(?step, "Applying step");
        match step {
            Step::Type(text) => editor.type_text(text)?,
            Step::Text(text) => editor.insert_text(text)?,
            Step::Enter => editor.insert_break()?,
            Step::Backspace(count) => {
                for _ in 0..*count {
                    editor.delete_backward()?;
                }
            }
            Step::Paste(text) => editor.paste_text(text)?,
            Step::PasteHtml(html) => editor.paste_html(html)?,
            Step::Indent => {
                editor.indent()?;
            }
            Step::Outdent => {
                editor.outdent()?;
            }
            Step::Toggle(block) => {
                editor.toggle_block(&Path::new(vec![*block]))?;
            }
            Step::Cursor(block, offset) => {
                let point = point_in_block(editor, *block, *offset)?;
                editor.set_cursor(point);
            }
            Step::Select(b1, o1, b2, o2) => {
                let anchor = point_in_block(editor, *b1, *o1)?;
                let focus = point_in_block(editor, *b2, *o2)?;
                editor.select(Range::new(anchor, focus));
            }
            Step::End => editor.move_to_end()?,
            Step::Mark(mark) => editor.toggle_mark(*mark)?,
            Step::ClearFormatting => editor.editor_mut().clear_formatting()?,
            Step::CodeBlock => {
                editor.toggle_code_block()?;
            }
            Step::Link(url, label) => editor.insert_link(url, label.as_deref())?,
            Step::Date(day) => editor.insert_date(start_of_day(*day))?,
            Step::Redate(block, child, day) => {
                editor.update_date(&Path::new(vec![*block, *child]), start_of_day(*day))?
            }
            Step::Resize(block, width, height) => {
                editor.resize_image(&Path::new(vec![*block]), *width, *height)?
            }
        }
    }
    Ok(())
}

/// Replay a script against a page and save the result
///
/// The caret starts at the end of the page.
pub fn run(store: &PageStore, key: &str, script: Option<PathBuf>, output: &Output) -> Result<()> {
    let source = match script {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read script from stdin")?;
            buf
        }
    };
    let steps = parse_script(&source)?;

    let mut page = find_page(store, key)?;
    let mut editor = BlockEditor::new(std::mem::take(&mut page.json_body));
    editor.move_to_end()?;
    apply(&mut editor, &steps)?;

    page.set_body(editor.into_document());
    store.save_page(&mut page).context("Failed to save page")?;

    output.print_page(&page);
    Ok(())
}
