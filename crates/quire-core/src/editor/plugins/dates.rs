//! Date chips
//!
//! A date is an inline element carrying the picked instant as an ISO 8601
//! string, labelled relative to today ("Tomorrow", "last Friday",
//! "03/01/2024"). The links stage declares the kind inline.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use tracing::debug;

use crate::document::{BlockId, Element, ElementKind, Node, Path, Point};
use crate::editor::Editor;
use crate::error::EditorResult;

/// Label for `date` as seen from `today`
pub fn friendly_date(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        -1 => "Yesterday".to_string(),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -6..=-2 => format!("last {}", date.format("%A")),
        2..=6 => date.format("%A").to_string(),
        _ => date.format("%m/%d/%Y").to_string(),
    }
}

/// `2024-03-01T09:30:00.000Z`
pub fn iso_string(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn local_label(date: DateTime<Utc>) -> String {
    let today = Local::now().date_naive();
    friendly_date(date.with_timezone(&Local).date_naive(), today)
}

/// A new date element for `date`
pub fn date_element(date: DateTime<Utc>) -> Element {
    let mut el = Element::with_children(ElementKind::Date, vec![Node::text(local_label(date))])
        .with_id(BlockId::new());
    el.date_iso_string = Some(iso_string(date));
    el
}

/// Replace the selection with a date element
pub fn insert_date(editor: &mut Editor, date: DateTime<Utc>) -> EditorResult<()> {
    debug!(date = %iso_string(date), "Inserting date");
    editor.insert_inline(date_element(date))
}

/// Point the date element at `path` to a new date and relabel it
///
/// A caret inside the old label moves to the end of the new one.
pub fn update_date(editor: &mut Editor, path: &Path, date: DateTime<Utc>) -> EditorResult<()> {
    let label = local_label(date);
    let len = label.chars().count();
    let el = editor.element_of_kind_mut(path, ElementKind::Date)?;
    el.date_iso_string = Some(iso_string(date));
    el.children = vec![Node::text(label)];

    let inside = editor.selection().is_some_and(|range| {
        path.is_ancestor_of(&range.anchor.path) || path.is_ancestor_of(&range.focus.path)
    });
    if inside {
        editor.set_cursor(Point::new(path.child(0), len));
    }
    Ok(())
}
