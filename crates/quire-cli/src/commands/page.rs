//! Page command handlers

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use quire_core::document::Document;
use quire_core::serialize::{to_html, to_plain_text};
use quire_core::{BlockEditor, Element, Page, PageStore};

use super::resolve_id;
use crate::output::Output;
use crate::BodyFormat;

/// Find a page by full id or unique prefix
pub fn find_page(store: &PageStore, key: &str) -> Result<Page> {
    let pages = store.list_pages().context("Failed to list pages")?;
    resolve_id(key, "page", pages, |p| p.id, |p| p.title.clone())
}

/// Create an empty page
pub fn create(store: &PageStore, title: String, output: &Output) -> Result<()> {
    let mut page = Page::new(title);
    page.set_body(Document::new(vec![Element::blank().into()]));
    store.save_page(&mut page).context("Failed to save page")?;

    if output.is_quiet() {
        println!("{}", page.id);
    } else {
        output.success(&format!("Created page {}", &page.id.to_string()[..8]));
    }
    Ok(())
}

pub fn list(store: &PageStore, output: &Output) -> Result<()> {
    let pages = store.list_pages().context("Failed to list pages")?;
    output.print_pages(&pages);
    Ok(())
}

/// Show a page, or print its body in the chosen format
pub fn show(store: &PageStore, key: &str, format: BodyFormat, output: &Output) -> Result<()> {
    let page = find_page(store, key)?;
    let nodes = page.json_body.children();
    match format {
        BodyFormat::Text => output.print_page(&page),
        BodyFormat::Html => println!("{}", to_html(nodes)),
        BodyFormat::Json => println!("{}", page.json_body.to_json()?),
    }
    Ok(())
}

/// Build a page body from a file: JSON is taken as a stored body, HTML goes
/// through the paste pipeline, anything else becomes one paragraph per line
pub fn body_from_file(path: &Path) -> Result<Document> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let body = match extension.as_deref() {
        Some("json") => Document::from_json(&content)
            .with_context(|| format!("Invalid page body in {:?}", path))?,
        Some("html") | Some("htm") => {
            let mut editor = BlockEditor::new(Document::default());
            editor.paste_html(&content)?;
            editor.into_document()
        }
        _ => Document::new(
            content
                .lines()
                .map(|line| Element::paragraph(line).into())
                .collect(),
        ),
    };
    Ok(body)
}

pub fn import(
    store: &PageStore,
    file: &Path,
    title: Option<String>,
    output: &Output,
) -> Result<()> {
    let body = body_from_file(file)?;
    let title = title.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut page = Page::new(title);
    page.set_body(body);
    store.save_page(&mut page).context("Failed to save page")?;

    if output.is_quiet() {
        println!("{}", page.id);
    } else {
        output.success(&format!(
            "Imported {} block(s) into page {}",
            page.json_body.children().len(),
            &page.id.to_string()[..8]
        ));
    }
    Ok(())
}

pub fn delete(store: &PageStore, key: &str, output: &Output) -> Result<()> {
    let page = find_page(store, key)?;
    store.delete_page(page.id).context("Failed to delete page")?;
    output.success(&format!("Deleted page: {}", &page.id.to_string()[..8]));
    Ok(())
}

/// Collapse or expand the blocks nested under a top-level block
pub fn toggle(store: &PageStore, key: &str, block: usize, output: &Output) -> Result<()> {
    let mut page = find_page(store, key)?;
    let mut editor = BlockEditor::new(std::mem::take(&mut page.json_body));
    let showing = editor
        .toggle_block(&vec![block].into())
        .with_context(|| format!("Cannot toggle block {}", block))?;
    page.set_body(editor.into_document());
    store.save_page(&mut page).context("Failed to save page")?;

    let state = if showing { "expanded" } else { "collapsed" };
    output.print_value(
        &serde_json::json!({ "block": block, "is_showing": showing }),
        &format!("Block {} {}", block, state),
    );
    if !output.is_json() && !output.is_quiet() {
        println!("{}", to_plain_text(visible_blocks(&page.json_body).as_slice()));
    }
    Ok(())
}

/// Top-level blocks not hidden under a collapsed toggle
fn visible_blocks(document: &Document) -> Vec<quire_core::Node> {
    document
        .children()
        .iter()
        .filter(|n| n.as_element().map_or(true, |el| !el.is_hidden()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::ElementKind;
    use tempfile::TempDir;

    #[test]
    fn test_body_from_text_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "one\ntwo\n").unwrap();

        let body = body_from_file(&path).unwrap();
        assert_eq!(body.children().len(), 2);
        assert_eq!(to_plain_text(body.children()), "one\ntwo");
    }

    #[test]
    fn test_body_from_html_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.html");
        fs::write(&path, "<h1>Title</h1><p>body</p>").unwrap();

        let body = body_from_file(&path).unwrap();
        let kinds: Vec<ElementKind> = body
            .children()
            .iter()
            .filter_map(|n| n.as_element())
            .map(|el| el.kind)
            .collect();
        assert_eq!(kinds, vec![ElementKind::HeadingOne, ElementKind::Paragraph]);
        assert!(body
            .children()
            .iter()
            .filter_map(|n| n.as_element())
            .all(|el| el.id.is_some()));
    }

    #[test]
    fn test_body_from_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("body.json");
        fs::write(&path, "{").unwrap();
        assert!(body_from_file(&path).is_err());
    }

    #[test]
    fn test_toggle_hides_nested_blocks() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::open(dir.path());
        let mut page = Page::new("Toggle");
        page.set_body(Document::new(vec![
            Element::paragraph("parent").into(),
            Element::paragraph("\tchild").into(),
            Element::paragraph("next").into(),
        ]));
        store.save_page(&mut page).unwrap();

        let output = Output::new(crate::output::OutputFormat::Quiet);
        toggle(&store, &page.id.to_string(), 0, &output).unwrap();

        let loaded = store.load_page(page.id).unwrap().unwrap();
        assert_eq!(visible_blocks(&loaded.json_body).len(), 2);
        assert!(toggle(&store, &page.id.to_string(), 9, &output).is_err());
    }
}
