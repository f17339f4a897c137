//! Image stage
//!
//! Images are void blocks. Pasted image files are embedded as `data:` URLs
//! and a pasted image URL becomes an image block.

use tracing::debug;

use crate::document::{Element, ElementKind, Path};
use crate::editor::plugins::links::is_url;
use crate::editor::{DataTransfer, Editor, InputEvent, Outcome, Plugin};
use crate::error::EditorResult;

/// File extensions treated as images
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "apng", "avif", "bmp", "cur", "dds", "djvu", "emf", "exif", "gif", "heic", "heif", "icns",
    "ico", "jfif", "jng", "jp2", "jpe", "jpeg", "jpg", "jps", "jxl", "jxr", "pbm", "pcx", "pgm",
    "pict", "png", "pnm", "ppm", "psd", "raw", "svg", "tga", "tif", "tiff", "wbmp", "webp", "wmf",
    "xbm", "xcf", "xpm",
];

pub struct Images;

impl Plugin for Images {
    fn name(&self) -> &'static str {
        "images"
    }

    fn is_void(&self, kind: ElementKind) -> bool {
        kind == ElementKind::Image
    }

    fn handle(&self, editor: &mut Editor, event: &InputEvent) -> EditorResult<Outcome> {
        match event {
            InputEvent::InsertData(data) => paste(editor, data),
            _ => Ok(Outcome::NotHandled),
        }
    }
}

fn paste(editor: &mut Editor, data: &DataTransfer) -> EditorResult<Outcome> {
    if !data.files().is_empty() {
        for file in data.files() {
            if !file.is_image() {
                debug!(name = %file.name, mime = %file.mime, "Skipping pasted non-image file");
                continue;
            }
            insert_image(editor, &file.to_data_url())?;
        }
        return Ok(Outcome::Handled);
    }

    match data.text() {
        Some(url) if is_image_url(url) => {
            insert_image(editor, url)?;
            Ok(Outcome::Handled)
        }
        _ => Ok(Outcome::NotHandled),
    }
}

/// Whether `text` is a URL whose path ends in an image extension
pub fn is_image_url(text: &str) -> bool {
    if !is_url(text) {
        return false;
    }
    let rest = text.split_once("//").map_or(text, |(_, rest)| rest);
    let path = rest.find('/').map_or("", |i| &rest[i..]);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Insert an image block followed by an empty paragraph
pub fn insert_image(editor: &mut Editor, url: &str) -> EditorResult<()> {
    editor.insert_blocks(vec![
        Element::block(ElementKind::Image).with_url(url).into(),
        Element::blank().into(),
    ])
}

/// Record the size an image block was resized to
pub fn resize_image(editor: &mut Editor, path: &Path, width: f64, height: f64) -> EditorResult<()> {
    let image = editor.element_of_kind_mut(path, ElementKind::Image)?;
    image.width = Some(width);
    image.height = Some(height);
    debug!(%path, width, height, "Resized image");
    Ok(())
}
