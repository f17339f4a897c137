//! Document serialization
//!
//! Plain text is used for search and for the `text/plain` clipboard flavour.
//! HTML is used for export, for the `text/html` clipboard flavour and for
//! turning pasted HTML back into blocks. The HTML round trip is lossy: only
//! the tags listed in [`html`] survive.

pub mod html;
pub mod text;

pub use html::{escape_html, from_html, from_html_with_schema, to_html};
pub use text::to_plain_text;
