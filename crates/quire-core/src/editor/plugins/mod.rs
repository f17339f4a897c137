//! The standard pipeline stages

pub mod dates;
pub mod embeds;
pub mod ids;
pub mod images;
pub mod links;
pub mod shortcuts;

pub use embeds::Embeds;
pub use ids::Ids;
pub use images::Images;
pub use links::Links;
pub use shortcuts::Shortcuts;
