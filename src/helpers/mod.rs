//! Helper functions shared by the feed, templates and server
//!
//! URL building, date interpretation, XML escaping and tag colors.

mod date;
mod html;
mod tag_color;
mod url;
mod xml;

pub use date::*;
pub use html::*;
pub use tag_color::*;
pub use url::*;
pub use xml::*;
