//! Presentation layer: HTML rendering of car listings

mod template;

pub use template::{escape_html, HomeTemplate, PageContext, RenderError};
