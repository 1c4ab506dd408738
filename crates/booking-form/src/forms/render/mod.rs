//! Render backends. Both consume the same composed blocks and never recompute geometry.

pub mod document;
pub mod interactive;

use super::layout::BoxContent;

pub use document::{
    DocumentBackend, DocumentFragment, DocumentRuntime, DocumentRuntimeConfig,
    DocumentRuntimeError,
};
pub use interactive::{InteractiveBackend, InteractiveView, ViewBlock, ViewNode};

/// Stable role name shared by both backends.
pub(crate) fn content_role(content: &BoxContent) -> &'static str {
    match content {
        BoxContent::Container => "container",
        BoxContent::Heading { .. } => "heading",
        BoxContent::Label { .. } => "label",
        BoxContent::Caption { .. } => "caption",
        BoxContent::CellRow => "cell_row",
        BoxContent::Cell { .. } => "cell",
        BoxContent::Checkbox { .. } => "checkbox",
        BoxContent::Paragraph { .. } => "paragraph",
        BoxContent::Image { .. } => "image",
    }
}
