use serde::Serialize;

use crate::forms::compositor::{BlockKind, ComposedForm, FormBlock};
use crate::forms::layout::{BoxContent, LayoutBox, LayoutConstants, Rect};

use super::content_role;

/// Positioned view tree for on-screen preview. Hosts must not rescale it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveView {
    pub container_width: f32,
    pub scalable: bool,
    pub blocks: Vec<ViewBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewBlock {
    #[serde(flatten)]
    pub kind: BlockKind,
    pub root: ViewNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub frame: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub clip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn find(&self, key: &str) -> Option<&ViewNode> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }
}

/// Maps composed blocks onto view nodes one to one.
#[derive(Debug, Clone, Copy)]
pub struct InteractiveBackend {
    constants: LayoutConstants,
}

impl InteractiveBackend {
    pub fn new(constants: LayoutConstants) -> Self {
        Self { constants }
    }

    pub fn render(&self, form: &ComposedForm) -> InteractiveView {
        InteractiveView {
            container_width: self.constants.container_width,
            scalable: false,
            blocks: form.blocks.iter().map(|block| self.render_block(block)).collect(),
        }
    }

    pub fn render_block(&self, block: &FormBlock) -> ViewBlock {
        ViewBlock {
            kind: block.kind,
            root: self.render_box(&block.root),
        }
    }

    pub fn render_box(&self, node: &LayoutBox) -> ViewNode {
        let mut view = ViewNode {
            role: content_role(&node.content),
            key: node.key.clone(),
            frame: node.rect,
            font_size: None,
            border_width: None,
            clip: false,
            checked: None,
            text: None,
            lines: Vec::new(),
            source: None,
            children: node
                .children
                .iter()
                .map(|child| self.render_box(child))
                .collect(),
        };

        match &node.content {
            BoxContent::Container | BoxContent::CellRow => {}
            BoxContent::Heading { text } => {
                view.font_size = Some(self.constants.heading_font_size);
                view.clip = true;
                view.text = Some(text.clone());
            }
            BoxContent::Label { text } | BoxContent::Caption { text } => {
                view.font_size = Some(self.constants.font_size);
                view.clip = true;
                view.text = Some(text.clone());
            }
            BoxContent::Cell { glyph, border } => {
                view.font_size = Some(self.constants.font_size);
                view.border_width = Some(*border);
                view.text = glyph.map(String::from);
            }
            BoxContent::Checkbox { checked, border } => {
                view.border_width = Some(*border);
                view.checked = Some(*checked);
            }
            BoxContent::Paragraph { lines } => {
                view.font_size = Some(self.constants.font_size);
                view.lines = lines.clone();
            }
            BoxContent::Image { image, placeholder } => match image {
                Some(image) => view.source = Some(image.data_uri()),
                None => {
                    view.font_size = Some(self.constants.font_size);
                    view.text = Some(placeholder.clone());
                }
            },
        }

        view
    }
}
