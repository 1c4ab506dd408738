//! Self-contained HTML documents for the designated template pages.
//!
//! Every box becomes an absolutely positioned `div` whose geometry is copied from
//! the layout tree, so the document and the interactive preview agree to the pixel.

use std::fmt::Write as _;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::forms::compositor::{PagePlan, PlannedPage};
use crate::forms::layout::{BoxContent, LayoutBox, LayoutConstants};

use super::content_role;

pub const DEFAULT_FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Settings fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRuntimeConfig {
    pub font_family: String,
    pub text_color: String,
    pub border_color: String,
}

impl Default for DocumentRuntimeConfig {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            text_color: "#000".to_string(),
            border_color: "#000".to_string(),
        }
    }
}

/// Process-wide document settings. Obtained through [`DocumentRuntime::initialize`].
#[derive(Debug)]
pub struct DocumentRuntime {
    config: DocumentRuntimeConfig,
}

static RUNTIME: OnceLock<DocumentRuntime> = OnceLock::new();

impl DocumentRuntime {
    /// Initialize the runtime once. Repeating the call with the same settings returns
    /// the existing runtime; different settings are rejected.
    pub fn initialize(
        config: DocumentRuntimeConfig,
    ) -> Result<&'static DocumentRuntime, DocumentRuntimeError> {
        let mut created = false;
        let runtime = RUNTIME.get_or_init(|| {
            created = true;
            DocumentRuntime {
                config: config.clone(),
            }
        });

        if created {
            info!(font_family = %runtime.config.font_family, "document runtime initialized");
        }

        if runtime.config == config {
            Ok(runtime)
        } else {
            Err(DocumentRuntimeError::AlreadyInitialized {
                existing: runtime.config.font_family.clone(),
            })
        }
    }

    /// The runtime, if [`DocumentRuntime::initialize`] has run.
    pub fn get() -> Result<&'static DocumentRuntime, DocumentRuntimeError> {
        RUNTIME.get().ok_or(DocumentRuntimeError::NotInitialized)
    }

    pub fn config(&self) -> &DocumentRuntimeConfig {
        &self.config
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentRuntimeError {
    #[error("document runtime has not been initialized")]
    NotInitialized,
    #[error("document runtime already initialized with font family `{existing}`")]
    AlreadyInitialized { existing: String },
}

/// Markup for one designated page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFragment {
    pub page_number: u32,
    pub width: f32,
    pub height: f32,
    pub html: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DocumentBackend {
    runtime: &'static DocumentRuntime,
    constants: LayoutConstants,
}

impl DocumentBackend {
    pub fn new(runtime: &'static DocumentRuntime, constants: LayoutConstants) -> Self {
        Self { runtime, constants }
    }

    pub fn render_plan(&self, plan: &PagePlan) -> Vec<DocumentFragment> {
        plan.pages.iter().map(|page| self.render_page(page)).collect()
    }

    pub fn render_page(&self, page: &PlannedPage) -> DocumentFragment {
        let width = self.constants.container_width;
        let height = page.block.height();
        let config = &self.runtime.config;

        let mut html = String::with_capacity(16 * 1024);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>Page {}</title>", page.page_number);
        html.push_str("<style>\n");
        let _ = writeln!(
            html,
            "html,body{{margin:0;padding:0;}}\n\
             .page{{position:relative;overflow:hidden;font-family:{};color:{};}}\n\
             .page div{{position:absolute;box-sizing:border-box;}}\n\
             .cell,.checkbox{{text-align:center;}}\n\
             .heading{{font-weight:bold;}}\n\
             .heading,.label,.caption{{white-space:nowrap;overflow:hidden;text-overflow:clip;}}\n\
             .image img{{width:100%;height:100%;object-fit:contain;}}",
            escape_html(&config.font_family),
            escape_html(&config.text_color),
        );
        html.push_str("</style>\n</head>\n<body>\n");
        let _ = writeln!(
            html,
            "<div class=\"page\" data-page=\"{}\" style=\"width:{};height:{};\">",
            page.page_number,
            format_px(width),
            format_px(height),
        );
        html.push_str(&self.render_box(&page.block.root));
        html.push_str("</div>\n</body>\n</html>\n");

        DocumentFragment {
            page_number: page.page_number,
            width,
            height,
            html,
        }
    }

    /// Markup for a single box and its descendants, positioned relative to its parent.
    pub fn render_box(&self, node: &LayoutBox) -> String {
        let mut out = String::new();
        self.write_box(&mut out, node);
        out
    }

    fn write_box(&self, out: &mut String, node: &LayoutBox) {
        let role = content_role(&node.content);
        let rect = node.rect;
        let border_color = &self.runtime.config.border_color;

        let _ = write!(out, "<div class=\"{role}\"");
        if let Some(key) = &node.key {
            let _ = write!(out, " data-key=\"{}\"", escape_html(key));
        }
        if let BoxContent::Checkbox { checked, .. } = &node.content {
            let _ = write!(out, " data-checked=\"{checked}\"");
        }
        let _ = write!(
            out,
            " style=\"left:{};top:{};width:{};height:{};",
            format_px(rect.x),
            format_px(rect.y),
            format_px(rect.width),
            format_px(rect.height),
        );

        match &node.content {
            BoxContent::Heading { .. } => {
                let _ = write!(
                    out,
                    "font-size:{};line-height:{};",
                    format_px(self.constants.heading_font_size),
                    format_px(rect.height),
                );
            }
            BoxContent::Label { .. } | BoxContent::Caption { .. } => {
                let _ = write!(
                    out,
                    "font-size:{};line-height:{};",
                    format_px(self.constants.font_size),
                    format_px(rect.height),
                );
            }
            BoxContent::Cell { border, .. } | BoxContent::Checkbox { border, .. } => {
                let _ = write!(
                    out,
                    "border:{} solid {};font-size:{};line-height:{};",
                    format_px(*border),
                    escape_html(border_color),
                    format_px(self.constants.font_size),
                    format_px(rect.height - 2.0 * border),
                );
            }
            BoxContent::Paragraph { .. } => {
                let _ = write!(
                    out,
                    "font-size:{};line-height:{};",
                    format_px(self.constants.font_size),
                    format_px(self.constants.line_height()),
                );
            }
            BoxContent::Image { image, .. } => {
                if image.is_none() {
                    let _ = write!(
                        out,
                        "border:1px dashed {};font-size:{};text-align:center;",
                        escape_html(border_color),
                        format_px(self.constants.font_size),
                    );
                }
            }
            BoxContent::Container | BoxContent::CellRow => {}
        }
        out.push_str("\">");

        match &node.content {
            BoxContent::Heading { text }
            | BoxContent::Label { text }
            | BoxContent::Caption { text } => out.push_str(&escape_html(text)),
            BoxContent::Cell { glyph, .. } => {
                if let Some(glyph) = glyph {
                    out.push_str(&escape_html(&glyph.to_string()));
                }
            }
            BoxContent::Checkbox { checked, .. } => {
                if *checked {
                    out.push('X');
                }
            }
            BoxContent::Paragraph { lines } => {
                let escaped: Vec<String> = lines.iter().map(|line| escape_html(line)).collect();
                out.push_str(&escaped.join("<br>"));
            }
            BoxContent::Image { image, placeholder } => match image {
                Some(image) => {
                    let _ = write!(out, "<img src=\"{}\" alt=\"\">", image.data_uri());
                }
                None => out.push_str(&escape_html(placeholder)),
            },
            BoxContent::Container | BoxContent::CellRow => {}
        }

        if !node.children.is_empty() {
            out.push('\n');
            for child in &node.children {
                self.write_box(out, child);
            }
        }
        out.push_str("</div>\n");
    }
}

/// CSS pixel length using the shortest representation that round-trips the value.
pub fn format_px(value: f32) -> String {
    format!("{value}px")
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
