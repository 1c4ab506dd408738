//! Geometry for the fixed-pitch booking form.
//!
//! Every width and height used by the compositor and by both render backends is
//! derived here from a single [`LayoutConstants`] value, so the on-screen preview and
//! the generated document cannot drift apart.

pub mod text;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

use super::images::ResolvedImage;
use text::{chars_per_line, wrap_words, LINE_HEIGHT_EM};
use tokenizer::Cell;

/// Cells printed for a standard single-line field.
pub const FIELD_CELLS: usize = 20;

/// Named layout configurations observed on the printed forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    Wide,
    Compact,
}

impl LayoutVariant {
    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wide" => Some(Self::Wide),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Wide => "wide",
            Self::Compact => "compact",
        }
    }

    pub const fn constants(self) -> LayoutConstants {
        match self {
            Self::Wide => LayoutConstants::WIDE,
            Self::Compact => LayoutConstants::COMPACT,
        }
    }
}

impl Default for LayoutVariant {
    fn default() -> Self {
        Self::Compact
    }
}

/// Layout dials shared by the compositor and both render backends. Units are
/// points of a 72 dpi page, which equal CSS pixels at the 612 wide container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConstants {
    pub container_width: f32,
    pub outer_padding: f32,
    pub column_gap: f32,
    pub label_width: f32,
    pub field_gap: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub cell_border: f32,
    pub photo_width: f32,
    pub row_gap: f32,
    pub font_size: f32,
    pub heading_font_size: f32,
    pub signature_height: f32,
}

impl LayoutConstants {
    pub const WIDE: Self = Self {
        container_width: 612.0,
        outer_padding: 10.0,
        column_gap: 12.0,
        label_width: 120.0,
        field_gap: 6.0,
        cell_width: 20.0,
        cell_height: 20.0,
        cell_border: 1.5,
        photo_width: 96.0,
        row_gap: 6.0,
        font_size: 10.0,
        heading_font_size: 12.0,
        signature_height: 56.0,
    };

    pub const COMPACT: Self = Self {
        container_width: 612.0,
        outer_padding: 16.0,
        column_gap: 12.0,
        label_width: 130.0,
        field_gap: 6.0,
        cell_width: 20.0,
        cell_height: 20.0,
        cell_border: 1.0,
        photo_width: 90.0,
        row_gap: 5.0,
        font_size: 10.0,
        heading_font_size: 12.0,
        signature_height: 56.0,
    };

    pub fn content_width(&self) -> f32 {
        self.container_width - 2.0 * self.outer_padding
    }

    /// Horizontal advance of one bordered cell.
    pub fn cell_pitch(&self) -> f32 {
        self.cell_width + 2.0 * self.cell_border
    }

    pub fn row_height(&self) -> f32 {
        self.cell_height + 2.0 * self.cell_border
    }

    /// Photo slots keep a 3:4 aspect ratio.
    pub fn photo_height(&self) -> f32 {
        self.photo_width * 4.0 / 3.0
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_EM
    }

    /// Width of the label column, gap and a standard field's cells.
    pub fn field_row_width(&self) -> f32 {
        self.label_width + self.field_gap + FIELD_CELLS as f32 * self.cell_pitch()
    }

    /// Reject configurations that would produce empty, negative or overflowing geometry.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = [
            ("container_width", self.container_width),
            ("label_width", self.label_width),
            ("cell_width", self.cell_width),
            ("cell_height", self.cell_height),
            ("photo_width", self.photo_width),
            ("font_size", self.font_size),
            ("heading_font_size", self.heading_font_size),
            ("signature_height", self.signature_height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("outer_padding", self.outer_padding),
            ("column_gap", self.column_gap),
            ("field_gap", self.field_gap),
            ("cell_border", self.cell_border),
            ("row_gap", self.row_gap),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LayoutError::Negative { field, value });
            }
        }

        let available = self.content_width();
        let required = self
            .field_row_width()
            .max(self.photo_width + self.column_gap);
        if required > available {
            return Err(LayoutError::RowOverflow {
                required,
                available,
            });
        }

        Ok(())
    }
}

impl Default for LayoutConstants {
    fn default() -> Self {
        LayoutVariant::default().constants()
    }
}

/// Geometry failures. These indicate a malformed configuration, never missing data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout constant `{field}` must be positive, found {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("layout constant `{field}` must not be negative, found {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("a cell row needs at least one cell")]
    EmptyCellRow,
    #[error("field row needs {required}pt but the container only offers {available}pt")]
    RowOverflow { required: f32, available: f32 },
}

/// Resolved box metrics for a run of character cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellGeometry {
    pub cell_width: f32,
    pub cell_height: f32,
    pub border_width: f32,
    pub total_row_width: f32,
}

impl CellGeometry {
    pub fn pitch(&self) -> f32 {
        self.cell_width + 2.0 * self.border_width
    }

    pub fn outer_height(&self) -> f32 {
        self.cell_height + 2.0 * self.border_width
    }
}

/// Box metrics for `cell_count` cells under `constants`.
pub fn cell_box_geometry(
    constants: &LayoutConstants,
    cell_count: usize,
) -> Result<CellGeometry, LayoutError> {
    if cell_count == 0 {
        return Err(LayoutError::EmptyCellRow);
    }
    for (field, value) in [
        ("cell_width", constants.cell_width),
        ("cell_height", constants.cell_height),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(LayoutError::NonPositive { field, value });
        }
    }
    if !(constants.cell_border.is_finite() && constants.cell_border >= 0.0) {
        return Err(LayoutError::Negative {
            field: "cell_border",
            value: constants.cell_border,
        });
    }

    let cell_width = constants.cell_width;
    let border_width = constants.cell_border;
    Ok(CellGeometry {
        cell_width,
        cell_height: constants.cell_height,
        border_width,
        total_row_width: cell_count as f32 * (cell_width + 2.0 * border_width),
    })
}

/// Axis-aligned box relative to its parent's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// What a positioned box draws.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    Container,
    Heading { text: String },
    Label { text: String },
    Caption { text: String },
    CellRow,
    Cell { glyph: Cell, border: f32 },
    Checkbox { checked: bool, border: f32 },
    Paragraph { lines: Vec<String> },
    Image {
        image: Option<ResolvedImage>,
        placeholder: String,
    },
}

/// Positioned element of a composed form. Child rectangles are relative to the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub key: Option<String>,
    pub rect: Rect,
    pub content: BoxContent,
    pub children: Vec<LayoutBox>,
}

impl LayoutBox {
    pub fn new(rect: Rect, content: BoxContent) -> Self {
        Self {
            key: None,
            rect,
            content,
            children: Vec::new(),
        }
    }

    pub fn container(rect: Rect) -> Self {
        Self::new(rect, BoxContent::Container)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_children(mut self, children: Vec<LayoutBox>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, child: LayoutBox) {
        self.children.push(child);
    }

    /// Move the box so its top-left corner sits at `(x, y)` in the parent.
    pub fn placed_at(mut self, x: f32, y: f32) -> Self {
        self.rect.x = x;
        self.rect.y = y;
        self
    }

    /// Depth-first lookup by key.
    pub fn find(&self, key: &str) -> Option<&LayoutBox> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }

    /// Visit every box together with its absolute origin.
    pub fn walk<F>(&self, origin_x: f32, origin_y: f32, visit: &mut F)
    where
        F: FnMut(&LayoutBox, Rect),
    {
        let absolute = Rect::new(
            origin_x + self.rect.x,
            origin_y + self.rect.y,
            self.rect.width,
            self.rect.height,
        );
        visit(self, absolute);
        for child in &self.children {
            child.walk(absolute.x, absolute.y, visit);
        }
    }
}

/// A run of bordered character cells starting at the parent's origin.
pub fn cell_row(cells: &[Cell], constants: &LayoutConstants) -> Result<LayoutBox, LayoutError> {
    let geometry = cell_box_geometry(constants, cells.len())?;
    let pitch = geometry.pitch();
    let height = geometry.outer_height();

    let children = cells
        .iter()
        .enumerate()
        .map(|(index, glyph)| {
            LayoutBox::new(
                Rect::new(index as f32 * pitch, 0.0, pitch, height),
                BoxContent::Cell {
                    glyph: *glyph,
                    border: geometry.border_width,
                },
            )
        })
        .collect();

    Ok(LayoutBox::new(
        Rect::new(0.0, 0.0, geometry.total_row_width, height),
        BoxContent::CellRow,
    )
    .with_children(children))
}

/// Fixed-width label column followed by one line of cells.
pub fn label_field_row(
    label: &str,
    cells: &[Cell],
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    label_field_rows(label, std::slice::from_ref(&cells.to_vec()), constants)
}

/// Fixed-width label column followed by stacked lines of cells; the label spans all lines.
pub fn label_field_rows(
    label: &str,
    lines: &[Vec<Cell>],
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    let cells_x = constants.label_width + constants.field_gap;
    let line_height = constants.row_height();

    let mut widest = 0.0f32;
    let mut rows = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let row = cell_row(line, constants)?.placed_at(cells_x, index as f32 * line_height);
        widest = widest.max(row.rect.width);
        rows.push(row);
    }

    let height = line_height * lines.len().max(1) as f32;
    let mut row = LayoutBox::container(Rect::new(0.0, 0.0, cells_x + widest, height));
    row.push(label_box(label, constants.label_width, height));
    row.children.extend(rows);
    Ok(row)
}

fn label_box(label: &str, width: f32, height: f32) -> LayoutBox {
    LayoutBox::new(
        Rect::new(0.0, 0.0, width, height),
        BoxContent::Label {
            text: label.to_string(),
        },
    )
}

/// A piece of a segmented row: cells or an inline caption of fixed width.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Cells(Vec<Cell>),
    Caption { text: String, width: f32 },
}

/// Label column followed by cells interleaved with inline captions on one line.
pub fn segmented_row(
    label: &str,
    segments: &[Segment],
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    let height = constants.row_height();
    let mut x = constants.label_width + constants.field_gap;
    let mut children = vec![label_box(label, constants.label_width, height)];

    for segment in segments {
        let child = match segment {
            Segment::Cells(cells) => cell_row(cells, constants)?.placed_at(x, 0.0),
            Segment::Caption { text, width } => LayoutBox::new(
                Rect::new(x, 0.0, *width, height),
                BoxContent::Caption { text: text.clone() },
            ),
        };
        x = child.rect.right();
        children.push(child);
    }

    Ok(LayoutBox::container(Rect::new(0.0, 0.0, x, height)).with_children(children))
}

/// Label column followed by equally spaced checkbox options across the field area.
pub fn checkbox_row(
    label: &str,
    options: &[(&str, bool)],
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    let geometry = cell_box_geometry(constants, FIELD_CELLS)?;
    let height = geometry.outer_height();
    let origin = constants.label_width + constants.field_gap;
    let option_width = geometry.total_row_width / options.len().max(1) as f32;
    let caption_gap = constants.field_gap;

    let mut children = vec![label_box(label, constants.label_width, height)];
    for (index, (caption, checked)) in options.iter().enumerate() {
        let x = origin + index as f32 * option_width;
        children.push(LayoutBox::new(
            Rect::new(x, 0.0, height, height),
            BoxContent::Checkbox {
                checked: *checked,
                border: geometry.border_width,
            },
        ));
        children.push(LayoutBox::new(
            Rect::new(
                x + height + caption_gap,
                0.0,
                (option_width - height - caption_gap).max(0.0),
                height,
            ),
            BoxContent::Caption {
                text: caption.to_string(),
            },
        ));
    }

    Ok(LayoutBox::container(Rect::new(
        0.0,
        0.0,
        origin + geometry.total_row_width,
        height,
    ))
    .with_children(children))
}

/// Static text wrapped to `width` at the body font size.
pub fn paragraph(text: &str, width: f32, constants: &LayoutConstants) -> LayoutBox {
    let lines = wrap_words(text, chars_per_line(width, constants.font_size));
    let height = constants.line_height() * lines.len() as f32;
    LayoutBox::new(
        Rect::new(0.0, 0.0, width, height),
        BoxContent::Paragraph { lines },
    )
}

/// Section title spanning `width`.
pub fn heading(text: &str, width: f32, constants: &LayoutConstants) -> LayoutBox {
    LayoutBox::new(
        Rect::new(0.0, 0.0, width, constants.row_height()),
        BoxContent::Heading {
            text: text.to_string(),
        },
    )
}
