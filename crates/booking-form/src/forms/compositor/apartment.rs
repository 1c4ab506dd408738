use serde::Serialize;

use crate::forms::domain::{ApplicationRecord, UnitType};
use crate::forms::layout::tokenizer::{normalize_money, tokenize_row, Cell};
use crate::forms::layout::{
    heading, label_field_row, paragraph, segmented_row, LayoutBox, LayoutConstants, LayoutError,
    Segment, FIELD_CELLS,
};

use super::copy::{
    APARTMENT_HEADING, DECLARATION_HEADING, DECLARATION_TEXT, PLACE_CAPTION, PRICING_NOTE,
    SQ_FEET_CAPTION, SQ_METER_CAPTION,
};
use super::BlockBuilder;

const AREA_CELLS: usize = 8;
const DATE_CELLS: usize = 10;
const PLACE_CELLS: usize = 8;

/// Whether the apartment block carries the shared signature footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApartmentLayout {
    Standalone,
    WithSignatureFooter,
}

pub(super) fn compose(
    application: &ApplicationRecord,
    footer: Option<LayoutBox>,
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    let width = constants.content_width();
    let mut block = BlockBuilder::new(constants);

    block.stack_keyed("heading", heading(APARTMENT_HEADING, width, constants));
    block.stack_keyed(
        "tower",
        label_field_row("Tower", &single(&application.tower), constants)?,
    );
    block.stack_keyed(
        "apartment_number",
        label_field_row(
            "Apartment No.",
            &single(&application.apartment_number),
            constants,
        )?,
    );
    block.stack_keyed(
        "unit_type",
        label_field_row(
            "Unit Type",
            &single(UnitType::display(application.unit_type)),
            constants,
        )?,
    );
    block.stack_keyed(
        "floor",
        label_field_row("Floor", &single(&application.floor), constants)?,
    );
    block.stack_keyed("carpet_area", carpet_area_row(application, constants)?);
    block.stack_keyed(
        "unit_price",
        label_field_row(
            "Unit Price (Rs.)",
            &single(&normalize_money(&application.unit_price)),
            constants,
        )?,
    );
    block.stack_keyed("pricing_note", paragraph(PRICING_NOTE, width, constants));
    block.stack_keyed(
        "total_price",
        label_field_row(
            "Total Price (Rs.)",
            &single(&normalize_money(&application.total_price)),
            constants,
        )?,
    );
    block.stack_keyed(
        "declaration_heading",
        heading(DECLARATION_HEADING, width, constants),
    );
    block.stack_keyed("declaration", paragraph(DECLARATION_TEXT, width, constants));
    block.stack_keyed("date_place", date_place_row(application, constants)?);

    if let Some(footer) = footer {
        block.stack_anchored(footer);
    }

    Ok(block.finish("apartment".to_string()))
}

fn single(value: &str) -> Vec<Cell> {
    tokenize_row(Some(value), FIELD_CELLS)
}

/// Caption width that lets two short cell runs and two captions fill a standard field.
fn caption_width(constants: &LayoutConstants, used_cells: usize, captions: usize) -> f32 {
    let spare = FIELD_CELLS.saturating_sub(used_cells) as f32 * constants.cell_pitch();
    spare / captions.max(1) as f32
}

fn carpet_area_row(
    application: &ApplicationRecord,
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    let width = caption_width(constants, 2 * AREA_CELLS, 2);
    segmented_row(
        "Carpet Area",
        &[
            Segment::Cells(tokenize_row(
                Some(application.carpet_area_sq_meter.as_str()),
                AREA_CELLS,
            )),
            Segment::Caption {
                text: SQ_METER_CAPTION.to_string(),
                width,
            },
            Segment::Cells(tokenize_row(
                Some(application.carpet_area_sq_feet.as_str()),
                AREA_CELLS,
            )),
            Segment::Caption {
                text: SQ_FEET_CAPTION.to_string(),
                width,
            },
        ],
        constants,
    )
}

fn date_place_row(
    application: &ApplicationRecord,
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    segmented_row(
        "Date",
        &[
            Segment::Cells(tokenize_row(
                Some(application.declaration_date.as_str()),
                DATE_CELLS,
            )),
            Segment::Caption {
                text: PLACE_CAPTION.to_string(),
                width: caption_width(constants, DATE_CELLS + PLACE_CELLS, 1),
            },
            Segment::Cells(tokenize_row(
                Some(application.declaration_place.as_str()),
                PLACE_CELLS,
            )),
        ],
        constants,
    )
}
