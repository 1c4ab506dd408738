use crate::forms::domain::{ApplicantRecord, ResidentialStatus};
use crate::forms::images::{ImageSlot, ResolvedImages};
use crate::forms::layout::tokenizer::{tokenize_multi_row, tokenize_row, Cell};
use crate::forms::layout::{
    checkbox_row, heading, label_field_row, label_field_rows, BoxContent, LayoutBox,
    LayoutConstants, LayoutError, Rect, FIELD_CELLS,
};

use super::copy::{joint_heading, PHOTO_PLACEHOLDER, PRIMARY_HEADING};
use super::{ApplicantSlotState, BlockBuilder};

const TAX_WARD_ROWS: usize = 2;
const ADDRESS_ROWS: usize = 3;

pub(super) fn compose(
    applicant: &ApplicantRecord,
    index: usize,
    slot: ApplicantSlotState,
    footer: Option<LayoutBox>,
    images: &ResolvedImages,
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    let title = match slot {
        ApplicantSlotState::Joint { index } => joint_heading(index),
        _ => PRIMARY_HEADING.to_string(),
    };

    let mut block = BlockBuilder::new(constants);
    let top = block.cursor();

    let photo = photo_slot(applicant, index, images, constants, top);
    let heading_width = constants.content_width() - constants.photo_width - constants.column_gap;
    block.stack_keyed("heading", heading(&title, heading_width, constants));
    block.advance_to(photo.rect.bottom() + constants.row_gap);
    block.overlay(photo);

    block.stack_keyed(
        "name",
        label_field_row("Name", &single(&applicant.display_name()), constants)?,
    );
    block.stack_keyed(
        "relation",
        label_field_row("S/o, W/o, D/o", &single(&applicant.relation), constants)?,
    );
    block.stack_keyed(
        "nationality",
        label_field_row("Nationality", &single(&applicant.nationality), constants)?,
    );
    block.stack_keyed("age", label_field_row("Age", &single(&applicant.age), constants)?);
    block.stack_keyed(
        "date_of_birth",
        label_field_row("Date of Birth", &single(&applicant.date_of_birth), constants)?,
    );
    block.stack_keyed(
        "profession",
        label_field_row("Profession", &single(&applicant.profession), constants)?,
    );
    block.stack_keyed(
        "national_id",
        label_field_row("National ID No.", &single(&applicant.national_id), constants)?,
    );
    block.stack_keyed(
        "residential_status",
        residential_status_row(applicant.residential_status(), constants)?,
    );
    block.stack_keyed(
        "tax_id",
        label_field_row("Tax ID No.", &single(&applicant.tax_id), constants)?,
    );
    block.stack_keyed(
        "tax_ward",
        label_field_rows(
            "Tax Ward / Circle",
            &tokenize_multi_row(Some(applicant.tax_ward.as_str()), FIELD_CELLS, TAX_WARD_ROWS),
            constants,
        )?,
    );
    block.stack_keyed(
        "address",
        label_field_rows(
            "Correspondence Address",
            &tokenize_multi_row(Some(applicant.address.as_str()), FIELD_CELLS, ADDRESS_ROWS),
            constants,
        )?,
    );
    block.stack_keyed(
        "phone",
        label_field_row("Telephone", &single(&applicant.phone), constants)?,
    );
    block.stack_keyed(
        "mobile",
        label_field_row("Mobile", &single(&applicant.mobile), constants)?,
    );
    block.stack_keyed(
        "email",
        label_field_row("E-mail", &single(&applicant.email), constants)?,
    );

    if let Some(footer) = footer {
        block.stack_anchored(footer);
    }

    Ok(block.finish(format!("applicant-{index}")))
}

fn single(value: &str) -> Vec<Cell> {
    tokenize_row(Some(value), FIELD_CELLS)
}

fn residential_status_row(
    status: Option<ResidentialStatus>,
    constants: &LayoutConstants,
) -> Result<LayoutBox, LayoutError> {
    let options: Vec<(&str, bool)> = ResidentialStatus::ordered()
        .into_iter()
        .map(|option| (option.label(), status == Some(option)))
        .collect();
    checkbox_row("Residential Status", &options, constants)
}

fn photo_slot(
    applicant: &ApplicantRecord,
    index: usize,
    images: &ResolvedImages,
    constants: &LayoutConstants,
    top: f32,
) -> LayoutBox {
    let x = constants.container_width - constants.outer_padding - constants.photo_width;
    let image = applicant
        .photograph
        .as_ref()
        .and_then(|_| images.get(ImageSlot::Photograph(index)))
        .cloned();

    LayoutBox::new(
        Rect::new(x, top, constants.photo_width, constants.photo_height()),
        BoxContent::Image {
            image,
            placeholder: PHOTO_PLACEHOLDER.to_string(),
        },
    )
    .with_key("photograph")
}
