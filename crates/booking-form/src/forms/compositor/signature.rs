use tracing::debug;

use crate::forms::domain::FormDataset;
use crate::forms::images::{ImageSlot, ResolvedImages};
use crate::forms::layout::{BoxContent, LayoutBox, LayoutConstants, Rect};

use super::copy::{PRIMARY_SIGNATURE_PLACEHOLDER, SECOND_SIGNATURE_PLACEHOLDER};

const SIGNATURE_SLOTS: [(usize, &str, &str); 2] = [
    (0, "signature_primary", PRIMARY_SIGNATURE_PLACEHOLDER),
    (1, "signature_second", SECOND_SIGNATURE_PLACEHOLDER),
];

/// The footer is present when either of the first two applicants carries a
/// signature reference. A slot whose image did not resolve shows its caption.
pub(super) fn compose(
    dataset: &FormDataset,
    images: &ResolvedImages,
    constants: &LayoutConstants,
) -> Option<LayoutBox> {
    let referenced = SIGNATURE_SLOTS.iter().any(|(index, _, _)| {
        dataset
            .applicant(*index)
            .is_some_and(|applicant| applicant.signature.is_some())
    });
    if !referenced {
        debug!("no signatures supplied, omitting signature footer");
        return None;
    }

    let width = constants.content_width();
    let slot_width = (width - constants.column_gap) / 2.0;
    let height = constants.signature_height;

    let children = SIGNATURE_SLOTS
        .iter()
        .enumerate()
        .map(|(position, (index, key, placeholder))| {
            let image = dataset
                .applicant(*index)
                .and_then(|applicant| applicant.signature.as_ref())
                .and_then(|_| images.get(ImageSlot::Signature(*index)))
                .cloned();
            let x = position as f32 * (slot_width + constants.column_gap);
            LayoutBox::new(
                Rect::new(x, 0.0, slot_width, height),
                BoxContent::Image {
                    image,
                    placeholder: placeholder.to_string(),
                },
            )
            .with_key(*key)
        })
        .collect();

    Some(
        LayoutBox::container(Rect::new(0.0, 0.0, width, height))
            .with_key("signature_footer")
            .with_children(children),
    )
}
