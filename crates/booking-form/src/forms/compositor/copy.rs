//! Fixed captions and legal text printed on the form.

pub const PRIMARY_HEADING: &str = "SOLE OR FIRST APPLICANT(S)";
pub const APARTMENT_HEADING: &str = "APARTMENT DETAILS";
pub const DECLARATION_HEADING: &str = "DECLARATION";

pub const PHOTO_PLACEHOLDER: &str = "Affix recent passport size photograph";
pub const PRIMARY_SIGNATURE_PLACEHOLDER: &str = "Sole/First Applicant";
pub const SECOND_SIGNATURE_PLACEHOLDER: &str = "Second Applicant, if any";

pub const SQ_METER_CAPTION: &str = "Sq. Mtr.";
pub const SQ_FEET_CAPTION: &str = "Sq. Ft.";
pub const PLACE_CAPTION: &str = "Place";

pub const PRICING_NOTE: &str = "Note: The unit price is inclusive of the cost of the \
apartment, proportionate share of the land and common areas, and car parking where \
allotted. Stamp duty, registration charges, applicable taxes, maintenance deposits \
and utility connection charges are payable separately at actuals as and when demanded.";

pub const DECLARATION_TEXT: &str = "I/We declare that the particulars furnished above \
are true and correct to the best of my/our knowledge and belief, and that I/We have \
read and understood the terms and conditions of allotment and agree to abide by them. \
I/We understand that this application does not constitute an agreement for sale and \
that the allotment is subject to execution of the agreement and payment as per the \
agreed schedule.";

pub fn joint_heading(index: usize) -> String {
    format!("JOINT APPLICANT {index}")
}
