use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::forms::layout::tokenizer::cells_to_string;
use crate::forms::layout::{BoxContent, LayoutBox};
use crate::forms::{
    ApplicantRecord, ApplicationRecord, DocumentBackend, DocumentRuntime, DocumentRuntimeConfig,
    FormCompositor, FormDataset, ImageRef, LayoutConstants, UnitType,
};

pub(super) fn constants() -> LayoutConstants {
    LayoutConstants::default()
}

pub(super) fn compositor() -> FormCompositor {
    FormCompositor::new(constants()).expect("default constants are valid")
}

pub(super) fn document_backend() -> DocumentBackend {
    let runtime = DocumentRuntime::initialize(DocumentRuntimeConfig::default())
        .expect("runtime initializes with defaults");
    DocumentBackend::new(runtime, constants())
}

pub(super) fn asha_rao() -> ApplicantRecord {
    ApplicantRecord {
        title: "Ms.".to_string(),
        name: "Asha Rao".to_string(),
        relation: "D/o Mohan Rao".to_string(),
        nationality: "Indian".to_string(),
        age: "34".to_string(),
        date_of_birth: "12/04/1991".to_string(),
        profession: "Architect".to_string(),
        national_id: "4821 7730 1942".to_string(),
        residential_status: "Resident".to_string(),
        tax_id: "ABCPR1234K".to_string(),
        tax_ward: "Ward 14(2), Bengaluru South".to_string(),
        address: "Flat 4B, Lakeview Residency, 2nd Cross, Indiranagar, Bengaluru 560038"
            .to_string(),
        phone: "080 2521 4400".to_string(),
        mobile: "98450 12345".to_string(),
        email: "asha.rao@example.in".to_string(),
        photograph: None,
        // Stored reference the default resolver cannot read.
        signature: Some(ImageRef("vault://signatures/asha-rao.png".to_string())),
    }
}

pub(super) fn application() -> ApplicationRecord {
    ApplicationRecord {
        tower: "B".to_string(),
        apartment_number: "1204".to_string(),
        unit_type: Some(UnitType::ThreeBhk),
        floor: "12".to_string(),
        carpet_area_sq_meter: "132.5".to_string(),
        carpet_area_sq_feet: "1426".to_string(),
        unit_price: "₹12,34,567".to_string(),
        total_price: "₹1,62,45,000".to_string(),
        declaration_date: "01/10/2026".to_string(),
        declaration_place: "Bengaluru".to_string(),
    }
}

/// One applicant, trailing unnamed joint slots, and a 3 BHK apartment.
pub(super) fn sole_applicant_dataset() -> FormDataset {
    FormDataset {
        applicants: vec![
            asha_rao(),
            ApplicantRecord::default(),
            ApplicantRecord::default(),
        ],
        application: application(),
        applicant_count: 1,
    }
}

pub(super) fn joint_applicant(name: &str) -> ApplicantRecord {
    ApplicantRecord {
        name: name.to_string(),
        nationality: "Indian".to_string(),
        residential_status: "Non-Resident".to_string(),
        ..ApplicantRecord::default()
    }
}

pub(super) fn three_applicant_dataset() -> FormDataset {
    FormDataset {
        applicants: vec![
            asha_rao(),
            joint_applicant("Vikram Rao"),
            joint_applicant("Meera Rao"),
        ],
        application: application(),
        applicant_count: 3,
    }
}

/// A small PNG encoded as a data URI.
pub(super) fn png_data_uri() -> ImageRef {
    let pixels = RgbImage::from_pixel(4, 3, image::Rgb([20, 40, 160]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(pixels)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png encodes");
    ImageRef(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

/// Text held by the cell rows of a keyed field, lines joined with `|`.
pub(super) fn field_text(root: &LayoutBox, key: &str) -> String {
    let row = root.find(key).expect("field row present");
    row.children
        .iter()
        .filter(|child| matches!(child.content, BoxContent::CellRow))
        .map(|line| {
            let cells: Vec<_> = line
                .children
                .iter()
                .map(|cell| match cell.content {
                    BoxContent::Cell { glyph, .. } => glyph,
                    _ => None,
                })
                .collect();
            cells_to_string(&cells)
        })
        .collect::<Vec<_>>()
        .join("|")
}

pub(super) fn checkbox_states(root: &LayoutBox, key: &str) -> Vec<bool> {
    let row = root.find(key).expect("checkbox row present");
    row.children
        .iter()
        .filter_map(|child| match child.content {
            BoxContent::Checkbox { checked, .. } => Some(checked),
            _ => None,
        })
        .collect()
}

pub(super) fn heading_text(root: &LayoutBox) -> String {
    match &root.find("heading").expect("heading present").content {
        BoxContent::Heading { text } => text.clone(),
        other => panic!("expected heading, got {other:?}"),
    }
}

pub(super) fn placeholder_text(root: &LayoutBox, key: &str) -> Option<String> {
    match &root.find(key)?.content {
        BoxContent::Image {
            image: None,
            placeholder,
        } => Some(placeholder.clone()),
        _ => None,
    }
}
