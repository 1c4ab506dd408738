//! End-to-end rendering of booking forms through the public facade.
//!
//! Datasets arrive as the JSON the booking front-end stores, and assertions only touch
//! the rendered outputs: the interactive view tree and the designated document pages.

use booking_form::applications::FormRenderer;
use booking_form::forms::{
    DataUriResolver, DocumentRuntime, DocumentRuntimeConfig, FormDataset, LayoutConstants,
    LayoutVariant,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn renderer(variant: LayoutVariant) -> FormRenderer {
    let runtime = DocumentRuntime::initialize(DocumentRuntimeConfig::default())
        .expect("runtime initializes");
    FormRenderer::new(runtime, variant.constants()).expect("renderer builds")
}

fn asha_rao_payload() -> FormDataset {
    serde_json::from_value(json!({
        "applicantCount": 1,
        "applicants": [
            {
                "title": "Ms.",
                "name": "Asha Rao",
                "nationality": "Indian",
                "residentialStatus": "Resident",
                "signature": "https://cdn.example.in/signatures/asha.png"
            },
            { "name": "" },
            { "name": "" }
        ],
        "application": {
            "tower": "B",
            "apartmentNumber": "1204",
            "unitType": "3bhk",
            "unitPrice": "₹12,34,567"
        }
    }))
    .expect("payload deserializes")
}

#[test]
fn asha_rao_renders_one_applicant_and_the_apartment() {
    let renderer = renderer(LayoutVariant::Compact);
    let dataset = asha_rao_payload();

    let preview = renderer
        .preview(&dataset, &DataUriResolver)
        .expect("preview renders");
    assert_eq!(preview.view.blocks.len(), 2);
    assert_eq!(preview.image_failures.len(), 1);

    let applicant = &preview.view.blocks[0].root;
    let heading = applicant.find("heading").expect("heading");
    assert_eq!(heading.text.as_deref(), Some("SOLE OR FIRST APPLICANT(S)"));
    let primary = applicant.find("signature_primary").expect("footer slot");
    assert_eq!(primary.text.as_deref(), Some("Sole/First Applicant"));
    let second = applicant.find("signature_second").expect("footer slot");
    assert_eq!(second.text.as_deref(), Some("Second Applicant, if any"));

    let unit_type = preview.view.blocks[1]
        .root
        .find("unit_type")
        .expect("unit type row");
    let glyphs: String = unit_type
        .children
        .iter()
        .filter(|child| child.role == "cell_row")
        .flat_map(|row| row.children.iter())
        .filter_map(|cell| cell.text.clone())
        .collect();
    assert_eq!(glyphs, "3 BHK");

    let price = preview.view.blocks[1]
        .root
        .find("unit_price")
        .expect("unit price row");
    let digits: String = price
        .children
        .iter()
        .filter(|child| child.role == "cell_row")
        .flat_map(|row| row.children.iter())
        .filter_map(|cell| cell.text.clone())
        .collect();
    assert_eq!(digits, "1234567");
}

#[test]
fn document_pages_follow_the_slot_plan() {
    let renderer = renderer(LayoutVariant::Compact);
    let rendered = renderer
        .document(&asha_rao_payload(), &DataUriResolver)
        .expect("document renders");

    let summary = rendered.summary();
    assert_eq!(summary.rendered_pages, vec![5, 8]);
    assert_eq!(summary.omitted_pages, vec![6, 7]);
    assert!(rendered.fragment(6).is_none());

    let last = rendered.fragment(8).expect("apartment page");
    assert!(last.html.contains("APARTMENT DETAILS"));
    assert!(last.html.contains("Second Applicant, if any"));
}

#[test]
fn rendering_is_deterministic() {
    let renderer = renderer(LayoutVariant::Compact);
    let dataset = asha_rao_payload();

    let first = renderer
        .document(&dataset, &DataUriResolver)
        .expect("renders");
    let second = renderer
        .document(&dataset, &DataUriResolver)
        .expect("renders");
    for (a, b) in first.fragments.iter().zip(&second.fragments) {
        assert_eq!(a.html.as_bytes(), b.html.as_bytes());
    }

    let a = serde_json::to_vec(&renderer.preview(&dataset, &DataUriResolver).expect("preview"))
        .expect("serializes");
    let b = serde_json::to_vec(&renderer.preview(&dataset, &DataUriResolver).expect("preview"))
        .expect("serializes");
    assert_eq!(a, b);
}

#[test]
fn wide_variant_uses_thicker_borders() {
    let wide = renderer(LayoutVariant::Wide);
    assert_eq!(wide.constants(), &LayoutConstants::WIDE);

    let rendered = wide
        .document(&asha_rao_payload(), &DataUriResolver)
        .expect("document renders");
    let first = rendered.fragment(5).expect("first applicant page");
    assert!(first.html.contains("border:1.5px solid"));
}
