use crate::infra::build_renderer;
use crate::render::{join_pages, print_image_failures, print_plan};
use booking_form::applications::FormRenderer;
use booking_form::config::AppConfig;
use booking_form::error::AppError;
use booking_form::forms::{
    ApplicantRecord, ApplicationRecord, DataUriResolver, FormDataset, ImageRef, LayoutVariant,
    UnitType,
};
use clap::Args;

/// 1x1 PNG used as the sample photograph.
const SAMPLE_PHOTOGRAPH: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Number of joint applicants added after the first applicant (0-2)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub(crate) joint_applicants: u8,
    /// Layout variant to render with (wide or compact). Defaults to FORM_LAYOUT_VARIANT.
    #[arg(long, value_parser = parse_variant)]
    pub(crate) variant: Option<LayoutVariant>,
}

fn parse_variant(value: &str) -> Result<LayoutVariant, String> {
    LayoutVariant::from_name(value).ok_or_else(|| format!("unknown layout variant `{value}`"))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(variant) = args.variant {
        config.form.variant = variant;
    }

    println!("Booking form compiler demo ({} layout)", config.form.variant.name());
    let renderer = build_renderer(&config.form)?;
    let dataset = sample_dataset(args.joint_applicants);
    for line in describe_sample(&renderer, &dataset)? {
        println!("{line}");
    }

    let document = renderer.document(&dataset, &DataUriResolver)?;
    print_plan(&document);
    for fragment in &document.fragments {
        println!(
            "  - page {}: {}x{} px, {} bytes of markup",
            fragment.page_number,
            fragment.width,
            fragment.height,
            fragment.html.len()
        );
    }
    print_image_failures(&document.image_failures);
    Ok(())
}

/// Summary lines for the interactive preview of `dataset`.
pub(crate) fn describe_sample(
    renderer: &FormRenderer,
    dataset: &FormDataset,
) -> Result<Vec<String>, AppError> {
    let preview = renderer.preview(dataset, &DataUriResolver)?;
    let mut lines = vec![format!(
        "- Applicant count hint {} | {} named applicant(s) rendered",
        preview.reconciliation.hinted, preview.reconciliation.rendered
    )];
    if !preview.reconciliation.agrees() {
        lines.push("  Hint ignored: named slots decide what is printed".to_string());
    }
    lines.push(format!(
        "- Interactive view: {} block(s) in a {} px container",
        preview.view.blocks.len(),
        preview.view.container_width
    ));
    let pages = renderer.document(dataset, &DataUriResolver)?.summary();
    lines.push(format!(
        "- Designated pages rendered: {}",
        join_pages(&pages.rendered_pages)
    ));
    Ok(lines)
}

/// A Bengaluru booking with `joint_applicants` extra named applicants.
///
/// The hint always claims a single applicant so the demo shows name presence winning.
pub(crate) fn sample_dataset(joint_applicants: u8) -> FormDataset {
    let mut applicants = vec![ApplicantRecord {
        title: "Ms.".to_string(),
        name: "Asha Rao".to_string(),
        relation: "D/o Prakash Rao".to_string(),
        nationality: "Indian".to_string(),
        age: "34".to_string(),
        date_of_birth: "14/02/1990".to_string(),
        profession: "Architect".to_string(),
        national_id: "5123 4567 8901".to_string(),
        residential_status: "Resident".to_string(),
        tax_id: "ABCPR1234K".to_string(),
        tax_ward: "Ward 14(2), Bengaluru South".to_string(),
        address: "Flat 4B, Lakeview Residency, 2nd Cross, Indiranagar, Bengaluru 560038"
            .to_string(),
        mobile: "98450 12345".to_string(),
        email: "asha.rao@example.in".to_string(),
        photograph: Some(ImageRef(SAMPLE_PHOTOGRAPH.to_string())),
        signature: Some(ImageRef("vault://signatures/asha-rao.png".to_string())),
        ..ApplicantRecord::default()
    }];

    let joint = [("Mr.", "Vikram Rao", "Non-Resident"), ("Mrs.", "Meera Rao", "Resident")];
    for (title, name, status) in joint.iter().take(usize::from(joint_applicants)) {
        applicants.push(ApplicantRecord {
            title: title.to_string(),
            name: name.to_string(),
            nationality: "Indian".to_string(),
            residential_status: status.to_string(),
            ..ApplicantRecord::default()
        });
    }

    FormDataset {
        applicants,
        application: ApplicationRecord {
            tower: "B".to_string(),
            apartment_number: "1204".to_string(),
            unit_type: Some(UnitType::ThreeBhk),
            floor: "12".to_string(),
            carpet_area_sq_meter: "118.5".to_string(),
            carpet_area_sq_feet: "1275".to_string(),
            unit_price: "₹12,34,567".to_string(),
            total_price: "₹1,62,45,000".to_string(),
            declaration_date: "01/03/2024".to_string(),
            declaration_place: "Bengaluru".to_string(),
        },
        applicant_count: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_form::forms::{DocumentRuntime, DocumentRuntimeConfig, LayoutConstants};

    fn renderer() -> FormRenderer {
        let runtime = DocumentRuntime::initialize(DocumentRuntimeConfig::default())
            .expect("runtime initializes");
        FormRenderer::new(runtime, LayoutConstants::default()).expect("renderer builds")
    }

    #[test]
    fn sample_adds_requested_joint_applicants() {
        assert_eq!(sample_dataset(0).applicants.len(), 1);
        let household = sample_dataset(2);
        assert_eq!(household.applicants.len(), 3);
        assert_eq!(household.applicants[2].name, "Meera Rao");
        assert!(household.validate().is_ok());
    }

    #[test]
    fn describe_sample_reports_hint_mismatch() {
        let lines = describe_sample(&renderer(), &sample_dataset(1)).expect("sample renders");

        assert!(lines[0].contains("hint 1 | 2 named"));
        assert!(lines.iter().any(|line| line.contains("Hint ignored")));
        assert!(lines
            .iter()
            .any(|line| line == "- Designated pages rendered: 5, 6, 8"));
    }

    #[test]
    fn variant_names_parse_case_insensitively() {
        assert_eq!(parse_variant("Wide"), Ok(LayoutVariant::Wide));
        assert!(parse_variant("tabloid").is_err());
    }
}
