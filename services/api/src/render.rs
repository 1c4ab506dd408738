use crate::infra::{build_renderer, load_dataset, read_template};
use booking_form::applications::{FormServiceError, RenderedDocument};
use booking_form::config::AppConfig;
use booking_form::error::AppError;
use booking_form::forms::{DataUriResolver, ImageFailure};
use booking_form::pdf::LopdfMerger;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Stored `formData` JSON document
    #[arg(long)]
    pub(crate) dataset: PathBuf,
    /// Directory receiving page-N.html files and preview.json
    #[arg(long, default_value = "rendered")]
    pub(crate) out_dir: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct PdfArgs {
    /// Stored `formData` JSON document
    #[arg(long)]
    pub(crate) dataset: PathBuf,
    /// Booking PDF template (defaults to FORM_TEMPLATE_PATH)
    #[arg(long)]
    pub(crate) template: Option<PathBuf>,
    /// Destination for the merged PDF
    #[arg(long, default_value = "booking-form.pdf")]
    pub(crate) output: PathBuf,
}

pub(crate) fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let renderer = build_renderer(&config.form)?;
    let dataset = load_dataset(&args.dataset)?;

    let document = renderer.document(&dataset, &DataUriResolver)?;
    let preview = renderer.preview(&dataset, &DataUriResolver)?;

    fs::create_dir_all(&args.out_dir)?;
    let written = write_fragments(&document, &args.out_dir)?;
    let preview_path = args.out_dir.join("preview.json");
    fs::write(&preview_path, serde_json::to_vec_pretty(&preview)?)?;

    println!("Rendered {} designated page(s)", written.len());
    for path in &written {
        println!("- {}", path.display());
    }
    println!("- {}", preview_path.display());
    print_plan(&document);
    if !preview.reconciliation.agrees() {
        println!(
            "Applicant count hint {} differs from {} named applicant(s); named slots were used",
            preview.reconciliation.hinted, preview.reconciliation.rendered
        );
    }
    print_image_failures(&document.image_failures);
    Ok(())
}

pub(crate) fn run_pdf(args: PdfArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let template_path = args.template.or(config.form.template_path.clone());
    let Some(template) = read_template(template_path.as_deref())? else {
        return Err(FormServiceError::TemplateMissing.into());
    };

    let renderer = build_renderer(&config.form)?;
    let dataset = load_dataset(&args.dataset)?;
    let merger = LopdfMerger::new(*renderer.constants());
    let generated = renderer.merge(&merger, &template, &dataset, &DataUriResolver)?;

    fs::write(&args.output, &generated.bytes)?;
    println!(
        "Wrote {} ({} bytes)",
        args.output.display(),
        generated.bytes.len()
    );
    println!(
        "Stamped pages: {}",
        join_pages(&generated.summary.rendered_pages)
    );
    if !generated.summary.omitted_pages.is_empty() {
        println!(
            "Removed template pages: {}",
            join_pages(&generated.summary.omitted_pages)
        );
    }
    print_image_failures(&generated.image_failures);
    Ok(())
}

pub(crate) fn write_fragments(
    document: &RenderedDocument,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, AppError> {
    let mut written = Vec::with_capacity(document.fragments.len());
    for fragment in &document.fragments {
        let path = out_dir.join(format!("page-{}.html", fragment.page_number));
        fs::write(&path, fragment.html.as_bytes())?;
        written.push(path);
    }
    Ok(written)
}

pub(crate) fn print_plan(document: &RenderedDocument) {
    let summary = document.summary();
    println!("Page plan: {}", join_pages(&summary.rendered_pages));
    if summary.omitted_pages.is_empty() {
        println!("Omitted pages: none");
    } else {
        println!("Omitted pages: {}", join_pages(&summary.omitted_pages));
    }
}

pub(crate) fn print_image_failures(failures: &[ImageFailure]) {
    if failures.is_empty() {
        return;
    }
    println!("Images replaced by placeholders:");
    for failure in failures {
        println!("  - {}: {}", failure.slot, failure.error);
    }
}

pub(crate) fn join_pages(pages: &[u32]) -> String {
    pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
