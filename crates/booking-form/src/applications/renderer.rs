use serde::Serialize;
use tracing::debug;

use crate::forms::{
    resolve_images, ApplicantCountReconciliation, DocumentBackend, DocumentFragment,
    DocumentRuntime, FormCompositor, FormDataset, ImageFailure, ImageResolver,
    InteractiveBackend, InteractiveView, LayoutConstants, LayoutError, PagePlan,
    PagePlanSummary,
};
use crate::pdf::{PageOverlay, PdfMerger};

use super::service::FormServiceError;

/// Interactive preview plus the diagnostics gathered while building it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPreview {
    pub view: InteractiveView,
    pub reconciliation: ApplicantCountReconciliation,
    pub image_failures: Vec<ImageFailure>,
}

/// Document fragments for every rendered designated page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub plan: PagePlan,
    pub fragments: Vec<DocumentFragment>,
    pub image_failures: Vec<ImageFailure>,
}

impl RenderedDocument {
    pub fn summary(&self) -> PagePlanSummary {
        self.plan.summary()
    }

    pub fn fragment(&self, page_number: u32) -> Option<&DocumentFragment> {
        self.fragments
            .iter()
            .find(|fragment| fragment.page_number == page_number)
    }
}

/// Merged PDF bytes; image failures are reported even though the merge succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub summary: PagePlanSummary,
    pub image_failures: Vec<ImageFailure>,
}

/// One compositor feeding both backends with a single set of constants.
#[derive(Debug, Clone, Copy)]
pub struct FormRenderer {
    compositor: FormCompositor,
    interactive: InteractiveBackend,
    document: DocumentBackend,
}

impl FormRenderer {
    pub fn new(
        runtime: &'static DocumentRuntime,
        constants: LayoutConstants,
    ) -> Result<Self, LayoutError> {
        let compositor = FormCompositor::new(constants)?;
        Ok(Self {
            compositor,
            interactive: InteractiveBackend::new(constants),
            document: DocumentBackend::new(runtime, constants),
        })
    }

    pub fn constants(&self) -> &LayoutConstants {
        self.compositor.constants()
    }

    pub fn preview(
        &self,
        dataset: &FormDataset,
        resolver: &dyn ImageResolver,
    ) -> Result<FormPreview, LayoutError> {
        let (images, image_failures) = resolve_images(dataset, resolver);
        let form = self.compositor.compose_form(dataset, &images)?;
        Ok(FormPreview {
            view: self.interactive.render(&form),
            reconciliation: form.reconciliation,
            image_failures,
        })
    }

    pub fn document(
        &self,
        dataset: &FormDataset,
        resolver: &dyn ImageResolver,
    ) -> Result<RenderedDocument, LayoutError> {
        let (images, image_failures) = resolve_images(dataset, resolver);
        let plan = self.compositor.plan_pages(dataset, &images)?;
        let fragments = self.document.render_plan(&plan);
        debug!(
            pages = fragments.len(),
            omitted = plan.omitted_pages.len(),
            "rendered designated pages"
        );
        Ok(RenderedDocument {
            plan,
            fragments,
            image_failures,
        })
    }

    pub fn merge(
        &self,
        merger: &dyn PdfMerger,
        template: &[u8],
        dataset: &FormDataset,
        resolver: &dyn ImageResolver,
    ) -> Result<GeneratedPdf, FormServiceError> {
        let rendered = self.document(dataset, resolver)?;
        let overlays = PageOverlay::pair(&rendered.plan, &rendered.fragments);
        let bytes = merger.merge(template, &overlays, &rendered.plan.omitted_pages)?;
        Ok(GeneratedPdf {
            bytes,
            summary: rendered.summary(),
            image_failures: rendered.image_failures,
        })
    }
}
