use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::forms::{
    DataUriResolver, DatasetError, DocumentFragment, FormDataset, ImageResolver, LayoutError,
    PagePlan,
};
use crate::pdf::{PdfMergeError, PdfMerger};

use super::renderer::{FormPreview, FormRenderer, GeneratedPdf};
use super::repository::{ApplicationId, FormRepository, RepositoryError, StoredApplication};

/// Service composing storage, image resolution, rendering and the PDF merge.
pub struct BookingFormService<R, M> {
    repository: Arc<R>,
    merger: Arc<M>,
    resolver: Arc<dyn ImageResolver>,
    renderer: FormRenderer,
    template: Option<Arc<[u8]>>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("form-{id:06}"))
}

impl<R, M> BookingFormService<R, M>
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    pub fn new(repository: Arc<R>, merger: Arc<M>, renderer: FormRenderer) -> Self {
        Self {
            repository,
            merger,
            resolver: Arc::new(DataUriResolver),
            renderer,
            template: None,
        }
    }

    pub fn with_image_resolver(mut self, resolver: Arc<dyn ImageResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_template(mut self, template: impl Into<Arc<[u8]>>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Validate and persist a new submission.
    pub fn submit(&self, dataset: FormDataset) -> Result<StoredApplication, FormServiceError> {
        dataset.validate()?;
        let record = StoredApplication::new(next_application_id(), dataset, Utc::now());
        let stored = self.repository.insert(record)?;
        info!(id = %stored.id, applicants = stored.form_data.applicants.len(), "application stored");
        Ok(stored)
    }

    /// Replace the form data of an existing application.
    pub fn update(
        &self,
        application_id: &ApplicationId,
        dataset: FormDataset,
    ) -> Result<StoredApplication, FormServiceError> {
        dataset.validate()?;
        let mut record = self.get(application_id)?;
        record.replace(dataset, Utc::now());
        self.repository.update(record.clone())?;
        info!(id = %record.id, "application updated");
        Ok(record)
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<StoredApplication, FormServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Interactive view of a stored application.
    pub fn preview(&self, application_id: &ApplicationId) -> Result<FormPreview, FormServiceError> {
        let record = self.get(application_id)?;
        Ok(self
            .renderer
            .preview(&record.form_data, self.resolver.as_ref())?)
    }

    /// Document markup for one designated template page.
    pub fn document_page(
        &self,
        application_id: &ApplicationId,
        page_number: u32,
    ) -> Result<DocumentFragment, FormServiceError> {
        if !PagePlan::is_designated(page_number) {
            return Err(FormServiceError::PageNotDesignated(page_number));
        }
        let record = self.get(application_id)?;
        let rendered = self
            .renderer
            .document(&record.form_data, self.resolver.as_ref())?;
        rendered
            .fragment(page_number)
            .cloned()
            .ok_or(FormServiceError::PageOmitted(page_number))
    }

    /// Merge the stored application onto the configured template.
    pub fn generate_pdf(
        &self,
        application_id: &ApplicationId,
    ) -> Result<GeneratedPdf, FormServiceError> {
        let template = self
            .template
            .as_ref()
            .ok_or(FormServiceError::TemplateMissing)?;
        let record = self.get(application_id)?;
        let generated = self.renderer.merge(
            self.merger.as_ref(),
            template,
            &record.form_data,
            self.resolver.as_ref(),
        )?;
        info!(
            id = %record.id,
            bytes = generated.bytes.len(),
            image_failures = generated.image_failures.len(),
            "generated application pdf"
        );
        Ok(generated)
    }
}

/// Error raised by the booking form service.
#[derive(Debug, thiserror::Error)]
pub enum FormServiceError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Merge(#[from] PdfMergeError),
    #[error("page {0} is not a designated form page")]
    PageNotDesignated(u32),
    #[error("page {0} is omitted for this application")]
    PageOmitted(u32),
    #[error("no PDF template is configured")]
    TemplateMissing,
}
