use booking_form::applications::{
    ApplicationId, FormRenderer, FormRepository, FormServiceError, RepositoryError,
    StoredApplication,
};
use booking_form::config::FormConfig;
use booking_form::error::AppError;
use booking_form::forms::{DocumentRuntime, FormDataset};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFormRepository {
    records: Arc<Mutex<HashMap<ApplicationId, StoredApplication>>>,
}

impl FormRepository for InMemoryFormRepository {
    fn insert(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: StoredApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    /// Most recently updated first.
    fn list(&self, limit: usize) -> Result<Vec<StoredApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<StoredApplication> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        records.truncate(limit);
        Ok(records)
    }
}

/// Initialize the document runtime from configuration and build the shared renderer.
pub(crate) fn build_renderer(form: &FormConfig) -> Result<FormRenderer, AppError> {
    let constants = form.layout_constants()?;
    let runtime = DocumentRuntime::initialize(form.runtime_config())?;
    info!(variant = form.variant.name(), "form renderer ready");
    Ok(FormRenderer::new(runtime, constants)?)
}

pub(crate) fn read_template(path: Option<&Path>) -> Result<Option<Vec<u8>>, AppError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = std::fs::read(path)?;
    info!(path = %path.display(), bytes = bytes.len(), "loaded PDF template");
    Ok(Some(bytes))
}

/// Read a stored `formData` JSON document and apply submission validation.
pub(crate) fn load_dataset(path: &Path) -> Result<FormDataset, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let dataset: FormDataset = serde_json::from_str(&raw)?;
    dataset.validate().map_err(FormServiceError::from)?;
    Ok(dataset)
}
