use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::applications::repository::{
    ApplicationId, FormRepository, RepositoryError, StoredApplication,
};
use crate::applications::{application_router, BookingFormService, FormRenderer};
use crate::forms::{
    ApplicantRecord, ApplicationRecord, DocumentRuntime, DocumentRuntimeConfig, FormDataset,
    ImageRef, LayoutConstants, UnitType,
};
use crate::pdf::{PageOverlay, PdfMergeError, PdfMerger};

pub(super) fn renderer() -> FormRenderer {
    let runtime = DocumentRuntime::initialize(DocumentRuntimeConfig::default())
        .expect("runtime initializes with defaults");
    FormRenderer::new(runtime, LayoutConstants::default()).expect("renderer builds")
}

pub(super) fn submission() -> FormDataset {
    FormDataset {
        applicants: vec![
            ApplicantRecord {
                title: "Ms.".to_string(),
                name: "Asha Rao".to_string(),
                nationality: "Indian".to_string(),
                residential_status: "Resident".to_string(),
                mobile: "98450 12345".to_string(),
                signature: Some(ImageRef("vault://signatures/asha-rao.png".to_string())),
                ..ApplicantRecord::default()
            },
            ApplicantRecord::default(),
        ],
        application: ApplicationRecord {
            tower: "B".to_string(),
            apartment_number: "1204".to_string(),
            unit_type: Some(UnitType::ThreeBhk),
            unit_price: "₹12,34,567".to_string(),
            ..ApplicationRecord::default()
        },
        applicant_count: 1,
    }
}

pub(super) fn joint_submission() -> FormDataset {
    let mut dataset = submission();
    dataset.applicants[1].name = "Vikram Rao".to_string();
    dataset.applicant_count = 2;
    dataset
}

pub(super) fn empty_submission() -> FormDataset {
    FormDataset {
        applicants: Vec::new(),
        ..submission()
    }
}

pub(super) fn build_service() -> (
    BookingFormService<MemoryRepository, RecordingMerger>,
    Arc<MemoryRepository>,
    Arc<RecordingMerger>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let merger = Arc::new(RecordingMerger::default());
    let service = BookingFormService::new(repository.clone(), merger.clone(), renderer());
    (service, repository, merger)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, StoredApplication>>>,
}

impl FormRepository for MemoryRepository {
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
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<StoredApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().take(limit).cloned().collect())
    }
}

pub(super) struct ConflictRepository;

impl FormRepository for ConflictRepository {
    fn insert(&self, _record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: StoredApplication) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        Ok(None)
    }

    fn list(&self, _limit: usize) -> Result<Vec<StoredApplication>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl FormRepository for UnavailableRepository {
    fn insert(&self, _record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: StoredApplication) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _limit: usize) -> Result<Vec<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Merge call as seen by the merger: stamped pages and deleted pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct MergeCall {
    pub(super) template_len: usize,
    pub(super) stamped_pages: Vec<u32>,
    pub(super) omitted_pages: Vec<u32>,
}

#[derive(Default)]
pub(super) struct RecordingMerger {
    calls: Mutex<Vec<MergeCall>>,
}

impl RecordingMerger {
    pub(super) fn calls(&self) -> Vec<MergeCall> {
        self.calls.lock().expect("merger mutex poisoned").clone()
    }
}

impl PdfMerger for RecordingMerger {
    fn merge(
        &self,
        template: &[u8],
        overlays: &[PageOverlay<'_>],
        omitted_pages: &[u32],
    ) -> Result<Vec<u8>, PdfMergeError> {
        self.calls
            .lock()
            .expect("merger mutex poisoned")
            .push(MergeCall {
                template_len: template.len(),
                stamped_pages: overlays
                    .iter()
                    .map(|overlay| overlay.fragment.page_number)
                    .collect(),
                omitted_pages: omitted_pages.to_vec(),
            });
        Ok(b"%PDF-1.7 merged".to_vec())
    }
}

pub(super) struct BrokenTemplateMerger;

impl PdfMerger for BrokenTemplateMerger {
    fn merge(
        &self,
        _template: &[u8],
        _overlays: &[PageOverlay<'_>],
        _omitted_pages: &[u32],
    ) -> Result<Vec<u8>, PdfMergeError> {
        Err(PdfMergeError::PageOutOfRange {
            page: 8,
            page_count: 4,
        })
    }
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) fn application_router_with_service(
    service: BookingFormService<MemoryRepository, RecordingMerger>,
) -> axum::Router {
    application_router(Arc::new(service))
}
