use super::common::*;
use std::sync::Arc;

use crate::applications::repository::{ApplicationId, FormRepository, RepositoryError};
use crate::applications::{BookingFormService, FormServiceError};
use crate::forms::{DatasetError, ImageSlot, UnitType};
use crate::pdf::PdfMergeError;

#[test]
fn submit_rejects_datasets_without_a_primary_applicant() {
    let (service, repository, _) = build_service();

    match service.submit(empty_submission()) {
        Err(FormServiceError::Dataset(DatasetError::MissingPrimaryApplicant)) => {}
        other => panic!("expected dataset error, got {other:?}"),
    }
    assert!(repository.list(10).expect("list succeeds").is_empty());
}

#[test]
fn submit_rejects_more_than_three_applicants() {
    let (service, _, _) = build_service();
    let mut dataset = submission();
    dataset.applicants.resize(4, dataset.applicants[1].clone());

    match service.submit(dataset) {
        Err(FormServiceError::Dataset(DatasetError::TooManyApplicants { count: 4 })) => {}
        other => panic!("expected too many applicants, got {other:?}"),
    }
}

#[test]
fn submit_persists_record_with_denormalized_fields() {
    let (service, repository, _) = build_service();

    let record = service.submit(submission()).expect("submission stored");
    assert!(record.id.0.starts_with("form-"));
    assert_eq!(record.applicant_count, 1);
    assert_eq!(record.unit_type, Some(UnitType::ThreeBhk));
    assert_eq!(record.created_at, record.updated_at);

    let stored = repository
        .fetch(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);
}

#[test]
fn update_replaces_form_data_and_keeps_creation_time() {
    let (service, _, _) = build_service();
    let record = service.submit(submission()).expect("submission stored");

    let updated = service
        .update(&record.id, joint_submission())
        .expect("update succeeds");
    assert_eq!(updated.id, record.id);
    assert_eq!(updated.created_at, record.created_at);
    assert!(updated.updated_at >= record.updated_at);
    assert_eq!(updated.applicant_count, 2);
    assert_eq!(service.get(&record.id).expect("record present"), updated);
}

#[test]
fn update_of_unknown_application_is_not_found() {
    let (service, _, _) = build_service();
    match service.update(&ApplicationId("form-missing".to_string()), submission()) {
        Err(FormServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn get_propagates_repository_outage() {
    let service = BookingFormService::new(
        Arc::new(UnavailableRepository),
        Arc::new(RecordingMerger::default()),
        renderer(),
    );
    match service.get(&ApplicationId("form-000001".to_string())) {
        Err(FormServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[test]
fn preview_reports_unresolved_signature_without_failing() {
    let (service, _, _) = build_service();
    let record = service.submit(submission()).expect("submission stored");

    let preview = service.preview(&record.id).expect("preview renders");
    assert_eq!(preview.view.blocks.len(), 2);
    assert!(preview.reconciliation.agrees());
    assert_eq!(preview.image_failures.len(), 1);
    assert_eq!(preview.image_failures[0].slot, ImageSlot::Signature(0));
}

#[test]
fn document_page_serves_designated_pages_only() {
    let (service, _, _) = build_service();
    let record = service.submit(submission()).expect("submission stored");

    let page = service
        .document_page(&record.id, 5)
        .expect("first applicant page renders");
    assert_eq!(page.page_number, 5);
    assert!(page.html.starts_with("<!DOCTYPE html>"));

    assert!(matches!(
        service.document_page(&record.id, 6),
        Err(FormServiceError::PageOmitted(6))
    ));
    assert!(matches!(
        service.document_page(&record.id, 3),
        Err(FormServiceError::PageNotDesignated(3))
    ));
}

#[test]
fn generate_pdf_requires_a_template() {
    let (service, _, merger) = build_service();
    let record = service.submit(submission()).expect("submission stored");

    assert!(!service.has_template());
    assert!(matches!(
        service.generate_pdf(&record.id),
        Err(FormServiceError::TemplateMissing)
    ));
    assert!(merger.calls().is_empty());
}

#[test]
fn generate_pdf_stamps_rendered_pages_and_drops_absent_ones() {
    let (service, _, merger) = build_service();
    let service = service.with_template(vec![0u8; 32]);
    let record = service.submit(submission()).expect("submission stored");

    let generated = service.generate_pdf(&record.id).expect("pdf generated");
    assert_eq!(generated.bytes, b"%PDF-1.7 merged".to_vec());
    assert_eq!(generated.summary.rendered_pages, vec![5, 8]);
    assert_eq!(generated.image_failures.len(), 1);

    let calls = merger.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].template_len, 32);
    assert_eq!(calls[0].stamped_pages, vec![5, 8]);
    assert_eq!(calls[0].omitted_pages, vec![6, 7]);
}

#[test]
fn merge_failures_surface_unchanged() {
    let repository = Arc::new(MemoryRepository::default());
    let service = BookingFormService::new(repository, Arc::new(BrokenTemplateMerger), renderer())
        .with_template(vec![1u8, 2, 3]);
    let record = service.submit(submission()).expect("submission stored");

    match service.generate_pdf(&record.id) {
        Err(FormServiceError::Merge(PdfMergeError::PageOutOfRange {
            page: 8,
            page_count: 4,
        })) => {}
        other => panic!("expected merge error, got {other:?}"),
    }
}
