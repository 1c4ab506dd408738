use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forms::{FormDataset, UnitType};

/// Opaque identifier assigned to a stored application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredApplication {
    pub id: ApplicationId,
    pub form_data: FormDataset,
    pub applicant_count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<UnitType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredApplication {
    pub fn new(id: ApplicationId, form_data: FormDataset, now: DateTime<Utc>) -> Self {
        Self {
            id,
            applicant_count: form_data.applicant_count,
            unit_type: form_data.application.unit_type,
            form_data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the form data, keeping the identifier and creation time.
    pub fn replace(&mut self, form_data: FormDataset, now: DateTime<Utc>) {
        self.applicant_count = form_data.applicant_count;
        self.unit_type = form_data.application.unit_type;
        self.form_data = form_data;
        self.updated_at = now;
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait FormRepository: Send + Sync {
    fn insert(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError>;
    fn update(&self, record: StoredApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError>;
    fn list(&self, limit: usize) -> Result<Vec<StoredApplication>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
