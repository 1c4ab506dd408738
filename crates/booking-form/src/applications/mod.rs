//! Application intake, storage and document generation around the form compiler.

pub mod renderer;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use renderer::{FormPreview, FormRenderer, GeneratedPdf, RenderedDocument};
pub use repository::{ApplicationId, FormRepository, RepositoryError, StoredApplication};
pub use router::application_router;
pub use service::{BookingFormService, FormServiceError};
