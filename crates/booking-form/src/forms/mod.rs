//! Layout compiler for the booking application form.
//!
//! Data flows one way: [`domain`] records are tokenized into character cells, the
//! [`layout`] engine turns cells into positioned boxes, the [`compositor`] assembles
//! applicant and apartment blocks, and a [`render`] backend draws them.

pub mod compositor;
pub mod domain;
pub mod images;
pub mod layout;
pub mod render;

#[cfg(test)]
mod tests;

pub use compositor::{
    ApartmentLayout, ApplicantSlotState, BlockKind, ComposedForm, FormBlock, FormCompositor,
    PagePlan, PagePlanSummary, PlannedPage, APARTMENT_PAGE, FIRST_APPLICANT_PAGE,
};
pub use domain::{
    ApplicantCountReconciliation, ApplicantRecord, ApplicationRecord, DatasetError, FormDataset,
    ImageRef, ResidentialStatus, UnitType, MAX_APPLICANTS,
};
pub use images::{
    resolve_images, DataUriResolver, ImageError, ImageFailure, ImageResolver, ImageSlot,
    ResolvedImage, ResolvedImages,
};
pub use layout::{
    cell_box_geometry, CellGeometry, LayoutConstants, LayoutError, LayoutVariant, FIELD_CELLS,
};
pub use render::{
    DocumentBackend, DocumentFragment, DocumentRuntime, DocumentRuntimeConfig,
    DocumentRuntimeError, InteractiveBackend, InteractiveView,
};
