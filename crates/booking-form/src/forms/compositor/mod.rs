//! Assembles tokenized rows into positioned applicant and apartment blocks.
//!
//! Composition is a pure function of the dataset, the resolved images and the layout
//! constants. Both render backends and the PDF merger consume the blocks produced here.

mod apartment;
mod applicant;
pub mod copy;
mod pages;
mod signature;

use serde::Serialize;
use tracing::debug;

use super::domain::{
    ApplicantCountReconciliation, ApplicantRecord, FormDataset, MAX_APPLICANTS,
};
use super::images::ResolvedImages;
use super::layout::{LayoutBox, LayoutConstants, LayoutError, Rect};

pub use apartment::ApartmentLayout;
pub use pages::{PagePlan, PagePlanSummary, PlannedPage, APARTMENT_PAGE, FIRST_APPLICANT_PAGE};

/// Rendering outcome for one applicant slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ApplicantSlotState {
    /// Joint slot without a name; contributes no output.
    Absent,
    /// Slot zero, rendered unconditionally.
    Primary,
    Joint { index: usize },
}

impl ApplicantSlotState {
    /// Name presence decides; the applicant-count hint is never consulted.
    pub fn for_slot(dataset: &FormDataset, index: usize) -> Self {
        if index == 0 {
            return Self::Primary;
        }
        match dataset.applicant(index) {
            Some(applicant) if index < MAX_APPLICANTS && applicant.has_name() => {
                Self::Joint { index }
            }
            _ => Self::Absent,
        }
    }

    pub fn is_rendered(self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// What a composed block represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum BlockKind {
    Applicant { slot: ApplicantSlotState },
    Apartment { layout: ApartmentLayout },
}

/// One page-equivalent layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FormBlock {
    pub kind: BlockKind,
    pub root: LayoutBox,
}

impl FormBlock {
    pub fn width(&self) -> f32 {
        self.root.rect.width
    }

    pub fn height(&self) -> f32 {
        self.root.rect.height
    }
}

/// Every block shown by the on-screen preview, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedForm {
    pub blocks: Vec<FormBlock>,
    pub reconciliation: ApplicantCountReconciliation,
}

impl ComposedForm {
    pub fn applicant_blocks(&self) -> impl Iterator<Item = &FormBlock> {
        self.blocks
            .iter()
            .filter(|block| matches!(block.kind, BlockKind::Applicant { .. }))
    }
}

/// Builds blocks for a fixed set of layout constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormCompositor {
    constants: LayoutConstants,
}

impl FormCompositor {
    /// Rejects malformed constants up front so composition itself cannot overflow.
    pub fn new(constants: LayoutConstants) -> Result<Self, LayoutError> {
        constants.validate()?;
        Ok(Self { constants })
    }

    pub fn constants(&self) -> &LayoutConstants {
        &self.constants
    }

    /// Block for applicant slot `index`, or `None` when the slot is absent.
    pub fn compose_applicant(
        &self,
        dataset: &FormDataset,
        index: usize,
        images: &ResolvedImages,
    ) -> Result<Option<FormBlock>, LayoutError> {
        let slot = ApplicantSlotState::for_slot(dataset, index);
        if !slot.is_rendered() {
            debug!(slot = index, "applicant slot absent, omitting block");
            return Ok(None);
        }

        let footer = match slot {
            ApplicantSlotState::Primary => self.signature_footer(dataset, images),
            _ => None,
        };
        let fallback = ApplicantRecord::default();
        let applicant = dataset.applicant(index).unwrap_or(&fallback);
        let root =
            applicant::compose(applicant, index, slot, footer, images, &self.constants)?;

        Ok(Some(FormBlock {
            kind: BlockKind::Applicant { slot },
            root,
        }))
    }

    /// The apartment and declaration block.
    pub fn compose_apartment(
        &self,
        dataset: &FormDataset,
        images: &ResolvedImages,
        layout: ApartmentLayout,
    ) -> Result<FormBlock, LayoutError> {
        let footer = match layout {
            ApartmentLayout::Standalone => None,
            ApartmentLayout::WithSignatureFooter => self.signature_footer(dataset, images),
        };
        let root = apartment::compose(&dataset.application, footer, &self.constants)?;
        Ok(FormBlock {
            kind: BlockKind::Apartment { layout },
            root,
        })
    }

    /// Shared signature footer positioned at the origin, or `None` when neither
    /// of the first two applicants supplied a signature.
    pub fn signature_footer(
        &self,
        dataset: &FormDataset,
        images: &ResolvedImages,
    ) -> Option<LayoutBox> {
        signature::compose(dataset, images, &self.constants)
    }

    /// Preview layout: rendered applicant blocks followed by the standalone apartment block.
    pub fn compose_form(
        &self,
        dataset: &FormDataset,
        images: &ResolvedImages,
    ) -> Result<ComposedForm, LayoutError> {
        let reconciliation = reconcile(dataset);

        let mut blocks = Vec::with_capacity(MAX_APPLICANTS + 1);
        for index in 0..MAX_APPLICANTS {
            if let Some(block) = self.compose_applicant(dataset, index, images)? {
                blocks.push(block);
            }
        }
        blocks.push(self.compose_apartment(dataset, images, ApartmentLayout::Standalone)?);

        Ok(ComposedForm {
            blocks,
            reconciliation,
        })
    }

    /// Designated template pages and the block each one receives.
    pub fn plan_pages(
        &self,
        dataset: &FormDataset,
        images: &ResolvedImages,
    ) -> Result<PagePlan, LayoutError> {
        reconcile(dataset);
        pages::plan(self, dataset, images)
    }
}

fn reconcile(dataset: &FormDataset) -> ApplicantCountReconciliation {
    let reconciliation = dataset.reconcile_applicant_count();
    if !reconciliation.agrees() {
        debug!(
            hinted = reconciliation.hinted,
            rendered = reconciliation.rendered,
            "applicant count hint disagrees with named slots; using named slots"
        );
    }
    reconciliation
}

/// Vertical stacker used by the block builders. Rows are placed at the left
/// padding edge and separated by the configured row gap.
pub(crate) struct BlockBuilder<'a> {
    constants: &'a LayoutConstants,
    cursor: f32,
    children: Vec<LayoutBox>,
}

impl<'a> BlockBuilder<'a> {
    pub(crate) fn new(constants: &'a LayoutConstants) -> Self {
        Self {
            constants,
            cursor: constants.outer_padding,
            children: Vec::new(),
        }
    }

    pub(crate) fn cursor(&self) -> f32 {
        self.cursor
    }

    pub(crate) fn advance_to(&mut self, y: f32) {
        self.cursor = self.cursor.max(y);
    }

    pub(crate) fn stack(&mut self, child: LayoutBox) {
        let height = child.rect.height;
        let placed = child.placed_at(self.constants.outer_padding, self.cursor);
        self.children.push(placed);
        self.cursor += height + self.constants.row_gap;
    }

    pub(crate) fn stack_keyed(&mut self, key: &str, child: LayoutBox) {
        self.stack(child.with_key(key));
    }

    /// Stack `child` inside a positioned wrapper so the child itself stays at the
    /// origin and renders identically wherever it is attached.
    pub(crate) fn stack_anchored(&mut self, child: LayoutBox) {
        let wrapper = LayoutBox::container(Rect::new(0.0, 0.0, child.rect.width, child.rect.height))
            .with_children(vec![child]);
        self.stack(wrapper);
    }

    /// Place without moving the cursor.
    pub(crate) fn overlay(&mut self, child: LayoutBox) {
        self.children.push(child);
    }

    pub(crate) fn finish(self, key: String) -> LayoutBox {
        let bottom = self
            .children
            .iter()
            .map(|child| child.rect.bottom())
            .fold(0.0f32, f32::max);
        let height = bottom + self.constants.outer_padding;
        LayoutBox::container(Rect::new(0.0, 0.0, self.constants.container_width, height))
            .with_key(key)
            .with_children(self.children)
    }
}
