use serde::Serialize;
use tracing::debug;

use crate::forms::domain::{FormDataset, MAX_APPLICANTS};
use crate::forms::images::ResolvedImages;
use crate::forms::layout::LayoutError;

use super::{ApartmentLayout, FormBlock, FormCompositor};

/// Template page (1-based) that receives applicant slot zero.
pub const FIRST_APPLICANT_PAGE: u32 = 5;
/// Template page that receives the apartment and declaration block.
pub const APARTMENT_PAGE: u32 = 8;

/// A designated template page and the block drawn onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage {
    pub page_number: u32,
    pub block: FormBlock,
}

/// Designated pages in ascending order plus the applicant pages dropped from the output.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub pages: Vec<PlannedPage>,
    pub omitted_pages: Vec<u32>,
}

impl PagePlan {
    pub fn page(&self, page_number: u32) -> Option<&PlannedPage> {
        self.pages
            .iter()
            .find(|page| page.page_number == page_number)
    }

    pub fn is_designated(page_number: u32) -> bool {
        (FIRST_APPLICANT_PAGE..=APARTMENT_PAGE).contains(&page_number)
    }

    pub fn summary(&self) -> PagePlanSummary {
        PagePlanSummary {
            rendered_pages: self.pages.iter().map(|page| page.page_number).collect(),
            omitted_pages: self.omitted_pages.clone(),
        }
    }
}

/// Serializable outline of a plan, without the layout trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePlanSummary {
    pub rendered_pages: Vec<u32>,
    pub omitted_pages: Vec<u32>,
}

pub(super) fn plan(
    compositor: &FormCompositor,
    dataset: &FormDataset,
    images: &ResolvedImages,
) -> Result<PagePlan, LayoutError> {
    let mut pages = Vec::with_capacity(MAX_APPLICANTS + 1);
    let mut omitted_pages = Vec::new();

    for index in 0..MAX_APPLICANTS {
        let page_number = FIRST_APPLICANT_PAGE + index as u32;
        match compositor.compose_applicant(dataset, index, images)? {
            Some(block) => pages.push(PlannedPage { page_number, block }),
            None => {
                debug!(page = page_number, "omitting template page for absent applicant");
                omitted_pages.push(page_number);
            }
        }
    }

    pages.push(PlannedPage {
        page_number: APARTMENT_PAGE,
        block: compositor.compose_apartment(
            dataset,
            images,
            ApartmentLayout::WithSignatureFooter,
        )?,
    });

    Ok(PagePlan {
        pages,
        omitted_pages,
    })
}
