//! Merging rendered pages onto the legal PDF template.

pub mod coords;
pub mod stamp;

use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use crate::forms::compositor::{FormBlock, PagePlan};
use crate::forms::layout::LayoutConstants;
use crate::forms::render::DocumentFragment;

use coords::{PageFrame, LETTER_MEDIA_BOX};
use stamp::{stamp_block, FONT_RESOURCE};

/// A rendered designated page together with the block it was rendered from.
#[derive(Debug, Clone, Copy)]
pub struct PageOverlay<'a> {
    pub fragment: &'a DocumentFragment,
    pub block: &'a FormBlock,
}

impl<'a> PageOverlay<'a> {
    /// Pair each planned page with its fragment by page number.
    pub fn pair(plan: &'a PagePlan, fragments: &'a [DocumentFragment]) -> Vec<PageOverlay<'a>> {
        plan.pages
            .iter()
            .filter_map(|page| {
                fragments
                    .iter()
                    .find(|fragment| fragment.page_number == page.page_number)
                    .map(|fragment| PageOverlay {
                        fragment,
                        block: &page.block,
                    })
            })
            .collect()
    }
}

/// Places rendered pages onto a template and returns the combined document.
pub trait PdfMerger: Send + Sync {
    fn merge(
        &self,
        template: &[u8],
        overlays: &[PageOverlay<'_>],
        omitted_pages: &[u32],
    ) -> Result<Vec<u8>, PdfMergeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PdfMergeError {
    #[error("template is not a readable PDF: {0}")]
    Template(String),
    #[error("page {page} is outside the template ({page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("template page {page} is malformed: {reason}")]
    MalformedPage { page: u32, reason: String },
    #[error("failed to write merged PDF: {0}")]
    Write(String),
}

/// Stamps vector content onto template pages with `lopdf`.
#[derive(Debug, Clone, Copy)]
pub struct LopdfMerger {
    constants: LayoutConstants,
}

impl LopdfMerger {
    pub fn new(constants: LayoutConstants) -> Self {
        Self { constants }
    }
}

impl PdfMerger for LopdfMerger {
    fn merge(
        &self,
        template: &[u8],
        overlays: &[PageOverlay<'_>],
        omitted_pages: &[u32],
    ) -> Result<Vec<u8>, PdfMergeError> {
        let mut doc =
            Document::load_mem(template).map_err(|err| PdfMergeError::Template(err.to_string()))?;
        let pages = doc.get_pages();
        let page_count = pages.len() as u32;

        let lookup = |page: u32| {
            pages
                .get(&page)
                .copied()
                .ok_or(PdfMergeError::PageOutOfRange { page, page_count })
        };

        let mut targets = Vec::with_capacity(overlays.len());
        for overlay in overlays {
            targets.push((lookup(overlay.fragment.page_number)?, overlay));
        }
        for page in omitted_pages {
            lookup(*page)?;
        }

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        for (page_id, overlay) in targets {
            self.stamp_page(&mut doc, page_id, font_id, overlay)?;
        }

        let mut omitted: Vec<u32> = omitted_pages.to_vec();
        omitted.sort_unstable();
        omitted.dedup();
        for page in omitted.iter().rev() {
            debug!(page, "removing template page for absent applicant");
            doc.delete_pages(&[*page]);
        }
        doc.prune_objects();

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|err| PdfMergeError::Write(err.to_string()))?;

        info!(
            stamped = overlays.len(),
            removed = omitted.len(),
            bytes = output.len(),
            "merged form pages onto template"
        );
        Ok(output)
    }
}

impl LopdfMerger {
    fn stamp_page(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        font_id: ObjectId,
        overlay: &PageOverlay<'_>,
    ) -> Result<(), PdfMergeError> {
        let page = overlay.fragment.page_number;
        let malformed = |reason: String| PdfMergeError::MalformedPage { page, reason };

        let media_box = inherited(doc, page_id, b"MediaBox")
            .and_then(|object| media_box(doc, &object))
            .unwrap_or(LETTER_MEDIA_BOX);
        let frame = PageFrame::new(media_box, overlay.fragment.width);
        let stamp = stamp_block(overlay.block, &frame, &self.constants, page);

        let content = Content {
            operations: stamp.operations,
        }
        .encode()
        .map_err(|err| malformed(err.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let mut images = Vec::with_capacity(stamp.images.len());
        for (name, stream) in stamp.images {
            images.push((name, doc.add_object(stream)));
        }

        let mut resources = inherited(doc, page_id, b"Resources")
            .and_then(|object| resolve_dict(doc, &object))
            .unwrap_or_default();
        let mut fonts = resources
            .get(b"Font")
            .ok()
            .and_then(|object| resolve_dict(doc, object))
            .unwrap_or_default();
        fonts.set(FONT_RESOURCE, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));

        if !images.is_empty() {
            let mut xobjects = resources
                .get(b"XObject")
                .ok()
                .and_then(|object| resolve_dict(doc, object))
                .unwrap_or_default();
            for (name, id) in images {
                xobjects.set(name, Object::Reference(id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let existing = doc
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map(|dict| template_streams(doc, dict))
            .map_err(|err| malformed(err.to_string()))?;
        let mut contents = Vec::with_capacity(existing.len() + 3);
        if !existing.is_empty() {
            // The template runs inside its own graphics state so a leftover `cm`
            // cannot move the stamp.
            contents.push(Object::Reference(
                doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec())),
            ));
            contents.extend(existing);
            contents.push(Object::Reference(
                doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec())),
            ));
        }
        contents.push(Object::Reference(content_id));

        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| malformed(err.to_string()))?;
        page_dict.set("Contents", Object::Array(contents));
        page_dict.set("Resources", Object::Dictionary(resources));

        Ok(())
    }
}

/// Content streams of a template page, with an indirect `/Contents` array flattened.
fn template_streams(doc: &Document, page: &Dictionary) -> Vec<Object> {
    match page.get(b"Contents") {
        Ok(Object::Array(streams)) => streams.clone(),
        Ok(reference @ Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(streams)) => streams.clone(),
            _ => vec![reference.clone()],
        },
        _ => Vec::new(),
    }
}

/// Look up `key` on the page or the nearest ancestor in the page tree.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    let mut depth = 0;
    while let Some(id) = current {
        let dict = doc.get_object(id).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .ok();
        depth += 1;
        if depth > 32 {
            return None;
        }
    }
    None
}

fn resolve_dict(doc: &Document, object: &Object) -> Option<Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc
            .get_object(*id)
            .and_then(Object::as_dict)
            .ok()
            .cloned(),
        _ => None,
    }
}

fn media_box(doc: &Document, object: &Object) -> Option<[f32; 4]> {
    let array = match object {
        Object::Array(values) => values.clone(),
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?.clone(),
        _ => return None,
    };
    if array.len() != 4 {
        return None;
    }
    let mut values = [0.0f32; 4];
    for (slot, value) in values.iter_mut().zip(array.iter()) {
        *slot = match value {
            Object::Integer(number) => *number as f32,
            Object::Real(number) => *number,
            _ => return None,
        };
    }
    Some(values)
}
