use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use tracing::warn;

use super::domain::{FormDataset, ImageRef, MAX_APPLICANTS};

/// Image bytes resolved by the caller before composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl ResolvedImage {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Inline `data:` URI used by both render backends.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Which picture a resolved image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "applicant")]
pub enum ImageSlot {
    Photograph(usize),
    Signature(usize),
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSlot::Photograph(index) => write!(f, "applicant {} photograph", index + 1),
            ImageSlot::Signature(index) => write!(f, "applicant {} signature", index + 1),
        }
    }
}

/// Failure raised by an image resolution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("unsupported image reference: {0}")]
    UnsupportedReference(String),
    #[error("image payload is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("image store unavailable: {0}")]
    Unavailable(String),
}

/// Turns an opaque stored reference into image bytes.
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, reference: &ImageRef) -> Result<ResolvedImage, ImageError>;
}

/// Resolves `data:<mime>;base64,<payload>` references as produced by the upload widget.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataUriResolver;

impl ImageResolver for DataUriResolver {
    fn resolve(&self, reference: &ImageRef) -> Result<ResolvedImage, ImageError> {
        let raw = reference.as_str().trim();
        let rest = raw
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::UnsupportedReference(preview(raw)))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::UnsupportedReference(preview(raw)))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ImageError::UnsupportedReference(preview(raw)))?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|err| ImageError::InvalidEncoding(err.to_string()))?;

        let mime = if mime.is_empty() {
            "application/octet-stream"
        } else {
            mime
        };
        Ok(ResolvedImage::new(mime, bytes))
    }
}

fn preview(raw: &str) -> String {
    raw.chars().take(32).collect()
}

/// A slot whose image could not be resolved; the slot renders its placeholder instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFailure {
    pub slot: ImageSlot,
    #[serde(serialize_with = "serialize_display")]
    pub error: ImageError,
}

fn serialize_display<S>(error: &ImageError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(error)
}

/// Images resolved for one dataset, keyed by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedImages {
    images: BTreeMap<ImageSlot, ResolvedImage>,
}

impl ResolvedImages {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: ImageSlot, image: ResolvedImage) {
        self.images.insert(slot, image);
    }

    pub fn get(&self, slot: ImageSlot) -> Option<&ResolvedImage> {
        self.images.get(&slot)
    }

    pub fn contains(&self, slot: ImageSlot) -> bool {
        self.images.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Resolve every photograph and signature referenced by `dataset`.
///
/// Failures do not abort: they are returned to the caller unchanged while the
/// affected slots fall back to their placeholders.
pub fn resolve_images(
    dataset: &FormDataset,
    resolver: &dyn ImageResolver,
) -> (ResolvedImages, Vec<ImageFailure>) {
    let mut resolved = ResolvedImages::default();
    let mut failures = Vec::new();

    for (index, applicant) in dataset.applicants.iter().take(MAX_APPLICANTS).enumerate() {
        let references = [
            (ImageSlot::Photograph(index), applicant.photograph.as_ref()),
            (ImageSlot::Signature(index), applicant.signature.as_ref()),
        ];

        for (slot, reference) in references {
            let Some(reference) = reference else {
                continue;
            };
            match resolver.resolve(reference) {
                Ok(image) => resolved.insert(slot, image),
                Err(error) => {
                    warn!(%slot, %error, "image unavailable, rendering placeholder");
                    failures.push(ImageFailure { slot, error });
                }
            }
        }
    }

    (resolved, failures)
}
