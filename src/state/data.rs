//! Shared data structures for the session state
//!
//! These types flow between intake, the session and the consumer.

use std::fmt;
use std::sync::Arc;

/// An encoded image payload (PNG, JPEG, ...)
///
/// Immutable once built. Clones share the same buffer, so handing the
/// finalized list to a consumer never copies pixel data.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
    media_type: Arc<str>,
}

impl EncodedImage {
    /// Wrap an already-encoded payload
    pub fn new(bytes: impl Into<Arc<[u8]>>, media_type: impl Into<Arc<str>>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }

    /// Shorthand for a PNG payload (the crop and edit output format)
    pub fn png(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/png")
    }

    /// The encoded bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Media type, e.g. "image/jpeg"
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payloads are megabytes; print the shape only
impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Stable identifier of one logical image within a session
///
/// Allocated from a per-session counter and never reused, so it keeps
/// pointing at the same image while removals shift positions around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

impl SlotId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One logical image: the decoded upload and its committed output
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlot {
    /// Stable identity
    pub id: SlotId,
    /// The upload as decoded; never reassigned
    pub original: EncodedImage,
    /// Crop/edit output (None until the slot is first cropped)
    pub finalized: Option<EncodedImage>,
}

impl ImageSlot {
    /// Has this slot been cropped at least once?
    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }
}
