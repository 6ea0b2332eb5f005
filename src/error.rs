//! Error types for the intake pipeline.
//!
//! Rejected files (wrong type, too large, over capacity) are not errors: the
//! validator counts and logs them. Everything here is a real failure that the
//! caller has to see.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::state::data::SlotId;

/// Reading or decoding a batch of selected files failed.
///
/// Cloneable so a decoded batch can travel through UI messages.
#[derive(Error, Debug, Clone)]
pub enum IntakeError {
    /// The payload of a selected file could not be read
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The file grew past the size ceiling after it was selected
    #[error("{name} is {size} bytes, over the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    /// The payload is not a decodable image
    #[error("Failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: Arc<image::ImageError>,
    },

    /// A blocking decode task panicked or was cancelled
    #[error("Decode task for {name} did not complete: {message}")]
    Join { name: String, message: String },
}

impl IntakeError {
    /// Name of the file the failure belongs to
    pub fn file_name(&self) -> &str {
        match self {
            Self::Read { name, .. }
            | Self::TooLarge { name, .. }
            | Self::Decode { name, .. }
            | Self::Join { name, .. } => name,
        }
    }
}

/// The crop capability could not produce an image.
#[derive(Error, Debug)]
pub enum CropError {
    #[error("Failed to decode source image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode cropped image: {0}")]
    Encode(#[source] image::ImageError),

    /// Region, aspect ratio or output size is degenerate
    #[error("Invalid crop geometry: {0}")]
    Geometry(String),
}

impl CropError {
    pub fn geometry<T: Into<String>>(msg: T) -> Self {
        Self::Geometry(msg.into())
    }
}

/// An edit capability could not produce an image.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Failed to decode image for editing: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode edited image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Re-crop failed: {0}")]
    Crop(#[from] CropError),
}

/// A session operation was rejected. The session is never mutated when one of
/// these is returned.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The slot was removed or never existed
    #[error("Unknown image slot {0}")]
    UnknownSlot(SlotId),

    /// Positional lookup past the end of the store
    #[error("No image at position {position} (session holds {len})")]
    PositionOutOfRange { position: usize, len: usize },

    /// Crop confirmation arrived with no active crop
    #[error("No image is waiting to be cropped")]
    NotCropping,

    /// Edits only apply to slots that already have a finalized image
    #[error("Image slot {0} has not been cropped yet")]
    NotFinalized(SlotId),

    #[error("Please upload {required} image{} before adding to cart ({finalized} ready)", plural(.required))]
    Incomplete { required: usize, finalized: usize },

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 {
        ""
    } else {
        "s"
    }
}

/// Loading or validating the pipeline configuration failed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::Invalid(msg.into())
    }
}
