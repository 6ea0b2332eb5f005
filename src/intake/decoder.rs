//! Async batch decoder
//!
//! Every accepted file is read and checked on its own blocking task; the batch
//! resolves only when all of them have finished, so the session is updated
//! once per batch.

use std::io::Cursor;
use std::sync::Arc;

use futures::future::join_all;
use image::ImageReader;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, info, warn};

use super::source::{FileSource, SelectedFile};
use crate::error::IntakeError;
use crate::state::data::EncodedImage;

/// What to do when one file of a batch cannot be decoded
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Leave the file out and keep the rest of the batch
    #[default]
    DropFailed,
    /// Fail the whole batch; nothing is appended
    AbortBatch,
}

/// Resolved batch, in selection order
#[derive(Debug, Clone, Default)]
pub struct DecodedBatch {
    pub images: Vec<EncodedImage>,
    /// Files left out under `DecodePolicy::DropFailed`
    pub failures: Vec<IntakeError>,
}

/// Decode all files concurrently and join
///
/// `size_limit` is checked again against the bytes actually read, since a
/// file on disk can change between selection and decoding.
pub async fn decode_batch(
    files: Vec<SelectedFile>,
    policy: DecodePolicy,
    size_limit: u64,
) -> Result<DecodedBatch, IntakeError> {
    let count = files.len();
    let results = join_all(
        files
            .into_iter()
            .map(|file| decode_file(file, size_limit)),
    )
    .await;

    let mut batch = DecodedBatch::default();
    for result in results {
        match result {
            Ok(image) => batch.images.push(image),
            Err(e) if policy == DecodePolicy::AbortBatch => {
                warn!("❌ Aborting batch: {}", e);
                return Err(e);
            }
            Err(e) => {
                warn!("⚠️  Dropping file from batch: {}", e);
                batch.failures.push(e);
            }
        }
    }

    info!(
        "📦 Decoded batch: {} of {} files ready",
        batch.images.len(),
        count
    );
    Ok(batch)
}

/// Read one file and confirm it is an image
pub async fn decode_file(
    file: SelectedFile,
    size_limit: u64,
) -> Result<EncodedImage, IntakeError> {
    let SelectedFile { name, source, .. } = file;

    let bytes: Arc<[u8]> = match source {
        FileSource::Path(path) => tokio::fs::read(&path)
            .await
            .map_err(|source| IntakeError::Read {
                name: name.clone(),
                source: Arc::new(source),
            })?
            .into(),
        FileSource::Memory(bytes) => bytes,
    };

    let size = bytes.len() as u64;
    if size > size_limit {
        return Err(IntakeError::TooLarge {
            name,
            size,
            limit: size_limit,
        });
    }

    // Format sniffing and header parsing are CPU work
    let task_name = name.clone();
    task::spawn_blocking(move || decode_blocking(task_name, bytes))
        .await
        .map_err(|e| IntakeError::Join {
            name,
            message: e.to_string(),
        })?
}

/// Blocking part of decoding: sniff the real format and parse the header
fn decode_blocking(name: String, bytes: Arc<[u8]>) -> Result<EncodedImage, IntakeError> {
    let format = image::guess_format(&bytes).map_err(|source| IntakeError::Decode {
        name: name.clone(),
        source: Arc::new(source),
    })?;

    let (width, height) = ImageReader::with_format(Cursor::new(&bytes[..]), format)
        .into_dimensions()
        .map_err(|source| IntakeError::Decode {
            name: name.clone(),
            source: Arc::new(source),
        })?;

    debug!(
        "📷 Decoded {}: {:?} {}x{} ({} bytes)",
        name,
        format,
        width,
        height,
        bytes.len()
    );

    Ok(EncodedImage::new(bytes, format.to_mime_type()))
}
