//! Image capabilities used by the session
//!
//! - `crop.rs` - the crop capability (region crop + fixed-size resample)
//! - `adjust.rs` - edit capabilities (tone/colour adjustments, re-crop)
//!
//! Both produce PNG output.

pub mod adjust;
pub mod crop;

pub use adjust::{Adjuster, EditCapability, Recropper};
pub use crop::{CropCapability, CropRegion, CropSpec, ImageCropper};

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Encode to an in-memory PNG
pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
