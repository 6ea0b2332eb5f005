//! Fixtures shared by the unit tests

use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::CropError;
use crate::imaging::{CropCapability, CropRegion, CropSpec};
use crate::intake::SelectedFile;
use crate::notify::ImagesConsumer;
use crate::state::data::EncodedImage;

/// A fake payload that is only ever compared, never decoded
pub fn tagged(name: &str) -> EncodedImage {
    EncodedImage::new(name.as_bytes().to_vec(), "image/x-test")
}

fn png(image: RgbImage) -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encode test png");
    buffer.into_inner()
}

/// Single-colour PNG
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    png(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// PNG with a red left half and a blue right half
pub fn split_png(width: u32, height: u32) -> Vec<u8> {
    png(RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    }))
}

/// Red PNG with a green strip `strip` pixels wide down the left edge
pub fn strip_png(width: u32, height: u32, strip: u32) -> Vec<u8> {
    png(RgbImage::from_fn(width, height, |x, _| {
        if x < strip {
            Rgb([0, 255, 0])
        } else {
            Rgb([255, 0, 0])
        }
    }))
}

pub fn decode(image: &EncodedImage) -> DynamicImage {
    image::load_from_memory(image.bytes()).expect("decode test output")
}

/// In-memory selection entry with an explicit declared type
pub fn memory_file(name: &str, media_type: &str, bytes: Vec<u8>) -> SelectedFile {
    SelectedFile::from_bytes(name, media_type, bytes)
}

/// Crop capability that tags the source payload instead of cropping
#[derive(Debug, Default)]
pub struct StubCropper;

impl StubCropper {
    pub fn output_for(source: &EncodedImage) -> EncodedImage {
        let mut bytes = b"cropped:".to_vec();
        bytes.extend_from_slice(source.bytes());
        EncodedImage::new(bytes, "image/png")
    }
}

impl CropCapability for StubCropper {
    fn crop(
        &self,
        source: &EncodedImage,
        _spec: &CropSpec,
        _region: Option<CropRegion>,
    ) -> Result<EncodedImage, CropError> {
        Ok(Self::output_for(source))
    }
}

/// Crop capability that always fails
#[derive(Debug, Default)]
pub struct FailingCropper;

impl CropCapability for FailingCropper {
    fn crop(
        &self,
        _source: &EncodedImage,
        _spec: &CropSpec,
        _region: Option<CropRegion>,
    ) -> Result<EncodedImage, CropError> {
        Err(CropError::geometry("refused"))
    }
}

/// Consumer that records every emitted list
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    updates: Arc<Mutex<Vec<Vec<EncodedImage>>>>,
}

impl Recorder {
    pub fn updates(&self) -> Vec<Vec<EncodedImage>> {
        self.updates.lock().expect("recorder lock").clone()
    }

    pub fn last(&self) -> Option<Vec<EncodedImage>> {
        self.updates().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.updates.lock().expect("recorder lock").len()
    }
}

impl ImagesConsumer for Recorder {
    fn on_images_update(&mut self, images: &[EncodedImage]) {
        self.updates
            .lock()
            .expect("recorder lock")
            .push(images.to_vec());
    }
}
