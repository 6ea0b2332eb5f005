//! Crop capability
//!
//! The session hands the original upload to a [`CropCapability`] together with
//! the fixed geometry of the order; the capability returns the finalized image.
//! [`ImageCropper`] is the non-interactive implementation: it takes an optional
//! user region (the crop box an interactive widget would produce) and falls
//! back to the largest centred box with the target aspect ratio.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::encode_png;
use crate::error::CropError;
use crate::state::data::EncodedImage;

/// Fixed output geometry for every crop in a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSpec {
    /// Target width / height of the crop box
    pub aspect_ratio: f64,
    /// Output size in pixels
    pub output_width: u32,
    pub output_height: u32,
}

impl CropSpec {
    /// Aspect ratio from the product's print dimensions
    pub fn new(max_width: u32, max_height: u32, output_width: u32, output_height: u32) -> Self {
        Self {
            aspect_ratio: f64::from(max_width) / f64::from(max_height),
            output_width,
            output_height,
        }
    }

    fn validate(&self) -> Result<(), CropError> {
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(CropError::geometry(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if self.output_width == 0 || self.output_height == 0 {
            return Err(CropError::geometry(format!(
                "output size must be non-zero, got {}x{}",
                self.output_width, self.output_height
            )));
        }
        Ok(())
    }
}

/// Crop box in source pixel coordinates
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Largest box with `aspect_ratio` centred in a `width` x `height` image.
    /// None if the image has no area.
    pub fn centered(width: u32, height: u32, aspect_ratio: f64) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let source_ratio = f64::from(width) / f64::from(height);

        let region = if source_ratio > aspect_ratio {
            // Too wide: full height, trim the sides
            let crop_width = ((f64::from(height) * aspect_ratio).round() as u32).clamp(1, width);
            Self {
                x: (width - crop_width) / 2,
                y: 0,
                width: crop_width,
                height,
            }
        } else {
            // Too tall (or exact): full width, trim top and bottom
            let crop_height = ((f64::from(width) / aspect_ratio).round() as u32).clamp(1, height);
            Self {
                x: 0,
                y: (height - crop_height) / 2,
                width,
                height: crop_height,
            }
        };
        Some(region)
    }

    /// Largest box with `aspect_ratio` centred inside this region
    pub fn fit_aspect(&self, aspect_ratio: f64) -> Option<Self> {
        let inner = Self::centered(self.width, self.height, aspect_ratio)?;
        Some(Self {
            x: self.x + inner.x,
            y: self.y + inner.y,
            ..inner
        })
    }

    /// Intersect with a `width` x `height` image. None if nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clamped = Self {
            x: self.x,
            y: self.y,
            width: self.width.min(width - self.x),
            height: self.height.min(height - self.y),
        };
        (clamped.width > 0 && clamped.height > 0).then_some(clamped)
    }
}

/// Turns an original image into a finalized one
pub trait CropCapability {
    fn crop(
        &self,
        source: &EncodedImage,
        spec: &CropSpec,
        region: Option<CropRegion>,
    ) -> Result<EncodedImage, CropError>;
}

/// Crop with the `image` crate and resample to the output size
#[derive(Debug, Clone, Copy)]
pub struct ImageCropper {
    filter: FilterType,
}

impl Default for ImageCropper {
    /// High-quality resampling
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl ImageCropper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CropCapability for ImageCropper {
    fn crop(
        &self,
        source: &EncodedImage,
        spec: &CropSpec,
        region: Option<CropRegion>,
    ) -> Result<EncodedImage, CropError> {
        spec.validate()?;

        let image = image::load_from_memory(source.bytes()).map_err(CropError::Decode)?;
        let (width, height) = image.dimensions();

        let bounds = match region {
            Some(requested) => requested.clamp_to(width, height).ok_or_else(|| {
                CropError::geometry(format!(
                    "region {:?} lies outside the {}x{} image",
                    requested, width, height
                ))
            })?,
            None => CropRegion {
                x: 0,
                y: 0,
                width,
                height,
            },
        };
        // The output size is fixed, so the box must match the target ratio
        let region = bounds.fit_aspect(spec.aspect_ratio).ok_or_else(|| {
            CropError::geometry(format!("{}x{} image has no area to crop", width, height))
        })?;

        let cropped = image
            .crop_imm(region.x, region.y, region.width, region.height)
            .resize_exact(spec.output_width, spec.output_height, self.filter);
        let output = DynamicImage::ImageRgba8(cropped.to_rgba8());

        debug!(
            "✂️  Cropped {}x{} at ({}, {}) from {}x{} -> {}x{}",
            region.width,
            region.height,
            region.x,
            region.y,
            width,
            height,
            spec.output_width,
            spec.output_height
        );

        encode_png(&output)
            .map(EncodedImage::png)
            .map_err(CropError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{decode, split_png, strip_png};

    #[test]
    fn test_centered_region_wide_source() {
        let region = CropRegion::centered(400, 200, 1.0);
        assert_eq!(
            region,
            Some(CropRegion {
                x: 100,
                y: 0,
                width: 200,
                height: 200
            })
        );
    }

    #[test]
    fn test_centered_region_tall_source() {
        let region = CropRegion::centered(300, 900, 1.5);
        assert_eq!(
            region,
            Some(CropRegion {
                x: 0,
                y: 350,
                width: 300,
                height: 200
            })
        );
    }

    #[test]
    fn test_centered_region_of_empty_image() {
        assert_eq!(CropRegion::centered(0, 0, 1.0), None);
        assert_eq!(CropRegion::centered(10, 0, 1.0), None);
    }

    #[test]
    fn test_fit_aspect_stays_inside_region() {
        let region = CropRegion {
            x: 10,
            y: 5,
            width: 40,
            height: 20,
        };
        assert_eq!(
            region.fit_aspect(1.0),
            Some(CropRegion {
                x: 20,
                y: 5,
                width: 20,
                height: 20
            })
        );
    }

    #[test]
    fn test_clamp_region() {
        let region = CropRegion {
            x: 30,
            y: 10,
            width: 100,
            height: 5,
        };
        assert_eq!(
            region.clamp_to(40, 40),
            Some(CropRegion {
                x: 30,
                y: 10,
                width: 10,
                height: 5
            })
        );
        assert_eq!(region.clamp_to(30, 40), None);
    }

    #[test]
    fn test_crop_output_has_fixed_size() {
        let source = EncodedImage::new(split_png(40, 20), "image/png");
        let spec = CropSpec::new(1, 1, 14, 14);

        let output = ImageCropper::new().crop(&source, &spec, None).unwrap();

        assert_eq!(output.media_type(), "image/png");
        let decoded = decode(&output);
        assert_eq!(decoded.dimensions(), (14, 14));
    }

    #[test]
    fn test_crop_uses_requested_region() {
        // left half red, right half blue
        let source = EncodedImage::new(split_png(40, 20), "image/png");
        let spec = CropSpec::new(1, 1, 8, 8);
        let left = CropRegion {
            x: 0,
            y: 0,
            width: 20,
            height: 20,
        };

        let output = ImageCropper::new().crop(&source, &spec, Some(left)).unwrap();

        let decoded = decode(&output).to_rgba8();
        assert!(decoded.pixels().all(|p| p.0[0] > 200 && p.0[2] < 50));
    }

    #[test]
    fn test_crop_region_is_fitted_to_aspect_ratio() {
        // 2:1 region on a 1:1 order: the green edge strip must be trimmed
        // away, not squeezed into the output
        let source = EncodedImage::png(strip_png(40, 20, 10));
        let spec = CropSpec::new(1, 1, 8, 8);
        let whole = CropRegion {
            x: 0,
            y: 0,
            width: 40,
            height: 20,
        };

        let output = ImageCropper::new().crop(&source, &spec, Some(whole)).unwrap();

        let decoded = decode(&output).to_rgba8();
        let green = decoded.pixels().filter(|p| p.0[1] > 128).count();
        assert_eq!(green, 0);
    }

    #[test]
    fn test_crop_rejects_region_outside_image() {
        let source = EncodedImage::new(split_png(10, 10), "image/png");
        let spec = CropSpec::new(1, 1, 4, 4);
        let outside = CropRegion {
            x: 50,
            y: 0,
            width: 5,
            height: 5,
        };

        let err = ImageCropper::new()
            .crop(&source, &spec, Some(outside))
            .unwrap_err();
        assert!(matches!(err, CropError::Geometry(_)));
    }

    #[test]
    fn test_crop_rejects_bad_spec() {
        let source = EncodedImage::new(split_png(10, 10), "image/png");
        let spec = CropSpec::new(1, 0, 4, 4);

        let err = ImageCropper::new().crop(&source, &spec, None).unwrap_err();
        assert!(matches!(err, CropError::Geometry(_)));
    }

    #[test]
    fn test_crop_rejects_garbage() {
        let source = EncodedImage::new(b"not an image".to_vec(), "image/png");
        let spec = CropSpec::new(1, 1, 4, 4);

        let err = ImageCropper::new().crop(&source, &spec, None).unwrap_err();
        assert!(matches!(err, CropError::Decode(_)));
    }
}
