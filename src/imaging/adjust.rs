//! Edit capabilities
//!
//! An edit takes a slot's current finalized image (and its original, for
//! edits that need to start over) and returns the new finalized image.

use image::{DynamicImage, Rgba};
use tracing::debug;

use super::crop::{CropCapability, CropRegion, CropSpec, ImageCropper};
use super::encode_png;
use crate::error::EditError;
use crate::state::data::EncodedImage;
use crate::state::edit::EditParams;

/// Maximum channel shift for temperature/tint at +/-100
const WHITE_BALANCE_STRENGTH: f32 = 0.15;

/// Produces an updated finalized image for one slot
pub trait EditCapability {
    fn edit(&self, current: &EncodedImage, original: &EncodedImage)
        -> Result<EncodedImage, EditError>;
}

/// Applies [`EditParams`] to the current finalized image
#[derive(Debug, Clone, Copy, Default)]
pub struct Adjuster {
    params: EditParams,
}

impl Adjuster {
    pub fn new(params: EditParams) -> Self {
        Self {
            params: params.clamped(),
        }
    }

    pub fn params(&self) -> &EditParams {
        &self.params
    }
}

impl EditCapability for Adjuster {
    fn edit(
        &self,
        current: &EncodedImage,
        _original: &EncodedImage,
    ) -> Result<EncodedImage, EditError> {
        let image = image::load_from_memory(current.bytes()).map_err(EditError::Decode)?;
        let mut pixels = image.to_rgba8();

        if !self.params.is_unedited() {
            let adjustment = Adjustment::from(&self.params);
            for pixel in pixels.pixels_mut() {
                adjustment.apply(pixel);
            }
        }

        debug!("🎨 Applied adjustments {:?}", self.params);

        encode_png(&DynamicImage::ImageRgba8(pixels))
            .map(EncodedImage::png)
            .map_err(EditError::Encode)
    }
}

/// Per-pixel factors derived once from the parameters
struct Adjustment {
    gain: f32,
    contrast: f32,
    saturation: f32,
    warmth: f32,
    tint: f32,
}

impl From<&EditParams> for Adjustment {
    fn from(params: &EditParams) -> Self {
        Self {
            gain: 2f32.powf(params.exposure),
            contrast: 1.0 + params.contrast / 100.0,
            saturation: 1.0 + params.saturation / 100.0,
            warmth: params.temperature as f32 / 100.0 * WHITE_BALANCE_STRENGTH,
            tint: params.tint as f32 / 100.0 * WHITE_BALANCE_STRENGTH,
        }
    }
}

impl Adjustment {
    fn apply(&self, pixel: &mut Rgba<u8>) {
        let [r, g, b, a] = pixel.0;
        let mut rgb = [r, g, b].map(|c| f32::from(c) / 255.0);

        // White balance, then exposure and contrast per channel
        rgb[0] += self.warmth;
        rgb[2] -= self.warmth;
        rgb[1] -= self.tint;
        for c in &mut rgb {
            *c = (*c * self.gain - 0.5) * self.contrast + 0.5;
        }

        // Saturation around Rec. 709 luma
        let luma = 0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2];
        for c in &mut rgb {
            *c = luma + (*c - luma) * self.saturation;
        }

        let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        pixel.0 = [r, g, b, a];
    }
}

/// Re-crops the original upload with a new region
///
/// Lets the user fix a crop after the fact without compounding resampling.
#[derive(Debug, Clone, Copy)]
pub struct Recropper {
    cropper: ImageCropper,
    spec: CropSpec,
    region: Option<CropRegion>,
}

impl Recropper {
    pub fn new(spec: CropSpec, region: Option<CropRegion>) -> Self {
        Self {
            cropper: ImageCropper::default(),
            spec,
            region,
        }
    }
}

impl EditCapability for Recropper {
    fn edit(
        &self,
        _current: &EncodedImage,
        original: &EncodedImage,
    ) -> Result<EncodedImage, EditError> {
        Ok(self.cropper.crop(original, &self.spec, self.region)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{decode, solid_png, split_png};
    use image::GenericImageView;

    fn first_pixel(image: &EncodedImage) -> [u8; 4] {
        decode(image).to_rgba8().get_pixel(0, 0).0
    }

    #[test]
    fn test_default_params_keep_pixels() {
        let image = EncodedImage::png(solid_png(4, 4, [10, 120, 240]));

        let edited = Adjuster::default().edit(&image, &image).unwrap();

        assert_eq!(first_pixel(&edited), [10, 120, 240, 255]);
    }

    #[test]
    fn test_exposure_doubles_per_stop() {
        let image = EncodedImage::png(solid_png(2, 2, [64, 64, 64]));
        let params = EditParams {
            exposure: 1.0,
            ..EditParams::default()
        };

        let edited = Adjuster::new(params).edit(&image, &image).unwrap();

        assert_eq!(first_pixel(&edited), [128, 128, 128, 255]);
    }

    #[test]
    fn test_full_desaturation_is_gray() {
        let image = EncodedImage::png(solid_png(2, 2, [200, 40, 90]));
        let params = EditParams {
            saturation: -100.0,
            ..EditParams::default()
        };

        let [r, g, b, _] = first_pixel(&Adjuster::new(params).edit(&image, &image).unwrap());

        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn test_warmer_raises_red_lowers_blue() {
        let image = EncodedImage::png(solid_png(2, 2, [128, 128, 128]));
        let params = EditParams {
            temperature: 100,
            ..EditParams::default()
        };

        let [r, _, b, _] = first_pixel(&Adjuster::new(params).edit(&image, &image).unwrap());

        assert!(r > 128);
        assert!(b < 128);
    }

    #[test]
    fn test_out_of_range_params_are_clamped() {
        let params = EditParams {
            exposure: 40.0,
            ..EditParams::default()
        };
        assert_eq!(Adjuster::new(params).params().exposure, 5.0);
    }

    #[test]
    fn test_recrop_starts_from_original() {
        let original = EncodedImage::png(split_png(40, 20));
        let current = EncodedImage::png(solid_png(8, 8, [0, 255, 0]));
        let right = CropRegion {
            x: 20,
            y: 0,
            width: 20,
            height: 20,
        };

        let edited = Recropper::new(CropSpec::new(1, 1, 8, 8), Some(right))
            .edit(&current, &original)
            .unwrap();

        let decoded = decode(&edited);
        assert_eq!(decoded.dimensions(), (8, 8));
        let [r, g, b, _] = decoded.to_rgba8().get_pixel(4, 4).0;
        assert!(b > 200 && r < 50 && g < 50);
    }

    #[test]
    fn test_edit_rejects_garbage() {
        let garbage = EncodedImage::new(b"nope".to_vec(), "image/png");
        let err = Adjuster::default().edit(&garbage, &garbage).unwrap_err();
        assert!(matches!(err, EditError::Decode(_)));
    }
}
