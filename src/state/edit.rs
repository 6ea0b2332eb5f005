//! Adjustment parameters for refining a finalized image
//!
//! The adjust capability applies these on top of the cropped output. They are
//! plain data so a front-end can keep them, compare them and store them as
//! JSON alongside an order.

use serde::{Deserialize, Serialize};

/// All adjustments for one finalized image
///
/// Every field defaults to "no adjustment"; applying the default set leaves
/// the pixels unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct EditParams {
    // ========== Tone ==========

    /// Exposure adjustment in stops (-5.0 to +5.0)
    /// - Negative values darken the image
    /// - Positive values brighten the image
    /// - 0.0 = no adjustment
    pub exposure: f32,

    /// Contrast adjustment (-100.0 to +100.0)
    /// - Negative values flatten towards mid-grey
    /// - Positive values push away from mid-grey
    pub contrast: f32,

    // ========== Color ==========

    /// Saturation adjustment (-100.0 to +100.0)
    /// - -100.0 = grayscale, 0.0 = original, +100.0 = double saturation
    pub saturation: f32,

    /// Temperature shift (-100 to +100)
    /// - Negative values = cooler (more blue)
    /// - Positive values = warmer (more red)
    pub temperature: i32,

    /// Tint shift (-100 to +100)
    /// - Negative values = more green
    /// - Positive values = more magenta
    pub tint: i32,
}

impl Default for EditParams {
    fn default() -> Self {
        Self {
            exposure: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            temperature: 0,
            tint: 0,
        }
    }
}

impl EditParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this represents an unedited image (all values at default)
    pub fn is_unedited(&self) -> bool {
        *self == Self::default()
    }

    /// Reset all adjustments to default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Copy with every field forced into its documented range
    pub fn clamped(&self) -> Self {
        Self {
            exposure: self.exposure.clamp(-5.0, 5.0),
            contrast: self.contrast.clamp(-100.0, 100.0),
            saturation: self.saturation.clamp(-100.0, 100.0),
            temperature: self.temperature.clamp(-100, 100),
            tint: self.tint.clamp(-100, 100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unedited() {
        let params = EditParams::default();
        assert!(params.is_unedited());
    }

    #[test]
    fn test_serialization() {
        let mut params = EditParams::default();
        params.exposure = 1.5;
        params.contrast = 20.0;
        params.saturation = -10.0;

        let json = params.to_json().unwrap();
        let restored = EditParams::from_json(&json).unwrap();

        assert_eq!(params, restored);
        assert!(!restored.is_unedited());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params = EditParams::from_json(r#"{"temperature": 40}"#).unwrap();

        assert_eq!(params.temperature, 40);
        assert_eq!(params.exposure, 0.0);
    }

    #[test]
    fn test_reset() {
        let mut params = EditParams::default();
        params.exposure = 2.0;
        params.contrast = 50.0;

        assert!(!params.is_unedited());

        params.reset();

        assert!(params.is_unedited());
    }

    #[test]
    fn test_clamped() {
        let params = EditParams {
            exposure: 9.0,
            contrast: -250.0,
            saturation: 10.0,
            temperature: 300,
            tint: -101,
        }
        .clamped();

        assert_eq!(params.exposure, 5.0);
        assert_eq!(params.contrast, -100.0);
        assert_eq!(params.saturation, 10.0);
        assert_eq!(params.temperature, 100);
        assert_eq!(params.tint, -100);
    }
}
