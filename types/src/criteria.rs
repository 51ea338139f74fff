//! Validation criteria — the quality and similarity thresholds applied to
//! vision-provider output.
//!
//! All values are percentages on a 0–100 scale. A `ValidationCriteria` is
//! built once at startup and shared read-only across verification runs.

use crate::KycError;
use serde::{Deserialize, Serialize};

/// Minimum requirements a selfie and a face comparison must meet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationCriteria {
    /// Minimum face-detection confidence.
    pub min_confidence: f32,
    /// Minimum image brightness of the detected face.
    pub min_brightness: f32,
    /// Minimum image sharpness of the detected face.
    pub min_sharpness: f32,
    /// Minimum similarity between the ID portrait and the selfie.
    pub min_similarity: f32,
}

impl ValidationCriteria {
    /// Reject thresholds that are NaN or fall outside 0–100.
    pub fn validate(&self) -> Result<(), KycError> {
        let fields = [
            ("min_confidence", self.min_confidence),
            ("min_brightness", self.min_brightness),
            ("min_sharpness", self.min_sharpness),
            ("min_similarity", self.min_similarity),
        ];
        for (name, value) in fields {
            if !(0.0..=100.0).contains(&value) {
                return Err(KycError::InvalidCriteria(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ValidationCriteria {
    fn default() -> Self {
        Self {
            min_confidence: 90.0,
            min_brightness: 50.0,
            min_sharpness: 50.0,
            min_similarity: 70.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let c = ValidationCriteria::default();
        assert_eq!(c.min_confidence, 90.0);
        assert_eq!(c.min_brightness, 50.0);
        assert_eq!(c.min_sharpness, 50.0);
        assert_eq!(c.min_similarity, 70.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn out_of_range_rejected() {
        let mut c = ValidationCriteria::default();
        c.min_similarity = 100.5;
        assert!(c.validate().is_err());

        let mut c = ValidationCriteria::default();
        c.min_sharpness = -1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn nan_rejected() {
        let mut c = ValidationCriteria::default();
        c.min_confidence = f32::NAN;
        assert!(matches!(c.validate(), Err(KycError::InvalidCriteria(_))));
    }
}
