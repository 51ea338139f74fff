//! Verification policy engine.
//!
//! Runs the three vision calls strictly in sequence and stops at the first
//! failing gate:
//!
//! 1. both images non-empty
//! 2. document analysis on the ID image
//! 3. face detection on the selfie, then the quality gate
//! 4. face comparison, ID image as source and selfie as target
//! 5. decision: `similarity >= min_similarity`
//!
//! The threshold is enforced twice, once by the provider on the comparison
//! call and once here on the returned score. Both must hold for a pass.

use std::sync::Arc;

use kyc_types::{ValidationCriteria, VerificationResult};
use kyc_vision::{FaceComparison, FaceDetection, FaceQualityMetrics, VisionError, VisionService};
use tracing::{debug, info, warn, Instrument, Span};

use crate::VerificationError;

const MISSING_QUALITY: &str = "missing face quality data";
const INCOMPLETE_QUALITY: &str = "incomplete face quality metrics";

pub struct PolicyEngine {
    vision: Arc<dyn VisionService>,
    criteria: ValidationCriteria,
    span: Span,
}

impl PolicyEngine {
    /// `span` is the parent for every verification run's log events.
    pub fn new(vision: Arc<dyn VisionService>, criteria: ValidationCriteria, span: Span) -> Self {
        Self {
            vision,
            criteria,
            span,
        }
    }

    pub fn criteria(&self) -> &ValidationCriteria {
        &self.criteria
    }

    pub fn provider(&self) -> &str {
        self.vision.name()
    }

    /// Run the full pipeline against one ID image and one selfie.
    pub async fn verify(
        &self,
        id_image: &[u8],
        selfie: &[u8],
    ) -> Result<VerificationResult, VerificationError> {
        let span = tracing::info_span!(
            parent: &self.span,
            "verify",
            provider = self.vision.name(),
            id_image_bytes = id_image.len(),
            selfie_bytes = selfie.len(),
        );
        self.run(id_image, selfie).instrument(span).await
    }

    async fn run(
        &self,
        id_image: &[u8],
        selfie: &[u8],
    ) -> Result<VerificationResult, VerificationError> {
        if id_image.is_empty() {
            return Err(VerificationError::InvalidInput(
                "ID image data is empty".into(),
            ));
        }
        if selfie.is_empty() {
            return Err(VerificationError::InvalidInput(
                "selfie image data is empty".into(),
            ));
        }

        let document = self
            .vision
            .analyze_document(id_image)
            .await
            .map_err(|e| {
                warn!(error = %e, "document analysis failed");
                VerificationError::DocumentAnalysisFailed(e)
            })?;
        debug!(
            documents = document.documents.len(),
            fields = document.field_count(),
            "document analyzed"
        );

        let detection = self.vision.detect_faces(selfie).await.map_err(|e| {
            warn!(error = %e, "face detection failed");
            VerificationError::FaceDetectionFailed(e)
        })?;
        if let Err(e) = self.check_face_quality(&detection) {
            info!(reason = e.kind(), "selfie rejected: {e}");
            return Err(e);
        }

        let comparison = self
            .vision
            .compare_faces(id_image, selfie, self.criteria.min_similarity)
            .await
            .map_err(|e| {
                warn!(error = %e, "face comparison failed");
                VerificationError::FaceComparisonFailed(e)
            })?;
        let similarity = first_similarity(&comparison)?;

        let result = self.decide(similarity);
        info!(
            verified = result.verified,
            similarity = result.similarity,
            "verification decided"
        );
        Ok(result)
    }

    /// Apply the face-count, confidence and quality gates to a detection.
    pub fn check_face_quality(
        &self,
        detection: &FaceDetection,
    ) -> Result<FaceQualityMetrics, VerificationError> {
        let metrics = FaceQualityMetrics::from_detection(detection);
        let c = &self.criteria;

        if metrics.face_count != 1 {
            return Err(VerificationError::FaceCountInvalid(metrics.face_count));
        }

        match metrics.confidence {
            Some(confidence) if confidence >= c.min_confidence => {}
            confidence => {
                return Err(VerificationError::LowConfidence {
                    confidence,
                    required: c.min_confidence,
                })
            }
        }

        if !metrics.quality_present {
            return Err(VerificationError::IncompleteQualityMetrics(MISSING_QUALITY));
        }
        let (Some(brightness), Some(sharpness)) = (metrics.brightness, metrics.sharpness) else {
            return Err(VerificationError::IncompleteQualityMetrics(INCOMPLETE_QUALITY));
        };

        if brightness < c.min_brightness || sharpness < c.min_sharpness {
            return Err(VerificationError::PoorImageQuality {
                brightness,
                sharpness,
                min_brightness: c.min_brightness,
                min_sharpness: c.min_sharpness,
            });
        }

        Ok(metrics)
    }

    /// Turn a similarity score into the final result.
    pub fn decide(&self, similarity: f32) -> VerificationResult {
        let required = self.criteria.min_similarity;
        let verified = similarity >= required;
        let message = if verified {
            format!("KYC verification successful with {similarity:.2}% similarity")
        } else {
            format!(
                "KYC verification failed with {similarity:.2}% similarity (required: {required:.2}%)"
            )
        };
        VerificationResult {
            verified,
            similarity,
            message,
        }
    }
}

/// The first reported match is authoritative.
fn first_similarity(comparison: &FaceComparison) -> Result<f32, VerificationError> {
    let first = comparison
        .matches
        .first()
        .ok_or(VerificationError::NoFaceMatch)?;
    first.similarity.ok_or_else(|| {
        VerificationError::FaceComparisonFailed(VisionError::InvalidResponse(
            "face match without similarity score".into(),
        ))
    })
}
