use kyc_store::StoreError;
use kyc_vision::VisionError;
use thiserror::Error;

/// Whether a failure was caused by the submitter or by the gateway and its
/// dependencies. The HTTP layer maps these to 400 and 500.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Internal,
}

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("email is required")]
    MissingEmail,

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("KYC with this email is already done successfully")]
    AlreadyVerified(String),

    #[error("{field}: {reason}")]
    MissingOrInvalidFile { field: String, reason: String },

    #[error("failed to analyze ID document: {0}")]
    DocumentAnalysisFailed(#[source] VisionError),

    #[error("failed to detect faces in selfie: {0}")]
    FaceDetectionFailed(#[source] VisionError),

    #[error("exactly one face should be detected, found {0}")]
    FaceCountInvalid(usize),

    #[error(
        "low face detection confidence: {shown:.2} (required: {required:.2})",
        shown = .confidence.unwrap_or(0.0)
    )]
    LowConfidence { confidence: Option<f32>, required: f32 },

    #[error("{0}")]
    IncompleteQualityMetrics(&'static str),

    #[error(
        "poor image quality (brightness: {brightness:.2}/{min_brightness:.2}, sharpness: {sharpness:.2}/{min_sharpness:.2})"
    )]
    PoorImageQuality {
        brightness: f32,
        sharpness: f32,
        min_brightness: f32,
        min_sharpness: f32,
    },

    #[error("failed to compare faces: {0}")]
    FaceComparisonFailed(#[source] VisionError),

    #[error("no face matches found")]
    NoFaceMatch,

    #[error("KYC with this email is already done successfully")]
    AlreadyRecorded(String),

    #[error("attempt ledger error: {0}")]
    Ledger(#[source] StoreError),

    #[error("verification timed out after {0}s")]
    Timeout(u64),
}

impl VerificationError {
    pub fn status_class(&self) -> ErrorClass {
        match self {
            Self::DocumentAnalysisFailed(_)
            | Self::FaceDetectionFailed(_)
            | Self::FaceComparisonFailed(_)
            | Self::Ledger(_)
            | Self::Timeout(_) => ErrorClass::Internal,
            _ => ErrorClass::Client,
        }
    }

    /// Whether the failure came out of the vision provider call path.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::DocumentAnalysisFailed(_)
                | Self::FaceDetectionFailed(_)
                | Self::FaceComparisonFailed(_)
        )
    }

    /// Short stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::MissingEmail => "missing_email",
            Self::InvalidEmail(_) => "invalid_email",
            Self::AlreadyVerified(_) => "already_verified",
            Self::MissingOrInvalidFile { .. } => "invalid_file",
            Self::DocumentAnalysisFailed(_) => "document_analysis_failed",
            Self::FaceDetectionFailed(_) => "face_detection_failed",
            Self::FaceCountInvalid(_) => "face_count_invalid",
            Self::LowConfidence { .. } => "low_confidence",
            Self::IncompleteQualityMetrics(_) => "incomplete_quality_metrics",
            Self::PoorImageQuality { .. } => "poor_image_quality",
            Self::FaceComparisonFailed(_) => "face_comparison_failed",
            Self::NoFaceMatch => "no_face_match",
            Self::AlreadyRecorded(_) => "already_recorded",
            Self::Ledger(_) => "ledger",
            Self::Timeout(_) => "timeout",
        }
    }
}
