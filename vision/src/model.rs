//! Provider-neutral view of document and face analysis output.
//!
//! Every numeric attribute a provider may omit is an `Option`. Absence is
//! a distinct case the policy checks for, never a silent zero.

use serde::{Deserialize, Serialize};

// ── Document analysis ────────────────────────────────────────────────────

/// Output of identity-document analysis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub documents: Vec<IdentityDocument>,
}

impl DocumentAnalysis {
    /// Total number of fields extracted across all documents.
    pub fn field_count(&self) -> usize {
        self.documents.iter().map(|d| d.fields.len()).sum()
    }
}

/// One identity document found in the submitted image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityDocument {
    pub fields: Vec<DocumentField>,
}

/// A normalised key/value pair such as `FIRST_NAME` / `JOHN`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentField {
    pub field_type: String,
    pub value: String,
    pub confidence: Option<f32>,
}

// ── Face detection ───────────────────────────────────────────────────────

/// Output of face detection on one image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub faces: Vec<FaceDetail>,
}

/// One detected face.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceDetail {
    /// Detection confidence, 0–100.
    pub confidence: Option<f32>,
    pub quality: Option<FaceQuality>,
}

/// Image-quality attributes of a detected face, 0–100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceQuality {
    pub brightness: Option<f32>,
    pub sharpness: Option<f32>,
}

/// The metrics the quality gate inspects, flattened from a detection.
///
/// `quality_present` distinguishes "no quality block" from "quality block
/// with missing fields"; both fail the gate the same way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceQualityMetrics {
    pub face_count: usize,
    pub confidence: Option<f32>,
    pub quality_present: bool,
    pub brightness: Option<f32>,
    pub sharpness: Option<f32>,
}

impl FaceQualityMetrics {
    /// Metrics of the first detected face, plus the total face count.
    pub fn from_detection(detection: &FaceDetection) -> Self {
        let first = detection.faces.first();
        let quality = first.and_then(|f| f.quality);
        Self {
            face_count: detection.faces.len(),
            confidence: first.and_then(|f| f.confidence),
            quality_present: quality.is_some(),
            brightness: quality.and_then(|q| q.brightness),
            sharpness: quality.and_then(|q| q.sharpness),
        }
    }
}

// ── Face comparison ──────────────────────────────────────────────────────

/// Output of comparing a source face against a target image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceComparison {
    /// Matches at or above the requested threshold, in provider order.
    pub matches: Vec<FaceMatch>,
    /// Number of target faces that did not match.
    pub unmatched_faces: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    /// Similarity, 0–100.
    pub similarity: Option<f32>,
}
