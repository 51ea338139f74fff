//! Vision service capability.
//!
//! The gateway never looks at pixels itself. Document analysis, face
//! detection and face comparison are black-box operations of a remote
//! provider, reached through the [`VisionService`] trait. The AWS adapter
//! implements it for production and the nullables crate for tests.

pub mod error;
pub mod model;

use async_trait::async_trait;

pub use error::VisionError;
pub use model::{
    DocumentAnalysis, DocumentField, FaceComparison, FaceDetail, FaceDetection, FaceMatch,
    FaceQuality, FaceQualityMetrics, IdentityDocument,
};

/// A remote provider of document and face analysis.
///
/// Every call is a network round trip. Dropping the returned future
/// abandons the call.
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Extract identity-document fields from an ID image.
    async fn analyze_document(&self, image: &[u8]) -> Result<DocumentAnalysis, VisionError>;

    /// Detect faces and their quality attributes in an image.
    async fn detect_faces(&self, image: &[u8]) -> Result<FaceDetection, VisionError>;

    /// Compare the largest face in `source` against faces in `target`.
    ///
    /// The provider only reports matches at or above `similarity_threshold`.
    async fn compare_faces(
        &self,
        source: &[u8],
        target: &[u8],
        similarity_threshold: f32,
    ) -> Result<FaceComparison, VisionError>;
}
