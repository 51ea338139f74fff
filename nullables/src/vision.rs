//! Nullable vision service — scripted provider responses without a network.

use async_trait::async_trait;
use kyc_vision::{
    DocumentAnalysis, FaceComparison, FaceDetail, FaceDetection, FaceMatch, FaceQuality,
    VisionError, VisionService,
};
use std::sync::Mutex;
use std::time::Duration;

/// A call the service received, for assertions on ordering and arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum VisionCall {
    AnalyzeDocument { image_len: usize },
    DetectFaces { image_len: usize },
    CompareFaces { source_len: usize, target_len: usize, threshold: f32 },
}

/// A vision provider that answers from a script.
///
/// Each operation returns a clone of its configured response every time it
/// is called. The default script is a clean pass: one sharp, bright,
/// confident face and a single 85% match.
pub struct NullVisionService {
    document: Mutex<Result<DocumentAnalysis, VisionError>>,
    detection: Mutex<Result<FaceDetection, VisionError>>,
    comparison: Mutex<Result<FaceComparison, VisionError>>,
    compare_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<VisionCall>>,
}

impl NullVisionService {
    pub fn new() -> Self {
        Self {
            document: Mutex::new(Ok(DocumentAnalysis::default())),
            detection: Mutex::new(Ok(Self::single_face(95.0, 60.0, 70.0))),
            comparison: Mutex::new(Ok(Self::matching(85.0))),
            compare_delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A detection with exactly one face and fully populated metrics.
    pub fn single_face(confidence: f32, brightness: f32, sharpness: f32) -> FaceDetection {
        FaceDetection {
            faces: vec![FaceDetail {
                confidence: Some(confidence),
                quality: Some(FaceQuality {
                    brightness: Some(brightness),
                    sharpness: Some(sharpness),
                }),
            }],
        }
    }

    /// A comparison reporting one match at `similarity`.
    pub fn matching(similarity: f32) -> FaceComparison {
        FaceComparison {
            matches: vec![FaceMatch {
                similarity: Some(similarity),
            }],
            unmatched_faces: 0,
        }
    }

    pub fn set_document(&self, response: Result<DocumentAnalysis, VisionError>) {
        *self.document.lock().unwrap() = response;
    }

    pub fn set_detection(&self, response: Result<FaceDetection, VisionError>) {
        *self.detection.lock().unwrap() = response;
    }

    pub fn set_comparison(&self, response: Result<FaceComparison, VisionError>) {
        *self.comparison.lock().unwrap() = response;
    }

    /// Make `compare_faces` sleep before answering.
    pub fn set_compare_delay(&self, delay: Duration) {
        *self.compare_delay.lock().unwrap() = Some(delay);
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<VisionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: VisionCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for NullVisionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for NullVisionService {
    fn name(&self) -> &str {
        "null-vision"
    }

    async fn analyze_document(&self, image: &[u8]) -> Result<DocumentAnalysis, VisionError> {
        self.record(VisionCall::AnalyzeDocument {
            image_len: image.len(),
        });
        self.document.lock().unwrap().clone()
    }

    async fn detect_faces(&self, image: &[u8]) -> Result<FaceDetection, VisionError> {
        self.record(VisionCall::DetectFaces {
            image_len: image.len(),
        });
        self.detection.lock().unwrap().clone()
    }

    async fn compare_faces(
        &self,
        source: &[u8],
        target: &[u8],
        similarity_threshold: f32,
    ) -> Result<FaceComparison, VisionError> {
        self.record(VisionCall::CompareFaces {
            source_len: source.len(),
            target_len: target.len(),
            threshold: similarity_threshold,
        });
        let delay = *self.compare_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.comparison.lock().unwrap().clone()
    }
}
