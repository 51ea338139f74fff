//! Rekognition + Textract implementation of [`VisionService`].

use std::time::Duration;

use async_trait::async_trait;
use kyc_vision::{DocumentAnalysis, FaceComparison, FaceDetection, VisionError, VisionService};

use crate::client::DEFAULT_TIMEOUT;
use crate::rekognition::{
    CompareFacesRequest, CompareFacesResponse, DetectFacesRequest, DetectFacesResponse, Image,
};
use crate::textract::{AnalyzeIdRequest, AnalyzeIdResponse};
use crate::{AwsConfig, AwsError, AwsJsonClient, AwsService};

pub struct AwsVisionService {
    rekognition: AwsJsonClient,
    textract: AwsJsonClient,
}

impl AwsVisionService {
    pub fn new(config: &AwsConfig) -> Result<Self, AwsError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(config: &AwsConfig, timeout: Duration) -> Result<Self, AwsError> {
        Ok(Self {
            rekognition: AwsJsonClient::with_timeout(config, AwsService::Rekognition, timeout)?,
            textract: AwsJsonClient::with_timeout(config, AwsService::Textract, timeout)?,
        })
    }
}

#[async_trait]
impl VisionService for AwsVisionService {
    fn name(&self) -> &str {
        "aws"
    }

    async fn analyze_document(&self, image: &[u8]) -> Result<DocumentAnalysis, VisionError> {
        let resp: AnalyzeIdResponse = self
            .textract
            .call("AnalyzeID", &AnalyzeIdRequest::new(image))
            .await?;
        Ok(resp.into())
    }

    async fn detect_faces(&self, image: &[u8]) -> Result<FaceDetection, VisionError> {
        let resp: DetectFacesResponse = self
            .rekognition
            .call("DetectFaces", &DetectFacesRequest::new(image))
            .await?;
        Ok(resp.into())
    }

    async fn compare_faces(
        &self,
        source: &[u8],
        target: &[u8],
        similarity_threshold: f32,
    ) -> Result<FaceComparison, VisionError> {
        let request = CompareFacesRequest {
            source_image: Image::from_bytes(source),
            target_image: Image::from_bytes(target),
            similarity_threshold,
        };
        let resp: CompareFacesResponse = self.rekognition.call("CompareFaces", &request).await?;
        Ok(resp.into())
    }
}
