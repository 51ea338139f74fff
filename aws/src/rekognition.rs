//! Rekognition `DetectFaces` / `CompareFaces` wire format.

use base64::{engine::general_purpose, Engine as _};
use kyc_vision::{FaceComparison, FaceDetail, FaceDetection, FaceMatch, FaceQuality};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    pub bytes: String,
}

impl Image {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: general_purpose::STANDARD.encode(bytes),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectFacesRequest {
    pub image: Image,
    pub attributes: Vec<&'static str>,
}

impl DetectFacesRequest {
    pub fn new(image: &[u8]) -> Self {
        Self {
            image: Image::from_bytes(image),
            attributes: vec!["DEFAULT", "ALL"],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DetectFacesResponse {
    pub face_details: Vec<WireFaceDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireFaceDetail {
    pub confidence: Option<f32>,
    pub quality: Option<WireQuality>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireQuality {
    pub brightness: Option<f32>,
    pub sharpness: Option<f32>,
}

impl From<DetectFacesResponse> for FaceDetection {
    fn from(resp: DetectFacesResponse) -> Self {
        FaceDetection {
            faces: resp
                .face_details
                .into_iter()
                .map(|d| FaceDetail {
                    confidence: d.confidence,
                    quality: d.quality.map(|q| FaceQuality {
                        brightness: q.brightness,
                        sharpness: q.sharpness,
                    }),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompareFacesRequest {
    pub source_image: Image,
    pub target_image: Image,
    pub similarity_threshold: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CompareFacesResponse {
    pub face_matches: Vec<WireFaceMatch>,
    pub unmatched_faces: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireFaceMatch {
    pub similarity: Option<f32>,
}

impl From<CompareFacesResponse> for FaceComparison {
    fn from(resp: CompareFacesResponse) -> Self {
        FaceComparison {
            matches: resp
                .face_matches
                .into_iter()
                .map(|m| FaceMatch {
                    similarity: m.similarity,
                })
                .collect(),
            unmatched_faces: resp.unmatched_faces.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_request_shape() {
        let json = serde_json::to_value(DetectFacesRequest::new(b"foo")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Image": {"Bytes": "Zm9v"}, "Attributes": ["DEFAULT", "ALL"]})
        );
    }

    #[test]
    fn detect_response_keeps_missing_quality_absent() {
        let body = r#"{"FaceDetails":[
            {"Confidence":99.1,"Quality":{"Brightness":61.5,"Sharpness":78.6},"AgeRange":{"Low":20,"High":30}},
            {"Confidence":88.0}
        ]}"#;
        let detection: FaceDetection = serde_json::from_str::<DetectFacesResponse>(body).unwrap().into();
        assert_eq!(detection.faces.len(), 2);
        assert_eq!(detection.faces[0].quality.unwrap().sharpness, Some(78.6));
        assert_eq!(detection.faces[1].quality, None);
    }

    #[test]
    fn compare_response_counts_unmatched() {
        let body = r#"{"FaceMatches":[{"Similarity":97.3,"Face":{"Confidence":99.9}}],
                       "UnmatchedFaces":[{"Confidence":95.0}],
                       "SourceImageFace":{"Confidence":99.0}}"#;
        let comparison: FaceComparison =
            serde_json::from_str::<CompareFacesResponse>(body).unwrap().into();
        assert_eq!(comparison.matches[0].similarity, Some(97.3));
        assert_eq!(comparison.unmatched_faces, 1);
    }
}
