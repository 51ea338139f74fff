//! Textract `AnalyzeID` wire format.

use base64::{engine::general_purpose, Engine as _};
use kyc_vision::{DocumentAnalysis, DocumentField, IdentityDocument};
use serde::{Deserialize, Serialize};

use crate::rekognition::Image;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalyzeIdRequest {
    pub document_pages: Vec<Image>,
}

impl AnalyzeIdRequest {
    pub fn new(image: &[u8]) -> Self {
        Self {
            document_pages: vec![Image {
                bytes: general_purpose::STANDARD.encode(image),
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AnalyzeIdResponse {
    pub identity_documents: Vec<WireIdentityDocument>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireIdentityDocument {
    pub identity_document_fields: Vec<WireField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WireField {
    #[serde(rename = "Type")]
    pub field_type: Option<Detection>,
    pub value_detection: Option<Detection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Detection {
    pub text: String,
    pub confidence: Option<f32>,
}

impl From<AnalyzeIdResponse> for DocumentAnalysis {
    fn from(resp: AnalyzeIdResponse) -> Self {
        DocumentAnalysis {
            documents: resp
                .identity_documents
                .into_iter()
                .map(|doc| IdentityDocument {
                    fields: doc
                        .identity_document_fields
                        .into_iter()
                        .filter_map(|f| {
                            let field_type = f.field_type?.text;
                            let value = f.value_detection.unwrap_or_default();
                            Some(DocumentField {
                                field_type,
                                value: value.text,
                                confidence: value.confidence,
                            })
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identity_fields() {
        let body = r#"{"IdentityDocuments":[{"DocumentIndex":1,"IdentityDocumentFields":[
            {"Type":{"Text":"FIRST_NAME"},"ValueDetection":{"Text":"JOHN","Confidence":98.4}},
            {"Type":{"Text":"LAST_NAME"},"ValueDetection":{"Text":"DOE","Confidence":97.0}},
            {"ValueDetection":{"Text":"orphan"}}
        ]}],"DocumentMetadata":{"Pages":1}}"#;
        let analysis: DocumentAnalysis =
            serde_json::from_str::<AnalyzeIdResponse>(body).unwrap().into();
        assert_eq!(analysis.field_count(), 2);
        let first = &analysis.documents[0].fields[0];
        assert_eq!(first.field_type, "FIRST_NAME");
        assert_eq!(first.value, "JOHN");
        assert_eq!(first.confidence, Some(98.4));
    }

    #[test]
    fn request_shape() {
        let json = serde_json::to_value(AnalyzeIdRequest::new(b"fo")).unwrap();
        assert_eq!(json, serde_json::json!({"DocumentPages": [{"Bytes": "Zm8="}]}));
    }
}
