//! Inbound submission as handed over by the HTTP layer.

use crate::VerificationError;

pub const ID_IMAGE_FIELD: &str = "id_image";
pub const SELFIE_FIELD: &str = "selfie";

/// One uploaded file: declared content type plus raw bytes.
#[derive(Clone, Debug, Default)]
pub struct ImagePayload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            bytes,
        }
    }

    /// Accept only non-empty payloads declared as `image/*`.
    pub(crate) fn validate(&self, field: &str) -> Result<(), VerificationError> {
        let invalid = |reason: &str| VerificationError::MissingOrInvalidFile {
            field: field.to_string(),
            reason: reason.to_string(),
        };
        match self.content_type.as_deref() {
            Some(ct) if ct.to_ascii_lowercase().starts_with("image/") => {}
            _ => return Err(invalid("file must be an image (JPG, PNG)")),
        }
        if self.bytes.is_empty() {
            return Err(invalid("file is empty"));
        }
        Ok(())
    }
}

/// A full verification request.
#[derive(Clone, Debug, Default)]
pub struct KycSubmission {
    pub email: String,
    pub id_image: Option<ImagePayload>,
    pub selfie: Option<ImagePayload>,
}

impl KycSubmission {
    /// Both payloads, validated. Missing files are reported before malformed
    /// ones, ID image before selfie.
    pub(crate) fn images(&self) -> Result<(&ImagePayload, &ImagePayload), VerificationError> {
        let id_image = require(self.id_image.as_ref(), ID_IMAGE_FIELD)?;
        let selfie = require(self.selfie.as_ref(), SELFIE_FIELD)?;
        id_image.validate(ID_IMAGE_FIELD)?;
        selfie.validate(SELFIE_FIELD)?;
        Ok((id_image, selfie))
    }
}

fn require<'a>(
    payload: Option<&'a ImagePayload>,
    field: &str,
) -> Result<&'a ImagePayload, VerificationError> {
    payload.ok_or_else(|| VerificationError::MissingOrInvalidFile {
        field: field.to_string(),
        reason: "file is required".to_string(),
    })
}
