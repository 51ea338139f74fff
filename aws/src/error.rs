use kyc_store::StoreError;
use kyc_vision::VisionError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AwsError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("{code}: {message}")]
    Auth { code: String, message: String },

    #[error("{code}: {message}")]
    Throttled { code: String, message: String },

    #[error("HTTP {status} {code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

impl AwsError {
    /// Classify an AWS error code returned in `__type` or `x-amzn-ErrorType`.
    pub fn from_code(status: u16, code: String, message: String) -> Self {
        match code.as_str() {
            "ThrottlingException"
            | "ProvisionedThroughputExceededException"
            | "RequestLimitExceeded"
            | "LimitExceededException" => Self::Throttled { code, message },
            "UnrecognizedClientException"
            | "AccessDeniedException"
            | "InvalidSignatureException"
            | "ExpiredTokenException"
            | "MissingAuthenticationTokenException" => Self::Auth { code, message },
            _ => Self::Service {
                status,
                code,
                message,
            },
        }
    }

    /// The AWS error code, when the service returned one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Auth { code, .. } | Self::Throttled { code, .. } | Self::Service { code, .. } => {
                Some(code)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AwsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AwsError::Timeout
        } else if e.is_connect() {
            AwsError::Transport(format!("connection failed: {e}"))
        } else {
            AwsError::Transport(e.to_string())
        }
    }
}

impl From<AwsError> for VisionError {
    fn from(e: AwsError) -> Self {
        match e {
            AwsError::Timeout => VisionError::Timeout,
            AwsError::Transport(msg) | AwsError::Endpoint(msg) | AwsError::Signing(msg) => {
                VisionError::Transport(msg)
            }
            AwsError::Auth { code, message } => VisionError::Auth(format!("{code}: {message}")),
            AwsError::Throttled { code, message } => {
                VisionError::Throttled(format!("{code}: {message}"))
            }
            AwsError::Service { code, message, .. } => VisionError::Provider { code, message },
            AwsError::InvalidResponse(msg) => VisionError::InvalidResponse(msg),
        }
    }
}

impl From<AwsError> for StoreError {
    fn from(e: AwsError) -> Self {
        match e {
            AwsError::InvalidResponse(msg) => StoreError::Serialization(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
