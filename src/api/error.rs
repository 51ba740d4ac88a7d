use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::metadata::{ErrorKind, MetadataError};

/// Body of every failure response: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Failure of an API request.
///
/// Rewriter errors are reported with a fixed message per [`ErrorKind`]; the internal
/// error text only goes to the log.
#[derive(Debug)]
pub enum ApiError {
    /// The body did not match the request shape.
    InvalidRequest { status: StatusCode, detail: String },
    /// The rewriter rejected the image or comment.
    Metadata(MetadataError),
    /// The server failed on its own.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { status, .. } => *status,
            Self::Metadata(e) => match e.kind() {
                ErrorKind::Decode => StatusCode::BAD_REQUEST,
                ErrorKind::Format => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorKind::Serialization => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client.
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidRequest { detail, .. } => detail.clone(),
            Self::Metadata(e) => match e.kind() {
                ErrorKind::Decode => "image_b64 is not a valid base64-encoded image".to_string(),
                ErrorKind::Format => "the provided image is not a PNG".to_string(),
                ErrorKind::Serialization => {
                    "user_comment could not be serialized to JSON".to_string()
                }
            },
            Self::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl From<MetadataError> for ApiError {
    fn from(e: MetadataError) -> Self {
        Self::Metadata(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::InvalidRequest { detail, .. } => log::debug!("Rejected request ({status}): {detail}"),
            Self::Metadata(e) => log::warn!("Metadata update failed ({status}): {e}"),
            Self::Internal(e) => log::error!("Internal error: {e}"),
        }
        (status, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    #[test]
    fn status_per_kind() {
        assert_eq!(
            ApiError::from(MetadataError::UnknownFormat).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MetadataError::NotPng(ImageFormat::Jpeg)).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ApiError::from(MetadataError::Serialization("x".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Internal("join".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn detail_hides_internal_text() {
        let err = ApiError::from(MetadataError::Image("zlib: invalid distance at 0x1f".into()));
        assert!(!err.detail().contains("zlib"));

        let err = ApiError::Internal("task panicked at src/metadata/writer.rs".into());
        assert_eq!(err.detail(), "internal server error");
    }
}
