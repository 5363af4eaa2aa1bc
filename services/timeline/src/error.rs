use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use lifeline_auth_types::session::Unauthenticated;
use lifeline_domain::photo::MAX_PHOTO_BYTES;
use lifeline_domain::validation::ValidationError;

/// Failures reported by the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailAlreadyRegistered,
    #[error("email address not confirmed")]
    EmailNotConfirmed,
    #[error("password rejected: {0}")]
    WeakPassword(String),
    #[error("not signed in")]
    Unauthenticated,
    #[error("identity provider error: {0}")]
    Provider(String),
}

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::EmailNotConfirmed => "EMAIL_NOT_CONFIRMED",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::Unauthenticated => Unauthenticated::KIND,
            Self::Provider(_) => "AUTH_PROVIDER",
        }
    }
}

/// Timeline service error variants.
#[derive(Debug, thiserror::Error)]
pub enum TimelineServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("invalid form data: {0}")]
    Form(MultipartError),
    #[error("invalid form data: {0}")]
    FormRequest(#[from] MultipartRejection),
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("invalid path: {0}")]
    Path(#[from] PathRejection),
    #[error("photo upload failed: {0}")]
    Upload(String),
    #[error("photo delete failed: {0}")]
    Delete(String),
    #[error("event store error: {0}")]
    Row(String),
    #[error("event not found")]
    EventNotFound,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl TimelineServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.kind(),
            Self::Auth(e) => e.kind(),
            Self::Form(_) | Self::FormRequest(_) => "INVALID_FORM",
            Self::Body(_) => "INVALID_BODY",
            Self::Path(_) => "INVALID_PATH",
            Self::Upload(_) => "UPLOAD_FAILED",
            Self::Delete(_) => "DELETE_FAILED",
            Self::Row(_) => "ROW_FAILED",
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(ValidationError::PhotoTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Validation(ValidationError::UnsupportedPhotoType { .. }) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::InvalidCredentials | AuthError::Unauthenticated) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::EmailAlreadyRegistered) => StatusCode::CONFLICT,
            Self::Auth(AuthError::EmailNotConfirmed) => StatusCode::FORBIDDEN,
            Self::Auth(AuthError::WeakPassword(_)) => StatusCode::BAD_REQUEST,
            Self::Form(e) => e.status(),
            Self::FormRequest(e) => e.status(),
            Self::Body(e) => e.status(),
            Self::Path(e) => e.status(),
            Self::Auth(AuthError::Provider(_))
            | Self::Upload(_)
            | Self::Delete(_)
            | Self::Row(_) => StatusCode::BAD_GATEWAY,
            Self::EventNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for TimelineServiceError {
    /// A form cut off by the request body limit is reported as an oversized photo.
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ValidationError::PhotoTooLarge {
                size: MAX_PHOTO_BYTES + 1,
            }
            .into()
        } else {
            Self::Form(e)
        }
    }
}

impl IntoResponse for TimelineServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors; the TraceLayer already records their status.
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            e if status == StatusCode::BAD_GATEWAY => {
                tracing::warn!(error = %e, kind = e.kind(), "upstream failure")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
