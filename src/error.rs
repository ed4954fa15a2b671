// Error taxonomy and the single classifier that turns errors into envelopes
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::envelope::{message, ResponseEnvelope};
use crate::api::response::ServerResponse;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler, service or the authentication gate can raise.
///
/// Handlers never build error responses themselves; they return one of these and
/// [`ApiError::classify`] produces the wire response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 - the request broke a resource rule
    #[error("{0}")]
    Validation(String),

    /// 401 - missing, invalid or expired credentials
    #[error("{0}")]
    Authorization(String),

    /// 500 - anything else; the cause is kept for logs and never sent to clients
    #[error("{}", .message.as_deref().unwrap_or(message::INTERNAL_SERVER_ERROR))]
    Unexpected {
        message: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// 400 - the request body could not be read or parsed
    #[error("{0}")]
    MalformedBody(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// `Field '<field>' is required`
    pub fn required(field: &str) -> Self {
        ApiError::Validation(format!("Field '{}' is required", field))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Authorization(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        ApiError::Unexpected {
            message: Some(message.into()),
            source: None,
        }
    }

    /// Wrap a lower-layer failure, taking its message when it has one
    pub fn exception<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = Some(cause.to_string()).filter(|m| !m.trim().is_empty());
        ApiError::Unexpected {
            message,
            source: Some(Box::new(cause)),
        }
    }

    pub fn malformed_body(message: impl Into<String>) -> Self {
        ApiError::MalformedBody(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authorization(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Map this error to its status and envelope. Pure apart from the envelope time stamp.
    pub fn classify(&self) -> (StatusCode, ResponseEnvelope) {
        let response = match self {
            ApiError::Validation(msg) | ApiError::MalformedBody(msg) => {
                ServerResponse::bad_request(msg.as_str())
            }
            ApiError::Authorization(msg) => ServerResponse::unauthorized(msg.as_str()),
            ApiError::Unexpected { message, .. } => match message {
                Some(msg) => ServerResponse::internal_server_error(msg.as_str()),
                None => ServerResponse::internal_server_error_from(None),
            },
        };

        response.into_parts()
    }

    fn log(&self) {
        match self {
            ApiError::Unexpected { source, .. } => match source {
                Some(cause) => tracing::error!(error = %self, cause = ?cause, "unexpected failure"),
                None => tracing::error!(error = %self, "unexpected failure"),
            },
            ApiError::Authorization(msg) => tracing::debug!("authorization failure: {}", msg),
            ApiError::Validation(msg) => tracing::debug!("validation failure: {}", msg),
            ApiError::MalformedBody(msg) => tracing::debug!("unreadable request body: {}", msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let (status, envelope) = self.classify();
        (status, axum::Json(envelope)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::malformed_body(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        ApiError::exception(err)
    }
}

impl From<crate::entity::RecordError> for ApiError {
    fn from(err: crate::entity::RecordError) -> Self {
        ApiError::exception(err)
    }
}
