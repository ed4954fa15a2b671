use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};

use super::envelope::{message, LoginEnvelope, ResponseEnvelope};

/// An envelope paired with the HTTP status it is sent with
#[derive(Debug, Clone)]
pub struct ServerResponse {
    status: StatusCode,
    body: ResponseEnvelope,
}

impl ServerResponse {
    /// Build an envelope whose `status_code` always agrees with the HTTP status
    pub fn build(success: bool, message: Option<String>, status: StatusCode) -> Self {
        Self {
            status,
            body: ResponseEnvelope::build(success, message, status),
        }
    }

    /// 200 OK
    pub fn ok(message: impl Into<String>) -> Self {
        Self::build(true, Some(message.into()), StatusCode::OK)
    }

    /// 201 Created
    pub fn created(message: impl Into<String>) -> Self {
        Self::build(true, Some(message.into()), StatusCode::CREATED)
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::build(false, Some(message.into()), StatusCode::BAD_REQUEST)
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::build(false, Some(message.into()), StatusCode::UNAUTHORIZED)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::build(false, Some(message.into()), StatusCode::NOT_FOUND)
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::build(false, Some(message.into()), StatusCode::METHOD_NOT_ALLOWED)
    }

    /// 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::build(false, Some(message.into()), StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 500 from an underlying cause; a cause without a message reads "Internal Server Error"
    pub fn internal_server_error_from(cause: Option<&(dyn std::error::Error + 'static)>) -> Self {
        let message = cause
            .map(|e| e.to_string())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| message::INTERNAL_SERVER_ERROR.to_string());
        Self::internal_server_error(message)
    }

    /// 200 OK carrying a freshly issued access token
    pub fn login(message: impl Into<String>, access_token: impl Into<String>) -> LoginResponse {
        LoginResponse(LoginEnvelope::new(message, access_token))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn envelope(&self) -> &ResponseEnvelope {
        &self.body
    }

    pub fn into_parts(self) -> (StatusCode, ResponseEnvelope) {
        (self.status, self.body)
    }
}

impl IntoResponse for ServerResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Login envelope response, always 200 OK
#[derive(Debug, Clone)]
pub struct LoginResponse(pub LoginEnvelope);

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Router fallback so unmatched paths still answer with the standard envelope
pub async fn not_found_fallback() -> ServerResponse {
    ServerResponse::not_found(message::NOT_FOUND)
}

/// Replaces axum's empty 405 body with the standard envelope, keeping the `Allow` header.
///
/// Install with `axum::middleware::map_response`.
pub async fn method_not_allowed_envelope(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped = ServerResponse::method_not_allowed(message::METHOD_NOT_ALLOWED).into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}
