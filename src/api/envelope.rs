// Standard JSON envelopes shared by success and error responses
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::date;

/// Default messages for callers with nothing more specific to say
pub mod message {
    pub const SUCCESS: &str = "Success!";
    pub const CREATED: &str = "Created!";
    pub const BAD_REQUEST: &str = "Bad Request!";
    pub const UNAUTHORIZED: &str = "Unauthorized Access!";
    pub const NOT_FOUND: &str = "Endpoint Not Found!";
    pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
    pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
    /// Substituted when an envelope is built without a message
    pub const UNEXPECTED: &str = "Unexpected Error Occurred";
}

/// `{"status_code", "status", "message", "time_stamp"}` in that order.
///
/// The time stamp is captured when the envelope is built and cannot be supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    status_code: u16,
    status: bool,
    message: String,
    time_stamp: String,
}

impl ResponseEnvelope {
    pub fn build(success: bool, message: Option<String>, status: StatusCode) -> Self {
        Self {
            status_code: status.as_u16(),
            status: success,
            message: message.unwrap_or_else(|| message::UNEXPECTED.to_string()),
            time_stamp: date::now_instant(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status(&self) -> bool {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn time_stamp(&self) -> &str {
        &self.time_stamp
    }

    /// Field-for-field comparison that ignores when the envelope was built
    pub fn same_content(&self, other: &Self) -> bool {
        self.status_code == other.status_code
            && self.status == other.status
            && self.message == other.message
    }
}

/// Successful login: the standard envelope followed by `access_token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEnvelope {
    status_code: u16,
    status: bool,
    message: String,
    time_stamp: String,
    access_token: String,
}

impl LoginEnvelope {
    pub fn new(message: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            status: true,
            message: message.into(),
            time_stamp: date::now_instant(),
            access_token: access_token.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status(&self) -> bool {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn time_stamp(&self) -> &str {
        &self.time_stamp
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}
