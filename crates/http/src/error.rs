//! Error handling for the HTTP layer

use std::sync::OnceLock;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{
    format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime, UtcOffset,
};

/// `dd-MM-yyyy hh:mm:ss`, 12-hour clock.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]-[month]-[year] [hour repr:12]:[minute]:[second]");

const GENERIC_MESSAGE: &str = "an error occurred";

/// Offset used for error timestamps, captured before the runtime spawns threads.
static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();
const MALFORMED_JSON_MESSAGE: &str = "Malformed JSON request";

/// Standard error response format for all HTTP errors
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status: String,
    pub timestamp: String,
    pub message: String,
    pub debug_message: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>, debug_message: impl Into<String>) -> Self {
        Self {
            status: status_name(status),
            timestamp: format_timestamp(now()),
            message: message.into(),
            debug_message: debug_message.into(),
        }
    }
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{debug_message}")]
    BadRequest {
        message: String,
        debug_message: String,
    },

    /// Failure answered by the transport itself: unknown route, wrong method,
    /// unsupported media type, timeout.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a bad request error for input the transport layer could not read
    pub fn bad_request(message: impl Into<String>, debug_message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            debug_message: debug_message.into(),
        }
    }

    /// Create an error for a request the transport refused with `status`
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Rejected { status, .. } => *status,
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Self::rejected(rejection.status(), rejection.body_text())
            }
            other => Self::bad_request(MALFORMED_JSON_MESSAGE, other.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(GENERIC_MESSAGE, rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(GENERIC_MESSAGE, rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let debug_message = match &self {
            AppError::Internal(e) => format!("{e:#}"),
            other => other.to_string(),
        };
        let message = match self {
            AppError::BadRequest { message, .. } => message,
            _ => GENERIC_MESSAGE.to_string(),
        };

        tracing::error!(
            status_code = %status.as_u16(),
            error = %debug_message,
            "error processing request"
        );

        (status, Json(ErrorBody::new(status, message, debug_message))).into_response()
    }
}

/// Fallback handler for paths no route matches.
pub async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(format!("no route for {method} {uri}"))
}

/// Gives bodiless error responses produced by the framework or middleware
/// (405, 408, ...) the standard JSON error body.
pub async fn render_bare_errors(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error())
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    let reason = status.canonical_reason().unwrap_or("request failed");
    let mut rendered = AppError::rejected(status, reason).into_response();
    if let Some(allow) = response.headers().get(header::ALLOW) {
        rendered.headers_mut().insert(header::ALLOW, allow.clone());
    }
    rendered
}

/// Upper snake case reason phrase, e.g. `NOT_FOUND`.
fn status_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
        .replace([' ', '-'], "_")
}

/// Record the local UTC offset for error timestamps.
///
/// Must run before the async runtime starts: the offset cannot be read once
/// other threads exist. Without it timestamps are in UTC.
pub fn capture_local_offset() {
    match UtcOffset::current_local_offset() {
        Ok(offset) => {
            let _ = LOCAL_OFFSET.set(offset);
        }
        Err(e) => tracing::warn!(error = %e, "local offset unavailable, error timestamps use UTC"),
    }
}

fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    match LOCAL_OFFSET.get() {
        Some(offset) => now.to_offset(*offset),
        None => now,
    }
}

fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}
