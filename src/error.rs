use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

/// Machine-readable error codes returned in API envelopes.
pub mod codes {
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const INVALID_URL: &str = "INVALID_URL";
    pub const LINK_NOT_FOUND: &str = "LINK_NOT_FOUND";
    pub const LINK_EXPIRED: &str = "LINK_EXPIRED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Application error taxonomy.
///
/// Every failure observed anywhere in the pipeline is tagged with one of
/// these kinds, which decides how it is handled:
///
/// - [`AppError::Validation`] - returned to the client, never retried
/// - [`AppError::NotFound`] / [`AppError::Expired`] - returned to the client
///   as 404 / 410
/// - [`AppError::Conflict`] - slug collision; retried by the create path
/// - [`AppError::NotOwned`] - an outbox lease was taken over by another
///   worker; logged at info and dropped
/// - [`AppError::Internal`] - transient storage or broker failure; surfaced
///   as 5xx in the API, retried with backoff in the workers
#[derive(Debug)]
pub enum AppError {
    Validation {
        code: &'static str,
        message: String,
        details: Value,
    },
    NotFound {
        message: String,
        details: Value,
    },
    Expired {
        message: String,
        details: Value,
    },
    Conflict {
        message: String,
        details: Value,
    },
    NotOwned {
        message: String,
        details: Value,
    },
    Internal {
        message: String,
        details: Value,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            code: codes::INVALID_REQUEST,
            message: message.into(),
            details,
        }
    }

    pub fn invalid_url(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            code: codes::INVALID_URL,
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn expired(message: impl Into<String>, details: Value) -> Self {
        Self::Expired {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn not_owned(message: impl Into<String>, details: Value) -> Self {
        Self::NotOwned {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Expired { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::NotOwned { message, .. }
            | AppError::Internal { message, .. } => message,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation {
                code,
                message,
                details,
            } => (StatusCode::BAD_REQUEST, code, message, details),
            AppError::NotFound { message, details } => (
                StatusCode::NOT_FOUND,
                codes::LINK_NOT_FOUND,
                message,
                details,
            ),
            AppError::Expired { message, details } => {
                (StatusCode::GONE, codes::LINK_EXPIRED, message, details)
            }
            AppError::Conflict { message, details }
            | AppError::NotOwned { message, details }
            | AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::INTERNAL_ERROR,
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    AppError::internal("Database error", json!({ "cause": e.to_string() }))
}
