//! Response envelope shared by all non-redirect endpoints.
//!
//! Every JSON response carries `responseTime` and `correlationId` plus
//! either `{code, data}` on success or `{error, message}` on failure. The
//! correlation id echoes the inbound `X-Correlation-Id` header when present
//! and is generated otherwise; it is also set as a response header.

use axum::{
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{codes as error_codes, AppError};

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Machine-readable success codes returned in the envelope's `code` field.
pub mod success_codes {
    pub const LINK_CREATED: &str = "LINK_CREATED";
    pub const LINK_DELETED: &str = "LINK_DELETED";
    pub const STATS_FOUND: &str = "STATS_FOUND";
}

/// Correlation id of the current request.
///
/// Extracted from `X-Correlation-Id` or freshly generated as a UUID v4.
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Ties an error to this request for envelope rendering.
    pub fn failure(&self, error: AppError) -> Failure {
        Failure {
            correlation_id: self.0.clone(),
            error,
        }
    }
}

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(CorrelationId(id))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T: Serialize> {
    pub response_time: DateTime<Utc>,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Renders a success envelope with the given status and code.
pub fn success<T: Serialize>(
    correlation: &CorrelationId,
    status: StatusCode,
    code: &'static str,
    data: T,
) -> Response {
    let envelope = ApiEnvelope {
        response_time: Utc::now(),
        correlation_id: correlation.0.clone(),
        code: Some(code),
        data: Some(data),
        error: None,
        message: None,
    };
    with_correlation_header(&correlation.0, (status, Json(envelope)).into_response())
}

/// An [`AppError`] bound to the request's correlation id.
#[derive(Debug)]
pub struct Failure {
    pub correlation_id: String,
    pub error: AppError,
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let (status, code) = match &self.error {
            AppError::Validation { code, .. } => (StatusCode::BAD_REQUEST, *code),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, error_codes::LINK_NOT_FOUND),
            AppError::Expired { .. } => (StatusCode::GONE, error_codes::LINK_EXPIRED),
            AppError::Conflict { .. } | AppError::NotOwned { .. } | AppError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
        };

        let envelope: ApiEnvelope<()> = ApiEnvelope {
            response_time: Utc::now(),
            correlation_id: self.correlation_id.clone(),
            code: None,
            data: None,
            error: Some(code),
            message: Some(self.error.message().to_string()),
        };
        with_correlation_header(
            &self.correlation_id,
            (status, Json(envelope)).into_response(),
        )
    }
}

fn with_correlation_header(correlation_id: &str, mut response: Response) -> Response {
    if let Ok(value) = HeaderValue::from_str(correlation_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
    }
    response
}
