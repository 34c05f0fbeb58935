//! Turns non-2xx responses into typed errors

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::rate_gate::parse_retry_after;
use crate::core::{ApiError, ModioError};

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_ref: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Value>>,
}

fn field_message(value: Value) -> String {
    match value {
        Value::String(message) => message,
        Value::Array(messages) => messages
            .into_iter()
            .map(field_message)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn fallback_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

/// Extract the server's error details, falling back to the raw body
pub fn parse_api_error(status: StatusCode, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => ApiError {
            status: status.as_u16(),
            error_ref: error.error_ref,
            message: error
                .message
                .unwrap_or_else(|| fallback_message(status, &[])),
            field_errors: error.errors.map(|errors| {
                errors
                    .into_iter()
                    .map(|(field, message)| (field, field_message(message)))
                    .collect()
            }),
        },
        Err(_) => ApiError {
            status: status.as_u16(),
            error_ref: None,
            message: fallback_message(status, body),
            field_errors: None,
        },
    }
}

/// Map a failed response to the matching error kind
///
/// Only the status decides the kind; the body supplies the details. The
/// classifier never retries.
pub fn classify(status: StatusCode, body: &[u8]) -> ModioError {
    let error = parse_api_error(status, body);
    match status {
        StatusCode::BAD_REQUEST => ModioError::BadRequest(error),
        StatusCode::UNAUTHORIZED => ModioError::Unauthorized(error),
        StatusCode::FORBIDDEN => ModioError::Forbidden(error),
        StatusCode::NOT_FOUND => ModioError::NotFound(error),
        StatusCode::METHOD_NOT_ALLOWED => ModioError::MethodNotAllowed(error),
        StatusCode::NOT_ACCEPTABLE => ModioError::NotAcceptable(error),
        StatusCode::GONE => ModioError::Gone(error),
        StatusCode::UNPROCESSABLE_ENTITY => ModioError::UnprocessableEntity(error),
        StatusCode::TOO_MANY_REQUESTS => ModioError::TooManyRequests {
            error,
            retry_after: None,
        },
        _ => ModioError::Unexpected(error),
    }
}

/// [`classify`], plus the retry hint of a 429 taken from the headers
pub(crate) fn classify_response(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> ModioError {
    match classify(status, body) {
        ModioError::TooManyRequests { error, .. } => ModioError::TooManyRequests {
            error,
            retry_after: parse_retry_after(headers),
        },
        other => other,
    }
}
