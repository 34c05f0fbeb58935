//! Error types for the client with server context and recovery information

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Server-side failure details extracted from the mod.io error envelope
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// mod.io specific error reference, when the server supplied one
    pub error_ref: Option<i64>,
    /// Human readable message from the server
    pub message: String,
    /// Per-field validation messages (only sent alongside 422 responses)
    pub field_errors: Option<BTreeMap<String, String>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_ref {
            Some(error_ref) => write!(f, "{} ({}) - {}", self.status, error_ref, self.message)?,
            None => write!(f, "{} - {}", self.status, self.message)?,
        }

        if let Some(errors) = &self.field_errors {
            for (field, message) in errors {
                write!(f, "\n{} - {}", field, message)?;
            }
        }

        Ok(())
    }
}

/// Misuse of the query builders or arguments, caught before any request is sent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("'{field}' cannot be used on {resource}: {reason}")]
    InvalidFilterField {
        resource: &'static str,
        field: String,
        reason: String,
    },

    #[error("Invalid value for '{field}': expected {expected}, got {found}")]
    InvalidFilterValue {
        field: String,
        expected: String,
        found: String,
    },

    #[error("Limit {value} is out of range (must be between 1 and {max})")]
    InvalidLimit { value: u32, max: u32 },

    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },
}

/// Every failure the client can surface
#[derive(Error, Debug)]
pub enum ModioError {
    /// Builder misuse detected locally
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A 2xx payload the mapper could not interpret
    #[error("Malformed {entity} response from mod.io")]
    MalformedResponse {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bad request: {0}")]
    BadRequest(ApiError),

    #[error("Unauthorized: {0}")]
    Unauthorized(ApiError),

    #[error("Forbidden: {0}")]
    Forbidden(ApiError),

    #[error("Not found: {0}")]
    NotFound(ApiError),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(ApiError),

    #[error("Not acceptable: {0}")]
    NotAcceptable(ApiError),

    #[error("Gone: {0}")]
    Gone(ApiError),

    /// Validation failed server-side, `ApiError::field_errors` holds the details
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(ApiError),

    #[error("Too many requests: {error}")]
    TooManyRequests {
        error: ApiError,
        retry_after: Option<Duration>,
    },

    /// Any status without a dedicated variant
    #[error("Unexpected API response: {0}")]
    Unexpected(ApiError),

    /// Transport level failure
    #[error("HTTP request to '{url}' failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to '{url}' timed out (try increasing the timeout or check network)")]
    Timeout { url: String },

    #[error("Invalid URL '{url}': {suggestion}")]
    InvalidUrl {
        url: String,
        suggestion: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
        suggestion: Option<String>,
    },

    /// The entity cannot perform this call (detached handle, missing context)
    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },
}

pub type Result<T> = std::result::Result<T, ModioError>;

impl ModioError {
    /// Server details for errors produced from an HTTP status
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ModioError::BadRequest(e)
            | ModioError::Unauthorized(e)
            | ModioError::Forbidden(e)
            | ModioError::NotFound(e)
            | ModioError::MethodNotAllowed(e)
            | ModioError::NotAcceptable(e)
            | ModioError::Gone(e)
            | ModioError::UnprocessableEntity(e)
            | ModioError::Unexpected(e) => Some(e),
            ModioError::TooManyRequests { error, .. } => Some(error),
            _ => None,
        }
    }

    /// HTTP status code, if the error came from a response
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|e| e.status)
    }

    /// Per-field validation messages of an `UnprocessableEntity` error
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        self.api_error().and_then(|e| e.field_errors.as_ref())
    }

    /// Check if repeating the same call later could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            ModioError::TooManyRequests { .. } => true,
            ModioError::Timeout { .. } => true,
            ModioError::Http { source, .. } => source.status().map_or(true, |s| s.is_server_error()),
            ModioError::Unexpected(e) => e.status >= 500,
            _ => false,
        }
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            ModioError::Validation(_) => "validation",
            ModioError::MalformedResponse { .. } => "malformed_response",
            ModioError::BadRequest(_) => "bad_request",
            ModioError::Unauthorized(_) => "unauthorized",
            ModioError::Forbidden(_) => "forbidden",
            ModioError::NotFound(_) => "not_found",
            ModioError::MethodNotAllowed(_) => "method_not_allowed",
            ModioError::NotAcceptable(_) => "not_acceptable",
            ModioError::Gone(_) => "gone",
            ModioError::UnprocessableEntity(_) => "unprocessable_entity",
            ModioError::TooManyRequests { .. } => "too_many_requests",
            ModioError::Unexpected(_) => "unexpected",
            ModioError::Http { .. } => "http_request",
            ModioError::Timeout { .. } => "timeout",
            ModioError::InvalidUrl { .. } => "invalid_url",
            ModioError::Configuration { .. } => "configuration",
            ModioError::Unsupported { .. } => "unsupported",
        }
    }

    /// Get user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ModioError::Unauthorized(_) => Some("Check that the API key or access token is valid"),
            ModioError::Forbidden(_) => {
                Some("This endpoint may require an OAuth access token rather than an API key")
            }
            ModioError::TooManyRequests { .. } => Some("Wait for the rate limit to reset before retrying"),
            ModioError::Timeout { .. } => Some("Check your internet connection or increase the timeout"),
            ModioError::MalformedResponse { .. } => {
                Some("The API returned a shape this version of the library does not understand")
            }
            ModioError::InvalidUrl { suggestion, .. } => Some(suggestion),
            ModioError::Configuration { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }

    /// Create a detailed error report for debugging
    pub fn detailed_report(&self) -> String {
        let mut report = format!("Error: {}\n", self);
        report.push_str(&format!("Category: {}\n", self.category()));
        report.push_str(&format!("Recoverable: {}\n", self.is_recoverable()));

        if let Some(suggestion) = self.suggestion() {
            report.push_str(&format!("Suggestion: {}\n", suggestion));
        }

        if let Some(source) = self.source() {
            report.push_str(&format!("Root cause: {}\n", source));
        }

        report
    }
}

impl From<reqwest::Error> for ModioError {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());

        if error.is_timeout() {
            ModioError::Timeout { url }
        } else {
            ModioError::Http { url, source: error }
        }
    }
}

impl ModioError {
    /// `InvalidUrl` for `url`, with a suggestion matching the parse failure
    pub(crate) fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        let suggestion = match source {
            url::ParseError::EmptyHost => "URL must have a valid hostname",
            url::ParseError::InvalidPort => "Port number must be between 1 and 65535",
            url::ParseError::RelativeUrlWithoutBase => "Base URL must be absolute (include https://)",
            _ => "Check URL format and try again",
        }
        .to_string();

        ModioError::InvalidUrl {
            url: url.into(),
            suggestion,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> ApiError {
        ApiError {
            status,
            error_ref: Some(11000),
            message: "Something went wrong".to_string(),
            field_errors: None,
        }
    }

    #[test]
    fn test_display_includes_field_errors() {
        let mut errors = BTreeMap::new();
        errors.insert("name".to_string(), "required".to_string());
        let error = ApiError {
            field_errors: Some(errors),
            ..api_error(422)
        };

        let text = error.to_string();
        assert!(text.starts_with("422 (11000) - Something went wrong"));
        assert!(text.contains("name - required"));
    }

    #[test]
    fn test_status_and_category() {
        let error = ModioError::NotFound(api_error(404));
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.category(), "not_found");
        assert!(!error.is_recoverable());

        let validation = ModioError::from(ValidationError::InvalidLimit { value: 0, max: 100 });
        assert_eq!(validation.status(), None);
        assert_eq!(validation.category(), "validation");
    }

    #[test]
    fn test_invalid_url_suggestion_follows_parse_error() {
        let source = url::Url::parse("api.mod.io/v1").unwrap_err();
        let error = ModioError::invalid_url("api.mod.io/v1", source);

        assert_eq!(error.category(), "invalid_url");
        assert_eq!(error.suggestion(), Some("Base URL must be absolute (include https://)"));
        assert!(error.to_string().contains("api.mod.io/v1"));

        let source = url::Url::parse("http://127.0.0.1:99999").unwrap_err();
        let error = ModioError::invalid_url("http://127.0.0.1:99999", source);
        assert_eq!(error.suggestion(), Some("Port number must be between 1 and 65535"));
    }

    #[test]
    fn test_rate_limited_is_recoverable() {
        let error = ModioError::TooManyRequests {
            error: api_error(429),
            retry_after: Some(Duration::from_secs(60)),
        };
        assert!(error.is_recoverable());
        assert!(error.suggestion().is_some());
        assert!(error.detailed_report().contains("Category: too_many_requests"));
    }
}
