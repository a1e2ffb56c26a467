//! HTTP-specific error types for the N-central API SDK.
//!
//! # Error Handling
//!
//! The SDK uses specific error types for different failure scenarios:
//!
//! - [`ApiError`]: The server answered with a non-2xx status
//! - [`ProtocolError`]: The server answered 2xx but the body did not have the expected shape
//! - [`InvalidHttpRequestError`]: A request failed validation before being sent
//! - [`HttpError`]: Unified error type encompassing all HTTP-related errors
//!
//! Connection-level failures surface unchanged as [`HttpError::Transport`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ncentral_api::clients::HttpError;
//!
//! match client.get("devices").await {
//!     Ok(body) => println!("Devices: {body:?}"),
//!     Err(HttpError::Api(e)) => println!("API error {}: {}", e.status, e.message),
//!     Err(HttpError::Protocol(e)) => println!("Unexpected response: {e}"),
//!     Err(HttpError::Transport(e)) => println!("Network error: {e}"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use serde_json::Value;
use thiserror::Error;

/// Error returned when the server answers with a non-successful status.
///
/// The `message` is taken from the `message` field of a JSON body when
/// present, otherwise the raw body, otherwise the canonical status reason.
///
/// # Example
///
/// ```rust
/// use ncentral_api::clients::ApiError;
///
/// let error = ApiError::from_response(401, r#"{"status":401,"message":"Token expired"}"#);
/// assert_eq!(error.status, 401);
/// assert_eq!(error.message, "Token expired");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("N-central API error {status}: {message}")]
pub struct ApiError {
    /// The HTTP status code of the response.
    pub status: u16,
    /// Message extracted from the response payload.
    pub message: String,
    /// The raw response body.
    pub body: String,
}

impl ApiError {
    /// Builds an error from a status code and raw response body.
    #[must_use]
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();

        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            })
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        Self {
            status,
            message,
            body,
        }
    }
}

/// Error returned when a successful response does not have the expected shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A required top-level key was absent.
    #[error("Response is missing the required '{field}' key.")]
    MissingField {
        /// The key that was expected.
        field: &'static str,
    },

    /// The `tokens` object could not be read as an access/refresh pair.
    #[error("Response 'tokens' object is malformed: {reason}")]
    MalformedTokens {
        /// Why deserialization failed.
        reason: String,
    },

    /// The body was not valid JSON.
    #[error("Response body is not valid JSON: {reason}")]
    InvalidJson {
        /// Why parsing failed.
        reason: String,
    },

    /// The body was JSON but not the structure the caller needed.
    #[error("Unexpected response shape: expected {expected}.")]
    UnexpectedShape {
        /// What the caller expected.
        expected: &'static str,
    },
}

/// Error returned when an HTTP request fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server answered 2xx with an unexpected body.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// A refresh was requested but the held token has no refresh credential.
    #[error("Cannot refresh: the current token has no refresh credential.")]
    MissingRefreshToken,

    /// Network or connection error below HTTP.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the API error if the server rejected the request.
    #[must_use]
    pub const fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_extracts_payload_message() {
        let error = ApiError::from_response(
            403,
            r#"{"status":403,"message":"Access denied","errorReference":"abc"}"#,
        );

        assert_eq!(error.status, 403);
        assert_eq!(error.message, "Access denied");
        assert!(error.body.contains("errorReference"));
        assert!(error.to_string().contains("403"));
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let error = ApiError::from_response(502, "Bad gateway from proxy");
        assert_eq!(error.message, "Bad gateway from proxy");
    }

    #[test]
    fn test_api_error_falls_back_to_status_reason() {
        let error = ApiError::from_response(404, "");
        assert_eq!(error.message, "Not Found");
        assert!(error.body.is_empty());
    }

    #[test]
    fn test_protocol_error_messages() {
        let error = ProtocolError::MissingField { field: "tokens" };
        assert!(error.to_string().contains("tokens"));

        let error = ProtocolError::UnexpectedShape {
            expected: "a JSON object",
        };
        assert!(error.to_string().contains("a JSON object"));
    }

    #[test]
    fn test_http_error_from_conversions() {
        let error: HttpError = ApiError::from_response(500, "boom").into();
        assert!(error.as_api_error().is_some());

        let error: HttpError = ProtocolError::MissingField { field: "tokens" }.into();
        assert!(error.as_api_error().is_none());
        assert!(matches!(error, HttpError::Protocol(_)));
    }

    #[test]
    fn test_all_error_types_implement_std_error() {
        let _: &dyn std::error::Error = &ApiError::from_response(400, "");
        let _: &dyn std::error::Error = &ProtocolError::MissingField { field: "x" };
        let _: &dyn std::error::Error = &InvalidHttpRequestError::MissingBodyType;
        let _: &dyn std::error::Error = &HttpError::MissingRefreshToken;
    }
}
