//! Error types for the N-central API SDK.
//!
//! This module contains the error type raised while building configuration.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. A client can only be built from a configuration that
//! already passed validation, so these errors never surface at request time.
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::{ConfigError, Jwt};
//!
//! let result = Jwt::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyJwt)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The long-lived JWT cannot be empty.
    #[error("The \"jwt\" cannot be empty. Please provide the N-central API-only user JWT.")]
    EmptyJwt,

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Base URL is invalid.
    #[error("A valid url must be provided for \"url\" [{url}]. Expected an absolute http(s) URL (e.g., 'https://ncentral.example.com/api').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// An expiry override exceeds the server's hard maximum.
    #[error("The \"{field}\" must be less than or equal to {max} seconds, got {value}.")]
    OverrideOutOfRange {
        /// The override that was out of range.
        field: &'static str,
        /// The value that was provided.
        value: u64,
        /// The maximum accepted value.
        max: u64,
    },

    /// An expiry override could not be parsed as a number of seconds.
    #[error("The \"{field}\" must be numeric, got '{value}'.")]
    NonNumericOverride {
        /// The override that failed to parse.
        field: &'static str,
        /// The raw value that was provided.
        value: String,
    },

    /// The underlying HTTP client could not be created.
    #[error("Failed to create HTTP client: {reason}")]
    HttpClient {
        /// The reason reported by the HTTP library.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_error_message() {
        let error = ConfigError::InvalidBaseUrl {
            url: "not a url".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("not a url"));
        assert!(message.contains("valid url"));
    }

    #[test]
    fn test_override_out_of_range_error_message() {
        let error = ConfigError::OverrideOutOfRange {
            field: "access override",
            value: 7200,
            max: 3600,
        };
        let message = error.to_string();
        assert!(message.contains("access override"));
        assert!(message.contains("3600"));
        assert!(message.contains("7200"));
    }

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "jwt" };
        let message = error.to_string();
        assert!(message.contains("jwt"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyJwt;
        let _: &dyn std::error::Error = &error;
    }
}
