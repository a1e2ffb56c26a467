//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// A validated long-lived N-central JWT.
///
/// The JWT belongs to an API-only user and is used exclusively to obtain
/// access and refresh tokens. It is never sent on resource requests.
///
/// # Security
///
/// The `Debug` implementation masks the value, displaying only
/// `Jwt(*****)` instead of the actual credential.
///
/// # Example
///
/// ```rust
/// use ncentral_api::Jwt;
///
/// let jwt = Jwt::new("eyJhbGciOi...").unwrap();
/// assert_eq!(format!("{:?}", jwt), "Jwt(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Jwt(String);

impl Jwt {
    /// Creates a new validated JWT.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyJwt`] if the value is empty or whitespace.
    pub fn new(jwt: impl Into<String>) -> Result<Self, ConfigError> {
        let jwt = jwt.into();
        let jwt = jwt.trim();
        if jwt.is_empty() {
            return Err(ConfigError::EmptyJwt);
        }
        Ok(Self(jwt.to_string()))
    }
}

impl AsRef<str> for Jwt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Jwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Jwt(*****)")
    }
}

/// A validated base URL for the N-central API.
///
/// The URL must be absolute, use the `http` or `https` scheme and carry a
/// host. The string is kept exactly as given so that path joining sees the
/// caller's own trailing slash (or lack of one).
///
/// # Example
///
/// ```rust
/// use ncentral_api::BaseUrl;
///
/// let url = BaseUrl::new("https://ncentral.example.com/api").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), Some("ncentral.example.com"));
/// assert_eq!(url.as_ref(), "https://ncentral.example.com/api");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    raw: String,
    parsed: url::Url,
}

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL cannot be parsed,
    /// is not `http(s)`, or has no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into().trim().to_string();
        let invalid = || ConfigError::InvalidBaseUrl { url: raw.clone() };

        let parsed = url::Url::parse(&raw).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(invalid());
        }

        Ok(Self { raw, parsed })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.parsed.scheme()
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.parsed.host_str()
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
