//! Configuration types for the N-central API SDK.
//!
//! This module provides the configuration used to construct an
//! [`AuthClient`](crate::clients::AuthClient).
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`NcentralConfig`]: The main configuration struct holding all SDK settings
//! - [`NcentralConfigBuilder`]: A builder for constructing [`NcentralConfig`] instances
//! - [`Jwt`]: A validated long-lived credential with masked debug output
//! - [`BaseUrl`]: A validated absolute base URL
//!
//! # Expiry Overrides
//!
//! Every authentication and refresh exchange asks the server for specific
//! token lifetimes through the `X-ACCESS-EXPIRY-OVERRIDE` and
//! `X-REFRESH-EXPIRY-OVERRIDE` headers. The server caps these at
//! [`MAX_ACCESS_OVERRIDE`] and [`MAX_REFRESH_OVERRIDE`] seconds, and
//! the builder rejects larger values up front.
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::{BaseUrl, Jwt, NcentralConfig};
//!
//! let config = NcentralConfig::builder()
//!     .jwt(Jwt::new("my-jwt").unwrap())
//!     .base_url(BaseUrl::new("https://ncentral.example.com/api").unwrap())
//!     .access_override(1800)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.access_override(), 1800);
//! assert_eq!(config.refresh_override(), 90_000);
//! ```

mod newtypes;

pub use newtypes::{BaseUrl, Jwt};

use std::time::Duration;

use crate::error::ConfigError;

/// Largest access token lifetime, in seconds, the server will honor.
pub const MAX_ACCESS_OVERRIDE: u64 = 3600;

/// Largest refresh token lifetime, in seconds, the server will honor.
pub const MAX_REFRESH_OVERRIDE: u64 = 90_000;

/// Environment variable holding the long-lived JWT.
pub const ENV_JWT: &str = "NCENTRAL_JWT";

/// Environment variable holding the base URL.
pub const ENV_URL: &str = "NCENTRAL_URL";

/// Environment variable holding the access expiry override.
pub const ENV_ACCESS_OVERRIDE: &str = "NCENTRAL_ACCESS_OVERRIDE";

/// Environment variable holding the refresh expiry override.
pub const ENV_REFRESH_OVERRIDE: &str = "NCENTRAL_REFRESH_OVERRIDE";

/// Configuration for the N-central API SDK.
///
/// Immutable once built. Every field has already been validated, so a client
/// constructed from it cannot fail on configuration at request time.
///
/// # Thread Safety
///
/// `NcentralConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct NcentralConfig {
    jwt: Jwt,
    base_url: BaseUrl,
    access_override: u64,
    refresh_override: u64,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    debug: bool,
}

impl NcentralConfig {
    /// Creates a new builder for constructing a `NcentralConfig`.
    #[must_use]
    pub fn builder() -> NcentralConfigBuilder {
        NcentralConfigBuilder::new()
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads [`ENV_JWT`], [`ENV_URL`], [`ENV_ACCESS_OVERRIDE`] and
    /// [`ENV_REFRESH_OVERRIDE`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is missing or any
    /// value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Keys are the same names [`from_env`](Self::from_env) reads. Empty
    /// values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required key is missing or any
    /// value fails validation.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use ncentral_api::NcentralConfig;
    ///
    /// let vars = HashMap::from([
    ///     ("NCENTRAL_JWT", "my-jwt"),
    ///     ("NCENTRAL_URL", "https://ncentral.example.com/api"),
    ///     ("NCENTRAL_ACCESS_OVERRIDE", "600"),
    /// ]);
    ///
    /// let config = NcentralConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();
    /// assert_eq!(config.access_override(), 600);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder();

        if let Some(jwt) = get(ENV_JWT) {
            builder = builder.jwt(Jwt::new(jwt)?);
        }
        if let Some(url) = get(ENV_URL) {
            builder = builder.base_url(BaseUrl::new(url)?);
        }
        if let Some(value) = get(ENV_ACCESS_OVERRIDE) {
            builder = builder.access_override(parse_override("access override", &value)?);
        }
        if let Some(value) = get(ENV_REFRESH_OVERRIDE) {
            builder = builder.refresh_override(parse_override("refresh override", &value)?);
        }

        builder.build()
    }

    /// Returns the long-lived JWT.
    #[must_use]
    pub const fn jwt(&self) -> &Jwt {
        &self.jwt
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the requested access token lifetime in seconds.
    #[must_use]
    pub const fn access_override(&self) -> u64 {
        self.access_override
    }

    /// Returns the requested refresh token lifetime in seconds.
    #[must_use]
    pub const fn refresh_override(&self) -> u64 {
        self.refresh_override
    }

    /// Returns the request timeout handed to the HTTP client, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns whether requests are traced by default.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}

// Verify NcentralConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NcentralConfig>();
};

fn parse_override(field: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::NonNumericOverride {
            field,
            value: value.to_string(),
        })
}

/// Builder for constructing [`NcentralConfig`] instances.
///
/// Required fields are `jwt` and `base_url`.
///
/// # Defaults
///
/// - `access_override`: [`MAX_ACCESS_OVERRIDE`] (3600)
/// - `refresh_override`: [`MAX_REFRESH_OVERRIDE`] (90000)
/// - `timeout`: `None` (reqwest default)
/// - `user_agent_prefix`: `None`
/// - `debug`: `false`
#[derive(Debug, Default)]
pub struct NcentralConfigBuilder {
    jwt: Option<Jwt>,
    base_url: Option<BaseUrl>,
    access_override: Option<u64>,
    refresh_override: Option<u64>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    debug: Option<bool>,
}

impl NcentralConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the long-lived JWT (required).
    #[must_use]
    pub fn jwt(mut self, jwt: Jwt) -> Self {
        self.jwt = Some(jwt);
        self
    }

    /// Sets the base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the requested access token lifetime in seconds.
    #[must_use]
    pub const fn access_override(mut self, seconds: u64) -> Self {
        self.access_override = Some(seconds);
        self
    }

    /// Sets the requested refresh token lifetime in seconds.
    #[must_use]
    pub const fn refresh_override(mut self, seconds: u64) -> Self {
        self.refresh_override = Some(seconds);
        self
    }

    /// Sets the timeout applied to every HTTP request.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Enables request tracing by default for every request.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Builds the [`NcentralConfig`], validating required fields and bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `jwt` or `base_url`
    /// are not set, and [`ConfigError::OverrideOutOfRange`] if either
    /// override exceeds its maximum.
    pub fn build(self) -> Result<NcentralConfig, ConfigError> {
        let jwt = self
            .jwt
            .ok_or(ConfigError::MissingRequiredField { field: "jwt" })?;
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "url" })?;

        let access_override = self.access_override.unwrap_or(MAX_ACCESS_OVERRIDE);
        if access_override > MAX_ACCESS_OVERRIDE {
            return Err(ConfigError::OverrideOutOfRange {
                field: "access override",
                value: access_override,
                max: MAX_ACCESS_OVERRIDE,
            });
        }

        let refresh_override = self.refresh_override.unwrap_or(MAX_REFRESH_OVERRIDE);
        if refresh_override > MAX_REFRESH_OVERRIDE {
            return Err(ConfigError::OverrideOutOfRange {
                field: "refresh override",
                value: refresh_override,
                max: MAX_REFRESH_OVERRIDE,
            });
        }

        Ok(NcentralConfig {
            jwt,
            base_url,
            access_override,
            refresh_override,
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
            debug: self.debug.unwrap_or(false),
        })
    }
}
