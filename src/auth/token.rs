//! Access/refresh token pair with expiry bookkeeping.
//!
//! A [`Token`] is created from an authenticate or refresh response and
//! replaced wholesale whenever a new one is issued. All derived state
//! (`is_valid`, `is_expired`, `needs_refreshing`, `valid_for`) is computed
//! against a clock reading; the `_at` variants take that reading explicitly.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds before expiry at which a token is already treated as expired.
pub const EXPIRE_BUFFER: u64 = 5;

/// Access token lifetime assumed when the server does not report one.
pub const DEFAULT_ACCESS_EXPIRY: i64 = 3600;

/// Refresh token lifetime assumed when the server does not report one.
pub const DEFAULT_REFRESH_EXPIRY: i64 = 90_000;

/// Token type assumed when the server does not report one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// One half of the `tokens` object returned by `auth/authenticate` and
/// `auth/refresh`.
///
/// # Example
///
/// ```rust
/// use ncentral_api::TokenDescriptor;
///
/// let access: TokenDescriptor = serde_json::from_str(
///     r#"{"token":"T","expirySeconds":3600,"type":"Bearer"}"#,
/// ).unwrap();
///
/// assert_eq!(access.token, "T");
/// assert_eq!(access.expiry_seconds, Some(3600));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDescriptor {
    /// The credential value.
    pub token: String,
    /// Lifetime of the credential in seconds.
    #[serde(default)]
    pub expiry_seconds: Option<i64>,
    /// Token type label (e.g. `Bearer`). Only sent for access tokens.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl TokenDescriptor {
    /// Creates a descriptor with the given credential and lifetime.
    #[must_use]
    pub fn new(token: impl Into<String>, expiry_seconds: i64) -> Self {
        Self {
            token: token.into(),
            expiry_seconds: Some(expiry_seconds),
            kind: None,
        }
    }

    /// Sets the token type label.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// An access credential, an optional refresh credential and their expiries.
///
/// A token without an access credential is never valid. Tokens are
/// serializable so a host application can store them and seed a client
/// later through [`AuthClient::set_token`](crate::clients::AuthClient::set_token).
///
/// # Example
///
/// ```rust
/// use ncentral_api::{Token, TokenDescriptor};
///
/// let token = Token::from_descriptors(
///     Some(TokenDescriptor::new("T", 3600).with_kind("Bearer")),
///     None,
/// );
///
/// assert!(token.is_valid());
/// assert!(!token.needs_refreshing());
/// assert_eq!(token.to_string(), "Bearer T");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredToken")]
pub struct Token {
    access_token: Option<String>,
    expires_at: DateTime<Utc>,
    refresh_token: Option<String>,
    renew_at: DateTime<Utc>,
    token_type: String,
}

/// Wire form of a persisted [`Token`]; restored through [`Token::new`].
#[derive(Deserialize)]
struct StoredToken {
    access_token: Option<String>,
    expires_at: DateTime<Utc>,
    refresh_token: Option<String>,
    renew_at: DateTime<Utc>,
    token_type: String,
}

impl From<StoredToken> for Token {
    fn from(stored: StoredToken) -> Self {
        Self::new(
            stored.access_token,
            stored.expires_at,
            stored.refresh_token,
            stored.renew_at,
            stored.token_type,
        )
    }
}

impl Token {
    /// Creates a token from explicit expiry timestamps.
    #[must_use]
    pub fn new(
        access_token: Option<String>,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
        renew_at: DateTime<Utc>,
        token_type: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            expires_at,
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            renew_at,
            token_type: token_type.into(),
        }
    }

    /// Creates a token from the access and refresh descriptors of an
    /// authentication response.
    ///
    /// Missing lifetimes default to [`DEFAULT_ACCESS_EXPIRY`] and
    /// [`DEFAULT_REFRESH_EXPIRY`]; a missing type defaults to `Bearer`.
    #[must_use]
    pub fn from_descriptors(
        access: Option<TokenDescriptor>,
        refresh: Option<TokenDescriptor>,
    ) -> Self {
        let now = Utc::now();

        let (access_token, expires_in, token_type) = access.map_or(
            (None, DEFAULT_ACCESS_EXPIRY, None),
            |d| {
                (
                    Some(d.token),
                    d.expiry_seconds.unwrap_or(DEFAULT_ACCESS_EXPIRY),
                    d.kind,
                )
            },
        );
        let (refresh_token, renew_in) = refresh.map_or((None, DEFAULT_REFRESH_EXPIRY), |d| {
            (
                Some(d.token),
                d.expiry_seconds.unwrap_or(DEFAULT_REFRESH_EXPIRY),
            )
        });

        Self::new(
            access_token,
            now + Duration::seconds(expires_in),
            refresh_token,
            now + Duration::seconds(renew_in),
            token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
        )
    }

    /// Wraps a bare access credential with the default lifetime and no
    /// refresh credential.
    #[must_use]
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self::from_descriptors(
            Some(TokenDescriptor::new(access_token, DEFAULT_ACCESS_EXPIRY)),
            None,
        )
    }

    /// Returns the access credential, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the refresh credential, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns when the access credential expires.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns when the refresh credential expires.
    #[must_use]
    pub const fn renew_at(&self) -> DateTime<Utc> {
        self.renew_at
    }

    /// Returns the token type label.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Whole seconds the access credential stays usable, floored at zero.
    #[must_use]
    pub fn valid_for(&self) -> u64 {
        self.valid_for_at(Utc::now())
    }

    /// [`valid_for`](Self::valid_for) against a fixed clock reading.
    #[must_use]
    pub fn valid_for_at(&self, now: DateTime<Utc>) -> u64 {
        if self.access_token.is_none() || now >= self.expires_at {
            return 0;
        }
        u64::try_from((self.expires_at - now).num_seconds()).unwrap_or(0)
    }

    /// Returns `true` if there is an access credential within
    /// [`EXPIRE_BUFFER`] seconds of expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// [`is_expired`](Self::is_expired) against a fixed clock reading.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && self.within_buffer(now)
    }

    /// Returns `true` if there is an access credential that has not expired.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// [`is_valid`](Self::is_valid) against a fixed clock reading.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && !self.is_expired_at(now)
    }

    /// Returns `true` if there is a refresh credential and the access
    /// credential is within [`EXPIRE_BUFFER`] seconds of expiry.
    #[must_use]
    pub fn needs_refreshing(&self) -> bool {
        self.needs_refreshing_at(Utc::now())
    }

    /// [`needs_refreshing`](Self::needs_refreshing) against a fixed clock reading.
    #[must_use]
    pub fn needs_refreshing_at(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token.is_some() && self.within_buffer(now)
    }

    /// Returns `true` if the refresh credential itself has lapsed.
    #[must_use]
    pub fn refresh_expired(&self) -> bool {
        self.refresh_token.is_none() || Utc::now() >= self.renew_at
    }

    fn within_buffer(&self, now: DateTime<Utc>) -> bool {
        self.valid_for_at(now) <= EXPIRE_BUFFER
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::from_descriptors(None, None)
    }
}

impl From<&str> for Token {
    fn from(access_token: &str) -> Self {
        Self::from_access_token(access_token)
    }
}

impl From<String> for Token {
    fn from(access_token: String) -> Self {
        Self::from_access_token(access_token)
    }
}

/// Formats the token as an `Authorization` header value.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.token_type,
            self.access_token.as_deref().unwrap_or_default()
        )
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |t: &Option<String>| t.as_ref().map(|_| "*****");
        f.debug_struct("Token")
            .field("access_token", &mask(&self.access_token))
            .field("expires_at", &self.expires_at)
            .field("refresh_token", &mask(&self.refresh_token))
            .field("renew_at", &self.renew_at)
            .field("token_type", &self.token_type)
            .finish()
    }
}

// Verify Token is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Token>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn token_expiring_in(seconds: i64, refresh: Option<&str>) -> (Token, DateTime<Utc>) {
        let now = Utc::now();
        let token = Token::new(
            Some("access".to_string()),
            now + Duration::seconds(seconds),
            refresh.map(ToString::to_string),
            now + Duration::seconds(DEFAULT_REFRESH_EXPIRY),
            "Bearer",
        );
        (token, now)
    }

    #[test]
    fn test_token_from_access_descriptor_is_valid() {
        let token = Token::from_descriptors(
            Some(TokenDescriptor::new("T", 3600).with_kind("Bearer")),
            None,
        );

        assert!(token.is_valid());
        assert!(!token.is_expired());
        assert_eq!(token.to_string(), "Bearer T");
    }

    #[test]
    fn test_token_without_access_credential_is_never_valid() {
        let token = Token::default();

        assert!(!token.is_valid());
        assert!(!token.is_expired());
        assert_eq!(token.valid_for(), 0);
    }

    #[test]
    fn test_token_at_or_past_expiry_is_expired() {
        for seconds in [0, -1, -3600] {
            let (token, now) = token_expiring_in(seconds, None);
            assert!(token.is_expired_at(now), "{seconds}s should be expired");
            assert_eq!(token.valid_for_at(now), 0);
            assert!(!token.is_valid_at(now));
        }
    }

    #[test]
    fn test_token_within_buffer_is_expired() {
        let (token, now) = token_expiring_in(5, None);
        assert_eq!(token.valid_for_at(now), 5);
        assert!(token.is_expired_at(now));
    }

    #[test]
    fn test_token_beyond_buffer_is_not_expired() {
        let (token, now) = token_expiring_in(6, None);
        assert_eq!(token.valid_for_at(now), 6);
        assert!(!token.is_expired_at(now));
        assert!(token.is_valid_at(now));
    }

    #[test]
    fn test_valid_for_floors_partial_seconds() {
        let now = Utc::now();
        let token = Token::new(
            Some("a".to_string()),
            now + Duration::milliseconds(10_900),
            None,
            now,
            "Bearer",
        );
        assert_eq!(token.valid_for_at(now), 10);
    }

    #[test]
    fn test_needs_refreshing_requires_refresh_credential() {
        let (token, now) = token_expiring_in(-60, None);
        assert!(!token.needs_refreshing_at(now));

        let (token, now) = token_expiring_in(-60, Some("refresh"));
        assert!(token.needs_refreshing_at(now));

        let (token, now) = token_expiring_in(600, Some("refresh"));
        assert!(!token.needs_refreshing_at(now));
    }

    #[test]
    fn test_refresh_descriptor_sets_refresh_expiry() {
        let token = Token::from_descriptors(
            Some(TokenDescriptor::new("access", 60)),
            Some(TokenDescriptor::new("refresh", 120)),
        );

        assert_eq!(token.refresh_token(), Some("refresh"));
        assert!(token.renew_at() > token.expires_at());
        assert!(!token.refresh_expired());
    }

    #[test]
    fn test_missing_lifetimes_use_defaults() {
        let token = Token::from_descriptors(
            Some(TokenDescriptor {
                token: "a".to_string(),
                expiry_seconds: None,
                kind: None,
            }),
            None,
        );

        assert_eq!(token.token_type(), "Bearer");
        assert!(token.valid_for() > 3590);
    }

    #[test]
    fn test_bare_string_converts_to_token() {
        let token = Token::from("abc");
        assert_eq!(token.access_token(), Some("abc"));
        assert!(token.refresh_token().is_none());
        assert!(token.is_valid());
    }

    #[test]
    fn test_debug_masks_credentials() {
        let token = Token::from_descriptors(
            Some(TokenDescriptor::new("secret-access", 60)),
            Some(TokenDescriptor::new("secret-refresh", 60)),
        );
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(debug.contains("*****"));
    }

    #[test]
    fn test_token_survives_serialization() {
        let token = Token::from_descriptors(
            Some(TokenDescriptor::new("access", 60)),
            Some(TokenDescriptor::new("refresh", 120)),
        );

        let blob = serde_json::to_string(&token).unwrap();
        let restored: Token = serde_json::from_str(&blob).unwrap();

        assert_eq!(restored, token);
    }

    #[test]
    fn test_restored_token_with_empty_credentials_is_not_valid() {
        let blob = r#"{
            "access_token": "",
            "expires_at": "2099-01-01T00:00:00Z",
            "refresh_token": "",
            "renew_at": "2099-01-01T00:00:00Z",
            "token_type": "Bearer"
        }"#;

        let restored: Token = serde_json::from_str(blob).unwrap();

        assert!(restored.access_token().is_none());
        assert!(restored.refresh_token().is_none());
        assert!(!restored.is_valid());
        assert!(!restored.needs_refreshing());
    }
}
