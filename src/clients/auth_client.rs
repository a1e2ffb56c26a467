//! Authenticated HTTP client for the N-central API.
//!
//! This module provides the [`AuthClient`] type, which owns the current
//! [`Token`], exchanges the long-lived JWT for access tokens when needed,
//! and executes resource requests with the right headers.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::auth::{Token, TokenDescriptor};
use crate::clients::errors::{ApiError, HttpError, ProtocolError};
use crate::clients::http_request::{DataType, HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::NcentralConfig;
use crate::error::ConfigError;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path of the full authentication exchange.
pub const AUTHENTICATE_PATH: &str = "auth/authenticate";

/// Path of the refresh exchange.
pub const REFRESH_PATH: &str = "auth/refresh";

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: TokenDescriptor,
    refresh: TokenDescriptor,
}

/// HTTP client holding the N-central token for one API-only user.
///
/// The client handles:
/// - Exchanging the configured JWT for an access/refresh token pair
/// - Refreshing the access token once it is within the expiry buffer
/// - Resolving request paths against the configured base URL
/// - Mapping non-2xx responses to [`ApiError`]
///
/// # Thread Safety
///
/// `AuthClient` is `Send + Sync`. Share it behind an `Arc`; concurrent
/// callers of [`get_token`](Self::get_token) are serialized so only one of
/// them performs an exchange.
///
/// # Example
///
/// ```rust,ignore
/// use ncentral_api::{AuthClient, NcentralConfig};
///
/// let client = AuthClient::new(NcentralConfig::from_env()?)?;
///
/// let devices = client.get("devices?pageSize=10").await?;
/// ```
#[derive(Debug)]
pub struct AuthClient {
    config: NcentralConfig,
    client: reqwest::Client,
    default_headers: HashMap<String, String>,
    token: Mutex<Token>,
}

// Verify AuthClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthClient>();
};

impl AuthClient {
    /// Creates a new client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the underlying reqwest client
    /// cannot be created.
    pub fn new(config: NcentralConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::HttpClient {
            reason: e.to_string(),
        })?;

        Ok(Self::with_http_client(config, client))
    }

    /// Creates a new client using a caller-supplied reqwest client.
    ///
    /// The configured timeout is not applied; the supplied client's own
    /// settings are used as-is.
    #[must_use]
    pub fn with_http_client(config: NcentralConfig, client: reqwest::Client) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}ncentral-api-rust/{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);

        Self {
            config,
            client,
            default_headers,
            token: Mutex::new(Token::default()),
        }
    }

    /// Seeds the client with a token, e.g. one persisted by the host application.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<Token>) -> Self {
        *self.token.get_mut() = token.into();
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &NcentralConfig {
        &self.config
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.default_headers
            .get("User-Agent")
            .map_or("", String::as_str)
    }

    /// Resolves `path` against the configured base URL.
    ///
    /// See [`uri_with_base`](Self::uri_with_base) for the joining rules.
    #[must_use]
    pub fn uri(&self, path: &str) -> String {
        Self::uri_with_base(path, self.config.base_url().as_ref())
    }

    /// Resolves `path` against `base`.
    ///
    /// - A path that already starts with `http` is returned verbatim.
    /// - Exactly one slash separates the base from the path.
    /// - A path starting with `?` is appended without a slash.
    /// - A trailing slash on the path is preserved.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ncentral_api::AuthClient;
    ///
    /// let base = "https://ncentral.example.com/api/";
    /// assert_eq!(AuthClient::uri_with_base("/devices", base), "https://ncentral.example.com/api/devices");
    /// assert_eq!(AuthClient::uri_with_base("?x=1", base), "https://ncentral.example.com/api?x=1");
    /// assert_eq!(AuthClient::uri_with_base("", base), "https://ncentral.example.com/api/");
    /// ```
    #[must_use]
    pub fn uri_with_base(path: &str, base: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }

        let path = path.trim_start_matches('/');
        let base = base.trim_end_matches('/');
        let separator = if path.starts_with('?') { "" } else { "/" };

        format!("{base}{separator}{path}")
    }

    /// Returns a snapshot of the held token.
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }

    /// Replaces the held token.
    ///
    /// Accepts a full [`Token`] or a bare access credential string.
    pub async fn set_token(&self, token: impl Into<Token>) {
        *self.token.lock().await = token.into();
    }

    /// Returns `true` if the held token is valid right now.
    pub async fn valid_token(&self) -> bool {
        self.token.lock().await.is_valid()
    }

    /// Returns a valid token, refreshing or re-authenticating if needed.
    ///
    /// - A valid held token is returned as-is.
    /// - A token needing refresh is exchanged through `auth/refresh`.
    /// - Otherwise a full exchange through `auth/authenticate` is made.
    ///
    /// The check and the exchange happen under one lock, so concurrent
    /// callers never issue more than one exchange between them.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Api`] if the exchange is rejected,
    /// [`HttpError::Protocol`] if the response has no usable `tokens`
    /// object, or [`HttpError::Transport`] on connection failure.
    pub async fn get_token(&self) -> Result<Token, HttpError> {
        let mut held = self.token.lock().await;

        if held.is_valid() {
            return Ok(held.clone());
        }

        let fresh = match held.refresh_token() {
            Some(refresh) if held.needs_refreshing() => {
                self.exchange(REFRESH_PATH, Some(refresh.to_string())).await?
            }
            _ => self.exchange(AUTHENTICATE_PATH, None).await?,
        };

        *held = fresh.clone();
        Ok(fresh)
    }

    /// Performs a full authentication exchange and replaces the held token.
    ///
    /// # Errors
    ///
    /// See [`get_token`](Self::get_token).
    pub async fn authenticate(&self) -> Result<Token, HttpError> {
        let mut held = self.token.lock().await;
        let fresh = self.exchange(AUTHENTICATE_PATH, None).await?;
        *held = fresh.clone();
        Ok(fresh)
    }

    /// Exchanges the held refresh credential and replaces the held token.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MissingRefreshToken`] if the held token has no
    /// refresh credential; otherwise see [`get_token`](Self::get_token).
    pub async fn refresh(&self) -> Result<Token, HttpError> {
        let mut held = self.token.lock().await;
        let refresh = held
            .refresh_token()
            .map(ToString::to_string)
            .ok_or(HttpError::MissingRefreshToken)?;
        let fresh = self.exchange(REFRESH_PATH, Some(refresh)).await?;
        *held = fresh.clone();
        Ok(fresh)
    }

    async fn exchange(&self, path: &str, refresh: Option<String>) -> Result<Token, HttpError> {
        if refresh.is_some() {
            tracing::debug!("Refreshing N-central access token");
        } else {
            tracing::debug!("Authenticating with N-central");
        }

        let mut builder = HttpRequest::builder(HttpMethod::Post, path)
            .header("Accept", "*/*")
            .header("Authorization", format!("Bearer {}", self.config.jwt().as_ref()))
            .header("Content-Type", DataType::Text.as_content_type())
            .header(
                "X-ACCESS-EXPIRY-OVERRIDE",
                format!("{}s", self.config.access_override()),
            )
            .header(
                "X-REFRESH-EXPIRY-OVERRIDE",
                format!("{}s", self.config.refresh_override()),
            )
            .debug(self.config.debug());

        if let Some(refresh) = refresh {
            builder = builder.body(refresh).body_type(DataType::Text);
        }

        let response = self.send(builder.build()?).await?;
        Ok(Self::token_from_body(response.body.as_ref())?)
    }

    fn token_from_body(body: Option<&Value>) -> Result<Token, ProtocolError> {
        let tokens = body
            .and_then(|b| b.get("tokens"))
            .ok_or(ProtocolError::MissingField { field: "tokens" })?;

        let pair = TokenPair::deserialize(tokens).map_err(|e| ProtocolError::MalformedTokens {
            reason: e.to_string(),
        })?;

        Ok(Token::from_descriptors(Some(pair.access), Some(pair.refresh)))
    }

    /// Sends a request as-is, without adding an `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if the request fails validation,
    /// [`HttpError::Transport`] on connection failure, [`HttpError::Api`]
    /// for a non-2xx status, and [`HttpError::Protocol`] if a 2xx body is
    /// not JSON.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.uri(&request.path);

        let mut headers = self.default_headers.clone();
        if let Some(body_type) = &request.body_type {
            headers.insert(
                "Content-Type".to_string(),
                body_type.as_content_type().to_string(),
            );
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(body) = request.encoded_body() {
            req_builder = req_builder.body(body);
        }

        if request.debug {
            tracing::debug!(method = %request.http_method, url = %url, "Sending N-central request");
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await?;

        if request.debug {
            tracing::debug!(status = code, url = %url, "Received N-central response");
        }

        if !(200..=299).contains(&code) {
            return Err(ApiError::from_response(code, body_text).into());
        }

        Ok(HttpResponse::parse(code, res_headers, &body_text)?)
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Sends an authenticated request and returns the decoded JSON body.
    ///
    /// A valid token is obtained first through [`get_token`](Self::get_token).
    /// `body` is sent as JSON only when it is non-empty.
    ///
    /// # Errors
    ///
    /// Propagates token exchange errors and the errors of [`send`](Self::send).
    pub async fn request(
        &self,
        path: &str,
        body: Option<&Value>,
        method: HttpMethod,
    ) -> Result<Option<Value>, HttpError> {
        self.request_with(path, body, method, self.config.debug())
            .await
    }

    /// Like [`request`](Self::request) with an explicit tracing flag.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn request_with(
        &self,
        path: &str,
        body: Option<&Value>,
        method: HttpMethod,
        debug: bool,
    ) -> Result<Option<Value>, HttpError> {
        let token = self.get_token().await?;

        let mut builder = HttpRequest::builder(method, path)
            .header("Authorization", token.to_string())
            .header("Content-Type", DataType::Json.as_content_type())
            .debug(debug);

        if let Some(body) = body.filter(|b| !is_empty_payload(b)) {
            builder = builder.body(body.clone()).body_type(DataType::Json);
        }

        let response = self.send(builder.build()?).await?;
        Ok(response.into_body())
    }

    /// Shortcut for a `GET` [`request`](Self::request).
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, path: &str) -> Result<Option<Value>, HttpError> {
        self.request(path, None, HttpMethod::Get).await
    }

    /// Shortcut for a `POST` [`request`](Self::request).
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(&self, path: &str, body: &Value) -> Result<Option<Value>, HttpError> {
        self.request(path, Some(body), HttpMethod::Post).await
    }

    /// Shortcut for a `DELETE` [`request`](Self::request).
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete(&self, path: &str) -> Result<Option<Value>, HttpError> {
        self.request(path, None, HttpMethod::Delete).await
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
