//! HTTP client types for N-central API communication.
//!
//! This module provides the authenticated HTTP layer. It owns the token
//! lifecycle, resolves request paths against the configured base URL and
//! maps failures to typed errors.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`AuthClient`]: The async client holding the current [`Token`](crate::auth::Token)
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, DELETE)
//! - [`DataType`]: Content types for request bodies
//! - [`HttpError`]: Unified error type for everything above
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ncentral_api::{AuthClient, NcentralConfig};
//!
//! let client = Arc::new(AuthClient::new(NcentralConfig::from_env()?)?);
//!
//! // A token is obtained (or refreshed) on demand
//! let body = client.get("server-info").await?;
//! ```
//!
//! # Retry Behavior
//!
//! Requests are never retried. The only extra round-trip a request can
//! cause is the single authenticate or refresh exchange performed by
//! [`AuthClient::get_token`] when the held token is not valid.

mod auth_client;
mod errors;
mod http_request;
mod http_response;

pub use auth_client::{AuthClient, AUTHENTICATE_PATH, REFRESH_PATH, SDK_VERSION};
pub use errors::{ApiError, HttpError, InvalidHttpRequestError, ProtocolError};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
