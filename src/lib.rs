//! # N-central API Rust SDK
//!
//! A Rust client for the N-able N-central REST API, providing type-safe
//! configuration, token lifecycle handling and a fluent resource builder.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`NcentralConfig`] and [`NcentralConfigBuilder`]
//! - Validated newtypes for the JWT and the base URL
//! - Access/refresh token bookkeeping via [`Token`]
//! - An authenticated async HTTP client, [`AuthClient`], that exchanges the
//!   JWT for tokens and refreshes them when they are about to expire
//! - A resource layer ([`rest`]) with a query [`Builder`](rest::Builder),
//!   dynamic [`Entity`](rest::Entity) records and lazy relations
//!
//! ## Quick Start
//!
//! ```rust
//! use ncentral_api::{BaseUrl, Jwt, NcentralConfig};
//!
//! let config = NcentralConfig::builder()
//!     .jwt(Jwt::new("eyJhbGciOi...").unwrap())
//!     .base_url(BaseUrl::new("https://ncentral.example.com/api").unwrap())
//!     .access_override(1800)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.access_override(), 1800);
//! assert_eq!(config.refresh_override(), 90_000);
//! ```
//!
//! ## Querying Resources
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ncentral_api::{AuthClient, NcentralConfig};
//! use ncentral_api::rest::Builder;
//!
//! let client = Arc::new(AuthClient::new(NcentralConfig::from_env()?)?);
//! let builder = Builder::new(Arc::clone(&client));
//!
//! let customers = builder.customers()?.paginate(Some(50)).get().await?.into_many();
//! for customer in customers.iter() {
//!     println!("{}", customer.get_str("customerName").unwrap_or_default());
//! }
//! ```
//!
//! ## Persisting Tokens
//!
//! [`Token`] is serializable, so a host application can store it and seed a
//! new client with it later:
//!
//! ```rust,ignore
//! let stored = serde_json::to_string(&client.token().await)?;
//!
//! let token: Token = serde_json::from_str(&stored)?;
//! let client = AuthClient::new(config)?.with_token(token);
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: the client and builders are constructed and passed explicitly
//! - **Fail-fast validation**: configuration errors surface at construction
//! - **Thread-safe**: all types are `Send + Sync`; token exchanges are serialized
//! - **Async-first**: designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use auth::{Token, TokenDescriptor};
pub use config::{BaseUrl, Jwt, NcentralConfig, NcentralConfigBuilder};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    ApiError, AuthClient, DataType, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponse, InvalidHttpRequestError, ProtocolError,
};

// Re-export resource types
pub use rest::{Builder, Collection, Entity, Fetched, ResourceError};
