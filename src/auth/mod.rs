//! Authentication types for the N-central API SDK.
//!
//! N-central issues short-lived access tokens (and longer-lived refresh
//! tokens) in exchange for the long-lived JWT of an API-only user. This
//! module holds the value type for that pair; the exchanges themselves live
//! on [`AuthClient`](crate::clients::AuthClient).
//!
//! # Overview
//!
//! - [`Token`]: An access/refresh credential pair with expiry bookkeeping
//! - [`TokenDescriptor`]: One half of the `tokens` object returned by the server
//!
//! # Token States
//!
//! - **Valid**: has an access credential more than [`EXPIRE_BUFFER`] seconds from expiry
//! - **Refreshable**: has a refresh credential and the access credential is at or inside the buffer
//! - **Absent/expired**: neither of the above; a full authentication is required
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::Token;
//!
//! // Seed from a credential persisted by the host application
//! let token = Token::from("stored-access-token");
//! assert!(token.is_valid());
//! assert_eq!(token.to_string(), "Bearer stored-access-token");
//! ```

pub mod token;

pub use token::{Token, TokenDescriptor, EXPIRE_BUFFER};
