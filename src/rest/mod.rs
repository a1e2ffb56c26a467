//! Resource layer for the N-central REST API.
//!
//! This module maps N-central resources onto dynamic entities:
//!
//! - **[`Builder`]**: accumulates filters, composes paths and fetches records
//! - **[`Entity`]**: an attribute map with casts, dirty tracking and `save`
//! - **[`Collection`]**: a page of entities with its [`Pagination`] and [`Links`]
//! - **Relations**: [`BelongsTo`], [`HasMany`] and [`ChildOf`], resolved lazily
//! - **[`EntityDescriptor`]**: static per-type metadata; the concrete types
//!   live in [`resources`]
//! - **[`ResourceError`]**: errors of the resource layer
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ncentral_api::{AuthClient, NcentralConfig};
//! use ncentral_api::rest::Builder;
//!
//! let client = Arc::new(AuthClient::new(NcentralConfig::from_env()?)?);
//! let builder = Builder::new(client);
//!
//! // Singleton resources come back as one entity
//! let health = builder.health()?.get().await?.into_first();
//!
//! // Relations are fetched on first access and memoized
//! if let Some(mut device) = builder.devices()?.find(42).await? {
//!     let customer = device.load("customer").await?;
//! }
//! ```

mod builder;
mod cast;
mod collection;
mod descriptor;
mod entity;
mod errors;
mod path;
pub mod registry;
mod relations;
pub mod resources;
mod tracking;

pub use builder::{Builder, Fetched};
pub use cast::{AttributeValue, Cast};
pub use collection::{Collection, Links, Pagination};
pub use descriptor::{EntityDescriptor, ExtraPath, ReadOnly, RelationDef, RelationKind};
pub use entity::Entity;
pub use errors::ResourceError;
pub use path::{build_path, build_query, scalar_to_string};
pub use relations::{BelongsTo, ChildOf, HasMany, Relation};
pub use tracking::TrackedAttributes;
