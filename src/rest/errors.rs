//! Error types for builder, entity and relation operations.
//!
//! [`ResourceError`] wraps the transport-level [`HttpError`] and adds the
//! failures that only make sense at the resource layer: an unset entity
//! type, unknown registry names, read-only violations and strict save
//! failures.
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::rest::ResourceError;
//!
//! let error = ResourceError::ReadOnly { entity: "Device" };
//! assert_eq!(error.to_string(), "Device is read only");
//! assert!(!error.is_api_error());
//! ```

use crate::clients::{ApiError, HttpError};
use thiserror::Error;

/// Error type for REST resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The builder has no entity type to hydrate responses into.
    #[error("No entity type has been set on the builder")]
    NoEntityType,

    /// A root resource name is not in the registry.
    #[error("Unknown root resource: {name}")]
    UnknownResource {
        /// The requested name.
        name: String,
    },

    /// A root resource was requested from a builder scoped to a parent entity.
    #[error("Cannot look up root resource '{name}' from a builder scoped to a parent")]
    ScopedRootLookup {
        /// The requested name.
        name: String,
    },

    /// The entity type declares no relation with this name.
    #[error("{entity} has no relation named '{relation}'")]
    UnknownRelation {
        /// The entity type name.
        entity: &'static str,
        /// The requested relation.
        relation: String,
    },

    /// A relation's path template names an attribute the owner does not have.
    #[error("{entity} has no value for path attribute '{attribute}'")]
    MissingPathAttribute {
        /// The owning entity type name.
        entity: &'static str,
        /// The placeholder left unfilled.
        attribute: String,
    },

    /// An attribute write was attempted on a read-only entity.
    #[error("{entity} is read only")]
    ReadOnly {
        /// The entity type name.
        entity: &'static str,
    },

    /// A strict save did not succeed.
    #[error("Unable to save {entity}")]
    UnableToSave {
        /// The entity type name.
        entity: &'static str,
    },

    /// The underlying request failed.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ResourceError {
    /// Returns `true` if the server answered with a non-success status.
    #[must_use]
    pub const fn is_api_error(&self) -> bool {
        matches!(self, Self::Http(HttpError::Api(_)))
    }

    /// Returns the API error, if this is one.
    #[must_use]
    pub const fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Http(error) => error.as_api_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ProtocolError;

    #[test]
    fn test_api_errors_are_recognized() {
        let error: ResourceError = HttpError::Api(ApiError::from_response(422, "")).into();
        assert!(error.is_api_error());
        assert_eq!(error.as_api_error().map(|e| e.status), Some(422));
    }

    #[test]
    fn test_protocol_errors_are_not_api_errors() {
        let error: ResourceError = HttpError::Protocol(ProtocolError::MissingField { field: "tokens" }).into();
        assert!(!error.is_api_error());
        assert!(error.as_api_error().is_none());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ResourceError::UnknownResource {
                name: "widgets".to_string()
            }
            .to_string(),
            "Unknown root resource: widgets"
        );
        assert_eq!(
            ResourceError::UnknownRelation {
                entity: "Device",
                relation: "owner".to_string()
            }
            .to_string(),
            "Device has no relation named 'owner'"
        );
        assert_eq!(
            ResourceError::MissingPathAttribute {
                entity: "Site",
                attribute: "orgUnitId".to_string()
            }
            .to_string(),
            "Site has no value for path attribute 'orgUnitId'"
        );
        assert_eq!(
            ResourceError::UnableToSave {
                entity: "ScheduledTask"
            }
            .to_string(),
            "Unable to save ScheduledTask"
        );
    }
}
