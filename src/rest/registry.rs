//! Registry of root resources.
//!
//! Maps the names accepted by [`Builder::resource`](crate::rest::Builder::resource)
//! to resource types.
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::rest::registry;
//!
//! assert_eq!(registry::lookup("devices").map(|d| d.name), Some("Device"));
//! assert!(registry::lookup("widgets").is_none());
//! ```

use crate::rest::descriptor::EntityDescriptor;
use crate::rest::resources::{
    CUSTOMER, DETAILED_SCHEDULED_TASK, DEVICE, DEVICE_TASK, HEALTH, SCHEDULED_TASK,
    SERVER_INFO, SERVICE_ORGANIZATION, SITE,
};

/// Root resource names and their types.
pub static ROOT_RESOURCES: &[(&str, &EntityDescriptor)] = &[
    ("customers", &CUSTOMER),
    ("detailedScheduledTasks", &DETAILED_SCHEDULED_TASK),
    ("devices", &DEVICE),
    ("deviceTasks", &DEVICE_TASK),
    ("health", &HEALTH),
    ("scheduledTasks", &SCHEDULED_TASK),
    ("serverInfo", &SERVER_INFO),
    ("serviceOrganizations", &SERVICE_ORGANIZATION),
    ("sites", &SITE),
];

/// Returns the resource type registered under `name`.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static EntityDescriptor> {
    ROOT_RESOURCES
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, descriptor)| *descriptor)
}
