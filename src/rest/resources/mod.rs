//! N-central resource types.
//!
//! Each resource is a `static` [`EntityDescriptor`](crate::rest::EntityDescriptor).
//! Organization units share [`ORG_UNIT`] through struct update syntax.
//!
//! | Descriptor | Path | Primary key |
//! |---|---|---|
//! | [`CUSTOMER`] | `/customers` | `customerId` |
//! | [`DEVICE`] | `/devices` | `deviceId` |
//! | [`DEVICE_TASK`] | `/devices/{deviceId}/scheduled-tasks` | `taskId` |
//! | [`SCHEDULED_TASK`] | `/scheduled-tasks` | `taskId` |
//! | [`DETAILED_SCHEDULED_TASK`] | `/scheduled-tasks/{taskId}/status/details` | `taskId` |
//! | [`SITE`], [`SERVICE_ORGANIZATION`] | `/org-units` | `orgUnitId` |
//! | [`SERVER_INFO`] | `/server-info` | |
//! | [`HEALTH`] | `/health` | |

mod customer;
mod device;
mod org_unit;
mod scheduled_task;
mod status;

pub use customer::CUSTOMER;
pub use device::{DEVICE, DEVICE_TASK};
pub use org_unit::{ORG_UNIT, SERVICE_ORGANIZATION, SITE};
pub use scheduled_task::{DETAILED_SCHEDULED_TASK, SCHEDULED_TASK};
pub use status::{HEALTH, SERVER_INFO};
