//! Devices and the scheduled tasks that run on them.

use crate::rest::cast::Cast;
use crate::rest::descriptor::{EntityDescriptor, ReadOnly, RelationDef};
use crate::rest::resources::CUSTOMER;

/// A managed device.
///
/// Relations: `customer` and `tasks` (under `/devices/{deviceId}/scheduled-tasks`).
pub static DEVICE: EntityDescriptor = EntityDescriptor {
    name: "Device",
    path: "/devices",
    primary_key: "deviceId",
    readonly: ReadOnly::Always,
    casts: &[
        ("customerId", Cast::Int),
        ("deviceId", Cast::Int),
        ("isProbe", Cast::Bool),
        ("stillLoggedIn", Cast::Bool),
    ],
    relations: &[
        RelationDef::belongs_to("customer", &CUSTOMER, Some("customerId")),
        RelationDef::has_many("tasks", &DEVICE_TASK, None),
    ],
    ..EntityDescriptor::DEFAULT
};

/// A scheduled task as listed for one device.
///
/// Always reached through the device's path.
pub static DEVICE_TASK: EntityDescriptor = EntityDescriptor {
    name: "DeviceTask",
    path: "/scheduled-tasks",
    primary_key: "taskId",
    nested: true,
    readonly: ReadOnly::Always,
    casts: &[
        ("credential", Cast::Array),
        ("customerId", Cast::Int),
        ("deviceId", Cast::Int),
        ("itemId", Cast::Int),
        ("parameters", Cast::Array),
        ("taskId", Cast::Int),
    ],
    ..EntityDescriptor::DEFAULT
};
