//! Singleton status resources.

use crate::rest::cast::Cast;
use crate::rest::descriptor::{EntityDescriptor, ReadOnly};

/// Server version information.
pub static SERVER_INFO: EntityDescriptor = EntityDescriptor {
    name: "ServerInfo",
    path: "/server-info",
    collection: false,
    readonly: ReadOnly::Always,
    ..EntityDescriptor::DEFAULT
};

/// API health, with the server's clock.
pub static HEALTH: EntityDescriptor = EntityDescriptor {
    name: "Health",
    path: "/health",
    collection: false,
    readonly: ReadOnly::Always,
    casts: &[
        ("currentTime", Cast::DateTimeMillis),
        ("startTime", Cast::DateTimeMillis),
    ],
    ..EntityDescriptor::DEFAULT
};
