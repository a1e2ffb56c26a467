//! Customers.

use crate::rest::cast::Cast;
use crate::rest::descriptor::{EntityDescriptor, ReadOnly};

/// A customer.
pub static CUSTOMER: EntityDescriptor = EntityDescriptor {
    name: "Customer",
    path: "/customers",
    primary_key: "customerId",
    readonly: ReadOnly::Always,
    casts: &[
        ("customerId", Cast::Int),
        ("isServiceOrg", Cast::Bool),
        ("isSystem", Cast::Bool),
        ("parentId", Cast::Int),
    ],
    ..EntityDescriptor::DEFAULT
};
