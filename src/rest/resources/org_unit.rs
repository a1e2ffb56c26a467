//! Organization units: sites and service organizations.

use crate::rest::cast::Cast;
use crate::rest::descriptor::{EntityDescriptor, ReadOnly, RelationDef};
use crate::rest::resources::{CUSTOMER, DEVICE};

/// Metadata shared by every organization unit.
pub const ORG_UNIT: EntityDescriptor = EntityDescriptor {
    name: "OrgUnit",
    path: "/org-units",
    primary_key: "orgUnitId",
    readonly: ReadOnly::Always,
    casts: &[("orgUnitId", Cast::Int), ("parentId", Cast::Int)],
    ..EntityDescriptor::DEFAULT
};

/// A site, owned by a customer.
///
/// Relations: `customer` (via `parentId`) and `devices`.
pub static SITE: EntityDescriptor = EntityDescriptor {
    name: "Site",
    relations: &[
        RelationDef::belongs_to("customer", &CUSTOMER, Some("parentId")),
        RelationDef::has_many("devices", &DEVICE, Some("/org-units/{orgUnitId}/devices")),
    ],
    ..ORG_UNIT
};

/// A service organization.
///
/// Relations: `customers`, the org units directly below it.
pub static SERVICE_ORGANIZATION: EntityDescriptor = EntityDescriptor {
    name: "ServiceOrganization",
    relations: &[RelationDef::has_many(
        "customers",
        &CUSTOMER,
        Some("/org-units/{orgUnitId}/children"),
    )],
    ..ORG_UNIT
};
