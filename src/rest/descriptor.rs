//! Static metadata describing each N-central resource type.
//!
//! An [`EntityDescriptor`] holds everything that differs between resource
//! types: base path, primary key, casts, read-only policy, response shape and
//! declared relations. Concrete resources are `static` descriptors; shared
//! metadata is composed with struct update syntax from a `const` base.
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::rest::{Cast, EntityDescriptor, ReadOnly};
//!
//! static WIDGET: EntityDescriptor = EntityDescriptor {
//!     name: "Widget",
//!     path: "/widgets",
//!     primary_key: "widgetId",
//!     casts: &[("widgetId", Cast::Int)],
//!     readonly: ReadOnly::Always,
//!     ..EntityDescriptor::DEFAULT
//! };
//!
//! assert_eq!(WIDGET.cast_for("widgetId"), Some(Cast::Int));
//! assert_eq!(WIDGET.response_key(), "data");
//! assert_eq!(WIDGET.assumed_foreign_key(), "widgetId");
//! ```

use std::fmt;

use serde_json::{Map, Value};

use crate::rest::cast::Cast;

/// When an entity rejects attribute writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOnly {
    /// Attributes can always be written.
    Never,
    /// Attributes can never be written.
    Always,
    /// Attributes can be written until the entity exists on the server.
    OnceExists,
}

/// Path suffix appended after the base path (and identifier).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtraPath {
    /// No suffix.
    None,
    /// Always append this suffix.
    Fixed(&'static str),
    /// Append this suffix only while the entity has no primary key value.
    UntilKeyed(&'static str),
}

/// The strategy of a declared relation.
#[derive(Clone, Copy)]
pub enum RelationKind {
    /// The owner holds the related entity's key in `foreign_key`.
    BelongsTo {
        /// The related resource type.
        related: &'static EntityDescriptor,
        /// Owner attribute holding the related key; defaults to `<relatedName>Id`.
        foreign_key: Option<&'static str>,
    },
    /// The related entities are scoped under the owner.
    HasMany {
        /// The related resource type.
        related: &'static EntityDescriptor,
        /// Path template interpolated from the owner's attributes. When set,
        /// it replaces nesting under the owner's own path.
        path: Option<&'static str>,
    },
    /// The owner itself is the related entity, scoped under the owner.
    ChildOf {
        /// The related resource type.
        related: &'static EntityDescriptor,
        /// Owner attribute holding the related key; defaults to `<relatedName>Id`.
        foreign_key: Option<&'static str>,
    },
}

impl fmt::Debug for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelongsTo {
                related,
                foreign_key,
            } => f
                .debug_struct("BelongsTo")
                .field("related", &related.name)
                .field("foreign_key", foreign_key)
                .finish(),
            Self::HasMany { related, path } => f
                .debug_struct("HasMany")
                .field("related", &related.name)
                .field("path", path)
                .finish(),
            Self::ChildOf {
                related,
                foreign_key,
            } => f
                .debug_struct("ChildOf")
                .field("related", &related.name)
                .field("foreign_key", foreign_key)
                .finish(),
        }
    }
}

/// A relation declared on a resource type, resolved by name.
#[derive(Clone, Copy, Debug)]
pub struct RelationDef {
    /// Name the relation is looked up by (e.g. `"customer"`).
    pub name: &'static str,
    /// How the relation resolves.
    pub kind: RelationKind,
}

impl RelationDef {
    /// Declares a belongs-to relation.
    #[must_use]
    pub const fn belongs_to(
        name: &'static str,
        related: &'static EntityDescriptor,
        foreign_key: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            kind: RelationKind::BelongsTo {
                related,
                foreign_key,
            },
        }
    }

    /// Declares a has-many relation.
    #[must_use]
    pub const fn has_many(
        name: &'static str,
        related: &'static EntityDescriptor,
        path: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            kind: RelationKind::HasMany { related, path },
        }
    }

    /// Declares a child-of relation.
    #[must_use]
    pub const fn child_of(
        name: &'static str,
        related: &'static EntityDescriptor,
        foreign_key: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            kind: RelationKind::ChildOf {
                related,
                foreign_key,
            },
        }
    }
}

/// Static description of a resource type.
pub struct EntityDescriptor {
    /// Type name (e.g. `"DeviceTask"`).
    pub name: &'static str,
    /// Base resource path (e.g. `"/devices"`).
    pub path: &'static str,
    /// Name of the primary key attribute.
    pub primary_key: &'static str,
    /// Envelope key wrapping the payload. `None` uses the camel-cased type name.
    pub response_key: Option<&'static str>,
    /// Whether the resource yields a list (`false` for singletons).
    pub collection: bool,
    /// Whether the resource is always reached through its parent's path.
    pub nested: bool,
    /// Read-only policy.
    pub readonly: ReadOnly,
    /// Path suffix policy.
    pub extra: ExtraPath,
    /// Declared attribute casts.
    pub casts: &'static [(&'static str, Cast)],
    /// Filters merged under every query's explicit filters.
    pub default_wheres: &'static [(&'static str, &'static str)],
    /// Attributes a freshly made entity starts with.
    pub defaults: Option<fn() -> Map<String, Value>>,
    /// Query parameter naming the sort column.
    pub order_by_parameter: &'static str,
    /// Query parameter flagging descending order. `None` uses `<order_by_parameter>desc`.
    pub order_by_direction_parameter: Option<&'static str>,
    /// Column used by `latest`/`oldest`.
    pub created_at_column: Option<&'static str>,
    /// Declared relations.
    pub relations: &'static [RelationDef],
}

impl EntityDescriptor {
    /// Baseline values for struct update syntax.
    pub const DEFAULT: Self = Self {
        name: "",
        path: "",
        primary_key: "id",
        response_key: Some("data"),
        collection: true,
        nested: false,
        readonly: ReadOnly::Never,
        extra: ExtraPath::None,
        casts: &[],
        default_wheres: &[],
        defaults: None,
        order_by_parameter: "order",
        order_by_direction_parameter: None,
        created_at_column: None,
        relations: &[],
    };

    /// Returns the cast declared for `key`, if any.
    #[must_use]
    pub fn cast_for(&self, key: &str) -> Option<Cast> {
        self.casts
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, cast)| *cast)
    }

    /// Returns the envelope key wrapping the payload.
    #[must_use]
    pub fn response_key(&self) -> String {
        self.response_key
            .map_or_else(|| camel_case(self.name), ToString::to_string)
    }

    /// Returns the query parameter flagging descending order.
    #[must_use]
    pub fn order_by_direction_parameter(&self) -> String {
        self.order_by_direction_parameter.map_or_else(
            || format!("{}desc", self.order_by_parameter),
            ToString::to_string,
        )
    }

    /// Returns the foreign key other entities use for this type by default.
    #[must_use]
    pub fn assumed_foreign_key(&self) -> String {
        format!("{}Id", camel_case(self.name))
    }

    /// Returns the relation declared under `name`, if any.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Returns the default filters as a JSON map.
    #[must_use]
    pub fn default_wheres(&self) -> Map<String, Value> {
        self.default_wheres
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect()
    }

    /// Returns the attributes a freshly made entity starts with.
    #[must_use]
    pub fn default_attributes(&self) -> Map<String, Value> {
        self.defaults.map(|f| f()).unwrap_or_default()
    }
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("primary_key", &self.primary_key)
            .finish_non_exhaustive()
    }
}

fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
