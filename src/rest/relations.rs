//! Lazily resolved relations between entities.
//!
//! Relations are declared statically on an [`EntityDescriptor`] through
//! [`RelationDef`](crate::rest::RelationDef) and built from an owning
//! [`Entity`] with [`Entity::relation`]. Each strategy holds a [`Builder`]
//! pre-scoped to the related type; nothing is fetched until
//! [`Relation::get_results`] is awaited.
//!
//! | Strategy | Scope | Resolves to |
//! |---|---|---|
//! | [`BelongsTo`] | `where_id(owner[foreign_key])` | zero or one entity |
//! | [`HasMany`] | owner as parent, or a path template | a collection |
//! | [`ChildOf`] | owner as parent | the owner itself |

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::rest::builder::{Builder, Fetched};
use crate::rest::descriptor::{EntityDescriptor, RelationDef, RelationKind};
use crate::rest::entity::Entity;
use crate::rest::errors::ResourceError;
use crate::rest::path::{build_path, scalar_to_string};

/// The owner holds the related entity's key.
#[derive(Clone, Debug)]
pub struct BelongsTo {
    builder: Builder,
    foreign_key: String,
    value: Value,
}

impl BelongsTo {
    /// Scopes a builder for `related` to the key stored in `owner[foreign_key]`.
    #[must_use]
    pub fn new(owner: &Entity, related: &'static EntityDescriptor, foreign_key: Option<&str>) -> Self {
        let foreign_key = foreign_key.map_or_else(|| related.assumed_foreign_key(), ToString::to_string);
        let value = owner.get(&foreign_key).cloned().unwrap_or(Value::Null);
        let builder = Builder::new(Arc::clone(owner.client()))
            .for_entity(related)
            .where_id(value.clone());

        Self {
            builder,
            foreign_key,
            value,
        }
    }

    /// Returns the name of the owner's foreign key attribute.
    #[must_use]
    pub fn foreign_key_name(&self) -> &str {
        &self.foreign_key
    }

    /// Returns the owner's foreign key value.
    #[must_use]
    pub const fn foreign_key(&self) -> &Value {
        &self.value
    }

    /// Returns the scoped builder.
    #[must_use]
    pub const fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Fetches the related entity.
    ///
    /// Resolves to `None` without a request when the foreign key is `null`,
    /// `0`, `false` or empty.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Builder::get`].
    pub async fn get_results(&self) -> Result<Option<Entity>, ResourceError> {
        if is_blank(&self.value) {
            return Ok(None);
        }
        Ok(self.builder.get().await?.into_first())
    }
}

/// Returns `true` for `null`, `false`, `0`, `"0"` and the empty string.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Returns the name inside the first `{...}` left in an interpolated path.
fn unfilled_placeholder(path: &str) -> Option<&str> {
    let start = path.find('{')? + 1;
    let end = start + path[start..].find('}')?;
    Some(&path[start..end])
}

/// The related entities are scoped under the owner.
#[derive(Clone, Debug)]
pub struct HasMany {
    builder: Builder,
}

impl HasMany {
    /// Scopes a builder for `related` under `owner`.
    ///
    /// With a `path` template the related builder uses the interpolated path
    /// and no parent; otherwise the owner's path prefixes the related path.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingPathAttribute`] if the owner has no
    /// value for a placeholder of the template.
    pub fn new(
        owner: &Entity,
        related: &'static EntityDescriptor,
        path: Option<&str>,
    ) -> Result<Self, ResourceError> {
        let builder = Builder::new(Arc::clone(owner.client())).for_entity(related);
        let builder = match path {
            Some(template) => {
                let ids: HashMap<&str, String> = owner
                    .attributes()
                    .iter()
                    .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.as_str(), v)))
                    .collect();
                let path = build_path(template, &ids);
                if let Some(attribute) = unfilled_placeholder(&path) {
                    return Err(ResourceError::MissingPathAttribute {
                        entity: owner.name(),
                        attribute: attribute.to_string(),
                    });
                }
                builder.with_path(path)
            }
            None => builder.with_parent(Some(owner.scope())),
        };

        Ok(Self { builder })
    }

    /// Returns the scoped builder.
    #[must_use]
    pub const fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Fetches the related entities.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Builder::get`].
    pub async fn get_results(&self) -> Result<Fetched, ResourceError> {
        self.builder.get().await
    }
}

/// The owner itself is the related entity.
#[derive(Clone, Debug)]
pub struct ChildOf {
    belongs_to: BelongsTo,
    owner: Entity,
}

impl ChildOf {
    /// Scopes a builder for `related` under `owner`.
    #[must_use]
    pub fn new(owner: &Entity, related: &'static EntityDescriptor, foreign_key: Option<&str>) -> Self {
        let mut belongs_to = BelongsTo::new(owner, related, foreign_key);
        belongs_to.builder = belongs_to.builder.with_parent(Some(owner.scope()));

        Self {
            belongs_to,
            owner: owner.clone(),
        }
    }

    /// Returns the name of the owner's foreign key attribute.
    #[must_use]
    pub fn foreign_key_name(&self) -> &str {
        self.belongs_to.foreign_key_name()
    }

    /// Returns the scoped builder.
    #[must_use]
    pub const fn builder(&self) -> &Builder {
        self.belongs_to.builder()
    }

    /// Returns the owner without a request.
    #[must_use]
    pub fn get_results(&self) -> Entity {
        self.owner.clone()
    }
}

/// A relation built from a [`RelationDef`].
#[derive(Clone, Debug)]
pub enum Relation {
    /// See [`BelongsTo`].
    BelongsTo(BelongsTo),
    /// See [`HasMany`].
    HasMany(HasMany),
    /// See [`ChildOf`].
    ChildOf(ChildOf),
}

impl Relation {
    /// Builds the relation declared by `definition` for `owner`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`HasMany::new`].
    pub fn from_definition(owner: &Entity, definition: &RelationDef) -> Result<Self, ResourceError> {
        Ok(match definition.kind {
            RelationKind::BelongsTo {
                related,
                foreign_key,
            } => Self::BelongsTo(BelongsTo::new(owner, related, foreign_key)),
            RelationKind::HasMany { related, path } => {
                Self::HasMany(HasMany::new(owner, related, path)?)
            }
            RelationKind::ChildOf {
                related,
                foreign_key,
            } => Self::ChildOf(ChildOf::new(owner, related, foreign_key)),
        })
    }

    /// Returns the scoped builder.
    #[must_use]
    pub const fn builder(&self) -> &Builder {
        match self {
            Self::BelongsTo(relation) => relation.builder(),
            Self::HasMany(relation) => relation.builder(),
            Self::ChildOf(relation) => relation.builder(),
        }
    }

    /// Resolves the relation.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Builder::get`].
    pub async fn get_results(&self) -> Result<Fetched, ResourceError> {
        match self {
            Self::BelongsTo(relation) => Ok(Fetched::One(relation.get_results().await?)),
            Self::HasMany(relation) => relation.get_results().await,
            Self::ChildOf(relation) => Ok(Fetched::One(Some(relation.get_results()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BaseUrl, Jwt, NcentralConfig};
    use crate::clients::AuthClient;
    use crate::rest::descriptor::ReadOnly;
    use serde_json::{json, Map};

    static CUSTOMER: EntityDescriptor = EntityDescriptor {
        name: "Customer",
        path: "/customers",
        primary_key: "customerId",
        readonly: ReadOnly::Always,
        ..EntityDescriptor::DEFAULT
    };

    static SITE: EntityDescriptor = EntityDescriptor {
        name: "Site",
        path: "/org-units",
        primary_key: "orgUnitId",
        readonly: ReadOnly::Always,
        relations: &[
            RelationDef::belongs_to("customer", &CUSTOMER, Some("parentId")),
            RelationDef::has_many("customers", &CUSTOMER, Some("/org-units/{orgUnitId}/children")),
            RelationDef::has_many("children", &CUSTOMER, None),
            RelationDef::child_of("self", &CUSTOMER, None),
        ],
        ..EntityDescriptor::DEFAULT
    };

    fn site(attributes: Value) -> Entity {
        let config = NcentralConfig::builder()
            .jwt(Jwt::new("jwt").unwrap())
            .base_url(BaseUrl::new("https://ncentral.example.com/api").unwrap())
            .build()
            .unwrap();
        let client = Arc::new(AuthClient::with_http_client(config, reqwest::Client::new()));
        Entity::hydrate(
            &SITE,
            client,
            None,
            attributes.as_object().cloned().unwrap_or_else(Map::new),
        )
    }

    #[test]
    fn test_belongs_to_scopes_by_foreign_key() {
        let owner = site(json!({"orgUnitId": 3, "parentId": 50}));
        let relation = owner.relation("customer").unwrap();

        assert_eq!(relation.builder().get_path(None).unwrap(), "/customers/50");
        match relation {
            Relation::BelongsTo(belongs_to) => {
                assert_eq!(belongs_to.foreign_key_name(), "parentId");
                assert_eq!(belongs_to.foreign_key(), &json!(50));
            }
            other => panic!("unexpected relation {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_belongs_to_blank_foreign_key_skips_request() {
        for value in [json!(null), json!(0), json!("0"), json!(""), json!(false)] {
            let owner = site(json!({"orgUnitId": 3, "parentId": value}));
            let results = owner.relation("customer").unwrap().get_results().await.unwrap();
            assert!(matches!(results, Fetched::One(None)));
        }
    }

    #[test]
    fn test_has_many_template_replaces_nesting() {
        let owner = site(json!({"orgUnitId": 50}));
        let relation = owner.relation("customers").unwrap();

        assert_eq!(
            relation.builder().get_path(None).unwrap(),
            "/org-units/50/children"
        );
    }

    #[test]
    fn test_has_many_template_requires_owner_attributes() {
        let owner = site(json!({"parentId": 7}));
        let error = owner.relation("customers").unwrap_err();

        assert!(matches!(
            error,
            ResourceError::MissingPathAttribute { entity: "Site", ref attribute } if attribute == "orgUnitId"
        ));
    }

    #[test]
    fn test_unfilled_placeholder() {
        assert_eq!(unfilled_placeholder("/org-units/{orgUnitId}/devices"), Some("orgUnitId"));
        assert_eq!(unfilled_placeholder("/org-units/50/devices"), None);
    }

    #[test]
    fn test_has_many_nests_under_owner() {
        let owner = site(json!({"orgUnitId": 50}));
        let relation = owner.relation("children").unwrap();

        assert_eq!(relation.builder().get_path(None).unwrap(), "/org-units/50/customers");
    }

    #[tokio::test]
    async fn test_child_of_returns_owner() {
        let owner = site(json!({"orgUnitId": 50}));
        let relation = owner.relation("self").unwrap();

        assert_eq!(relation.builder().get_path(None).unwrap(), "/org-units/50/customers");
        match relation.get_results().await.unwrap() {
            Fetched::One(Some(entity)) => assert_eq!(entity.get_i64("orgUnitId"), Some(50)),
            other => panic!("unexpected results {other:?}"),
        }
    }
}
