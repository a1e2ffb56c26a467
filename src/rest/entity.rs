//! Dynamic records mapped onto N-central resources.
//!
//! An [`Entity`] pairs a static [`EntityDescriptor`] with the attribute map
//! the server returned. Attributes are stored verbatim; declared casts are
//! applied on read. Writes go through [`Entity::set`], which enforces the
//! descriptor's read-only policy at the moment of the write.
//!
//! # Persistence
//!
//! N-central only supports creating most resources, so [`Entity::save`]
//! always issues a `POST`:
//!
//! - read-only entities return `Ok(false)` without a request
//! - clean entities return `Ok(true)` without a request
//! - otherwise the full attribute set is posted and the entity is replaced
//!   by the server's response
//!
//! API-level failures (non-2xx responses) become `Ok(false)`. Transport
//! and protocol failures are returned as errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use ncentral_api::rest::Builder;
//! use serde_json::json;
//!
//! let mut task = Builder::new(client).scheduled_tasks()?.make(
//!     json!({"name": "Reboot", "itemId": 1, "customerId": 50})
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default(),
//! );
//!
//! if task.save().await? {
//!     println!("created task {:?}", task.get_i64("taskId"));
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::clients::{AuthClient, HttpError};
use crate::rest::builder::{Builder, Fetched};
use crate::rest::cast::AttributeValue;
use crate::rest::collection::Collection;
use crate::rest::descriptor::{EntityDescriptor, ExtraPath, ReadOnly};
use crate::rest::errors::ResourceError;
use crate::rest::path::{build_query, scalar_to_string};
use crate::rest::relations::Relation;
use crate::rest::tracking::TrackedAttributes;

static NULL: Value = Value::Null;

/// A record of one N-central resource type.
#[derive(Clone)]
pub struct Entity {
    descriptor: &'static EntityDescriptor,
    client: Arc<AuthClient>,
    attributes: TrackedAttributes,
    parent: Option<Arc<Entity>>,
    path: Option<String>,
    extra: Option<String>,
    readonly: Option<bool>,
    exists: bool,
    was_recently_created: bool,
    relations: HashMap<String, Fetched>,
}

// Verify Entity is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Entity>();
};

impl Entity {
    /// Creates an unsaved entity.
    ///
    /// The descriptor's default attributes form the clean snapshot; the given
    /// attributes are filled on top of them and count as changes.
    #[must_use]
    pub fn new(
        descriptor: &'static EntityDescriptor,
        client: Arc<AuthClient>,
        attributes: Map<String, Value>,
    ) -> Self {
        let mut entity = Self::blank(
            descriptor,
            client,
            TrackedAttributes::from_existing(descriptor.default_attributes()),
        );
        entity.fill(attributes);
        entity
    }

    /// Creates an entity from attributes the server returned.
    #[must_use]
    pub fn hydrate(
        descriptor: &'static EntityDescriptor,
        client: Arc<AuthClient>,
        parent: Option<Arc<Self>>,
        attributes: Map<String, Value>,
    ) -> Self {
        let mut entity = Self::blank(
            descriptor,
            client,
            TrackedAttributes::from_existing(attributes),
        );
        entity.parent = parent;
        entity.exists = true;
        entity
    }

    fn blank(
        descriptor: &'static EntityDescriptor,
        client: Arc<AuthClient>,
        attributes: TrackedAttributes,
    ) -> Self {
        Self {
            descriptor,
            client,
            attributes,
            parent: None,
            path: None,
            extra: None,
            readonly: None,
            exists: false,
            was_recently_created: false,
            relations: HashMap::new(),
        }
    }

    /// Scopes the entity under a parent entity.
    #[must_use]
    pub fn with_parent(mut self, parent: Option<Arc<Self>>) -> Self {
        self.parent = parent;
        self
    }

    /// Returns the resource type.
    #[must_use]
    pub const fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    /// Returns the resource type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Returns the client the entity was loaded with.
    #[must_use]
    pub const fn client(&self) -> &Arc<AuthClient> {
        &self.client
    }

    /// Returns the parent entity the resource is nested under.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// Returns `true` once the entity has round-tripped through the server.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    /// Returns `true` if the entity was created by the last [`save`](Self::save).
    #[must_use]
    pub const fn was_recently_created(&self) -> bool {
        self.was_recently_created
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Returns the name of the primary key attribute.
    #[must_use]
    pub const fn key_name(&self) -> &'static str {
        self.descriptor.primary_key
    }

    /// Returns the primary key as a path segment, if it is set.
    ///
    /// Only `null` and the empty string count as unset; `0` is a key.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        self.attributes
            .get(self.key_name())
            .and_then(scalar_to_string)
            .filter(|key| !key.is_empty())
    }

    /// Returns a stored value as the server sent it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns a value with its declared cast applied.
    ///
    /// Attributes without a declared cast come back as [`AttributeValue::Raw`].
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        let value = self.attributes.get(key).filter(|v| !v.is_null())?;
        match self.descriptor.cast_for(key) {
            Some(cast) => cast.apply(value),
            None => Some(AttributeValue::Raw(value.clone())),
        }
    }

    /// Returns an integer attribute.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.attribute(key)? {
            AttributeValue::Int(n) => Some(n),
            AttributeValue::Raw(Value::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns a boolean attribute.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.attribute(key)? {
            AttributeValue::Bool(b) | AttributeValue::Raw(Value::Bool(b)) => Some(b),
            _ => None,
        }
    }

    /// Returns a string attribute.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Returns a timestamp attribute.
    #[must_use]
    pub fn get_datetime(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.attribute(key)? {
            AttributeValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns an array (or object) attribute.
    #[must_use]
    pub fn get_array(&self, key: &str) -> Option<Value> {
        match self.attribute(key)? {
            AttributeValue::Array(value) => Some(value),
            AttributeValue::Raw(value) if value.is_array() || value.is_object() => Some(value),
            _ => None,
        }
    }

    /// Sets an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ReadOnly`] if the entity is read-only.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<&mut Self, ResourceError> {
        if self.is_readonly() {
            return Err(ResourceError::ReadOnly { entity: self.name() });
        }
        self.attributes.set(key, value.into());
        Ok(self)
    }

    /// Sets several attributes at once, bypassing the read-only check.
    pub fn fill(&mut self, attributes: Map<String, Value>) -> &mut Self {
        for (key, value) in attributes {
            self.attributes.set(key, value);
        }
        self
    }

    /// Replaces every attribute, optionally taking them as the clean snapshot.
    pub fn set_raw_attributes(&mut self, attributes: Map<String, Value>, sync: bool) -> &mut Self {
        self.attributes.replace(attributes, sync);
        self
    }

    /// Returns the current attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        self.attributes.attributes()
    }

    /// Returns the snapshot taken at hydration or the last save.
    #[must_use]
    pub const fn original(&self) -> &Map<String, Value> {
        self.attributes.original()
    }

    /// Returns `true` if any attribute changed since the snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.attributes.is_dirty()
    }

    /// Returns `true` if the given attribute changed since the snapshot.
    #[must_use]
    pub fn is_dirty_key(&self, key: &str) -> bool {
        self.attributes.is_dirty_key(key)
    }

    /// Returns the attributes that changed since the snapshot.
    #[must_use]
    pub fn dirty(&self) -> Map<String, Value> {
        self.attributes.changed_fields()
    }

    /// Returns the attributes as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.attributes().clone())
    }

    // ========================================================================
    // Read-only policy
    // ========================================================================

    /// Returns `true` if attribute writes and saves are rejected.
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        if let Some(readonly) = self.readonly {
            return readonly;
        }
        match self.descriptor.readonly {
            ReadOnly::Never => false,
            ReadOnly::Always => true,
            ReadOnly::OnceExists => self.exists,
        }
    }

    /// Overrides the descriptor's read-only policy. `None` restores it.
    pub fn set_readonly(&mut self, readonly: Option<bool>) -> &mut Self {
        self.readonly = readonly;
        self
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// Overrides the base path. `None` restores the descriptor's path.
    pub fn set_path(&mut self, path: Option<String>) -> &mut Self {
        self.path = path;
        self
    }

    /// Overrides the path suffix. `None` restores the descriptor's suffix.
    pub fn set_extra(&mut self, extra: Option<String>) -> &mut Self {
        self.extra = extra;
        self
    }

    /// Returns the base path, without identifier or suffix.
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.path.as_deref().unwrap_or(self.descriptor.path)
    }

    /// Returns the entity's own resource path.
    #[must_use]
    pub fn path(&self) -> String {
        self.path_for(None, None, &Map::new())
    }

    /// Composes a resource path.
    ///
    /// The identifier segment is `id` when given, else the entity's own key
    /// once it exists. `extra` replaces the descriptor's suffix. `query` is
    /// merged over the descriptor's default filters. An entity scoped under a
    /// parent is prefixed by the parent's path when it has no key yet or its
    /// type is always nested.
    #[must_use]
    pub fn path_for(&self, id: Option<&str>, extra: Option<&str>, query: &Map<String, Value>) -> String {
        self.compose_path(id, extra, Some(query))
    }

    fn compose_path(
        &self,
        id: Option<&str>,
        extra: Option<&str>,
        query: Option<&Map<String, Value>>,
    ) -> String {
        let mut path = self.base_path().trim_end_matches('/').to_string();

        let own_key = if self.exists { self.key() } else { None };
        let id = id.map(ToString::to_string).or(own_key);
        let keyed = id.is_some();
        if let Some(id) = id {
            path.push('/');
            path.push_str(&id);
        }

        let extra = extra
            .map(ToString::to_string)
            .or_else(|| self.extra.clone())
            .or_else(|| match self.descriptor.extra {
                ExtraPath::None => None,
                ExtraPath::Fixed(extra) => Some(extra.to_string()),
                ExtraPath::UntilKeyed(extra) => {
                    (!keyed && self.key().is_none()).then(|| extra.to_string())
                }
            });
        if let Some(extra) = extra {
            path.push('/');
            path.push_str(extra.trim_start_matches('/'));
        }

        if let Some(query) = query {
            let mut filters = self.descriptor.default_wheres();
            for (key, value) in query {
                filters.insert(key.clone(), value.clone());
            }
            let query = build_query(&filters);
            if !query.is_empty() {
                path.push('?');
                path.push_str(&query);
            }
        }

        match &self.parent {
            Some(parent) if self.key().is_none() || self.descriptor.nested => {
                parent.compose_path(None, Some(&path), None)
            }
            _ => path,
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Creates the entity on the server.
    ///
    /// Returns `Ok(false)` for read-only entities and for API-level
    /// failures, `Ok(true)` when nothing changed or the create succeeded.
    ///
    /// # Errors
    ///
    /// Returns transport and protocol failures.
    pub async fn save(&mut self) -> Result<bool, ResourceError> {
        if self.is_readonly() {
            return Ok(false);
        }
        if !self.is_dirty() {
            return Ok(true);
        }

        let path = self.path();
        match self.client.post(&path, &self.to_json()).await {
            Ok(response) => {
                self.exists = true;
                self.was_recently_created = true;
                match response {
                    Some(Value::Object(attributes)) => self.attributes.replace(attributes, true),
                    _ => self.attributes.mark_clean(),
                }
                tracing::debug!(entity = self.name(), path = %path, "Created entity");
                Ok(true)
            }
            Err(HttpError::Api(_)) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    /// Like [`save`](Self::save), but a `false` result becomes an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnableToSave`] when the save did not succeed,
    /// plus the errors of [`save`](Self::save).
    pub async fn save_or_fail(&mut self) -> Result<(), ResourceError> {
        if self.save().await? {
            Ok(())
        } else {
            Err(ResourceError::UnableToSave { entity: self.name() })
        }
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Returns the foreign key other entities use for `related` by default.
    #[must_use]
    pub fn assume_foreign_key(related: &EntityDescriptor) -> String {
        related.assumed_foreign_key()
    }

    /// Builds a declared relation without resolving it.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownRelation`] if no relation is declared
    /// under `name`, and [`ResourceError::MissingPathAttribute`] if a path
    /// template cannot be filled from this entity.
    pub fn relation(&self, name: &str) -> Result<Relation, ResourceError> {
        let definition =
            self.descriptor
                .relation(name)
                .ok_or_else(|| ResourceError::UnknownRelation {
                    entity: self.name(),
                    relation: name.to_string(),
                })?;
        Relation::from_definition(self, definition)
    }

    /// Resolves a declared relation, memoizing the result on the entity.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownRelation`] for undeclared names and
    /// the errors of the underlying fetch.
    pub async fn load(&mut self, name: &str) -> Result<&Fetched, ResourceError> {
        if !self.relations.contains_key(name) {
            let results = self.relation(name)?.get_results().await?;
            self.relations.insert(name.to_string(), results);
        }
        self.relations
            .get(name)
            .ok_or_else(|| ResourceError::UnknownRelation {
                entity: self.name(),
                relation: name.to_string(),
            })
    }

    /// Returns a memoized relation result.
    #[must_use]
    pub fn related(&self, name: &str) -> Option<&Fetched> {
        self.relations.get(name)
    }

    /// Returns `true` if the relation has been resolved.
    #[must_use]
    pub fn relation_loaded(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Stores a relation result, e.g. one embedded in the response.
    pub fn set_relation(&mut self, name: impl Into<String>, results: Fetched) -> &mut Self {
        self.relations.insert(name.into(), results);
        self
    }

    /// Hydrates an embedded related record.
    #[must_use]
    pub fn given_one(&self, related: &'static EntityDescriptor, attributes: &Value) -> Self {
        Self::hydrate(
            related,
            Arc::clone(&self.client),
            self.parent.clone(),
            attributes.as_object().cloned().unwrap_or_default(),
        )
    }

    /// Hydrates a list of embedded related records.
    #[must_use]
    pub fn given_many(&self, related: &'static EntityDescriptor, given: &Value) -> Collection {
        let items = given
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|attributes| self.given_one(related, attributes))
                    .collect()
            })
            .unwrap_or_default();
        Collection::from_items(items)
    }

    /// Returns a builder for this entity's type.
    #[must_use]
    pub fn builder(&self) -> Builder {
        Builder::new(Arc::clone(&self.client))
            .for_entity(self.descriptor)
            .with_parent(self.parent.clone())
    }

    /// Returns a copy usable as a parent scope, without memoized relations.
    #[must_use]
    pub(crate) fn scope(&self) -> Arc<Self> {
        Arc::new(Self {
            relations: HashMap::new(),
            ..self.clone()
        })
    }
}

impl Index<&str> for Entity {
    type Output = Value;

    fn index(&self, key: &str) -> &Self::Output {
        self.attributes.get(key).unwrap_or(&NULL)
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.attributes().serialize(serializer)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.descriptor.name)
            .field("attributes", self.attributes.attributes())
            .field("exists", &self.exists)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("relations", &self.relations.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
