//! Fluent query builder for N-central resources.
//!
//! A [`Builder`] accumulates filters for one resource type, composes the
//! request path (including parent nesting), executes it through the
//! [`AuthClient`] and hydrates the response envelope into entities.
//!
//! # Filters
//!
//! Every filter method writes one or more query parameters into a single
//! map, so a later call for the same parameter overwrites an earlier one:
//!
//! | Method | Parameters |
//! |---|---|
//! | [`where_`](Builder::where_) | `key=value` |
//! | [`where_id`](Builder::where_id) | the primary key, rendered as a path segment |
//! | [`order_by`](Builder::order_by) | `order=column&orderdesc=false` |
//! | [`limit`](Builder::limit) / [`take`](Builder::take) | `count=n` |
//! | [`page`](Builder::page) | `pageNumber=n` plus [`paginate`](Builder::paginate) |
//! | [`paginate`](Builder::paginate) | `paginate=true&pageSize=n`, or `paginate=false` |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ncentral_api::{AuthClient, NcentralConfig};
//! use ncentral_api::rest::Builder;
//!
//! let client = Arc::new(AuthClient::new(NcentralConfig::from_env()?)?);
//! let builder = Builder::new(client);
//!
//! // GET /devices?pageNumber=2&pageSize=10&paginate=true
//! let devices = builder.devices()?.page(2, Some(10)).get().await?.into_many();
//! println!("{:?} devices in total", devices.record_count());
//!
//! // GET /devices/42/scheduled-tasks
//! if let Some(mut device) = builder.devices()?.find(42).await? {
//!     let tasks = device.load("tasks").await?;
//! }
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::{AuthClient, HttpMethod, ProtocolError};
use crate::rest::collection::{Collection, Links, Pagination};
use crate::rest::descriptor::EntityDescriptor;
use crate::rest::entity::Entity;
use crate::rest::errors::ResourceError;
use crate::rest::path::scalar_to_string;
use crate::rest::registry;

static UNSET: EntityDescriptor = EntityDescriptor::DEFAULT;

/// The result of a fetch: a collection, or one entity for singleton resources.
#[derive(Clone, Debug)]
pub enum Fetched {
    /// A singleton resource, or a belongs-to relation.
    One(Option<Entity>),
    /// A collection resource.
    Many(Collection),
}

impl Fetched {
    /// Returns the collection, wrapping a single entity if needed.
    #[must_use]
    pub fn into_many(self) -> Collection {
        match self {
            Self::Many(collection) => collection,
            Self::One(entity) => Collection::from_items(entity.into_iter().collect()),
        }
    }

    /// Returns the entity, or the first entity of a collection.
    #[must_use]
    pub fn into_first(self) -> Option<Entity> {
        match self {
            Self::One(entity) => entity,
            Self::Many(collection) => collection.into_first(),
        }
    }

    /// Returns the entity of a singleton result.
    #[must_use]
    pub const fn as_one(&self) -> Option<&Entity> {
        match self {
            Self::One(entity) => entity.as_ref(),
            Self::Many(_) => None,
        }
    }

    /// Returns the collection of a collection result.
    #[must_use]
    pub const fn as_many(&self) -> Option<&Collection> {
        match self {
            Self::Many(collection) => Some(collection),
            Self::One(_) => None,
        }
    }
}

/// Query constructor for one resource type.
#[derive(Clone, Debug)]
pub struct Builder {
    client: Arc<AuthClient>,
    descriptor: Option<&'static EntityDescriptor>,
    parent: Option<Arc<Entity>>,
    path: Option<String>,
    wheres: Map<String, Value>,
    debug: bool,
}

impl Builder {
    /// Creates a root builder without an entity type.
    ///
    /// Use [`resource`](Self::resource), one of its shorthands, or
    /// [`for_entity`](Self::for_entity) to pick the type.
    #[must_use]
    pub fn new(client: Arc<AuthClient>) -> Self {
        let debug = client.config().debug();
        Self {
            client,
            descriptor: None,
            parent: None,
            path: None,
            wheres: Map::new(),
            debug,
        }
    }

    /// Returns a fresh builder for `descriptor`, keeping the client, parent
    /// scope and debug flag.
    #[must_use]
    pub fn for_entity(&self, descriptor: &'static EntityDescriptor) -> Self {
        Self {
            client: Arc::clone(&self.client),
            descriptor: Some(descriptor),
            parent: self.parent.clone(),
            path: None,
            wheres: Map::new(),
            debug: self.debug,
        }
    }

    /// Scopes the builder under a parent entity.
    #[must_use]
    pub fn with_parent(mut self, parent: Option<Arc<Entity>>) -> Self {
        self.parent = parent;
        self
    }

    /// Overrides the resource base path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Traces requests made by this builder.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Returns the client.
    #[must_use]
    pub const fn client(&self) -> &Arc<AuthClient> {
        &self.client
    }

    /// Returns the entity type, if one is set.
    #[must_use]
    pub const fn descriptor(&self) -> Option<&'static EntityDescriptor> {
        self.descriptor
    }

    /// Returns the parent scope, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Entity> {
        self.parent.as_deref()
    }

    /// Returns the accumulated filters.
    #[must_use]
    pub const fn wheres(&self) -> &Map<String, Value> {
        &self.wheres
    }

    // ========================================================================
    // Root resources
    // ========================================================================

    /// Returns a builder for a root resource registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ScopedRootLookup`] if this builder is scoped
    /// to a parent, and [`ResourceError::UnknownResource`] for unregistered
    /// names.
    pub fn resource(&self, name: &str) -> Result<Self, ResourceError> {
        if self.parent.is_some() {
            return Err(ResourceError::ScopedRootLookup {
                name: name.to_string(),
            });
        }
        let descriptor = registry::lookup(name).ok_or_else(|| ResourceError::UnknownResource {
            name: name.to_string(),
        })?;
        Ok(self.for_entity(descriptor))
    }

    /// Builder for `customers`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn customers(&self) -> Result<Self, ResourceError> {
        self.resource("customers")
    }

    /// Builder for `devices`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn devices(&self) -> Result<Self, ResourceError> {
        self.resource("devices")
    }

    /// Builder for `deviceTasks`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn device_tasks(&self) -> Result<Self, ResourceError> {
        self.resource("deviceTasks")
    }

    /// Builder for `scheduledTasks`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn scheduled_tasks(&self) -> Result<Self, ResourceError> {
        self.resource("scheduledTasks")
    }

    /// Builder for `detailedScheduledTasks`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn detailed_scheduled_tasks(&self) -> Result<Self, ResourceError> {
        self.resource("detailedScheduledTasks")
    }

    /// Builder for `health`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn health(&self) -> Result<Self, ResourceError> {
        self.resource("health")
    }

    /// Builder for `serverInfo`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn server_info(&self) -> Result<Self, ResourceError> {
        self.resource("serverInfo")
    }

    /// Builder for `serviceOrganizations`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn service_organizations(&self) -> Result<Self, ResourceError> {
        self.resource("serviceOrganizations")
    }

    /// Builder for `sites`.
    ///
    /// # Errors
    ///
    /// See [`resource`](Self::resource).
    pub fn sites(&self) -> Result<Self, ResourceError> {
        self.resource("sites")
    }

    // ========================================================================
    // Filters
    // ========================================================================

    fn descriptor_or_unset(&self) -> &'static EntityDescriptor {
        self.descriptor.unwrap_or(&UNSET)
    }

    /// Adds a filter.
    #[must_use]
    pub fn where_(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.wheres.insert(key.into(), value.into());
        self
    }

    /// Filters by primary key, which renders as a path segment.
    ///
    /// `null` leaves the path without an identifier.
    #[must_use]
    pub fn where_id(self, id: impl Into<Value>) -> Self {
        let key = self.descriptor_or_unset().primary_key;
        self.where_(key, id)
    }

    /// Filters for `key=false`.
    #[must_use]
    pub fn where_not(self, key: impl Into<String>) -> Self {
        self.where_(key, false)
    }

    /// Sorts ascending by `column`.
    #[must_use]
    pub fn order_by(self, column: impl Into<String>) -> Self {
        self.order(column.into(), false)
    }

    /// Sorts descending by `column`.
    #[must_use]
    pub fn order_by_desc(self, column: impl Into<String>) -> Self {
        self.order(column.into(), true)
    }

    fn order(self, column: String, descending: bool) -> Self {
        let descriptor = self.descriptor_or_unset();
        self.where_(descriptor.order_by_parameter, column)
            .where_(descriptor.order_by_direction_parameter(), descending)
    }

    /// Newest first, by `column` or the type's created-at column.
    ///
    /// Does nothing when neither is available.
    #[must_use]
    pub fn latest(self, column: Option<&str>) -> Self {
        match column.or(self.descriptor_or_unset().created_at_column) {
            Some(column) => self.order_by_desc(column),
            None => self,
        }
    }

    /// Oldest first, by `column` or the type's created-at column.
    ///
    /// Does nothing when neither is available.
    #[must_use]
    pub fn oldest(self, column: Option<&str>) -> Self {
        match column.or(self.descriptor_or_unset().created_at_column) {
            Some(column) => self.order_by(column),
            None => self,
        }
    }

    /// Limits the number of records.
    #[must_use]
    pub fn limit(self, count: u64) -> Self {
        self.where_("count", count)
    }

    /// Alias of [`limit`](Self::limit).
    #[must_use]
    pub fn take(self, count: u64) -> Self {
        self.limit(count)
    }

    /// Selects a page, optionally setting the page size.
    #[must_use]
    pub fn page(self, number: u64, size: Option<u64>) -> Self {
        let builder = self.where_("pageNumber", number);
        match size {
            Some(size) => builder.paginate(Some(size)),
            None => builder,
        }
    }

    /// Enables pagination with a page size, or disables it with `None`.
    #[must_use]
    pub fn paginate(self, size: Option<u64>) -> Self {
        match size.filter(|size| *size > 0) {
            Some(size) => self.where_("pageSize", size).where_("paginate", true),
            None => self.where_("paginate", false),
        }
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// Returns an unsaved entity of the builder's type, scoped like the builder.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NoEntityType`] if no type is set.
    pub fn model(&self) -> Result<Entity, ResourceError> {
        let descriptor = self.descriptor.ok_or(ResourceError::NoEntityType)?;
        let mut entity = Entity::new(descriptor, Arc::clone(&self.client), Map::new())
            .with_parent(self.parent.clone());
        entity.set_path(self.path.clone());
        Ok(entity)
    }

    /// Returns the base path of the builder's type.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NoEntityType`] if no type is set.
    pub fn path(&self) -> Result<String, ResourceError> {
        Ok(self.model()?.base_path().to_string())
    }

    /// Composes the request path from the filters.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NoEntityType`] if no type is set.
    pub fn get_path(&self, extra: Option<&str>) -> Result<String, ResourceError> {
        let model = self.model()?;
        let mut wheres = self.wheres.clone();
        let id = wheres
            .remove(model.key_name())
            .as_ref()
            .and_then(scalar_to_string)
            .filter(|id| !id.is_empty());

        Ok(model.path_for(id.as_deref(), extra, &wheres))
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Fetches every property of the matching records.
    ///
    /// # Errors
    ///
    /// See [`get_with`](Self::get_with).
    pub async fn get(&self) -> Result<Fetched, ResourceError> {
        self.get_with(None, None).await
    }

    /// Fetches only the given properties of the matching records.
    ///
    /// # Errors
    ///
    /// See [`get_with`](Self::get_with).
    pub async fn get_only(&self, properties: &[&str]) -> Result<Fetched, ResourceError> {
        self.get_with(Some(properties), None).await
    }

    /// Fetches the matching records.
    ///
    /// `properties` restricts the hydrated attributes; `extra` replaces the
    /// type's path suffix. Collection types yield [`Fetched::Many`] with the
    /// envelope's page metadata; singleton types yield [`Fetched::One`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NoEntityType`] if no type is set,
    /// [`ResourceError::Http`] for request failures, including a
    /// [`ProtocolError::UnexpectedShape`] when the payload is not an object
    /// or a list of objects.
    pub async fn get_with(
        &self,
        properties: Option<&[&str]>,
        extra: Option<&str>,
    ) -> Result<Fetched, ResourceError> {
        let descriptor = self.descriptor.ok_or(ResourceError::NoEntityType)?;
        let path = self.get_path(extra)?;

        let body = self
            .client
            .request_with(&path, None, HttpMethod::Get, self.debug)
            .await?;
        let (items, pagination, links) = unwrap_envelope(&descriptor.response_key(), body)?;

        let entities = items
            .into_iter()
            .map(|mut attributes| {
                if let Some(properties) = properties.filter(|p| !p.contains(&"*")) {
                    attributes.retain(|key, _| properties.contains(&key.as_str()));
                }
                Entity::hydrate(
                    descriptor,
                    Arc::clone(&self.client),
                    self.parent.clone(),
                    attributes,
                )
            })
            .collect();
        let collection = Collection::new(entities, pagination, links);

        if descriptor.collection {
            Ok(Fetched::Many(collection))
        } else {
            Ok(Fetched::One(collection.into_first()))
        }
    }

    /// Fetches one record by primary key.
    ///
    /// # Errors
    ///
    /// See [`get_with`](Self::get_with).
    pub async fn find(&self, id: impl Into<Value>) -> Result<Option<Entity>, ResourceError> {
        self.find_only(id, None).await
    }

    /// Fetches the given properties of one record by primary key.
    ///
    /// # Errors
    ///
    /// See [`get_with`](Self::get_with).
    pub async fn find_only(
        &self,
        id: impl Into<Value>,
        properties: Option<&[&str]>,
    ) -> Result<Option<Entity>, ResourceError> {
        Ok(self
            .clone()
            .where_id(id)
            .get_with(properties, None)
            .await?
            .into_first())
    }

    // ========================================================================
    // Creating
    // ========================================================================

    /// Makes an unsaved entity without a request.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NoEntityType`] if no type is set.
    pub fn make(&self, attributes: Map<String, Value>) -> Result<Entity, ResourceError> {
        let mut entity = self.model()?;
        entity.fill(attributes);
        Ok(entity)
    }

    /// Makes an entity and saves it.
    ///
    /// The returned entity reports whether the save went through via
    /// [`Entity::exists`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NoEntityType`] if no type is set and the
    /// errors of [`Entity::save`].
    pub async fn create(&self, attributes: Map<String, Value>) -> Result<Entity, ResourceError> {
        let mut entity = self.make(attributes)?;
        entity.save().await?;
        Ok(entity)
    }
}

type Unwrapped = (Vec<Map<String, Value>>, Pagination, Links);

fn unwrap_envelope(response_key: &str, body: Option<Value>) -> Result<Unwrapped, ResourceError> {
    let (payload, pagination, links) = match body {
        None => (Value::Null, Pagination::default(), Links::default()),
        Some(Value::Object(mut envelope)) => {
            let pagination = Pagination::from_envelope(&envelope);
            let links = Links::from_envelope(&envelope);
            let payload = envelope
                .remove(response_key)
                .unwrap_or(Value::Object(envelope));
            (payload, pagination, links)
        }
        Some(list @ Value::Array(_)) => (list, Pagination::default(), Links::default()),
        Some(_) => return Err(unexpected_shape()),
    };

    let items = match payload {
        Value::Null => Vec::new(),
        Value::Object(item) if item.is_empty() => Vec::new(),
        Value::Object(item) => vec![item],
        Value::Array(list) => list
            .into_iter()
            .map(|item| match item {
                Value::Object(item) => Ok(item),
                _ => Err(unexpected_shape()),
            })
            .collect::<Result<_, _>>()?,
        _ => return Err(unexpected_shape()),
    };

    Ok((items, pagination, links))
}

fn unexpected_shape() -> ResourceError {
    ResourceError::Http(
        ProtocolError::UnexpectedShape {
            expected: "an object or a list of objects",
        }
        .into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BaseUrl, Jwt, NcentralConfig};
    use crate::rest::resources::{DEVICE, SCHEDULED_TASK};
    use serde_json::json;

    fn builder() -> Builder {
        let config = NcentralConfig::builder()
            .jwt(Jwt::new("jwt").unwrap())
            .base_url(BaseUrl::new("https://ncentral.example.com/api").unwrap())
            .build()
            .unwrap();
        Builder::new(Arc::new(AuthClient::with_http_client(
            config,
            reqwest::Client::new(),
        )))
    }

    #[test]
    fn test_unset_type_is_an_error() {
        let error = builder().get_path(None).unwrap_err();
        assert!(matches!(error, ResourceError::NoEntityType));
        assert!(matches!(builder().model(), Err(ResourceError::NoEntityType)));
    }

    #[test]
    fn test_where_id_appends_identifier() {
        let path = builder().devices().unwrap().where_id(42).get_path(None).unwrap();
        assert_eq!(path, "/devices/42");
    }

    #[test]
    fn test_null_and_empty_ids_are_absent() {
        let devices = builder().devices().unwrap();
        assert_eq!(devices.clone().where_id(Value::Null).get_path(None).unwrap(), "/devices");
        assert_eq!(devices.where_id("").get_path(None).unwrap(), "/devices");
    }

    #[test]
    fn test_zero_id_is_a_segment() {
        let path = builder().devices().unwrap().where_id(0).get_path(None).unwrap();
        assert_eq!(path, "/devices/0");
    }

    #[test]
    fn test_later_filters_overwrite_earlier_ones() {
        let builder = builder().customers().unwrap().where_("name", "a").where_("name", "b");
        assert_eq!(builder.wheres().get("name"), Some(&json!("b")));
    }

    #[test]
    fn test_booleans_in_query() {
        let path = builder()
            .devices()
            .unwrap()
            .where_("isProbe", true)
            .where_not("stillLoggedIn")
            .get_path(None)
            .unwrap();
        assert_eq!(path, "/devices?isProbe=true&stillLoggedIn=false");
    }

    #[test]
    fn test_ordering_parameters() {
        let path = builder().devices().unwrap().order_by_desc("longName").get_path(None).unwrap();
        assert_eq!(path, "/devices?order=longName&orderdesc=true");

        let path = builder().devices().unwrap().order_by("longName").get_path(None).unwrap();
        assert_eq!(path, "/devices?order=longName&orderdesc=false");
    }

    #[test]
    fn test_latest_without_created_at_column_is_a_noop() {
        let builder = builder().devices().unwrap().latest(None).oldest(None);
        assert!(builder.wheres().is_empty());

        let builder = builder.latest(Some("lastApplianceCheckinTime"));
        assert_eq!(builder.wheres().get("orderdesc"), Some(&json!(true)));
    }

    #[test]
    fn test_paging_parameters() {
        let devices = builder().devices().unwrap();

        let path = devices.clone().page(2, Some(10)).get_path(None).unwrap();
        assert_eq!(path, "/devices?pageNumber=2&pageSize=10&paginate=true");

        let path = devices.clone().paginate(None).get_path(None).unwrap();
        assert_eq!(path, "/devices?paginate=false");

        let path = devices.take(5).get_path(None).unwrap();
        assert_eq!(path, "/devices?count=5");
    }

    #[test]
    fn test_scheduled_task_listing_uses_direct_suffix() {
        let tasks = builder().for_entity(&SCHEDULED_TASK);
        assert_eq!(tasks.get_path(None).unwrap(), "/scheduled-tasks/direct");
        assert_eq!(tasks.where_id(9).get_path(None).unwrap(), "/scheduled-tasks/9");
    }

    #[test]
    fn test_path_override() {
        let builder = builder().for_entity(&DEVICE).with_path("/org-units/50/devices");
        assert_eq!(builder.path().unwrap(), "/org-units/50/devices");
        assert_eq!(builder.get_path(None).unwrap(), "/org-units/50/devices");
    }

    #[test]
    fn test_root_lookup_errors() {
        let root = builder();
        assert!(matches!(
            root.resource("widgets"),
            Err(ResourceError::UnknownResource { name }) if name == "widgets"
        ));

        let device = root.devices().unwrap().make(Map::new()).unwrap();
        let scoped = root.devices().unwrap().with_parent(Some(device.scope()));
        assert!(matches!(
            scoped.customers(),
            Err(ResourceError::ScopedRootLookup { name }) if name == "customers"
        ));
    }

    #[test]
    fn test_make_does_not_exist() {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), json!("Reboot"));
        let task = builder().scheduled_tasks().unwrap().make(attributes).unwrap();

        assert!(!task.exists());
        assert!(task.is_dirty());
        assert_eq!(task["taskType"], json!("AutomationPolicy"));
    }

    #[test]
    fn test_unwrap_envelope_peels_response_key() {
        let (items, pagination, links) = unwrap_envelope(
            "data",
            Some(json!({
                "totalItems": 50,
                "pageNumber": 2,
                "totalPages": 5,
                "pageSize": 10,
                "_links": {"nextPage": "/devices?pageNumber=3"},
                "data": [{"deviceId": 1}, {"deviceId": 2}]
            })),
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(pagination.count, Some(50));
        assert!(links.has_next_page());
    }

    #[test]
    fn test_unwrap_envelope_shapes() {
        let (items, ..) = unwrap_envelope("data", Some(json!({"version": "2024.1"}))).unwrap();
        assert_eq!(items.len(), 1);

        let (items, ..) = unwrap_envelope("data", Some(json!({"data": {}}))).unwrap();
        assert!(items.is_empty());

        let (items, ..) = unwrap_envelope("data", Some(json!([{"a": 1}]))).unwrap();
        assert_eq!(items.len(), 1);

        let (items, ..) = unwrap_envelope("data", None).unwrap();
        assert!(items.is_empty());

        assert!(unwrap_envelope("data", Some(json!("text"))).is_err());
        assert!(unwrap_envelope("data", Some(json!({"data": [1, 2]}))).is_err());
    }
}
