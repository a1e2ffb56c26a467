//! Collections of hydrated entities with their page metadata.
//!
//! A [`Collection`] derefs to `[Entity]`, so it can be iterated, indexed
//! and measured like a slice. Pagination metadata and navigation links are
//! read once from the response envelope and never recomputed.
//!
//! # Example
//!
//! ```rust
//! use ncentral_api::rest::{Links, Pagination};
//! use serde_json::json;
//!
//! let envelope = json!({
//!     "totalItems": 50,
//!     "pageNumber": 2,
//!     "totalPages": 5,
//!     "pageSize": 10,
//!     "_links": {"nextPage": "/api/devices?pageNumber=3&pageSize=10"}
//! });
//! let envelope = envelope.as_object().unwrap();
//!
//! let pagination = Pagination::from_envelope(envelope);
//! assert_eq!(pagination.count, Some(50));
//! assert_eq!(pagination.page, Some(2));
//!
//! let links = Links::from_envelope(envelope);
//! assert!(links.has_next_page());
//! assert!(!links.has_previous_page());
//! ```

use std::ops::Deref;

use serde_json::{Map, Value};

use crate::rest::entity::Entity;

/// Page metadata from a response envelope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Total number of records (`totalItems`).
    pub count: Option<u64>,
    /// Current page (`pageNumber`).
    pub page: Option<u64>,
    /// Total pages (`totalPages`).
    pub pages: Option<u64>,
    /// Page size (`pageSize`).
    pub page_size: Option<u64>,
}

impl Pagination {
    /// Reads the metadata from the top level of an envelope.
    #[must_use]
    pub fn from_envelope(envelope: &Map<String, Value>) -> Self {
        Self {
            count: envelope.get("totalItems").and_then(as_u64),
            page: envelope.get("pageNumber").and_then(as_u64),
            pages: envelope.get("totalPages").and_then(as_u64),
            page_size: envelope.get("pageSize").and_then(as_u64),
        }
    }
}

/// Navigation links from a response envelope (`_links`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Links {
    /// Link to the first page.
    pub first_page: Option<String>,
    /// Link to the last page.
    pub last_page: Option<String>,
    /// Link to the next page.
    pub next_page: Option<String>,
    /// Link to the previous page.
    pub previous_page: Option<String>,
}

impl Links {
    /// Reads the links from the `_links` object of an envelope.
    #[must_use]
    pub fn from_envelope(envelope: &Map<String, Value>) -> Self {
        let Some(links) = envelope.get("_links").and_then(Value::as_object) else {
            return Self::default();
        };
        let link = |key: &str| {
            links
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };

        Self {
            first_page: link("firstPage"),
            last_page: link("lastPage"),
            next_page: link("nextPage"),
            previous_page: link("previousPage"),
        }
    }

    /// Returns `true` if there is a next page.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }

    /// Returns `true` if there is a previous page.
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.previous_page.is_some()
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// An ordered list of entities from one response.
///
/// # Example
///
/// ```rust,ignore
/// let devices = builder.devices()?.page(2, Some(10)).get().await?.into_many();
///
/// println!("page {:?} of {:?}", devices.page(), devices.pages());
/// for device in devices.iter() {
///     println!("{}", device.get_str("longName").unwrap_or_default());
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Collection {
    items: Vec<Entity>,
    pagination: Pagination,
    links: Links,
}

impl Collection {
    /// Creates a collection with its metadata.
    #[must_use]
    pub const fn new(items: Vec<Entity>, pagination: Pagination, links: Links) -> Self {
        Self {
            items,
            pagination,
            links,
        }
    }

    /// Creates a collection without metadata.
    #[must_use]
    pub fn from_items(items: Vec<Entity>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Total number of records across all pages, as reported by the server.
    #[must_use]
    pub const fn record_count(&self) -> Option<u64> {
        self.pagination.count
    }

    /// Current page number.
    #[must_use]
    pub const fn page(&self) -> Option<u64> {
        self.pagination.page
    }

    /// Total number of pages.
    #[must_use]
    pub const fn pages(&self) -> Option<u64> {
        self.pagination.pages
    }

    /// Number of records per page.
    #[must_use]
    pub const fn page_size(&self) -> Option<u64> {
        self.pagination.page_size
    }

    /// Returns the page metadata.
    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Returns the navigation links.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }

    /// Consumes the collection and returns its first entity.
    #[must_use]
    pub fn into_first(self) -> Option<Entity> {
        self.items.into_iter().next()
    }

    /// Consumes the collection and returns the entities.
    #[must_use]
    pub fn into_inner(self) -> Vec<Entity> {
        self.items
    }
}

impl Deref for Collection {
    type Target = [Entity];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl IntoIterator for Collection {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pagination_reads_envelope() {
        let pagination = Pagination::from_envelope(&envelope(json!({
            "totalItems": 50,
            "pageNumber": 2,
            "totalPages": 5,
            "pageSize": 10,
            "data": []
        })));

        assert_eq!(
            pagination,
            Pagination {
                count: Some(50),
                page: Some(2),
                pages: Some(5),
                page_size: Some(10),
            }
        );
    }

    #[test]
    fn test_pagination_accepts_numeric_strings() {
        let pagination = Pagination::from_envelope(&envelope(json!({"pageNumber": "3"})));
        assert_eq!(pagination.page, Some(3));
        assert_eq!(pagination.count, None);
    }

    #[test]
    fn test_links_missing_or_empty() {
        assert_eq!(Links::from_envelope(&Map::new()), Links::default());

        let links = Links::from_envelope(&envelope(json!({
            "_links": {"firstPage": "/a", "nextPage": ""}
        })));
        assert_eq!(links.first_page.as_deref(), Some("/a"));
        assert!(!links.has_next_page());
    }

    #[test]
    fn test_empty_collection() {
        let collection = Collection::default();
        assert!(collection.is_empty());
        assert_eq!(collection.record_count(), None);
        assert!(collection.into_first().is_none());
    }
}
