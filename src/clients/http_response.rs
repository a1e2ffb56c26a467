//! HTTP response type for the N-central API SDK.

use std::collections::HashMap;

use serde_json::Value;

use crate::clients::errors::ProtocolError;

/// A successful response from the N-central API.
///
/// Header names are lowercased. An empty body is `None`.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use ncentral_api::clients::HttpResponse;
///
/// let response = HttpResponse::parse(200, HashMap::new(), r#"{"data":[]}"#).unwrap();
/// assert!(response.is_ok());
/// assert!(response.body.is_some());
///
/// let empty = HttpResponse::parse(204, HashMap::new(), "").unwrap();
/// assert!(empty.body.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body, `None` when the body was empty.
    pub body: Option<Value>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` from an already parsed body.
    #[must_use]
    pub const fn new(code: u16, headers: HashMap<String, Vec<String>>, body: Option<Value>) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Creates a new `HttpResponse`, parsing `text` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidJson`] if a non-blank body is not JSON.
    pub fn parse(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        text: &str,
    ) -> Result<Self, ProtocolError> {
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson {
                    reason: e.to_string(),
                })?,
            )
        };
        Ok(Self::new(code, headers, body))
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Consumes the response and returns the body.
    #[must_use]
    pub fn into_body(self) -> Option<Value> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_body() {
        let response = HttpResponse::parse(200, HashMap::new(), r#"{"a":1}"#).unwrap();
        assert_eq!(response.body, Some(json!({"a": 1})));
    }

    #[test]
    fn test_parse_blank_body_is_none() {
        let response = HttpResponse::parse(200, HashMap::new(), "  \n").unwrap();
        assert!(response.into_body().is_none());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = HttpResponse::parse(200, HashMap::new(), "<html>");
        assert!(matches!(result, Err(ProtocolError::InvalidJson { .. })));
    }

    #[test]
    fn test_is_ok_range() {
        assert!(HttpResponse::new(200, HashMap::new(), None).is_ok());
        assert!(HttpResponse::new(299, HashMap::new(), None).is_ok());
        assert!(!HttpResponse::new(301, HashMap::new(), None).is_ok());
        assert!(!HttpResponse::new(404, HashMap::new(), None).is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), vec!["application/json".to_string()]);

        let response = HttpResponse::new(200, headers, None);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }
}
