//! Integration tests for entity persistence.
//!
//! These tests cover:
//! - Creating entities through `save`, `save_or_fail` and `Builder::create`
//! - Read-only policies and dirty tracking short-circuits
//! - Mapping of API failures onto save results

use std::sync::Arc;

use ncentral_api::rest::{Builder, ResourceError};
use ncentral_api::{AuthClient, BaseUrl, Jwt, NcentralConfig, Token};
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base_url: String) -> Arc<AuthClient> {
    let config = NcentralConfig::builder()
        .jwt(Jwt::new("long-lived-jwt").unwrap())
        .base_url(BaseUrl::new(base_url).unwrap())
        .build()
        .unwrap();
    Arc::new(
        AuthClient::new(config)
            .unwrap()
            .with_token(Token::from_access_token("seeded")),
    )
}

fn builder(server: &MockServer) -> Builder {
    Builder::new(client(format!("{}/api", server.uri())))
}

fn attributes(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

// ============================================================================
// Creating
// ============================================================================

#[tokio::test]
async fn test_save_creates_scheduled_task() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/scheduled-tasks/direct"))
        .and(body_json(json!({
            "credential": {"password": null, "type": "LocalSystem", "username": null},
            "customerId": 100,
            "deviceId": 42,
            "itemId": 7,
            "name": "Reboot",
            "taskType": "AutomationPolicy"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "taskId": 9,
            "name": "Reboot",
            "isEnabled": "true"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let root = builder(&server);
    let mut task = root
        .scheduled_tasks()
        .unwrap()
        .make(attributes(json!({
            "customerId": 100,
            "deviceId": 42,
            "itemId": 7,
            "name": "Reboot"
        })))
        .unwrap();

    assert!(!task.exists());
    assert!(!task.is_readonly());
    assert!(task.is_dirty_key("name"));
    assert!(!task.is_dirty_key("taskType"));
    assert_eq!(task.path(), "/scheduled-tasks/direct");

    assert!(task.save().await.unwrap());

    assert!(task.exists());
    assert!(task.was_recently_created());
    assert!(!task.is_dirty());
    assert_eq!(task.key().as_deref(), Some("9"));
    assert_eq!(task.get_bool("isEnabled"), Some(true));
    assert!(task.get("deviceId").is_none());
    assert_eq!(task.path(), "/scheduled-tasks/9");

    // Created tasks cannot be modified
    assert!(task.is_readonly());
    assert!(!task.save().await.unwrap());
}

#[tokio::test]
async fn test_builder_create() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/scheduled-tasks/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskId": 12})))
        .expect(1)
        .mount(&server)
        .await;

    let task = builder(&server)
        .scheduled_tasks()
        .unwrap()
        .create(attributes(json!({"name": "Patch"})))
        .await
        .unwrap();

    assert!(task.exists());
    assert_eq!(task.get_i64("taskId"), Some(12));
}

#[tokio::test]
async fn test_empty_save_response_keeps_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/scheduled-tasks/direct"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let root = builder(&server);
    let mut task = root
        .scheduled_tasks()
        .unwrap()
        .make(attributes(json!({"name": "Scan"})))
        .unwrap();

    assert!(task.save().await.unwrap());
    assert!(task.exists());
    assert!(!task.is_dirty());
    assert_eq!(task.get_str("name"), Some("Scan"));
}

// ============================================================================
// Short-circuits
// ============================================================================

#[tokio::test]
async fn test_clean_entity_save_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let root = builder(&server);
    let mut task = root.scheduled_tasks().unwrap().make(Map::new()).unwrap();

    assert!(!task.is_dirty());
    assert!(task.save().await.unwrap());
    assert!(!task.exists());
}

#[tokio::test]
async fn test_readonly_entity_save_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let root = builder(&server);
    let mut device = root
        .devices()
        .unwrap()
        .make(attributes(json!({"longName": "edge-01"})))
        .unwrap();

    assert!(device.is_readonly());
    assert!(!device.save().await.unwrap());

    let error = device.set("longName", "edge-02").unwrap_err();
    assert!(matches!(error, ResourceError::ReadOnly { entity: "Device" }));
    assert_eq!(error.to_string(), "Device is read only");
}

#[tokio::test]
async fn test_readonly_override_allows_saving() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"customerId": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let root = builder(&server);
    let mut customer = root.customers().unwrap().make(Map::new()).unwrap();
    customer.set_readonly(Some(false));
    customer.set("customerName", "Acme").unwrap();

    assert!(customer.save().await.unwrap());
    assert_eq!(customer.key().as_deref(), Some("5"));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_api_failure_reports_false() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/scheduled-tasks/direct"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "itemId is required"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let root = builder(&server);
    let mut task = root
        .scheduled_tasks()
        .unwrap()
        .make(attributes(json!({"name": "Reboot"})))
        .unwrap();

    assert!(!task.save().await.unwrap());
    assert!(!task.exists());
    assert!(task.is_dirty());

    let error = task.save_or_fail().await.unwrap_err();
    assert!(matches!(
        error,
        ResourceError::UnableToSave { entity: "ScheduledTask" }
    ));
}

#[tokio::test]
async fn test_transport_failure_propagates_from_save() {
    let server = MockServer::start().await;
    let base_url = format!("{}/api", server.uri());
    drop(server);

    let root = Builder::new(client(base_url));
    let mut task = root
        .scheduled_tasks()
        .unwrap()
        .make(attributes(json!({"name": "Reboot"})))
        .unwrap();

    let error = task.save().await.unwrap_err();
    assert!(matches!(error, ResourceError::Http(_)));
    assert!(!error.is_api_error());
}
