//! Scheduled tasks.
//!
//! N-central creates tasks at `/scheduled-tasks/direct` but reads them at
//! `/scheduled-tasks/{taskId}`, and tasks cannot be changed once created.

use serde_json::{json, Map, Value};

use crate::rest::cast::Cast;
use crate::rest::descriptor::{EntityDescriptor, ExtraPath, ReadOnly, RelationDef};

/// A scheduled task.
///
/// Relations: `details`, the task's per-device status.
pub static SCHEDULED_TASK: EntityDescriptor = EntityDescriptor {
    name: "ScheduledTask",
    path: "/scheduled-tasks",
    primary_key: "taskId",
    readonly: ReadOnly::OnceExists,
    extra: ExtraPath::UntilKeyed("/direct"),
    defaults: Some(scheduled_task_defaults),
    casts: &[
        ("applianceId", Cast::Int),
        ("customerId", Cast::Int),
        ("deviceId", Cast::Int),
        ("isEnabled", Cast::Bool),
        ("isReactive", Cast::Bool),
        ("itemId", Cast::Int),
        ("parentId", Cast::Int),
        ("taskId", Cast::Int),
    ],
    relations: &[RelationDef::belongs_to(
        "details",
        &DETAILED_SCHEDULED_TASK,
        Some("taskId"),
    )],
    ..EntityDescriptor::DEFAULT
};

/// Status details of a scheduled task.
pub static DETAILED_SCHEDULED_TASK: EntityDescriptor = EntityDescriptor {
    name: "DetailedScheduledTask",
    path: "/scheduled-tasks",
    primary_key: "taskId",
    readonly: ReadOnly::Always,
    extra: ExtraPath::Fixed("/status/details"),
    casts: &[("deviceId", Cast::Int), ("taskId", Cast::Int)],
    ..EntityDescriptor::DEFAULT
};

fn scheduled_task_defaults() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert(
        "credential".to_string(),
        json!({"type": "LocalSystem", "username": null, "password": null}),
    );
    defaults.insert("taskType".to_string(), json!("AutomationPolicy"));
    defaults
}
