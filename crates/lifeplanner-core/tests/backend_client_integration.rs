//! Integration tests for the REST backend client against a mock server.

use lifeplanner_core::api::BackendClient;
use lifeplanner_core::model::{NewTask, Priority, ProjectPatch, TaskStatus};
use lifeplanner_core::storage::ApiConfig;
use lifeplanner_core::ApiError;
use mockito::{Matcher, Server};
use serde_json::json;

fn client(url: &str) -> BackendClient {
    BackendClient::new(&ApiConfig {
        base_url: url.to_string(),
        timeout_secs: 5,
        max_retries: 2,
        retry_delay_ms: 0,
    })
    .unwrap()
}

fn task_json(id: i64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Write report",
        "description": null,
        "status": status,
        "priority": "media",
        "due_date": "2026-11-01",
        "project_id": 7,
        "created_at": "2026-10-01T10:00:00",
        "updated_at": "2026-10-02T10:00:00"
    })
}

#[tokio::test]
async fn test_health_check() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/lifeplanner/health")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    client(&server.url()).health().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_projects_decodes_wire_values() {
    let mut server = Server::new_async().await;
    let body = json!([{
        "id": 7,
        "title": "Thesis",
        "description": "Final chapter",
        "priority": "alta",
        "category": "study",
        "deadline": "2026-12-01",
        "status": "en_pausa",
        "created_at": "2026-09-01T08:00:00",
        "updated_at": null,
        "tasks": [task_json(1, "completada"), task_json(2, "pendiente")]
    }]);
    let mock = server
        .mock("GET", "/lifeplanner/projects/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let projects = client(&server.url()).list_projects().await.unwrap();
    mock.assert_async().await;

    assert_eq!(projects.len(), 1);
    let project = &projects[0];
    assert_eq!(project.priority, Some(Priority::High));
    assert_eq!(project.tasks.len(), 2);
    assert_eq!(project.completed_tasks(), 1);
}

#[tokio::test]
async fn test_list_tasks_filters_by_project() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/lifeplanner/tasks/")
        .match_query(Matcher::UrlEncoded("project_id".into(), "7".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([task_json(1, "en_progreso")]).to_string())
        .create_async()
        .await;

    let tasks = client(&server.url()).list_tasks(7).await.unwrap();
    mock.assert_async().await;
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
}

#[tokio::test]
async fn test_create_task_sends_backend_enums() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/lifeplanner/tasks/project/7")
        .match_body(Matcher::PartialJson(json!({
            "title": "Write report",
            "status": "pendiente",
            "priority": "alta"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(task_json(3, "pendiente").to_string())
        .create_async()
        .await;

    let new = NewTask {
        title: "Write report".into(),
        priority: Priority::High,
        ..NewTask::default()
    };
    let task = client(&server.url()).create_task(7, &new).await.unwrap();
    mock.assert_async().await;
    assert_eq!(task.id, 3);
}

#[tokio::test]
async fn test_update_project_omits_absent_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/lifeplanner/projects/7")
        .match_body(Matcher::Json(json!({ "title": "Thesis v2" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"id": 7, "title": "Thesis v2", "status": "activo"}).to_string(),
        )
        .create_async()
        .await;

    let patch = ProjectPatch {
        title: Some("Thesis v2".into()),
        ..ProjectPatch::default()
    };
    let project = client(&server.url()).update_project(7, &patch).await.unwrap();
    mock.assert_async().await;
    assert_eq!(project.title, "Thesis v2");
    assert!(project.tasks.is_empty());
}

#[tokio::test]
async fn test_advance_task_status_cycles() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/lifeplanner/tasks/1/status")
        .match_body(Matcher::Json(json!({ "status": "pendiente" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(task_json(1, "pendiente").to_string())
        .create_async()
        .await;

    let done: lifeplanner_core::Task =
        serde_json::from_value(task_json(1, "completada")).unwrap();
    let task = client(&server.url()).advance_task_status(&done).await.unwrap();
    mock.assert_async().await;
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_update_priority() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/lifeplanner/tasks/1/priority")
        .match_body(Matcher::Json(json!({ "priority": "baja" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(task_json(1, "pendiente").to_string())
        .create_async()
        .await;

    client(&server.url())
        .update_task_priority(1, Priority::Low)
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/lifeplanner/tasks/9")
        .with_status(204)
        .create_async()
        .await;

    client(&server.url()).delete_task(9).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_service_unavailable_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/lifeplanner/projects/")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let err = client(&server.url()).list_projects().await.unwrap_err();
    mock.assert_async().await;
    assert!(matches!(err, ApiError::Unavailable(503)));
}

#[tokio::test]
async fn test_rate_limit_retries_until_budget_is_spent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/lifeplanner/projects/")
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(3)
        .create_async()
        .await;

    let err = client(&server.url()).list_projects().await.unwrap_err();
    mock.assert_async().await;
    assert!(matches!(err, ApiError::Status { status: 429, .. }));
}

#[tokio::test]
async fn test_error_status_keeps_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/lifeplanner/projects/42")
        .with_status(404)
        .with_body(r#"{"detail":"Project not found"}"#)
        .create_async()
        .await;

    match client(&server.url()).get_project(42).await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("Project not found"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/lifeplanner/projects/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"not":"a list"}"#)
        .create_async()
        .await;

    let err = client(&server.url()).list_projects().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_connection_refused_after_retries() {
    // Nothing listens on port 1.
    let err = client("http://127.0.0.1:1").health().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
