#![cfg(feature = "http_api")]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    response::Response,
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use task_scheduler::{SqliteTaskStore, Task, TaskStore, http_api};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let store = SqliteTaskStore::in_memory().unwrap();
    let state = http_api::AppState::new(Arc::new(store))
        .with_clock(|| NaiveDate::from_ymd_opt(2024, 1, 26).unwrap());
    http_api::router(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
}

async fn text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn next_date_endpoint_returns_plain_dates() {
    let app = new_router();

    let response = send(&app, "GET", "/api/nextdate?now=20240126&date=20240113&repeat=d%207", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "20240127");

    let response = send(&app, "GET", "/api/nextdate?now=20240126&date=20240229&repeat=y", None).await;
    assert_eq!(text(response).await, "20250301");

    let response = send(&app, "GET", "/api/nextdate?now=20240126&date=20240101&repeat=d%20401", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "GET", "/api/nextdate?now=bad&date=20240101&repeat=y", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(text(response).await.contains("invalid now"));
}

#[tokio::test]
async fn task_lifecycle_via_http_api() {
    let app = new_router();

    // A past-due recurring task moves forward on creation.
    let task = json!({ "date": "20240113", "title": "Standup", "comment": "", "repeat": "d 7" });
    let response = send(&app, "POST", "/api/task", Some(task)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = send(&app, "GET", &format!("/api/task?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Task = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(fetched.title, "Standup");
    assert_eq!(fetched.date, "20240127");

    // Edit it.
    let edit = json!({ "id": id, "date": "20240301", "title": "Retro", "comment": "room 2", "repeat": "w 5" });
    let response = send(&app, "PUT", "/api/task", Some(edit)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({}));

    // Complete it: recurring, so it moves to the next Friday after the stored date.
    let response = send(&app, "POST", &format!("/api/task/done?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, "GET", &format!("/api/task?id={id}"), None).await;
    let fetched: Task = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(fetched.title, "Retro");
    assert_eq!(fetched.date, "20240308");

    // Delete it.
    let response = send(&app, "DELETE", &format!("/api/task?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", &format!("/api/task?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap_or_default().contains("not found"));
}

#[tokio::test]
async fn completing_a_one_shot_task_removes_it() {
    let app = new_router();
    let response = send(&app, "POST", "/api/task", Some(json!({ "title": "Once" }))).await;
    let id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = send(&app, "POST", &format!("/api/task/done?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", &format!("/api/task?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_returns_tasks_in_date_order() {
    let app = new_router();
    for (title, date) in [("Later", "20240501"), ("Sooner", "20240201"), ("Today", "")] {
        let response = send(
            &app,
            "POST",
            "/api/task",
            Some(json!({ "title": title, "date": date })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: http_api::TaskList = serde_json::from_value(json_body(response).await).unwrap();
    let titles: Vec<&str> = body.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Today", "Sooner", "Later"]);

    let response = send(&app, "GET", "/api/tasks?limit=1", None).await;
    let body: http_api::TaskList = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(body.tasks.len(), 1);

    let response = send(&app, "GET", "/api/tasks?limit=zero", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let app = new_router();
    let response = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(json_body(response).await, json!({ "tasks": [] }));
}

#[tokio::test]
async fn invalid_payloads_return_bad_request() {
    let app = new_router();

    let cases = [
        json!({ "title": "" }),
        json!({ "title": "Bad date", "date": "2024-01-01" }),
        json!({ "title": "Bad rule", "repeat": "w 8" }),
        json!({ "title": "Impossible", "repeat": "m 31 2" }),
    ];
    for payload in cases {
        let response = send(&app, "POST", "/api/task", Some(payload.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body = json_body(response).await;
        assert!(body["error"].is_string(), "{payload}");
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/task")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());

    let response = send(&app, "GET", "/api/task", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "PUT", "/api/task", Some(json!({ "title": "No id" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "DELETE", "/api/task?id=999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completing_a_task_with_a_broken_stored_rule_is_a_bad_request() {
    let store = SqliteTaskStore::in_memory().unwrap();
    let id = store
        .add_task(&Task::new("Broken").with_date("20240201").with_repeat("w 9"))
        .unwrap();
    let state = http_api::AppState::new(Arc::new(store))
        .with_clock(|| NaiveDate::from_ymd_opt(2024, 1, 26).unwrap());
    let app = http_api::router(state);

    let response = send(&app, "POST", &format!("/api/task/done?id={id}"), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());

    let response = send(&app, "GET", &format!("/api/task?id={id}"), None).await;
    let fetched: Task = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(fetched.date, "20240201");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = new_router();
    let response = send(&app, "GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}
