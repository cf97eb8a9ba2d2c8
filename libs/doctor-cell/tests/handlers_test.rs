use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use doctor_cell::handlers::DoctorCellState;
use doctor_cell::router::doctor_routes;
use doctor_cell::services::{DoctorDirectoryService, InMemoryCalendar};

fn create_test_app() -> Router {
    let state = DoctorCellState {
        directory: Arc::new(DoctorDirectoryService::new()),
        calendar: Arc::new(InMemoryCalendar::new()),
    };
    doctor_routes(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn doctor_body(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Dr. {}", id),
        "email": format!("{}@clinic.example", id.to_lowercase())
    })
}

#[tokio::test]
async fn test_add_doctor_returns_created() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request("POST", "/", doctor_body("D1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["doctor"]["id"], json!("D1"));
}

#[tokio::test]
async fn test_add_duplicate_doctor_conflicts() {
    let app = create_test_app();

    let first = app
        .clone()
        .oneshot(json_request("POST", "/", doctor_body("D1")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(json_request("POST", "/", doctor_body("D1")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = response_json(second).await;
    assert_eq!(body["error"], json!("Doctor already exists"));
}

#[tokio::test]
async fn test_add_doctor_rejects_blank_fields() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "id": "D1", "name": "  ", "email": "d1@clinic.example" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_doctors_sorted_by_id() {
    let app = create_test_app();

    for id in ["D2", "D1"] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/", doctor_body(id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let ids: Vec<&str> = body["doctors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|doctor| doctor["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["D1", "D2"]);
}

#[tokio::test]
async fn test_update_availability_unknown_doctor() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/ghost/availability",
            json!({ "date": "2024-06-01", "slots": ["10:00"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_then_get_availability() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request("POST", "/", doctor_body("D1")))
        .await
        .unwrap();

    let update = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/D1/availability",
            json!({ "date": "2024-06-01", "slots": ["11:00", "10:00"] }),
        ))
        .await
        .unwrap();
    assert_eq!(update.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/D1/availability?date=2024-06-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    // BTreeSet ordering: slots come back sorted regardless of input order
    assert_eq!(
        body["schedule"]["available_slots"],
        json!(["10:00", "11:00"])
    );
}

#[tokio::test]
async fn test_get_full_schedule_without_date() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request("POST", "/", doctor_body("D1")))
        .await
        .unwrap();

    for (day, slot) in [("2024-06-02", "14:00"), ("2024-06-01", "10:00")] {
        app.clone()
            .oneshot(json_request(
                "PUT",
                "/D1/availability",
                json!({ "date": day, "slots": [slot] }),
            ))
            .await
            .unwrap();
    }

    let response = app.oneshot(get_request("/D1/availability")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let days = body["schedule"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], json!("2024-06-01"));
    assert_eq!(days[1]["date"], json!("2024-06-02"));
}

#[tokio::test]
async fn test_get_availability_empty_day() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request("POST", "/", doctor_body("D1")))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request("/D1/availability?date=2030-01-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["schedule"]["available_slots"], json!([]));
}
