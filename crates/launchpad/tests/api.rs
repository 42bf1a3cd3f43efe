//! End-to-end tests of the HTTP API against in-memory storage.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use launchpad::api::{router, AppState};
use launchpad::config::ApiConfig;
use launchpad::launch::{parse_launch_date, Launch};
use launchpad::{LaunchManager, Planet, Storage};

fn test_storage() -> Arc<Storage> {
    let storage = Storage::open_in_memory().expect("failed to create test storage");
    storage
        .insert_planet(&Planet::new("Kepler-186 f"))
        .expect("failed to seed planet");
    Arc::new(storage)
}

fn test_app(storage: Arc<Storage>) -> Router {
    let manager = LaunchManager::new(storage);
    router(Arc::new(AppState::new(manager, ApiConfig::default())))
}

fn ingested_launch(flight_number: i64) -> Launch {
    Launch {
        flight_number,
        mission: format!("Mission {flight_number}"),
        rocket: "Falcon 9".to_string(),
        launch_date: parse_launch_date("2020-05-30T15:22:00-04:00").unwrap(),
        target: None,
        customers: vec!["NASA".to_string()],
        upcoming: true,
        success: None,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, content_type, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn complete_launch_data() -> Value {
    json!({
        "mission": "USS Enterprise",
        "rocket": "NC 1701-D",
        "target": "Kepler-186 f",
        "launchDate": "2030-10-10"
    })
}

fn launch_data_without_date() -> Value {
    json!({
        "mission": "USS Enterprise",
        "rocket": "NC 1701-D",
        "target": "Kepler-186 f"
    })
}

#[tokio::test]
async fn get_launches_responds_with_json_sorted_by_flight_number() {
    let storage = test_storage();
    for flight_number in [30, 2, 17] {
        storage.upsert_launch(&ingested_launch(flight_number)).unwrap();
    }

    let (status, content_type, body) = send(test_app(storage), get("/launches")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().contains("json"));
    let numbers: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["flightNumber"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![2, 17, 30]);
}

#[tokio::test]
async fn get_launches_strips_identity_fields() {
    let storage = test_storage();
    storage.upsert_launch(&ingested_launch(1)).unwrap();

    let (_, _, body) = send(test_app(storage), get("/launches")).await;

    let launch = body[0].as_object().unwrap();
    assert!(!launch.contains_key("_id"));
    assert!(!launch.contains_key("id"));
    assert!(!launch.contains_key("__v"));
    assert!(launch.contains_key("customers"));
}

#[tokio::test]
async fn get_launches_paginates() {
    let storage = test_storage();
    for flight_number in 1..=5 {
        storage.upsert_launch(&ingested_launch(flight_number)).unwrap();
    }

    let (status, _, body) = send(test_app(storage), get("/launches?skip=1&limit=2")).await;

    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["flightNumber"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![2, 3]);
}

#[tokio::test]
async fn get_launches_rejects_bad_pagination() {
    let (status, _, body) = send(test_app(test_storage()), get("/launches?limit=lots")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid pagination parameters" }));
}

#[tokio::test]
async fn post_launch_responds_with_201_created() {
    let request_data = complete_launch_data();
    let (status, content_type, body) =
        send(test_app(test_storage()), post_json("/launches", &request_data)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(content_type.unwrap().contains("json"));

    let request_date = parse_launch_date("2030-10-10").unwrap();
    let response_date: DateTime<Utc> = body["launchDate"].as_str().unwrap().parse().unwrap();
    assert_eq!(response_date, request_date);

    assert_eq!(body["mission"], "USS Enterprise");
    assert_eq!(body["rocket"], "NC 1701-D");
    assert_eq!(body["target"], "Kepler-186 f");
    assert_eq!(body["flightNumber"], 100);
    assert_eq!(body["upcoming"], true);
    assert_eq!(body["success"], true);
    assert_eq!(body["customers"], json!(["Zero to Mastery", "NASA"]));
}

#[tokio::test]
async fn post_launch_assigns_next_flight_number() {
    let storage = test_storage();
    storage.upsert_launch(&ingested_launch(187)).unwrap();

    let (status, _, body) =
        send(test_app(storage), post_json("/launches", &complete_launch_data())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["flightNumber"], 188);
}

#[tokio::test]
async fn post_launch_catches_missing_required_properties() {
    let (status, content_type, body) = send(
        test_app(test_storage()),
        post_json("/launches", &launch_data_without_date()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(content_type.unwrap().contains("json"));
    assert_eq!(body, json!({ "error": "Missing required launch property" }));
}

#[tokio::test]
async fn post_launch_catches_invalid_dates() {
    let mut request_data = launch_data_without_date();
    request_data["launchDate"] = json!("heloooo");

    let (status, content_type, body) =
        send(test_app(test_storage()), post_json("/launches", &request_data)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(content_type.unwrap().contains("json"));
    assert_eq!(body, json!({ "error": "Invalid launch date" }));
}

#[tokio::test]
async fn post_launch_treats_non_string_date_as_invalid() {
    let mut request_data = complete_launch_data();
    request_data["launchDate"] = json!(12345);

    let (status, _, body) =
        send(test_app(test_storage()), post_json("/launches", &request_data)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid launch date" }));
}

#[tokio::test]
async fn post_launch_rejects_unknown_target() {
    let storage = test_storage();
    let mut request_data = complete_launch_data();
    request_data["target"] = json!("Kepler-1649 c");

    let (status, _, body) =
        send(test_app(storage.clone()), post_json("/launches", &request_data)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No matching planet found" }));
    assert_eq!(storage.latest_flight_number().unwrap(), None);
}

#[tokio::test]
async fn post_launch_rejects_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/launches")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _, body) = send(test_app(test_storage()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn delete_launch_aborts() {
    let storage = test_storage();
    storage.upsert_launch(&ingested_launch(42)).unwrap();

    let (status, _, body) = send(test_app(storage.clone()), delete("/launches/42")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (_, _, launches) = send(test_app(storage), get("/launches")).await;
    assert_eq!(launches[0]["upcoming"], false);
    assert_eq!(launches[0]["success"], false);
}

#[tokio::test]
async fn delete_launch_twice_is_not_aborted_again() {
    let storage = test_storage();
    storage.upsert_launch(&ingested_launch(42)).unwrap();

    send(test_app(storage.clone()), delete("/launches/42")).await;
    let (status, _, body) = send(test_app(storage), delete("/launches/42")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Launch not aborted" }));
}

#[tokio::test]
async fn delete_missing_launch_is_not_found() {
    let (status, _, body) = send(test_app(test_storage()), delete("/launches/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Launch not found" }));
}

#[tokio::test]
async fn delete_with_invalid_flight_number_is_bad_request() {
    let (status, _, body) = send(test_app(test_storage()), delete("/launches/abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid flight number" }));
}

#[tokio::test]
async fn get_planets_lists_reference_set() {
    let (status, _, body) = send(test_app(test_storage()), get("/planets")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "keplerName": "Kepler-186 f" }]));
}

#[tokio::test]
async fn health_check_reports_service() {
    let (status, _, body) = send(test_app(test_storage()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "launchpad");
}
