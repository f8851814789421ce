//! Тесты HTTP-слоя: полный роутер поверх хранилища в памяти.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

use seat_booking::{app, config::Config, store::MemorySeatStore, AppState};

fn test_app() -> Router {
    let state = AppState::with_store(Config::in_memory(), Arc::new(MemorySeatStore::new()));
    app(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn book(app: &Router, num_seats: i64) -> (StatusCode, Vec<u8>) {
    send(app, Method::POST, "/book", Some(json!({ "numSeats": num_seats }))).await
}

fn ids(body: &[u8]) -> Vec<u64> {
    let seats: Vec<Value> = serde_json::from_slice(body).unwrap();
    seats.iter().map(|s| s["id"].as_u64().unwrap()).collect()
}

#[tokio::test]
async fn health_and_banner() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    let banner = String::from_utf8_lossy(&body);
    assert!(banner.contains("env=test"), "banner: {}", banner);
    assert!(banner.contains("storage=memory"), "banner: {}", banner);
}

#[tokio::test]
async fn initialize_then_list_returns_all_available_seats() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/initialize", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Seats initialized.");

    let (status, body) = send(&app, Method::GET, "/seats", None).await;
    assert_eq!(status, StatusCode::OK);
    let seats: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(seats.len(), 80);
    assert_eq!(seats[0], json!({ "id": 1, "status": "available", "user_name": null }));
    assert_eq!(ids(&body), (1..=80).collect::<Vec<u64>>());
}

#[tokio::test]
async fn booking_follows_rows() {
    let app = test_app();
    send(&app, Method::GET, "/initialize", None).await;

    let (status, body) = book(&app, 7).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3, 4, 5, 6, 7]);

    let (_, body) = book(&app, 3).await;
    assert_eq!(ids(&body), vec![8, 9, 10]);
    let seats: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert!(seats.iter().all(|s| s["status"] == "booked"));

    let (_, body) = book(&app, 5).await;
    assert_eq!(ids(&body), vec![15, 16, 17, 18, 19]);

    let (_, body) = send(&app, Method::GET, "/seats/summary", None).await;
    let summary: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary, json!({ "total": 80, "available": 65, "booked": 15 }));
}

#[tokio::test]
async fn holder_name_is_stored() {
    let app = test_app();
    send(&app, Method::GET, "/initialize", None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/book",
        Some(json!({ "numSeats": 2, "userName": "Olga" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let seats: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert!(seats.iter().all(|s| s["user_name"] == "Olga"));
}

#[tokio::test]
async fn out_of_range_counts_are_bad_requests() {
    let app = test_app();
    send(&app, Method::GET, "/initialize", None).await;

    for n in [0, 8, -3] {
        let (status, body) = book(&app, n).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "numSeats={}", n);
        assert!(String::from_utf8_lossy(&body).contains("between 1 and 7"));
    }
}

#[tokio::test]
async fn non_integer_counts_are_bad_requests() {
    let app = test_app();
    send(&app, Method::GET, "/initialize", None).await;

    for body in [json!({ "numSeats": 2.5 }), json!({ "numSeats": "3" }), json!({})] {
        let (status, text) = send(&app, Method::POST, "/book", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body={}", body);
        assert!(String::from_utf8_lossy(&text).contains("between 1 and 7"));
    }

    let (_, body) = send(&app, Method::GET, "/seats/summary", None).await;
    let summary: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary["booked"], 0);
}

#[tokio::test]
async fn exhausted_inventory_is_a_bad_request() {
    let app = test_app();
    send(&app, Method::GET, "/initialize", None).await;
    for _ in 0..11 {
        assert_eq!(book(&app, 7).await.0, StatusCode::OK);
    }
    assert_eq!(book(&app, 3).await.0, StatusCode::OK);

    let (status, body) = book(&app, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("Not enough seats"));
}

#[tokio::test]
async fn rows_view_matches_layout() {
    let app = test_app();
    send(&app, Method::GET, "/initialize", None).await;

    let (status, body) = send(&app, Method::GET, "/seats/rows", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[11]["row"], 11);
    assert_eq!(rows[11]["seats"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn uninitialized_inventory_has_nothing_to_book() {
    let app = test_app();
    let (_, body) = send(&app, Method::GET, "/seats", None).await;
    assert_eq!(ids(&body), Vec::<u64>::new());
    assert_eq!(book(&app, 1).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_requests_get_disjoint_seats() {
    let app = test_app();
    send(&app, Method::GET, "/initialize", None).await;

    // 20 запросов по 4 места — ровно весь вагон
    let handles: Vec<_> = (0..20)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { book(&app, 4).await })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        for id in ids(&body) {
            assert!(seen.insert(id), "seat {} sold twice", id);
        }
    }
    assert_eq!(seen.len(), 80);
    assert_eq!(book(&app, 1).await.0, StatusCode::BAD_REQUEST);
}
