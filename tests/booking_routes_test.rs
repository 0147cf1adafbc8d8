mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use common::{get, post_json, send, test_app};
use gym_be::store::BookingStore;

fn ali_program_booking() -> serde_json::Value {
    json!({
        "type": "program",
        "name": "Ali",
        "email": "ali@x.com",
        "phone": "03001234567",
        "programName": "Cardio Training"
    })
}

#[tokio::test]
async fn test_program_booking_then_duplicate() {
    let (router, store) = test_app(false);
    let program = store.add_program("Cardio Training", 8, 4500).await;

    let first = post_json(&router, "/api/book", ali_program_booking()).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["success"], true);
    assert_eq!(first.body["data"]["status"], "pending");
    assert!(first.body["data"]["id"].is_string());
    assert!(first.body["data"]["createdAt"].is_string());

    let second = post_json(&router, "/api/book", ali_program_booking()).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["success"], false);
    assert!(second.body["message"]
        .as_str()
        .unwrap()
        .starts_with("A booking for this selection already exists"));

    let bookings = store.list_bookings().await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].program_id, Some(program.id));
}

#[tokio::test]
async fn test_new_email_creates_user_referenced_by_booking() {
    let (router, store) = test_app(false);

    let response = post_json(&router, "/api/book", ali_program_booking()).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let users = store.users().await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "ali@x.com");

    let bookings = store.list_bookings().await.unwrap();
    assert_eq!(bookings[0].user_id, users[0].id);
}

#[tokio::test]
async fn test_existing_email_overwrites_name_and_phone() {
    let (router, store) = test_app(false);
    store.add_trainer("Sara", Some("Boxing")).await;

    post_json(&router, "/api/book", ali_program_booking()).await;
    let response = post_json(
        &router,
        "/api/book",
        json!({
            "type": "trainer",
            "name": "Ali Raza",
            "email": "ali@x.com",
            "phone": "03111111111",
            "trainerName": "Sara"
        }),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let users = store.users().await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Ali Raza");
    assert_eq!(users[0].phone.as_deref(), Some("03111111111"));
}

#[tokio::test]
async fn test_unknown_program_books_without_target() {
    let (router, store) = test_app(false);

    let mut body = ali_program_booking();
    body["programName"] = json!("Underwater Zumba");
    let response = post_json(&router, "/api/book", body).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let bookings = store.list_bookings().await.unwrap();
    assert_eq!(bookings[0].program_id, None);
}

#[tokio::test]
async fn test_unknown_type_books_without_target() {
    let (router, store) = test_app(false);
    store.add_program("Cardio Training", 8, 4500).await;

    let mut body = ali_program_booking();
    body["type"] = json!("class");
    let response = post_json(&router, "/api/book", body).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["status"], "pending");

    let bookings = store.list_bookings().await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert!(bookings[0].targets().is_empty());
}

#[tokio::test]
async fn test_padded_program_name_is_not_matched() {
    let (router, store) = test_app(false);
    store.add_program("Cardio Training", 8, 4500).await;

    let mut body = ali_program_booking();
    body["programName"] = json!(" Cardio Training ");
    let response = post_json(&router, "/api/book", body).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let bookings = store.list_bookings().await.unwrap();
    assert_eq!(bookings[0].program_id, None);
}

#[tokio::test]
async fn test_cancelled_booking_releases_slot() {
    let (router, store) = test_app(false);
    store.add_program("Cardio Training", 8, 4500).await;

    let first = post_json(&router, "/api/book", ali_program_booking()).await;
    let id = first.body["data"]["id"].as_str().unwrap().to_string();

    let cancel = send(
        &router,
        Method::PATCH,
        &format!("/api/book/{id}/status"),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(cancel.status, StatusCode::OK);
    assert_eq!(cancel.body["data"]["status"], "cancelled");

    let again = post_json(&router, "/api/book", ali_program_booking()).await;
    assert_eq!(again.status, StatusCode::CREATED);
    assert_eq!(store.list_bookings().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_date_defaults_to_tomorrow() {
    let (router, store) = test_app(false);

    let before = Utc::now();
    post_json(&router, "/api/book", ali_program_booking()).await;
    let after = Utc::now();

    let booking = &store.list_bookings().await.unwrap()[0];
    assert!(booking.preferred_date >= before + Duration::hours(24));
    assert!(booking.preferred_date <= after + Duration::hours(24));
    assert_eq!(booking.preferred_time, "Any");
}

#[tokio::test]
async fn test_explicit_schedule_is_stored() {
    let (router, store) = test_app(false);

    let mut body = ali_program_booking();
    body["preferredDate"] = json!("2030-01-05T09:00:00Z");
    body["preferredTime"] = json!("Morning");
    body["alternativeTime"] = json!("Evening");
    post_json(&router, "/api/book", body).await;

    let booking = &store.list_bookings().await.unwrap()[0];
    let expected: DateTime<Utc> = "2030-01-05T09:00:00Z".parse().unwrap();
    assert_eq!(booking.preferred_date, expected);
    assert_eq!(booking.preferred_time, "Morning");
    assert_eq!(booking.alternative_time.as_deref(), Some("Evening"));
}

#[tokio::test]
async fn test_missing_name_and_email_is_bad_request() {
    let (router, store) = test_app(false);

    let response = post_json(&router, "/api/book", json!({ "type": "program", "name": "  " })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Name and email are required");
    assert_eq!(response.body["fields"], json!(["name", "email"]));
    assert!(store.users().await.is_empty());
}

#[tokio::test]
async fn test_invalid_date_is_bad_request() {
    let (router, store) = test_app(false);

    let mut body = ali_program_booking();
    body["preferredDate"] = json!("someday");
    let response = post_json(&router, "/api/book", body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(store.list_bookings().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let (router, _store) = test_app(false);

    let response = post_json(&router, "/api/book", json!(["not", "an", "object"])).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_list_bookings_and_programs() {
    let (router, store) = test_app(false);
    store.add_program("Cardio Training", 8, 4500).await;
    post_json(&router, "/api/book", ali_program_booking()).await;

    let bookings = get(&router, "/api/book").await;
    assert_eq!(bookings.status, StatusCode::OK);
    assert_eq!(bookings.body["total"], 1);
    assert_eq!(bookings.body["data"][0]["status"], "pending");

    let programs = get(&router, "/api/book/programs").await;
    assert_eq!(programs.status, StatusCode::OK);
    assert_eq!(programs.body["data"][0]["name"], "Cardio Training");
    assert_eq!(programs.body["data"][0]["duration"], "8 weeks");
}

#[tokio::test]
async fn test_status_update_errors() {
    let (router, _store) = test_app(false);

    let bad_id = send(
        &router,
        Method::PATCH,
        "/api/book/not-a-uuid/status",
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);

    let unknown = send(
        &router,
        Method::PATCH,
        &format!("/api/book/{}/status", uuid::Uuid::new_v4()),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let bad_status = send(
        &router,
        Method::PATCH,
        &format!("/api/book/{}/status", uuid::Uuid::new_v4()),
        Some(json!({ "status": "archived" })),
    )
    .await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);
}
