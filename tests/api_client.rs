mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

use common::{booking_json, client, spawn_stub};
use roombook::{error::ApiError, models::booking::CreateBookingRequest, services::poller::fetch_snapshot};

fn request() -> CreateBookingRequest {
    CreateBookingRequest {
        room_id: 5,
        user_id: Some(1),
        date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
        start_time: "09:00".into(),
        end_time: "10:30".into(),
        pic: "Rina".into(),
        email: "rina@example.com".into(),
        topic: "Weekly sync".into(),
    }
}

#[tokio::test]
async fn test_list_rooms() {
    let base = spawn_stub(Router::new().route(
        "/rooms",
        get(|| async {
            Json(json!([
                { "id": 1, "name": "Lobby", "capacity": 0 },
                { "id": 5, "name": "Borobudur", "capacity": 10, "is_active": false }
            ]))
        }),
    ))
    .await;

    let rooms = client(&base).list_rooms().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert!(rooms[0].is_active());
    assert!(!rooms[1].is_active());
}

#[tokio::test]
async fn test_list_bookings_flat() {
    let base = spawn_stub(Router::new().route(
        "/bookings",
        get(|| async {
            Json(json!([
                booking_json(1, 5, "2026-01-08"),
                booking_json(2, 6, "2026-01-09")
            ]))
        }),
    ))
    .await;

    let bookings = client(&base).list_bookings().await.unwrap();
    let ids: Vec<i64> = bookings.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(bookings[0].participants[0].name, "Budi");
}

#[tokio::test]
async fn test_list_bookings_tolerates_null_fields() {
    let base = spawn_stub(
        Router::new()
            .route("/rooms", get(|| async { Json(json!([{ "id": 5, "name": "Borobudur", "capacity": 10 }])) }))
            .route(
                "/bookings",
                get(|| async {
                    let mut no_email = booking_json(1, 5, "2026-01-08");
                    no_email["email"] = Value::Null;
                    let mut no_date = booking_json(2, 5, "2026-01-09");
                    no_date["date"] = Value::Null;
                    Json(json!([no_email, no_date]))
                }),
            ),
    )
    .await;
    let api = client(&base);

    let bookings = api.list_bookings().await.unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0].email, "");
    assert_eq!(bookings[1].date, "");

    let snapshot = fetch_snapshot(&api).await.unwrap();
    assert_eq!(snapshot.bookings.len(), 2);
    let scheduled: Vec<i64> = snapshot.groups[0].dates[0].schedules.iter().map(|b| b.id).collect();
    assert_eq!(snapshot.groups.len(), 1);
    assert_eq!(snapshot.groups[0].dates.len(), 1);
    assert_eq!(scheduled, vec![1]);
}

#[tokio::test]
async fn test_list_bookings_pre_grouped() {
    let base = spawn_stub(Router::new().route(
        "/bookings",
        get(|| async {
            Json(json!([{
                "month": "January 2026",
                "dates": [
                    { "date": "2026-01-08", "schedules": [booking_json(1, 5, "2026-01-08")] },
                    { "date": "2026-01-09", "schedules": [booking_json(2, 6, "2026-01-09")] }
                ]
            }]))
        }),
    ))
    .await;

    let bookings = client(&base).list_bookings().await.unwrap();
    assert_eq!(bookings.len(), 2);
}

#[tokio::test]
async fn test_list_bookings_for_room_filters_locally() {
    let base = spawn_stub(Router::new().route(
        "/bookings",
        get(|Query(params): Query<Value>| async move {
            assert_eq!(params["room_id"], "5");
            Json(json!([
                booking_json(1, 5, "2026-01-08"),
                booking_json(2, 6, "2026-01-08")
            ]))
        }),
    ))
    .await;

    let bookings = client(&base).list_bookings_for_room(5).await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].room_id, 5);
}

#[tokio::test]
async fn test_create_booking_created() {
    let base = spawn_stub(Router::new().route(
        "/bookings",
        axum::routing::post(|Json(body): Json<Value>| async move {
            assert_eq!(body["date"], "2026-01-08");
            assert_eq!(body["start_time"], "09:00");
            (StatusCode::CREATED, Json(booking_json(77, 5, "2026-01-08")))
        }),
    ))
    .await;

    let booking = client(&base).create_booking(&request()).await.unwrap();
    assert_eq!(booking.id, 77);
}

#[tokio::test]
async fn test_create_booking_envelope() {
    let base = spawn_stub(Router::new().route(
        "/bookings",
        axum::routing::post(|| async {
            (
                StatusCode::CREATED,
                Json(json!({
                    "statusCode": 201,
                    "message": "Booking created",
                    "data": { "bookings": [booking_json(78, 5, "2026-01-08")] }
                })),
            )
        }),
    ))
    .await;

    let booking = client(&base).create_booking(&request()).await.unwrap();
    assert_eq!(booking.id, 78);
}

#[tokio::test]
async fn test_create_booking_conflict_status() {
    let base = spawn_stub(Router::new().route(
        "/bookings",
        axum::routing::post(|| async {
            (
                StatusCode::CONFLICT,
                Json(json!({ "message": "Room already booked for this slot" })),
            )
        }),
    ))
    .await;

    let err = client(&base).create_booking(&request()).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.to_string(), "Slot unavailable: Room already booked for this slot");
}

#[tokio::test]
async fn test_create_booking_conflict_in_envelope() {
    let base = spawn_stub(Router::new().route(
        "/bookings",
        axum::routing::post(|| async { Json(json!({ "statusCode": 409, "message": "Overlap" })) }),
    ))
    .await;

    let err = client(&base).create_booking(&request()).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_create_booking_server_error_is_not_conflict() {
    let base = spawn_stub(Router::new().route(
        "/bookings",
        axum::routing::post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
    ))
    .await;

    match client(&base).create_booking(&request()).await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn test_cancel_booking() {
    let deleted = Arc::new(AtomicUsize::new(0));
    let counter = deleted.clone();
    let base = spawn_stub(Router::new().route(
        "/bookings/{id}",
        delete(move |Path(id): Path<i64>| {
            let counter = counter.clone();
            async move {
                if id == 7 {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::OK, Json(json!({ "message": "deleted" })))
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "message": "no such booking" })))
                }
            }
        }),
    ))
    .await;

    let api = client(&base);
    api.cancel_booking(7).await.unwrap();
    assert_eq!(deleted.load(Ordering::SeqCst), 1);
    assert!(matches!(api.cancel_booking(8).await, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_fetch_snapshot_is_all_or_nothing() {
    let base = spawn_stub(
        Router::new()
            .route("/rooms", get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }))
            .route(
                "/bookings",
                get(|| async { Json(json!([booking_json(1, 5, "2026-01-08")])) }),
            ),
    )
    .await;

    assert!(fetch_snapshot(&client(&base)).await.is_err());
}

#[tokio::test]
async fn test_fetch_snapshot_groups_bookings() {
    let base = spawn_stub(
        Router::new()
            .route(
                "/rooms",
                get(|| async { Json(json!([{ "id": 5, "name": "Borobudur", "capacity": 10 }])) }),
            )
            .route(
                "/bookings",
                get(|| async {
                    Json(json!([
                        booking_json(1, 5, "2026-01-08T09:00:00+07:00"),
                        booking_json(2, 5, "2026-01-08T14:00:00+07:00"),
                        booking_json(3, 6, "2026-02-01T10:00:00+07:00")
                    ]))
                }),
            ),
    )
    .await;

    let snapshot = fetch_snapshot(&client(&base)).await.unwrap();
    assert_eq!(snapshot.groups.len(), 2);
    assert_eq!(snapshot.groups[0].month, "January 2026");
    assert!(snapshot.fetched_at.is_some());
}
