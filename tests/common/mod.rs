#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use serde_json::{json, Value};
use tokio::sync::watch;

use roombook::{
    config::Config,
    models::{booking::BookingRecord, room::RoomRecord},
    services::{api::ApiClient, board::BoardSnapshot},
    AppState,
};

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&Config::for_api(base_url)).unwrap()
}

pub fn booking_json(id: i64, room_id: i64, date: &str) -> Value {
    json!({
        "id": id,
        "room_id": room_id,
        "user_id": 1,
        "date": date,
        "start_time": "09:00:00",
        "end_time": "10:30:00",
        "pic": "Rina",
        "email": "rina@example.com",
        "topic": "Weekly sync",
        "status": "booked",
        "participants": [
            { "id": 1, "email": "budi@example.com", "name": "Budi", "status": "invited" }
        ]
    })
}

pub fn booking(id: i64, room_id: i64, date: &str) -> BookingRecord {
    serde_json::from_value(booking_json(id, room_id, date)).unwrap()
}

pub fn room(id: i64, name: &str) -> RoomRecord {
    RoomRecord {
        id,
        name: name.into(),
        capacity: 8,
        is_active: Some(true),
        created_at: None,
        updated_at: None,
    }
}

/// The three-booking example: two in room 5 on 8 January, one in room 6 on 1 February.
pub fn sample_bookings() -> Vec<BookingRecord> {
    vec![
        booking(1, 5, "2026-01-08T09:00:00+07:00"),
        booking(2, 5, "2026-01-08T14:00:00+07:00"),
        booking(3, 6, "2026-02-01T10:00:00+07:00"),
    ]
}

pub fn board_state(api_base: &str, snapshot: BoardSnapshot, config: Config) -> AppState {
    // The receiver keeps serving the last value after the sender is gone.
    let (_tx, rx) = watch::channel(Arc::new(snapshot));
    AppState {
        api: client(api_base),
        board: rx,
        config: Arc::new(config),
    }
}
