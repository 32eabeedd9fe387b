use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::room::RoomRecord,
    services::{
        board::{BoardView, ROOM_NOT_FOUND},
        booking_form::bookable_rooms,
    },
    AppState,
};

/// GET /rooms
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomRecord>> {
    Json(state.board.borrow().rooms.clone())
}

/// GET /rooms/bookable — rooms the booking form may offer
pub async fn list_bookable_rooms(State(state): State<AppState>) -> Json<Vec<RoomRecord>> {
    let snapshot = state.board.borrow().clone();
    Json(bookable_rooms(&snapshot.rooms, &state.config.excluded_room_ids))
}

/// GET /rooms/{id} — one room with its grouped schedule
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let snapshot = state.board.borrow().clone();
    let Some(room) = snapshot.room(id) else {
        return Err((StatusCode::NOT_FOUND, Json(json!({ "error": ROOM_NOT_FOUND }))));
    };
    let view = BoardView {
        room_id: Some(id),
        date: None,
    };
    Ok(Json(json!({
        "room": room,
        "schedule": view.apply(&snapshot.groups),
    })))
}
