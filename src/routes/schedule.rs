use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::{
    models::booking::{BookingRecord, MonthGroup},
    services::board::BoardView,
    AppState,
};

/// GET /schedule?room_id=&date=YYYY-MM-DD
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(view): Query<BoardView>,
) -> Json<Vec<MonthGroup>> {
    let snapshot = state.board.borrow().clone();
    Json(view.apply(&snapshot.groups))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub room_id: Option<i64>,
    /// Defaults to today, local time.
    pub date: Option<NaiveDate>,
}

/// GET /schedule/day?room_id=&date=YYYY-MM-DD — flat list for one day
pub async fn get_day(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Json<Vec<BookingRecord>> {
    let snapshot = state.board.borrow().clone();
    let day = query.date.unwrap_or_else(|| Local::now().date_naive());
    let view = BoardView {
        room_id: query.room_id,
        date: None,
    };
    Json(view.day_list(&snapshot.groups, day))
}
