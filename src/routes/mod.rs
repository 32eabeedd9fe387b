pub mod bookings;
pub mod health;
pub mod rooms;
pub mod schedule;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Board API consumed by the presentation layer.
pub fn router(state: AppState) -> Router {
    // Only local front-ends render the board.
    let cors_origin = AllowOrigin::predicate(|origin: &HeaderValue, _| {
        origin
            .to_str()
            .map(|o| o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1"))
            .unwrap_or(false)
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_origin(cors_origin);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/bookable", get(rooms::list_bookable_rooms))
        .route("/rooms/{id}", get(rooms::get_room))
        .route("/schedule", get(schedule::get_schedule))
        .route("/schedule/day", get(schedule::get_day))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/{id}", delete(bookings::cancel_booking))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
