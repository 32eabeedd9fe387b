use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{ApiError, FlowError, FormError},
    services::{
        booking_flow::{BookingFlow, FlowState},
        booking_form::{bookable_rooms, BookingDraft},
        cancellation::{cancel_with_email, CancelOutcome},
    },
    AppState,
};

type HandlerError = (StatusCode, Json<Value>);

fn flow_error(e: FlowError) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

/// POST /bookings — validate, then forward to the booking API.
/// Sending the request is the confirmation; the dialog lives in the front-end.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(draft): Json<BookingDraft>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    let room_name = {
        let snapshot = state.board.borrow();
        match draft.room_id {
            Some(id) => {
                let bookable = bookable_rooms(&snapshot.rooms, &state.config.excluded_room_ids);
                if !bookable.iter().any(|room| room.id == id) {
                    return Err((
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({
                            "error": format!("Room {id} is not available for booking"),
                            "fields": ["room_id"],
                        })),
                    ));
                }
                snapshot.room_name(id).to_string()
            }
            None => String::new(),
        }
    };

    let mut flow = BookingFlow::new(state.config.receptionist_phone.clone());
    if let FlowState::InvalidForm(e) = flow.submit(&draft, &room_name).map_err(flow_error)? {
        let fields = match e {
            FormError::MissingFields(fields) => fields.clone(),
            _ => Vec::new(),
        };
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string(), "fields": fields })),
        ));
    }

    match flow.submit_with(&state.api).await.map_err(flow_error)? {
        FlowState::Success(notice) => Ok((StatusCode::CREATED, Json(json!(notice)))),
        FlowState::Conflict => Err((
            StatusCode::CONFLICT,
            Json(json!({ "error": "slot unavailable" })),
        )),
        FlowState::Failed(message) => Err((
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": message })),
        )),
        other => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("unexpected state: {}", other.name()) })),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub email: String,
}

/// DELETE /bookings/{id} — only the booking's owner (or an override address) may cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<Value>, HandlerError> {
    let booking = state.board.borrow().booking(id).cloned();
    let Some(booking) = booking else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Booking not found" })),
        ));
    };

    match cancel_with_email(
        &state.api,
        &booking,
        &body.email,
        &state.config.cancel_override_emails,
    )
    .await
    {
        Ok(CancelOutcome::Cancelled) => Ok(Json(json!({ "status": "cancelled", "id": id }))),
        Ok(CancelOutcome::EmailMismatch) => Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Email does not match" })),
        )),
        Err(ApiError::NotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Booking not found" })),
        )),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}
