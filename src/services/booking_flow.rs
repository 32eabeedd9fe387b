//! Confirmation dialog for creating a booking:
//! `Idle -> AwaitingConfirmation -> Submitting -> Success | Conflict | Failed`.
//!
//! The machine never performs I/O itself; `confirm` hands back the request to
//! send and `finish` consumes the API result. `submit_with` wires both to an
//! [`ApiClient`] for callers that don't need the split.

use reqwest::Url;
use serde::Serialize;

use crate::{
    error::{ApiError, FlowError, FormError},
    models::booking::{BookingRecord, CreateBookingRequest},
    services::{api::ApiClient, booking_form::BookingDraft},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingBooking {
    pub request: CreateBookingRequest,
    pub room_name: String,
}

/// What the success dialog shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmationNotice {
    pub booking_id: Option<i64>,
    pub room_name: String,
    pub summary: String,
    /// Pre-filled WhatsApp message to the receptionist, when a number is configured.
    pub receptionist_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Idle,
    InvalidForm(FormError),
    AwaitingConfirmation(PendingBooking),
    Submitting(PendingBooking),
    Success(ConfirmationNotice),
    Conflict,
    Failed(String),
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::InvalidForm(_) => "showing an invalid form",
            FlowState::AwaitingConfirmation(_) => "awaiting confirmation",
            FlowState::Submitting(_) => "submitting",
            FlowState::Success(_) => "showing success",
            FlowState::Conflict => "showing a conflict",
            FlowState::Failed(_) => "showing an error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowState::Success(_) | FlowState::Conflict | FlowState::Failed(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    state: FlowState,
    receptionist_phone: Option<String>,
}

impl BookingFlow {
    pub fn new(receptionist_phone: Option<String>) -> Self {
        Self {
            state: FlowState::Idle,
            receptionist_phone,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Validates the draft and either asks for confirmation or reports the invalid form.
    pub fn submit(&mut self, draft: &BookingDraft, room_name: &str) -> Result<&FlowState, FlowError> {
        match self.state {
            FlowState::Idle | FlowState::InvalidForm(_) => {}
            _ => return Err(self.invalid("submit")),
        }
        self.state = match draft.validate() {
            Ok(request) => FlowState::AwaitingConfirmation(PendingBooking {
                request,
                room_name: room_name.to_string(),
            }),
            Err(e) => FlowState::InvalidForm(e),
        };
        Ok(&self.state)
    }

    /// "Check again": back to editing without sending anything.
    pub fn revise(&mut self) -> Result<(), FlowError> {
        match self.state {
            FlowState::AwaitingConfirmation(_) => {
                self.state = FlowState::Idle;
                Ok(())
            }
            _ => Err(self.invalid("revise")),
        }
    }

    /// Moves to `Submitting` and returns the request the caller must send.
    pub fn confirm(&mut self) -> Result<CreateBookingRequest, FlowError> {
        let pending = match &self.state {
            FlowState::AwaitingConfirmation(pending) => pending.clone(),
            _ => return Err(self.invalid("confirm")),
        };
        let request = pending.request.clone();
        self.state = FlowState::Submitting(pending);
        Ok(request)
    }

    /// Records the API outcome of the submitted request.
    pub fn finish(&mut self, result: Result<BookingRecord, ApiError>) -> Result<&FlowState, FlowError> {
        let pending = match &self.state {
            FlowState::Submitting(pending) => pending.clone(),
            _ => return Err(self.invalid("finish")),
        };
        self.state = match result {
            Ok(booking) => FlowState::Success(self.notice(&pending, Some(booking.id))),
            Err(ApiError::Conflict(message)) => {
                tracing::info!("Room {} unavailable: {}", pending.request.room_id, message);
                FlowState::Conflict
            }
            Err(e) => {
                tracing::error!("Booking failed: {}", e);
                FlowState::Failed(e.to_string())
            }
        };
        Ok(&self.state)
    }

    /// Confirms and sends through `api` in one step.
    pub async fn submit_with(&mut self, api: &ApiClient) -> Result<&FlowState, FlowError> {
        let request = self.confirm()?;
        let result = api.create_booking(&request).await;
        self.finish(result)
    }

    /// Dismisses a result or invalid-form dialog.
    pub fn reset(&mut self) -> Result<(), FlowError> {
        if self.state.is_terminal() || matches!(self.state, FlowState::InvalidForm(_)) {
            self.state = FlowState::Idle;
            Ok(())
        } else {
            Err(self.invalid("reset"))
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    fn notice(&self, pending: &PendingBooking, booking_id: Option<i64>) -> ConfirmationNotice {
        let req = &pending.request;
        let summary = format!(
            "Reservation for {} on {} from {} to {} is confirmed. Please pass these details to the receptionist.",
            pending.room_name, req.date, req.start_time, req.end_time
        );
        ConfirmationNotice {
            booking_id,
            room_name: pending.room_name.clone(),
            summary,
            receptionist_link: self
                .receptionist_phone
                .as_deref()
                .and_then(|phone| receptionist_link(phone, pending)),
        }
    }
}

fn receptionist_link(phone: &str, pending: &PendingBooking) -> Option<String> {
    let text = format!(
        "Hello!\n\nI just reserved a meeting room for:\n*{}*\n*{}*\n*{}*\n*{}*",
        pending.room_name, pending.request.date, pending.request.start_time, pending.request.end_time
    );
    let base = format!("https://wa.me/{}", phone.trim_start_matches('+'));
    Url::parse_with_params(&base, &[("text", text)])
        .map(String::from)
        .ok()
}
