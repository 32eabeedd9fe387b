use serde::Serialize;

use crate::{
    error::ApiError,
    models::booking::BookingRecord,
    services::api::ApiClient,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOutcome {
    Cancelled,
    EmailMismatch,
}

/// Whether `entered` may cancel `booking`: the booking's own email, or any override address.
/// Comparison is trimmed and case-insensitive.
pub fn may_cancel(booking: &BookingRecord, entered: &str, overrides: &[String]) -> bool {
    let entered = entered.trim();
    if entered.is_empty() {
        return false;
    }
    let matches = |candidate: &str| candidate.trim().eq_ignore_ascii_case(entered);
    matches(booking.email.as_str()) || overrides.iter().any(|o| matches(o.as_str()))
}

/// Cancels `booking` once the entered email checks out. A mismatch never reaches the API.
pub async fn cancel_with_email(
    api: &ApiClient,
    booking: &BookingRecord,
    entered: &str,
    overrides: &[String],
) -> Result<CancelOutcome, ApiError> {
    if !may_cancel(booking, entered, overrides) {
        tracing::info!("Cancel of booking {} refused: email does not match", booking.id);
        return Ok(CancelOutcome::EmailMismatch);
    }
    api.cancel_booking(booking.id).await?;
    Ok(CancelOutcome::Cancelled)
}
