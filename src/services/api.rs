use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::{
    config::Config,
    error::ApiError,
    models::{
        booking::{BookingEnvelope, BookingRecord, BookingsPayload, CreateBookingRequest},
        room::RoomRecord,
    },
};

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for the remote booking API. Conflict detection, persistence and
/// authentication all happen on the server; this only moves records.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub client: Client,
    pub base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_rooms(&self) -> ApiResult<Vec<RoomRecord>> {
        let response = self.client.get(self.url("/rooms")).send().await?;
        let rooms = check(response).await?.json::<Vec<RoomRecord>>().await?;
        tracing::debug!("Fetched {} rooms", rooms.len());
        Ok(rooms)
    }

    /// Fetches every booking, flattening whichever shape the server answered with.
    pub async fn list_bookings(&self) -> ApiResult<Vec<BookingRecord>> {
        let response = self.client.get(self.url("/bookings")).send().await?;
        let payload = check(response).await?.json::<BookingsPayload>().await?;
        let records = payload.into_records();
        tracing::debug!("Fetched {} bookings", records.len());
        Ok(records)
    }

    pub async fn list_bookings_for_room(&self, room_id: i64) -> ApiResult<Vec<BookingRecord>> {
        let response = self
            .client
            .get(self.url("/bookings"))
            .query(&[("room_id", room_id)])
            .send()
            .await?;
        let payload = check(response).await?.json::<BookingsPayload>().await?;
        // The parameter is advisory on some deployments.
        let mut records = payload.into_records();
        records.retain(|r| r.room_id == room_id);
        Ok(records)
    }

    /// Submits a booking. An overlapping slot comes back as [`ApiError::Conflict`].
    pub async fn create_booking(&self, req: &CreateBookingRequest) -> ApiResult<BookingRecord> {
        let response = self
            .client
            .post(self.url("/bookings"))
            .json(req)
            .send()
            .await?;
        let body: Value = check(response).await?.json().await?;

        if body.get("statusCode").is_some() {
            let envelope: BookingEnvelope = serde_json::from_value(body)?;
            let message = envelope.message.clone().unwrap_or_default();
            return match envelope.status_code {
                409 => Err(ApiError::Conflict(message)),
                code if code >= 400 => Err(ApiError::Status {
                    status: code,
                    message,
                }),
                _ => envelope
                    .data
                    .and_then(|data| data.bookings.into_iter().next())
                    .ok_or_else(|| {
                        ApiError::UnexpectedResponse("booking missing from response".into())
                    }),
            };
        }

        let booking: BookingRecord = serde_json::from_value(body)?;
        tracing::info!("Booking {} created for room {}", booking.id, booking.room_id);
        Ok(booking)
    }

    pub async fn cancel_booking(&self, id: i64) -> ApiResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/bookings/{}", id)))
            .send()
            .await?;
        check(response).await?;
        tracing::info!("Booking {} cancelled", id);
        Ok(())
    }
}

/// Maps non-success statuses onto [`ApiError`], passing successful responses through.
async fn check(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_message(&text);
    tracing::warn!("API error {}: {}", status, message);

    Err(match status {
        StatusCode::CONFLICT => ApiError::Conflict(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

/// Prefers a `message` or `error` field from a JSON body over the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
