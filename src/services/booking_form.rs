use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{
    error::FormError,
    models::{booking::CreateBookingRequest, room::RoomRecord},
};

/// Default meeting length used when no end time is given.
pub const DEFAULT_DURATION_MINUTES: i64 = 90;

/// Booking form as filled in by a user. Everything is raw input until `validate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub room_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub pic: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub topic: String,
}

impl BookingDraft {
    /// Checks required fields and formats, producing the request body.
    ///
    /// An empty end time becomes start + [`DEFAULT_DURATION_MINUTES`].
    pub fn validate(&self) -> Result<CreateBookingRequest, FormError> {
        let start = self.start_time.trim();
        let end = match self.end_time.trim() {
            "" => default_end_time(start).unwrap_or_default(),
            given => given.to_string(),
        };

        let mut missing = Vec::new();
        if self.room_id.is_none() {
            missing.push("room");
        }
        if self.date.trim().is_empty() {
            missing.push("date");
        }
        if start.is_empty() {
            missing.push("start_time");
        }
        if end.is_empty() && start.is_empty() {
            missing.push("end_time");
        }
        if self.pic.trim().is_empty() {
            missing.push("pic");
        }
        if self.topic.trim().is_empty() {
            missing.push("topic");
        }
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(self.date.clone()))?;
        let start_at = parse_time(start)?;
        let end_at = parse_time(&end)?;
        if end_at <= start_at {
            return Err(FormError::EndBeforeStart {
                start: start.to_string(),
                end,
            });
        }

        Ok(CreateBookingRequest {
            room_id: self.room_id.unwrap_or_default(),
            user_id: self.user_id,
            date,
            start_time: start_at.format("%H:%M").to_string(),
            end_time: end_at.format("%H:%M").to_string(),
            pic: self.pic.trim().to_string(),
            email: self.email.trim().to_string(),
            topic: self.topic.trim().to_string(),
        })
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, FormError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| FormError::InvalidTime(value.to_string()))
}

/// Start + 90 minutes as `HH:MM`, wrapping past midnight. `None` for an unreadable start.
pub fn default_end_time(start: &str) -> Option<String> {
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()?;
    let (end, _) = start.overflowing_add_signed(Duration::minutes(DEFAULT_DURATION_MINUTES));
    Some(end.format("%H:%M").to_string())
}

/// Rooms that may be offered in the booking form.
pub fn bookable_rooms(rooms: &[RoomRecord], excluded: &[i64]) -> Vec<RoomRecord> {
    rooms
        .iter()
        .filter(|r| r.is_active() && !excluded.contains(&r.id))
        .cloned()
        .collect()
}
