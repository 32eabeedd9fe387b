use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One reservation as returned by the booking API.
///
/// `date`, `start_time` and `end_time` are kept exactly as the API sent them.
/// The calendar day is derived on demand so that one malformed record cannot
/// fail the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: i64,
    pub room_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl BookingRecord {
    /// Calendar day taken from the date portion of `date`, ignoring any time
    /// or offset that follows it.
    pub fn calendar_day(&self) -> Option<NaiveDate> {
        let day = self.date.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Reads `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keeps strings as-is; `null` and non-string values become `""`, which no
/// calendar day or time parses from.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// All schedules of a single calendar day, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub schedules: Vec<BookingRecord>,
}

/// Days of one month, labelled like "January 2026".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthGroup {
    pub month: String,
    pub dates: Vec<DateGroup>,
}

/// Body for POST /bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub date: NaiveDate,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub pic: String,
    #[serde(default)]
    pub email: String,
    pub topic: String,
}

/// Status envelope some API deployments wrap their responses in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<EnvelopeData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeData {
    #[serde(default)]
    pub bookings: Vec<BookingRecord>,
}

/// Every shape `GET /bookings` is known to answer with.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BookingsPayload {
    Flat(Vec<BookingRecord>),
    ByMonth(Vec<MonthGroup>),
    ByDate(Vec<DateGroup>),
    Envelope(BookingEnvelope),
}

impl BookingsPayload {
    /// Flattens any shape back into the record list, preserving order.
    pub fn into_records(self) -> Vec<BookingRecord> {
        match self {
            BookingsPayload::Flat(records) => records,
            BookingsPayload::ByMonth(months) => months
                .into_iter()
                .flat_map(|m| m.dates)
                .flat_map(|d| d.schedules)
                .collect(),
            BookingsPayload::ByDate(days) => days.into_iter().flat_map(|d| d.schedules).collect(),
            BookingsPayload::Envelope(envelope) => envelope
                .data
                .map(|data| data.bookings)
                .unwrap_or_default(),
        }
    }
}

/// Renders a start/end value as `HH:MM`.
///
/// Accepts plain times (`09:00`, `09:00:00`) and ISO datetimes
/// (`2026-01-08T09:00:00+07:00`). Anything else is returned unchanged.
pub fn display_time(value: &str) -> String {
    let time = match value.find('T') {
        Some(idx) => &value[idx + 1..],
        None => value,
    };
    match time.get(..5) {
        Some(hhmm) if hhmm.as_bytes()[2] == b':' => hhmm.to_string(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(date: &str) -> BookingRecord {
        serde_json::from_value(json!({
            "id": 1,
            "room_id": 5,
            "date": date,
            "start_time": "09:00",
            "end_time": "10:30",
        }))
        .unwrap()
    }

    #[test]
    fn test_calendar_day_ignores_time_and_offset() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        assert_eq!(record("2026-01-08").calendar_day(), Some(day));
        assert_eq!(record("2026-01-08T23:30:00-05:00").calendar_day(), Some(day));
        assert_eq!(record("2026-01-08T00:00:00.000Z").calendar_day(), Some(day));
    }

    #[test]
    fn test_calendar_day_malformed() {
        assert_eq!(record("").calendar_day(), None);
        assert_eq!(record("08/01/2026").calendar_day(), None);
        assert_eq!(record("2026-13-01").calendar_day(), None);
    }

    #[test]
    fn test_optional_fields_default() {
        let r = record("2026-01-08");
        assert!(r.participants.is_empty());
        assert_eq!(r.email, "");
        assert_eq!(r.user_id, None);
    }

    #[test]
    fn test_null_fields_do_not_fail_the_list() {
        let payload: BookingsPayload = serde_json::from_value(json!([
            { "id": 1, "room_id": 5, "date": "2026-01-08", "start_time": "09:00", "end_time": "10:30" },
            {
                "id": 2, "room_id": 5, "date": null, "start_time": null, "end_time": 1030,
                "pic": null, "email": null, "topic": null, "status": null, "participants": null
            },
            { "id": 3, "room_id": 6 }
        ]))
        .unwrap();
        let records = payload.into_records();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].email, "");
        assert_eq!(records[1].end_time, "");
        assert!(records[1].participants.is_empty());
        assert_eq!(records[1].calendar_day(), None);
        assert_eq!(records[2].calendar_day(), None);
    }

    #[test]
    fn test_display_time() {
        assert_eq!(display_time("09:00:00"), "09:00");
        assert_eq!(display_time("14:30"), "14:30");
        assert_eq!(display_time("2026-01-08T09:15:00+07:00"), "09:15");
        assert_eq!(display_time("soon"), "soon");
    }

    #[test]
    fn test_payload_envelope() {
        let payload: BookingsPayload = serde_json::from_value(json!({
            "statusCode": 200,
            "data": { "bookings": [record("2026-01-08")] }
        }))
        .unwrap();
        assert_eq!(payload.into_records().len(), 1);
    }

    #[test]
    fn test_payload_nested_by_month() {
        let payload: BookingsPayload = serde_json::from_value(json!([{
            "month": "January 2026",
            "dates": [
                { "date": "2026-01-08", "schedules": [record("2026-01-08"), record("2026-01-08")] },
                { "date": "2026-01-09", "schedules": [record("2026-01-09")] }
            ]
        }]))
        .unwrap();
        assert!(matches!(payload, BookingsPayload::ByMonth(_)));
        assert_eq!(payload.into_records().len(), 3);
    }

    #[test]
    fn test_payload_nested_by_date() {
        let payload: BookingsPayload = serde_json::from_value(json!([
            { "date": "2026-01-08", "schedules": [record("2026-01-08")] }
        ]))
        .unwrap();
        assert!(matches!(payload, BookingsPayload::ByDate(_)));
        assert_eq!(payload.into_records()[0].id, 1);
    }
}
