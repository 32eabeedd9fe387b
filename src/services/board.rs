use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{
        booking::{BookingRecord, MonthGroup},
        room::RoomRecord,
    },
    services::grouping::{self, RoomFilter},
};

pub const ROOM_NOT_FOUND: &str = "Room not found";

/// One successful refresh of rooms and bookings. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub rooms: Vec<RoomRecord>,
    pub bookings: Vec<BookingRecord>,
    pub groups: Vec<MonthGroup>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl BoardSnapshot {
    pub fn new(rooms: Vec<RoomRecord>, bookings: Vec<BookingRecord>) -> Self {
        let groups = grouping::group_by_month_then_date(&bookings);
        Self {
            rooms,
            bookings,
            groups,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn room(&self, id: i64) -> Option<&RoomRecord> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Display name for a room id, falling back to [`ROOM_NOT_FOUND`].
    pub fn room_name(&self, id: i64) -> &str {
        self.room(id).map_or(ROOM_NOT_FOUND, |r| r.name.as_str())
    }

    pub fn booking(&self, id: i64) -> Option<&BookingRecord> {
        self.bookings.iter().find(|b| b.id == id)
    }
}

/// Selected room and day of a board view. Owned by whoever renders it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BoardView {
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl BoardView {
    pub fn room_filter(&self) -> RoomFilter {
        RoomFilter::from(self.room_id)
    }

    /// The hierarchy this view shows: room filter first, then the nested day filter.
    pub fn apply(&self, groups: &[MonthGroup]) -> Vec<MonthGroup> {
        let by_room = grouping::filter_by_room(groups, self.room_filter());
        match self.date {
            Some(day) => grouping::calendar_on(&by_room, day),
            None => by_room,
        }
    }

    /// Flat list of the view's room on `day`.
    pub fn day_list(&self, groups: &[MonthGroup], day: NaiveDate) -> Vec<BookingRecord> {
        let by_room = grouping::filter_by_room(groups, self.room_filter());
        grouping::bookings_on(&by_room, day)
    }
}
