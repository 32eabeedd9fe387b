//! Month → date hierarchy over a flat booking list, plus the room and day
//! filters the board renders from. Every function here is pure; inputs are
//! never mutated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::booking::{BookingRecord, DateGroup, MonthGroup};

/// Room selector. `All` is the "every room" sentinel and leaves a hierarchy untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoomFilter {
    #[default]
    All,
    Room(i64),
}

impl From<Option<i64>> for RoomFilter {
    fn from(room_id: Option<i64>) -> Self {
        room_id.map_or(RoomFilter::All, RoomFilter::Room)
    }
}

/// Result of a grouping pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingReport {
    pub groups: Vec<MonthGroup>,
    /// Ids of records whose `date` had no readable calendar day.
    pub skipped: Vec<i64>,
}

/// Label used both for display and as the month grouping key, e.g. "January 2026".
pub fn month_label(day: NaiveDate) -> String {
    day.format("%B %Y").to_string()
}

/// Groups records by month, then by calendar day.
///
/// Months and days appear in first-seen order, and schedules keep their input
/// order. Records with an unreadable `date` are left out and logged.
pub fn group_by_month_then_date(records: &[BookingRecord]) -> Vec<MonthGroup> {
    let report = group_with_report(records);
    for id in &report.skipped {
        tracing::warn!("Skipping booking {} with malformed date", id);
    }
    report.groups
}

/// Same as [`group_by_month_then_date`], but returns skipped ids instead of logging them.
pub fn group_with_report(records: &[BookingRecord]) -> GroupingReport {
    let mut groups: Vec<MonthGroup> = Vec::new();
    let mut skipped = Vec::new();

    for record in records {
        let Some(day) = record.calendar_day() else {
            skipped.push(record.id);
            continue;
        };
        let label = month_label(day);

        let month_idx = match groups.iter().position(|m| m.month == label) {
            Some(idx) => idx,
            None => {
                groups.push(MonthGroup {
                    month: label,
                    dates: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let month = &mut groups[month_idx];

        match month.dates.iter_mut().find(|d| d.date == day) {
            Some(date_group) => date_group.schedules.push(record.clone()),
            None => month.dates.push(DateGroup {
                date: day,
                schedules: vec![record.clone()],
            }),
        }
    }

    GroupingReport { groups, skipped }
}

/// Keeps only schedules held in the selected room, dropping days and months
/// left empty. An unknown room yields an empty hierarchy.
pub fn filter_by_room(groups: &[MonthGroup], filter: RoomFilter) -> Vec<MonthGroup> {
    let room_id = match filter {
        RoomFilter::All => return groups.to_vec(),
        RoomFilter::Room(id) => id,
    };
    retain_schedules(groups, |schedule, _| schedule.room_id == room_id)
}

/// Nested day filter: the month and date containing `day`, or nothing.
pub fn calendar_on(groups: &[MonthGroup], day: NaiveDate) -> Vec<MonthGroup> {
    retain_schedules(groups, |_, date| date == day)
}

/// Flat day filter: every schedule on `day`, in hierarchy order.
pub fn bookings_on(groups: &[MonthGroup], day: NaiveDate) -> Vec<BookingRecord> {
    groups
        .iter()
        .flat_map(|m| &m.dates)
        .filter(|d| d.date == day)
        .flat_map(|d| d.schedules.iter().cloned())
        .collect()
}

/// Flattens a hierarchy back into a record list in month, day, schedule order.
pub fn flatten(groups: &[MonthGroup]) -> Vec<BookingRecord> {
    groups
        .iter()
        .flat_map(|m| &m.dates)
        .flat_map(|d| d.schedules.iter().cloned())
        .collect()
}

pub fn count_schedules(groups: &[MonthGroup]) -> usize {
    groups
        .iter()
        .flat_map(|m| &m.dates)
        .map(|d| d.schedules.len())
        .sum()
}

fn retain_schedules<F>(groups: &[MonthGroup], keep: F) -> Vec<MonthGroup>
where
    F: Fn(&BookingRecord, NaiveDate) -> bool,
{
    groups
        .iter()
        .filter_map(|month| {
            let dates: Vec<DateGroup> = month
                .dates
                .iter()
                .filter_map(|date_group| {
                    let schedules: Vec<BookingRecord> = date_group
                        .schedules
                        .iter()
                        .filter(|s| keep(*s, date_group.date))
                        .cloned()
                        .collect();
                    (!schedules.is_empty()).then(|| DateGroup {
                        date: date_group.date,
                        schedules,
                    })
                })
                .collect();
            (!dates.is_empty()).then(|| MonthGroup {
                month: month.month.clone(),
                dates,
            })
        })
        .collect()
}
