//! Shared test helper functions for constructing fixtures.
//!
//! Compiled only in test builds. Integration tests in
//! `crates/itingraph-core/tests/` define their own local helpers because they
//! link against the non-test library build where this module is absent.
#![allow(clippy::expect_used)]

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::flight::FlightRecord;
use crate::newtypes::CalendarDate;
use crate::structures::{DateRange, GraphEdge};

/// Parses a calendar date string, panicking on invalid input (test-only).
pub fn date(s: &str) -> CalendarDate {
    CalendarDate::try_from(s).expect("valid CalendarDate")
}

/// Parses `YYYY-MM-DDTHH:MM:SS`, panicking on invalid input (test-only).
pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").expect("valid timestamp")
}

/// Start of `day` (00:00:00).
pub fn day_start(day: &str) -> NaiveDateTime {
    date(day).naive().and_time(NaiveTime::MIN)
}

/// End of `day` as the normalizer computes it (23:59:00).
pub fn day_end(day: &str) -> NaiveDateTime {
    day_start(day) + TimeDelta::minutes(23 * 60 + 59)
}

/// A flight departing at the start of `dep_day` and arriving at the end of
/// `arr_day`, matching what the normalizer produces for a date range.
pub fn flight(id: &str, source: &str, target: &str, dep_day: &str, arr_day: &str) -> FlightRecord {
    FlightRecord::new(id, source, target, day_start(dep_day), day_end(arr_day))
}

/// A flight with explicit timestamps.
pub fn flight_at(id: &str, source: &str, target: &str, dep: &str, arr: &str) -> FlightRecord {
    FlightRecord::new(id, source, target, ts(dep), ts(arr))
}

/// An editor edge with a date range.
pub fn edge(id: &str, source: &str, target: &str, start: &str, end: &str) -> GraphEdge {
    GraphEdge::new(id, source, target, DateRange::new(date(start), date(end)))
}
