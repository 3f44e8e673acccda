/// Time-respecting check for flight sequences.
///
/// A sequence is time-respecting when every leg departs strictly after the
/// previous leg arrives. Only adjacent legs are compared: the last arrival is
/// never compared back to the first departure.
use chrono::NaiveDateTime;

use crate::flight::FlightRecord;

/// Returns `true` if `flights` can be flown in order.
///
/// An empty sequence is trivially time-respecting.
pub fn is_time_respecting(flights: &[FlightRecord]) -> bool {
    first_violation(flights).is_none()
}

/// Returns the position of the first leg whose departure is at or before the
/// previous leg's arrival, or `None` if the sequence is time-respecting.
///
/// The returned index is always at least 1.
pub fn first_violation(flights: &[FlightRecord]) -> Option<usize> {
    let mut current_arrival: Option<NaiveDateTime> = None;
    for (index, flight) in flights.iter().enumerate() {
        if current_arrival.is_some_and(|arrival| flight.departure <= arrival) {
            return Some(index);
        }
        current_arrival = Some(flight.arrival);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{flight, flight_at};

    #[test]
    fn empty_sequence_is_time_respecting() {
        assert!(is_time_respecting(&[]));
        assert_eq!(first_violation(&[]), None);
    }

    #[test]
    fn single_leg_is_time_respecting_even_when_instantaneous() {
        let f = flight_at("e1", "A", "A", "2024-01-01T10:00:00", "2024-01-01T10:00:00");
        assert!(is_time_respecting(&[f]));
    }

    #[test]
    fn strictly_increasing_legs_pass() {
        let legs = [
            flight("e1", "A", "B", "2024-01-01", "2024-01-01"),
            flight("e2", "B", "A", "2024-01-02", "2024-01-02"),
        ];
        assert!(is_time_respecting(&legs));
    }

    #[test]
    fn departure_before_previous_arrival_fails() {
        let legs = [
            flight("e1", "A", "B", "2024-01-05", "2024-01-05"),
            flight("e2", "B", "A", "2024-01-01", "2024-01-01"),
        ];
        assert!(!is_time_respecting(&legs));
        assert_eq!(first_violation(&legs), Some(1));
    }

    #[test]
    fn departure_equal_to_previous_arrival_fails() {
        let legs = [
            flight_at("e1", "A", "B", "2024-01-01T08:00:00", "2024-01-01T10:00:00"),
            flight_at("e2", "B", "A", "2024-01-01T10:00:00", "2024-01-01T12:00:00"),
        ];
        assert_eq!(first_violation(&legs), Some(1));
    }

    #[test]
    fn same_day_legs_overlap_and_fail() {
        // Date ranges expand to 00:00..23:59, so two legs on one day collide.
        let legs = [
            flight("e1", "A", "B", "2024-01-01", "2024-01-01"),
            flight("e2", "B", "A", "2024-01-01", "2024-01-01"),
        ];
        assert!(!is_time_respecting(&legs));
    }

    #[test]
    fn wrap_around_is_not_compared() {
        // Last leg arrives long after the first departed; only adjacent pairs count.
        let legs = [
            flight("e1", "A", "B", "2024-01-01", "2024-01-01"),
            flight("e2", "B", "C", "2024-01-02", "2024-01-02"),
            flight("e3", "C", "A", "2024-01-03", "2024-12-31"),
        ];
        assert!(is_time_respecting(&legs));
    }

    #[test]
    fn reports_first_of_several_violations() {
        let legs = [
            flight("e1", "A", "B", "2024-01-01", "2024-01-01"),
            flight("e2", "B", "C", "2024-01-02", "2024-01-09"),
            flight("e3", "C", "D", "2024-01-03", "2024-01-03"),
            flight("e4", "D", "A", "2024-01-01", "2024-01-01"),
        ];
        assert_eq!(first_violation(&legs), Some(2));
    }
}
