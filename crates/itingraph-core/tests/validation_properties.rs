//! Property-based tests for cycle enumeration and validation.
//!
//! Generates small flight sets (up to 8 airports, 14 flights) and checks the
//! verdicts and structural guarantees that must hold for any input.
#![allow(clippy::expect_used)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use itingraph_core::{
    Cycle, EnumerationBudget, FlightRecord, ValidatorConfig, build_graph, enumerate_cycles,
    enumerate_rotations, validate,
};
use proptest::prelude::*;

const AIRPORTS: [&str; 8] = ["SFO", "JFK", "LHR", "CDG", "NRT", "SYD", "GRU", "JNB"];

fn base_day() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .expect("valid date")
        .and_time(NaiveTime::MIN)
}

/// A leg departing `dep_day` days after the base date and arriving the same
/// day at 23:59, as the normalizer produces for a single-day range.
fn leg(id: usize, source: usize, target: usize, dep_day: i64) -> FlightRecord {
    let departure = base_day() + TimeDelta::days(dep_day);
    FlightRecord::new(
        format!("f{id}"),
        AIRPORTS[source],
        AIRPORTS[target],
        departure,
        departure + TimeDelta::minutes(23 * 60 + 59),
    )
}

/// Flights that only go from a lower airport index to a higher one.
fn arb_acyclic() -> impl Strategy<Value = Vec<FlightRecord>> {
    prop::collection::vec((0..8usize, 0..8usize, 0..60i64), 0..14).prop_map(|raw| {
        raw.into_iter()
            .filter(|(a, b, _)| a != b)
            .enumerate()
            .map(|(id, (a, b, day))| leg(id, a.min(b), a.max(b), day))
            .collect()
    })
}

/// A ring over `k` distinct airports with strictly increasing departure days,
/// listed outbound first.
fn arb_forward_ring() -> impl Strategy<Value = Vec<FlightRecord>> {
    (1..=8usize, prop::collection::vec(1..5i64, 8)).prop_map(|(k, gaps)| {
        let mut day = 0;
        (0..k)
            .map(|i| {
                let f = leg(i, i, (i + 1) % k, day);
                day += gaps[i];
                f
            })
            .collect()
    })
}

/// Arbitrary flights, cycles included.
fn arb_flights() -> impl Strategy<Value = Vec<FlightRecord>> {
    prop::collection::vec((0..6usize, 0..6usize, 0..30i64), 0..12).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(id, (a, b, day))| leg(id, a, b, day))
            .collect()
    })
}

fn unlimited() -> ValidatorConfig {
    ValidatorConfig::unlimited()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A graph without cycles is valid and reports no cycles.
    #[test]
    fn acyclic_graphs_are_valid(flights in arb_acyclic()) {
        let result = validate(&flights, &unlimited());
        prop_assert!(result.valid);
        prop_assert!(result.cycles().is_empty());
    }

    /// A ring whose legs depart strictly after the previous arrival is valid.
    #[test]
    fn forward_rings_are_valid(flights in arb_forward_ring()) {
        let result = validate(&flights, &unlimited());
        prop_assert!(result.valid);
        prop_assert_eq!(result.cycles().len(), 1);
    }

    /// Moving the last leg of a ring of two or more legs back before the
    /// previous arrival makes the graph invalid.
    #[test]
    fn injected_paradox_is_invalid(mut flights in arb_forward_ring()) {
        prop_assume!(flights.len() >= 2);
        let n = flights.len();
        let earlier = flights[n - 2].departure;
        let last = &mut flights[n - 1];
        last.departure = earlier;
        last.arrival = earlier + TimeDelta::minutes(23 * 60 + 59);
        let result = validate(&flights, &unlimited());
        prop_assert!(!result.valid);
        prop_assert!(result.invalid_cycle.is_some());
    }

    /// Validating the same input twice gives the same result.
    #[test]
    fn validation_is_idempotent(flights in arb_flights()) {
        let cfg = unlimited();
        prop_assert_eq!(validate(&flights, &cfg), validate(&flights, &cfg));
    }

    /// Every enumerated cycle is a closed chain, and a cycle through `k`
    /// airports is found once per airport by the raw walk.
    #[test]
    fn collapsed_cycles_account_for_every_rotation(flights in arb_flights()) {
        let graph = build_graph(&flights);
        let budget = EnumerationBudget::unlimited();
        let cycles = enumerate_cycles(&graph, &budget).expect("unlimited");
        let rotations = enumerate_rotations(&graph, &budget).expect("unlimited");

        for c in &cycles {
            prop_assert!(Cycle::new(c.flights().to_vec()).is_ok());
        }
        let legs: usize = cycles.iter().map(Cycle::len).sum();
        prop_assert_eq!(rotations.len(), legs);
    }

    /// A valid verdict never hides a failing cycle.
    #[test]
    fn valid_verdict_means_every_cycle_passes(flights in arb_flights()) {
        let result = validate(&flights, &unlimited());
        if result.valid {
            prop_assert!(result.cycles().iter().all(Cycle::is_time_respecting));
        } else {
            let cycle = result.invalid_cycle.expect("invalid verdict names a cycle");
            prop_assert!(!cycle.is_time_respecting());
        }
    }
}
