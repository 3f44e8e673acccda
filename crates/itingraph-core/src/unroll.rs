/// Itinerary unrolling: expands a validated flight graph into concrete,
/// time-ordered routes from a starting airport.
///
/// From the start airport every flight departing strictly after the current
/// time is followed, and the time advances to that flight's arrival. A route
/// ends when no flight can be taken or when it reaches `max_depth` legs. The
/// graph is validated first; a graph with a cycle that cannot be flown in
/// order is refused.
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::flight::{Cycle, FlightRecord};
use crate::graph::{OutgoingLeg, build_graph};
use crate::newtypes::AirportCode;
use crate::validation::{LimitExceeded, ValidatorConfig, validate};

/// Default maximum number of legs per itinerary.
pub const DEFAULT_MAX_DEPTH: usize = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One stop of a rendered route.
///
/// Every stop but the last carries the departure and arrival of the leg
/// leaving it; the final stop carries only the airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStop {
    /// The airport.
    pub node: AirportCode,
    /// Departure of the leg leaving this airport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure: Option<NaiveDateTime>,
    /// Arrival of the leg leaving this airport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<NaiveDateTime>,
}

/// A concrete route: the start airport and the legs flown, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    /// Where the route begins.
    pub start: AirportCode,
    /// Legs flown, possibly none.
    pub flights: Vec<FlightRecord>,
}

impl Itinerary {
    /// Returns `true` when no leg could be taken from the start.
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Where the route ends.
    pub fn end(&self) -> &AirportCode {
        self.flights.last().map_or(&self.start, |f| &f.target)
    }

    /// Renders the route as a stop list: `[{node, departure, arrival}, ...,
    /// {node}]`, or `[{node: start}]` for an empty itinerary.
    pub fn stops(&self) -> Vec<RouteStop> {
        let mut stops: Vec<RouteStop> = self
            .flights
            .iter()
            .map(|f| RouteStop {
                node: f.source.clone(),
                departure: Some(f.departure),
                arrival: Some(f.arrival),
            })
            .collect();
        stops.push(RouteStop {
            node: self.end().clone(),
            departure: None,
            arrival: None,
        });
        stops
    }
}

/// Errors from [`unroll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnrollError {
    /// The graph has a cycle that is not time-respecting.
    InvalidGraph {
        /// The first offending cycle.
        cycle: Cycle,
    },
    /// Validation or unrolling hit a configured limit.
    LimitExceeded(LimitExceeded),
}

impl fmt::Display for UnrollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGraph { cycle } => write!(
                f,
                "graph contains a cycle that is not time-respecting: {cycle}"
            ),
            Self::LimitExceeded(limit) => write!(f, "cannot unroll graph: {limit}"),
        }
    }
}

impl std::error::Error for UnrollError {}

// ---------------------------------------------------------------------------
// Unrolling
// ---------------------------------------------------------------------------

struct Frame<'a> {
    legs: Vec<OutgoingLeg<'a>>,
    next: usize,
    time: NaiveDateTime,
    extended: bool,
}

/// Lists every time-ordered route from `start`, depth-first, in record order.
///
/// A start airport with no flights yields a single empty itinerary. Traversed
/// legs count against `config.budget.max_steps`.
///
/// # Errors
///
/// - [`UnrollError::InvalidGraph`] when validation finds an invalid cycle.
/// - [`UnrollError::LimitExceeded`] when validation or the walk hits a limit.
pub fn unroll(
    flights: &[FlightRecord],
    start: &str,
    start_time: NaiveDateTime,
    max_depth: usize,
    config: &ValidatorConfig,
) -> Result<Vec<Itinerary>, UnrollError> {
    let verdict = validate(flights, config);
    if let Some(limit) = verdict.limit_exceeded {
        return Err(UnrollError::LimitExceeded(limit));
    }
    if let Some(cycle) = verdict.invalid_cycle {
        return Err(UnrollError::InvalidGraph { cycle });
    }

    let start_code = AirportCode::from(start);
    let itinerary = |path: &[usize]| Itinerary {
        start: start_code.clone(),
        flights: path.iter().filter_map(|&i| flights.get(i)).cloned().collect(),
    };

    let graph = build_graph(flights);
    let Some(root) = graph.node_index(start) else {
        debug!(start, "start airport has no flights");
        return Ok(vec![itinerary(&[])]);
    };
    if max_depth == 0 {
        return Ok(vec![itinerary(&[])]);
    }

    let mut results: Vec<Itinerary> = Vec::new();
    let mut path: Vec<usize> = Vec::new();
    let mut steps: usize = 0;
    let mut stack: Vec<Frame<'_>> = vec![Frame {
        legs: graph.outgoing(root).collect(),
        next: 0,
        time: start_time,
        extended: false,
    }];

    while let Some(top) = stack.last_mut() {
        let mut taken: Option<OutgoingLeg<'_>> = None;
        while let Some(leg) = top.legs.get(top.next).copied() {
            top.next += 1;
            if leg.flight.departure > top.time {
                taken = Some(leg);
                break;
            }
        }
        let Some(leg) = taken else {
            if !top.extended {
                results.push(itinerary(&path));
            }
            stack.pop();
            if !stack.is_empty() {
                path.pop();
            }
            continue;
        };
        top.extended = true;

        steps += 1;
        if steps > config.budget.max_steps {
            return Err(UnrollError::LimitExceeded(LimitExceeded::TooManySteps {
                limit: config.budget.max_steps,
            }));
        }

        path.push(leg.record);
        if path.len() >= max_depth {
            results.push(itinerary(&path));
            path.pop();
            continue;
        }
        stack.push(Frame {
            legs: graph.outgoing(leg.target).collect(),
            next: 0,
            time: leg.flight.arrival,
            extended: false,
        });
    }

    debug!(start, itineraries = results.len(), steps, "unrolled itinerary graph");
    Ok(results)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;
    use crate::test_helpers::{flight, ts};

    const DAWN: &str = "2000-01-01T00:00:00";

    fn routes(flights: &[FlightRecord], start: &str, max_depth: usize) -> Vec<Vec<String>> {
        unroll(flights, start, ts(DAWN), max_depth, &ValidatorConfig::default())
            .expect("valid graph")
            .into_iter()
            .map(|it| it.flights.into_iter().map(|f| f.id).collect())
            .collect()
    }

    #[test]
    fn chain_unrolls_to_one_route() {
        let flights = [
            flight("e1", "A", "B", "2024-01-01", "2024-01-01"),
            flight("e2", "B", "C", "2024-01-02", "2024-01-02"),
        ];
        assert_eq!(routes(&flights, "A", DEFAULT_MAX_DEPTH), [["e1", "e2"]]);
    }

    #[test]
    fn branches_follow_record_order() {
        let flights = [
            flight("e1", "A", "B", "2024-01-01", "2024-01-01"),
            flight("e2", "A", "C", "2024-01-01", "2024-01-01"),
            flight("e3", "B", "D", "2024-01-02", "2024-01-02"),
        ];
        assert_eq!(
            routes(&flights, "A", DEFAULT_MAX_DEPTH),
            vec![vec!["e1", "e3"], vec!["e2"]]
        );
    }

    #[test]
    fn departures_must_follow_arrival() {
        let flights = [
            flight("e1", "A", "B", "2024-01-05", "2024-01-05"),
            flight("early", "B", "C", "2024-01-05", "2024-01-05"),
            flight("late", "B", "D", "2024-01-06", "2024-01-06"),
        ];
        assert_eq!(routes(&flights, "A", DEFAULT_MAX_DEPTH), [["e1", "late"]]);
    }

    #[test]
    fn start_time_filters_first_leg() {
        let flights = [
            flight("old", "A", "B", "2024-01-01", "2024-01-01"),
            flight("new", "A", "C", "2024-02-01", "2024-02-01"),
        ];
        let its = unroll(
            &flights,
            "A",
            ts("2024-01-15T00:00:00"),
            DEFAULT_MAX_DEPTH,
            &ValidatorConfig::default(),
        )
        .expect("valid");
        assert_eq!(its.len(), 1);
        assert_eq!(its[0].flights[0].id, "new");
    }

    #[test]
    fn round_trip_revisits_start_until_depth() {
        let flights = [
            flight("out", "A", "B", "2024-01-01", "2024-01-01"),
            flight("back", "B", "A", "2024-01-02", "2024-01-02"),
        ];
        assert_eq!(routes(&flights, "A", 1), [["out"]]);
        assert_eq!(routes(&flights, "A", DEFAULT_MAX_DEPTH), [["out", "back"]]);
    }

    #[test]
    fn zero_depth_yields_empty_route() {
        let flights = [flight("e1", "A", "B", "2024-01-01", "2024-01-01")];
        let its = unroll(&flights, "A", ts(DAWN), 0, &ValidatorConfig::default()).expect("valid");
        assert_eq!(its.len(), 1);
        assert!(its[0].is_empty());
    }

    #[test]
    fn absent_start_yields_single_empty_itinerary() {
        let flights = [flight("e1", "A", "B", "2024-01-01", "2024-01-01")];
        let its = unroll(&flights, "ZZZ", ts(DAWN), DEFAULT_MAX_DEPTH, &ValidatorConfig::default())
            .expect("valid");
        assert_eq!(its.len(), 1);
        assert!(its[0].is_empty());
        let stops = its[0].stops();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].node, "ZZZ");
        assert!(stops[0].departure.is_none());
    }

    #[test]
    fn invalid_graph_is_refused() {
        let flights = [
            flight("e1", "A", "B", "2024-01-05", "2024-01-05"),
            flight("e2", "B", "A", "2024-01-01", "2024-01-01"),
        ];
        match unroll(&flights, "A", ts(DAWN), DEFAULT_MAX_DEPTH, &ValidatorConfig::default()) {
            Err(UnrollError::InvalidGraph { cycle }) => {
                assert_eq!(cycle.len(), 2);
            }
            other => panic!("expected InvalidGraph, got {other:?}"),
        }
    }

    #[test]
    fn validation_step_budget_refuses_unroll() {
        let flights = [
            flight("e1", "A", "B", "2024-01-01", "2024-01-01"),
            flight("e2", "B", "C", "2024-01-02", "2024-01-02"),
            flight("e3", "C", "D", "2024-01-03", "2024-01-03"),
        ];
        let mut cfg = ValidatorConfig::default();
        cfg.budget.max_steps = 2;
        let err = unroll(&flights, "A", ts(DAWN), DEFAULT_MAX_DEPTH, &cfg).expect_err("too many steps");
        assert_eq!(
            err,
            UnrollError::LimitExceeded(LimitExceeded::TooManySteps { limit: 2 })
        );
    }

    #[test]
    fn walk_step_budget_is_enforced_after_validation_passes() {
        // The cycle search takes one step per self-loop; the walk takes one
        // per increasing subset of them (15 for four loops).
        let flights = [
            flight("d1", "A", "A", "2024-01-01", "2024-01-01"),
            flight("d2", "A", "A", "2024-01-02", "2024-01-02"),
            flight("d3", "A", "A", "2024-01-03", "2024-01-03"),
            flight("d4", "A", "A", "2024-01-04", "2024-01-04"),
        ];
        let mut cfg = ValidatorConfig::default();
        cfg.budget.max_steps = 10;

        let verdict = validate(&flights, &cfg);
        assert!(verdict.valid);
        assert!(verdict.limit_exceeded.is_none());

        let err = unroll(&flights, "A", ts(DAWN), DEFAULT_MAX_DEPTH, &cfg)
            .expect_err("walk needs more than 10 steps");
        assert_eq!(
            err,
            UnrollError::LimitExceeded(LimitExceeded::TooManySteps { limit: 10 })
        );

        cfg.budget.max_steps = 15;
        let its = unroll(&flights, "A", ts(DAWN), DEFAULT_MAX_DEPTH, &cfg).expect("fits");
        assert_eq!(its.len(), 8);
    }

    #[test]
    fn stops_list_sources_then_final_target() {
        let it = Itinerary {
            start: AirportCode::from("A"),
            flights: vec![
                flight("e1", "A", "B", "2024-01-01", "2024-01-01"),
                flight("e2", "B", "C", "2024-01-02", "2024-01-03"),
            ],
        };
        let stops = it.stops();
        let nodes: Vec<&str> = stops.iter().map(|s| s.node.as_str()).collect();
        assert_eq!(nodes, ["A", "B", "C"]);
        assert_eq!(stops[1].arrival, Some(ts("2024-01-03T23:59:00")));
        assert!(stops[2].arrival.is_none());
        let v = serde_json::to_value(&stops).expect("serialize");
        assert_eq!(v[0]["departure"], "2024-01-01T00:00:00");
        assert!(v[2].get("departure").is_none());
    }
}
