#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod flight;
pub mod format;
pub mod graph;
pub mod newtypes;
pub mod normalize;
pub mod structures;
pub mod timing;
pub mod unroll;
pub mod validation;

#[cfg(test)]
mod test_helpers;

pub use flight::{Cycle, CycleShapeError, FlightRecord};
pub use format::{DateStyle, EMPTY_CYCLE, InvalidDateStyle, format_cycle, format_flights};
pub use graph::{
    BudgetLimit, CycleSearchError, EnumerationBudget, FlightGraph, OutgoingLeg, build_graph,
    enumerate_cycles, enumerate_rotations, find_cycles,
};
pub use newtypes::{AirportCode, CalendarDate, NewtypeError};
pub use normalize::{
    DateRangePolicy, MissingAirportPolicy, NormalizeConfig, NormalizeError, normalize,
};
pub use structures::{DateRange, GraphEdge, GraphNode, ItineraryGraph, NodeKind, RawDateRange};
pub use timing::{first_violation, is_time_respecting};
pub use unroll::{DEFAULT_MAX_DEPTH, Itinerary, RouteStop, UnrollError, unroll};
pub use validation::check::{
    CheckConfig, CheckReport, CheckRule, Diagnostic, Location, RuleId, Severity, check,
};
pub use validation::{
    DEFAULT_MAX_FLIGHTS, LimitExceeded, ValidationResult, ValidatorConfig, validate,
    validate_graph,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
