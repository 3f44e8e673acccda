/// Itinerary validation: the time-respecting cycle verdict and the document
/// lint pass built around it.
///
/// [`validate`] is the core entry point. It enumerates every cycle of the
/// flight graph once and reports the first cycle that cannot be flown in
/// order. A graph with no such cycle is valid.
///
/// Enumeration is exponential in the worst case, so [`ValidatorConfig`]
/// bounds the input size and the search. When a bound is hit the graph is
/// reported invalid with [`ValidationResult::limit_exceeded`] set: a graph
/// that could not be checked is never reported valid.
///
/// The [`check`] submodule wraps normalization and validation into a
/// diagnostics report for tooling.
pub mod check;
pub mod rules_nrm;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::flight::{Cycle, FlightRecord};
use crate::graph::{BudgetLimit, CycleSearchError, EnumerationBudget, build_graph, enumerate_cycles};
use crate::normalize::{NormalizeConfig, NormalizeError, normalize};
use crate::structures::ItineraryGraph;


/// Default ceiling on the number of flight records accepted by [`validate`].
pub const DEFAULT_MAX_FLIGHTS: usize = 5_000;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Resource limits for a validation call.
///
/// # Default
///
/// ```
/// # use itingraph_core::{ValidatorConfig, EnumerationBudget, DEFAULT_MAX_FLIGHTS};
/// let cfg = ValidatorConfig::default();
/// assert_eq!(cfg.max_flights, DEFAULT_MAX_FLIGHTS);
/// assert_eq!(cfg.budget, EnumerationBudget::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Inputs with more records than this are refused without enumeration.
    pub max_flights: usize,
    /// Bounds on the cycle search.
    pub budget: EnumerationBudget,
}

impl ValidatorConfig {
    /// No input ceiling and an unlimited search budget.
    pub fn unlimited() -> Self {
        Self {
            max_flights: usize::MAX,
            budget: EnumerationBudget::unlimited(),
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_flights: DEFAULT_MAX_FLIGHTS,
            budget: EnumerationBudget::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Which limit stopped validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LimitExceeded {
    /// The input had more records than [`ValidatorConfig::max_flights`].
    TooManyFlights {
        /// Records in the input.
        count: usize,
        /// The configured ceiling.
        limit: usize,
    },
    /// The search found more cycles than the budget allows.
    TooManyCycles {
        /// The configured cap.
        limit: usize,
    },
    /// The search traversed more flights than the budget allows.
    TooManySteps {
        /// The configured cap.
        limit: usize,
    },
}

impl From<BudgetLimit> for LimitExceeded {
    fn from(limit: BudgetLimit) -> Self {
        match limit {
            BudgetLimit::Cycles(limit) => Self::TooManyCycles { limit },
            BudgetLimit::Steps(limit) => Self::TooManySteps { limit },
        }
    }
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyFlights { count, limit } => {
                write!(f, "{count} flights exceed the limit of {limit}")
            }
            Self::TooManyCycles { limit } => write!(f, "more than {limit} cycles"),
            Self::TooManySteps { limit } => {
                write!(f, "cycle search exceeded {limit} traversal steps")
            }
        }
    }
}

/// Outcome of [`validate`].
///
/// Exactly one of the optional fields is set:
///
/// - `cycles` when the graph is valid (possibly empty);
/// - `invalid_cycle` when some cycle is not time-respecting;
/// - `limit_exceeded` when the graph could not be checked.
///
/// Serialized with camelCase keys, omitting unset fields:
///
/// ```json
/// { "valid": false, "invalidCycle": [ { "id": "e1", ... }, ... ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// `true` when every cycle is time-respecting.
    pub valid: bool,
    /// The first cycle, in discovery order, that is not time-respecting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_cycle: Option<Cycle>,
    /// Every cycle found, in discovery order, when the graph is valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<Vec<Cycle>>,
    /// The limit that stopped validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_exceeded: Option<LimitExceeded>,
}

impl ValidationResult {
    /// A valid verdict carrying every cycle found.
    pub fn valid(cycles: Vec<Cycle>) -> Self {
        Self {
            valid: true,
            invalid_cycle: None,
            cycles: Some(cycles),
            limit_exceeded: None,
        }
    }

    /// An invalid verdict naming the first failing cycle.
    pub fn invalid(cycle: Cycle) -> Self {
        Self {
            valid: false,
            invalid_cycle: Some(cycle),
            cycles: None,
            limit_exceeded: None,
        }
    }

    /// A fail-closed verdict for a graph that could not be checked.
    pub fn exceeded(limit: LimitExceeded) -> Self {
        Self {
            valid: false,
            invalid_cycle: None,
            cycles: None,
            limit_exceeded: Some(limit),
        }
    }

    /// The cycles found, or an empty slice for an invalid verdict.
    pub fn cycles(&self) -> &[Cycle] {
        self.cycles.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Checks that every cycle in `flights` is time-respecting.
///
/// An empty input is valid without enumeration. Otherwise every cycle is
/// enumerated once and checked in discovery order; the first failure wins.
/// Pure: the same input and configuration always yield the same result.
pub fn validate(flights: &[FlightRecord], config: &ValidatorConfig) -> ValidationResult {
    if flights.is_empty() {
        debug!("no flights, nothing to validate");
        return ValidationResult::valid(Vec::new());
    }
    if flights.len() > config.max_flights {
        let limit = LimitExceeded::TooManyFlights {
            count: flights.len(),
            limit: config.max_flights,
        };
        warn!(%limit, "refusing to validate");
        return ValidationResult::exceeded(limit);
    }

    let graph = build_graph(flights);
    let cycles = match enumerate_cycles(&graph, &config.budget) {
        Ok(cycles) => cycles,
        Err(CycleSearchError::BudgetExceeded {
            limit,
            cycles_found,
        }) => {
            warn!(%limit, cycles_found, "cycle search budget exhausted, failing closed");
            return ValidationResult::exceeded(limit.into());
        }
    };

    if let Some(bad) = cycles.iter().find(|c| !c.is_time_respecting()) {
        debug!(legs = bad.len(), cycle = %bad, "cycle is not time-respecting");
        return ValidationResult::invalid(bad.clone());
    }

    debug!(cycles = cycles.len(), "all cycles time-respecting");
    ValidationResult::valid(cycles)
}

/// Normalizes an editor document and validates the resulting flights.
///
/// # Errors
///
/// Returns [`NormalizeError`] only when `normalize_config` uses a rejecting
/// policy and the document trips it.
pub fn validate_graph(
    graph: &ItineraryGraph,
    normalize_config: &NormalizeConfig,
    validator_config: &ValidatorConfig,
) -> Result<ValidationResult, NormalizeError> {
    let flights = normalize(graph, normalize_config)?;
    Ok(validate(&flights, validator_config))
}
