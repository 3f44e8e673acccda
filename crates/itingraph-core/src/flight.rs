/// Flight records and cycles: the normalized data the validator works on.
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::format::{DateStyle, format_flights};
use crate::newtypes::AirportCode;
use crate::timing;

/// One directed, dated leg of the itinerary.
///
/// `departure` and `arrival` are wall-clock instants. `arrival >= departure`
/// is expected but not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// Identifier of the edge this record was built from.
    pub id: String,
    /// Departure airport.
    pub source: AirportCode,
    /// Arrival airport.
    pub target: AirportCode,
    /// Earliest departure instant.
    pub departure: NaiveDateTime,
    /// Latest arrival instant.
    pub arrival: NaiveDateTime,
    /// Editor node id of the departure endpoint, when built from a graph document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_node: Option<String>,
    /// Editor node id of the arrival endpoint, when built from a graph document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,
}

impl FlightRecord {
    /// Creates a record with no editor node ids attached.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<AirportCode>,
        target: impl Into<AirportCode>,
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            departure,
            arrival,
            source_node: None,
            target_node: None,
        }
    }

    /// Attaches the editor node ids the record was derived from.
    #[must_use]
    pub fn with_nodes(mut self, source_node: impl Into<String>, target_node: impl Into<String>) -> Self {
        self.source_node = Some(source_node.into());
        self.target_node = Some(target_node.into());
        self
    }

    /// Returns `true` for a leg that departs from and arrives at the same airport.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Reasons a flight sequence is not a well-formed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleShapeError {
    /// The sequence has no flights.
    Empty,
    /// Flight `index` does not depart from where flight `index - 1` arrived.
    Broken {
        /// Position of the first flight that breaks the chain.
        index: usize,
    },
    /// The last flight does not return to the first flight's departure airport.
    NotClosed,
}

impl fmt::Display for CycleShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("cycle has no flights"),
            Self::Broken { index } => write!(
                f,
                "flight {index} does not depart from the previous flight's arrival airport"
            ),
            Self::NotClosed => f.write_str("last flight does not return to the start airport"),
        }
    }
}

impl std::error::Error for CycleShapeError {}

/// A non-empty closed chain of flights `[f1, ..., fk]` where each flight
/// departs from the previous flight's arrival airport and `fk` returns to
/// `f1.source`.
///
/// Construction through [`Cycle::new`] (and deserialization) checks the
/// chain; the enumerator builds cycles directly from DFS paths, which satisfy
/// it by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FlightRecord>", into = "Vec<FlightRecord>")]
pub struct Cycle(Vec<FlightRecord>);

impl Cycle {
    /// Checks that `flights` forms a closed chain and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`CycleShapeError`] when the sequence is empty, broken, or does
    /// not return to its start.
    pub fn new(flights: Vec<FlightRecord>) -> Result<Self, CycleShapeError> {
        let (Some(first), Some(last)) = (flights.first(), flights.last()) else {
            return Err(CycleShapeError::Empty);
        };
        if let Some(index) = flights
            .windows(2)
            .position(|pair| pair[0].target != pair[1].source)
        {
            return Err(CycleShapeError::Broken { index: index + 1 });
        }
        if last.target != first.source {
            return Err(CycleShapeError::NotClosed);
        }
        Ok(Self(flights))
    }

    /// Wraps a DFS path already known to be closed.
    pub(crate) fn from_path(flights: Vec<FlightRecord>) -> Self {
        Self(flights)
    }

    /// The flights in traversal order.
    pub fn flights(&self) -> &[FlightRecord] {
        &self.0
    }

    /// Consumes the cycle and returns its flights.
    pub fn into_flights(self) -> Vec<FlightRecord> {
        self.0
    }

    /// Number of legs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; cycles are non-empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The airport the cycle starts and ends at.
    pub fn start(&self) -> Option<&AirportCode> {
        self.0.first().map(|f| &f.source)
    }

    /// Returns `true` if every leg departs strictly after the previous leg arrives.
    pub fn is_time_respecting(&self) -> bool {
        timing::is_time_respecting(&self.0)
    }

    /// Position of the first leg that departs at or before the previous arrival.
    pub fn first_violation(&self) -> Option<usize> {
        timing::first_violation(&self.0)
    }
}

impl TryFrom<Vec<FlightRecord>> for Cycle {
    type Error = CycleShapeError;

    fn try_from(flights: Vec<FlightRecord>) -> Result<Self, Self::Error> {
        Self::new(flights)
    }
}

impl From<Cycle> for Vec<FlightRecord> {
    fn from(cycle: Cycle) -> Self {
        cycle.0
    }
}

impl AsRef<[FlightRecord]> for Cycle {
    fn as_ref(&self) -> &[FlightRecord] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Cycle {
    type Item = &'a FlightRecord;
    type IntoIter = std::slice::Iter<'a, FlightRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_flights(&self.0, &DateStyle::default()))
    }
}
