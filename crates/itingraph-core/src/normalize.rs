/// Flight-edge normalizer: converts an editor [`ItineraryGraph`] into a flat
/// list of [`FlightRecord`] values.
///
/// One record is produced per edge, in edge order:
///
/// - `departure` is the range start at `00:00:00`;
/// - `arrival` is the range end at `23:59:00`;
/// - `source`/`target` are the first airport of the endpoint nodes.
///
/// The default configuration is permissive. A missing node or airport becomes
/// [`AirportCode::UNKNOWN`], an inverted range is kept as-is, and an edge with
/// no range, or with range text that is not two calendar dates, uses the
/// fallback date for both ends. [`NormalizeConfig`] turns
/// each coercion into an explicit policy so stricter callers can reject or
/// repair such input instead.
use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use tracing::debug;

use crate::flight::FlightRecord;
use crate::newtypes::{AirportCode, CalendarDate};
use crate::structures::{DateRange, GraphEdge, GraphNode, ItineraryGraph, RawDateRange};

/// Minutes past midnight of the arrival instant assigned to a range's end day.
const ARRIVAL_MINUTE_OF_DAY: i64 = 23 * 60 + 59;

/// What to do when an edge endpoint has no node or the node has no airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingAirportPolicy {
    /// Substitute [`AirportCode::UNKNOWN`].
    #[default]
    Sentinel,
    /// Fail with [`NormalizeError::MissingAirport`].
    Reject,
}

/// What to do with an edge date range that cannot be used as given: one that
/// ends before it starts, or one whose text is not two calendar dates.
///
/// Only [`DateRangePolicy::Reject`] applies to malformed text; every other
/// policy sends such an edge to the fallback date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRangePolicy {
    /// Keep the range as given; the record's arrival precedes its departure.
    #[default]
    Permissive,
    /// Fail with [`NormalizeError::InvertedDateRange`] or
    /// [`NormalizeError::MalformedDateRange`].
    Reject,
    /// Exchange start and end.
    Swap,
    /// Collapse the range to its start day.
    Clamp,
}

/// Normalizer configuration.
///
/// # Default
///
/// ```
/// # use itingraph_core::{NormalizeConfig, MissingAirportPolicy, DateRangePolicy};
/// let cfg = NormalizeConfig::default();
/// assert_eq!(cfg.missing_airport, MissingAirportPolicy::Sentinel);
/// assert_eq!(cfg.inverted_range, DateRangePolicy::Permissive);
/// assert!(cfg.fallback_date.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizeConfig {
    /// Handling of endpoints without a usable airport.
    pub missing_airport: MissingAirportPolicy,
    /// Handling of inverted date ranges.
    pub inverted_range: DateRangePolicy,
    /// Date used for both ends of an edge with no usable date range. `None`
    /// means the current UTC date at normalization time.
    pub fallback_date: Option<CalendarDate>,
}

impl NormalizeConfig {
    /// A configuration that rejects every coercion the permissive default
    /// would perform silently.
    pub fn strict() -> Self {
        Self {
            missing_airport: MissingAirportPolicy::Reject,
            inverted_range: DateRangePolicy::Reject,
            fallback_date: None,
        }
    }

    fn resolve_fallback_date(&self) -> CalendarDate {
        self.fallback_date
            .unwrap_or_else(|| CalendarDate::from_naive(today()))
    }
}

/// Errors raised by rejecting normalization policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// An edge endpoint has no node, or its node carries no airport.
    MissingAirport {
        /// The edge whose endpoint could not be resolved.
        edge_id: String,
        /// The node id the edge references.
        node_id: String,
    },
    /// An edge's date range ends before it starts.
    InvertedDateRange {
        /// The offending edge.
        edge_id: String,
        /// The range start.
        start: CalendarDate,
        /// The range end.
        end: CalendarDate,
    },
    /// An edge's date range text is not two `YYYY-MM-DD` calendar dates.
    MalformedDateRange {
        /// The offending edge.
        edge_id: String,
        /// The range text as sent.
        raw: RawDateRange,
    },
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAirport { edge_id, node_id } => write!(
                f,
                "edge {edge_id:?} endpoint {node_id:?} has no airport"
            ),
            Self::InvertedDateRange {
                edge_id,
                start,
                end,
            } => write!(
                f,
                "edge {edge_id:?} date range ends ({end}) before it starts ({start})"
            ),
            Self::MalformedDateRange { edge_id, raw } => write!(
                f,
                "edge {edge_id:?} date range {raw} is not two YYYY-MM-DD dates"
            ),
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Start-of-day instant for `day`.
pub fn departure_instant(day: CalendarDate) -> NaiveDateTime {
    day.naive().and_time(NaiveTime::MIN)
}

/// The `23:59:00` instant used as the arrival on `day`.
pub fn arrival_instant(day: CalendarDate) -> NaiveDateTime {
    departure_instant(day) + TimeDelta::minutes(ARRIVAL_MINUTE_OF_DAY)
}

/// Converts the editor graph into flight records, one per edge.
///
/// # Errors
///
/// Only a rejecting policy in `config` produces an error; the default
/// configuration never fails.
pub fn normalize(
    graph: &ItineraryGraph,
    config: &NormalizeConfig,
) -> Result<Vec<FlightRecord>, NormalizeError> {
    let mut nodes: HashMap<&str, &GraphNode> = HashMap::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        nodes.entry(node.id.as_str()).or_insert(node);
    }
    let fallback = config.resolve_fallback_date();

    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "normalizing itinerary graph"
    );

    graph
        .edges
        .iter()
        .map(|edge| normalize_edge(edge, &nodes, fallback, config))
        .collect()
}

fn normalize_edge(
    edge: &GraphEdge,
    nodes: &HashMap<&str, &GraphNode>,
    fallback: CalendarDate,
    config: &NormalizeConfig,
) -> Result<FlightRecord, NormalizeError> {
    let source = resolve_airport(edge, &edge.source, nodes, config)?;
    let target = resolve_airport(edge, &edge.target, nodes, config)?;
    let range = resolve_range(edge, fallback, config)?;

    Ok(FlightRecord::new(
        edge.id.as_str(),
        source,
        target,
        departure_instant(range.start),
        arrival_instant(range.end),
    )
    .with_nodes(edge.source.as_str(), edge.target.as_str()))
}

fn resolve_airport(
    edge: &GraphEdge,
    node_id: &str,
    nodes: &HashMap<&str, &GraphNode>,
    config: &NormalizeConfig,
) -> Result<AirportCode, NormalizeError> {
    if let Some(code) = nodes.get(node_id).and_then(|n| n.primary_airport()) {
        return Ok(AirportCode::from(code));
    }
    match config.missing_airport {
        MissingAirportPolicy::Sentinel => {
            debug!(edge = %edge.id, node = node_id, "no airport for endpoint, using sentinel");
            Ok(AirportCode::unknown())
        }
        MissingAirportPolicy::Reject => Err(NormalizeError::MissingAirport {
            edge_id: edge.id.clone(),
            node_id: node_id.to_owned(),
        }),
    }
}

fn resolve_range(
    edge: &GraphEdge,
    fallback: CalendarDate,
    config: &NormalizeConfig,
) -> Result<DateRange, NormalizeError> {
    let range = match (edge.date_range, &edge.malformed_date_range) {
        (Some(range), _) => range,
        (None, Some(raw)) if config.inverted_range == DateRangePolicy::Reject => {
            return Err(NormalizeError::MalformedDateRange {
                edge_id: edge.id.clone(),
                raw: raw.clone(),
            });
        }
        (None, raw) => {
            debug!(edge = %edge.id, malformed = raw.is_some(), %fallback, "using fallback date");
            DateRange::single(fallback)
        }
    };
    if !range.is_inverted() {
        return Ok(range);
    }
    match config.inverted_range {
        DateRangePolicy::Permissive => Ok(range),
        DateRangePolicy::Reject => Err(NormalizeError::InvertedDateRange {
            edge_id: edge.id.clone(),
            start: range.start,
            end: range.end,
        }),
        DateRangePolicy::Swap => Ok(DateRange::new(range.end, range.start)),
        DateRangePolicy::Clamp => Ok(DateRange::single(range.start)),
    }
}

/// Returns today's date in UTC, the day the editor stamps on undated edges.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
