/// Typed schema for the graph document produced by the itinerary editor.
///
/// The editor emits loosely-shaped node and edge records. These structs pin
/// that shape down at the boundary: required fields are plain fields, optional
/// ones are `Option`/defaulted, and unknown keys (canvas positions, tour
/// visit counts and similar UI state) are ignored on deserialization.
///
/// ```json
/// {
///   "nodes": [{ "id": "n1", "type": "airport", "airports": ["SFO"] }],
///   "edges": [{ "id": "e1", "source": "n1", "target": "n2",
///               "dateRange": { "start": "2024-01-01", "end": "2024-01-02" } }]
/// }
/// ```
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::newtypes::CalendarDate;

/// The kind of a node on the editor canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A node bound to one or more concrete airports.
    #[default]
    Airport,
    /// A multi-city tour placeholder. Tours carry candidate cities rather than
    /// an `airports` list, so they normalize to the unknown-airport sentinel.
    Tour,
    /// Any other node type emitted by a newer editor.
    #[serde(other)]
    Other,
}

/// A node in the editor graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphNode {
    /// Editor-local node identifier referenced by edges.
    pub id: String,
    /// Node kind; defaults to [`NodeKind::Airport`] when absent.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Airport codes attached to the node, in editor order.
    #[serde(default)]
    pub airports: Vec<String>,
}

impl GraphNode {
    /// Builds an airport node with the given codes.
    pub fn airport(id: impl Into<String>, airports: &[&str]) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Airport,
            airports: airports.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    /// Returns the first non-empty airport code, which is the one used for
    /// flight records.
    pub fn primary_airport(&self) -> Option<&str> {
        self.airports
            .first()
            .map(String::as_str)
            .filter(|code| !code.is_empty())
    }
}

/// An inclusive range of travel dates attached to an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day on which the leg may depart.
    pub start: CalendarDate,
    /// Last day on which the leg may arrive.
    pub end: CalendarDate,
}

impl DateRange {
    /// Creates a range from `start` to `end` without reordering.
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    /// A single-day range.
    pub fn single(day: CalendarDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Returns `true` when `end` precedes `start`.
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

/// A `dateRange` exactly as the editor sent it.
///
/// The editor fills both ends with `""` when the date pickers are untouched,
/// so an edge's range text is only promoted to a [`DateRange`] when both ends
/// are valid calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawDateRange {
    /// Start text; `None` when the key is absent or `null`.
    #[serde(default)]
    pub start: Option<String>,
    /// End text; `None` when the key is absent or `null`.
    #[serde(default)]
    pub end: Option<String>,
}

impl RawDateRange {
    /// Builds a raw range from start and end text.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Parses both ends, or returns `None` if either is not a `YYYY-MM-DD`
    /// calendar date.
    pub fn parse(&self) -> Option<DateRange> {
        let start = CalendarDate::try_from(self.start.as_deref()?).ok()?;
        let end = CalendarDate::try_from(self.end.as_deref()?).ok()?;
        Some(DateRange::new(start, end))
    }
}

impl fmt::Display for RawDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.as_deref().unwrap_or_default();
        let end = self.end.as_deref().unwrap_or_default();
        write!(f, "{start:?} to {end:?}")
    }
}

/// A directed, dated edge between two editor nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Editor-local edge identifier; becomes the flight record id.
    pub id: String,
    /// Id of the node the leg departs from.
    pub source: String,
    /// Id of the node the leg arrives at.
    pub target: String,
    /// Travel dates for the leg. The editor may omit it for freshly drawn edges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// The editor's range text when it was present but not a usable pair of
    /// dates. `date_range` is `None` whenever this is set.
    #[serde(skip)]
    pub malformed_date_range: Option<RawDateRange>,
}

/// Wire shape of an edge before its range text is parsed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeRecord {
    id: String,
    source: String,
    target: String,
    #[serde(default)]
    date_range: Option<RawDateRange>,
}

impl<'de> Deserialize<'de> for GraphEdge {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let record = EdgeRecord::deserialize(d)?;
        let (date_range, malformed_date_range) = match record.date_range {
            None => (None, None),
            Some(raw) => match raw.parse() {
                Some(range) => (Some(range), None),
                None => (None, Some(raw)),
            },
        };
        Ok(Self {
            id: record.id,
            source: record.source,
            target: record.target,
            date_range,
            malformed_date_range,
        })
    }
}

impl GraphEdge {
    /// Builds an edge with a date range.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        date_range: DateRange,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            date_range: Some(date_range),
            malformed_date_range: None,
        }
    }

    /// Builds an edge whose range text could not be parsed.
    pub fn with_malformed_range(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        raw: RawDateRange,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            date_range: None,
            malformed_date_range: Some(raw),
        }
    }
}

/// The full editor graph as handed to the validator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItineraryGraph {
    /// All nodes on the canvas.
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    /// All edges on the canvas.
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl ItineraryGraph {
    /// Creates a graph from node and edge lists.
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Returns the first node with the given id, mirroring the editor's
    /// first-match lookup when ids are duplicated.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
