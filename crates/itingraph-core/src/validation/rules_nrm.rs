/// NRM-01 through NRM-04: document rules for input the normalizer can only
/// handle by coercion.
///
/// These rules are stateless structs implementing
/// [`crate::validation::check::CheckRule`]. All produce
/// [`Severity::Warning`] diagnostics and collect every finding without early
/// exit. A strict normalizer policy additionally turns the first such finding
/// into an `NRM-05` error.
use std::collections::{HashMap, HashSet};

use crate::normalize::{DateRangePolicy, MissingAirportPolicy, NormalizeConfig};
use crate::structures::{GraphNode, ItineraryGraph};

use super::check::{CheckRule, Diagnostic, Location, RuleId, Severity};

/// First-wins id lookup, matching the normalizer.
fn node_map(graph: &ItineraryGraph) -> HashMap<&str, &GraphNode> {
    let mut nodes = HashMap::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        nodes.entry(node.id.as_str()).or_insert(node);
    }
    nodes
}

fn missing_airport_outcome(config: &NormalizeConfig) -> &'static str {
    match config.missing_airport {
        MissingAirportPolicy::Sentinel => "\"Unknown\" is used",
        MissingAirportPolicy::Reject => "normalization will reject it",
    }
}

// ---------------------------------------------------------------------------
// NRM-01
// ---------------------------------------------------------------------------

/// NRM-01: an edge endpoint node exists but carries no usable airport.
///
/// Reported once per node, at the node, however many edges use it.
pub struct Nrm01;

impl CheckRule for Nrm01 {
    fn id(&self) -> RuleId {
        RuleId::Nrm01
    }

    fn check(&self, graph: &ItineraryGraph, config: &NormalizeConfig, diags: &mut Vec<Diagnostic>) {
        let nodes = node_map(graph);
        let mut reported: HashSet<&str> = HashSet::new();
        for edge in &graph.edges {
            for end in [edge.source.as_str(), edge.target.as_str()] {
                let Some(node) = nodes.get(end) else {
                    continue;
                };
                if node.primary_airport().is_some() || !reported.insert(end) {
                    continue;
                }
                diags.push(Diagnostic::new(
                    self.id(),
                    self.severity(),
                    Location::Node {
                        node_id: node.id.clone(),
                    },
                    format!(
                        "{:?} node has no airport; {}",
                        node.kind,
                        missing_airport_outcome(config)
                    ),
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// NRM-02
// ---------------------------------------------------------------------------

/// NRM-02: an edge references a node id absent from the node set.
pub struct Nrm02;

impl CheckRule for Nrm02 {
    fn id(&self) -> RuleId {
        RuleId::Nrm02
    }

    fn check(&self, graph: &ItineraryGraph, config: &NormalizeConfig, diags: &mut Vec<Diagnostic>) {
        let nodes = node_map(graph);
        for edge in &graph.edges {
            for (field, end) in [("source", &edge.source), ("target", &edge.target)] {
                if nodes.contains_key(end.as_str()) {
                    continue;
                }
                diags.push(Diagnostic::new(
                    self.id(),
                    self.severity(),
                    Location::edge_field(edge.id.as_str(), field),
                    format!(
                        "references unknown node {end:?}; {}",
                        missing_airport_outcome(config)
                    ),
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// NRM-03
// ---------------------------------------------------------------------------

/// NRM-03: an edge's date range ends before it starts.
pub struct Nrm03;

impl CheckRule for Nrm03 {
    fn id(&self) -> RuleId {
        RuleId::Nrm03
    }

    fn check(&self, graph: &ItineraryGraph, config: &NormalizeConfig, diags: &mut Vec<Diagnostic>) {
        let outcome = match config.inverted_range {
            DateRangePolicy::Permissive => "kept as given",
            DateRangePolicy::Reject => "normalization will reject it",
            DateRangePolicy::Swap => "start and end are swapped",
            DateRangePolicy::Clamp => "end is clamped to start",
        };
        for edge in &graph.edges {
            let Some(range) = edge.date_range.filter(|r| r.is_inverted()) else {
                continue;
            };
            diags.push(Diagnostic::new(
                self.id(),
                self.severity(),
                Location::edge_field(edge.id.as_str(), "dateRange"),
                format!(
                    "range ends {} before it starts {}; {outcome}",
                    range.end, range.start
                ),
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// NRM-04
// ---------------------------------------------------------------------------

/// NRM-04: an edge has no usable date range and takes the fallback date.
///
/// Covers both an absent range and range text that is not two calendar
/// dates, such as the empty strings of untouched date pickers.
pub struct Nrm04;

impl CheckRule for Nrm04 {
    fn id(&self) -> RuleId {
        RuleId::Nrm04
    }

    fn check(&self, graph: &ItineraryGraph, config: &NormalizeConfig, diags: &mut Vec<Diagnostic>) {
        let fallback = config
            .fallback_date
            .map_or_else(|| "today's date".to_owned(), |d| d.to_string());
        let fallback_outcome = format!("{fallback} is used for both ends");
        for edge in graph.edges.iter().filter(|e| e.date_range.is_none()) {
            let message = match &edge.malformed_date_range {
                None => format!("no date range; {fallback_outcome}"),
                Some(raw) => {
                    let outcome = match config.inverted_range {
                        DateRangePolicy::Reject => "normalization will reject it",
                        DateRangePolicy::Permissive
                        | DateRangePolicy::Swap
                        | DateRangePolicy::Clamp => fallback_outcome.as_str(),
                    };
                    format!("date range {raw} is not two YYYY-MM-DD dates; {outcome}")
                }
            };
            diags.push(Diagnostic::new(
                self.id(),
                self.severity(),
                Location::edge_field(edge.id.as_str(), "dateRange"),
                message,
            ));
        }
    }
}
