/// Diagnostics for itinerary documents.
///
/// [`check`] runs the document rules in [`super::rules_nrm`], then normalizes
/// and validates the document, and reports everything it found as
/// [`Diagnostic`] values. It never fails fast: all lint findings are collected
/// even when normalization is later rejected.
///
/// | Code     | Severity | Finding                                          |
/// |----------|----------|--------------------------------------------------|
/// | `NRM-01` | Warning  | endpoint node has no airport                     |
/// | `NRM-02` | Warning  | edge references a node that does not exist       |
/// | `NRM-03` | Warning  | edge date range ends before it starts            |
/// | `NRM-04` | Warning  | edge has no usable date range                    |
/// | `NRM-05` | Error    | normalization rejected by a strict policy        |
/// | `CYC-01` | Error    | a cycle is not time-respecting                   |
/// | `CYC-02` | Error    | a validation limit was hit                       |
use std::fmt;

use serde::Serialize;

use crate::format::{DateStyle, format_cycle};
use crate::normalize::{NormalizeConfig, NormalizeError, normalize};
use crate::structures::ItineraryGraph;

use super::rules_nrm::{Nrm01, Nrm02, Nrm03, Nrm04};
use super::{ValidationResult, ValidatorConfig, validate};

// ---------------------------------------------------------------------------
// Diagnostic types
// ---------------------------------------------------------------------------

/// The severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The itinerary is invalid or could not be checked.
    Error,
    /// The document was coerced into something checkable.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::Warning => f.write_str("Warning"),
        }
    }
}

/// Machine-readable identifier for a check rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    /// Endpoint node has no airport.
    Nrm01,
    /// Edge references a missing node.
    Nrm02,
    /// Inverted date range.
    Nrm03,
    /// Missing date range.
    Nrm04,
    /// Strict normalization rejection.
    Nrm05,
    /// Cycle not time-respecting.
    Cyc01,
    /// Validation limit exceeded.
    Cyc02,
}

impl RuleId {
    /// Returns the hyphenated rule code, e.g. `"NRM-03"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Nrm01 => "NRM-01",
            Self::Nrm02 => "NRM-02",
            Self::Nrm03 => "NRM-03",
            Self::Nrm04 => "NRM-04",
            Self::Nrm05 => "NRM-05",
            Self::Cyc01 => "CYC-01",
            Self::Cyc02 => "CYC-02",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.code())
    }
}

/// Where in the document a finding applies. Ids are editor ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Location {
    /// A node.
    Node {
        /// The node id.
        #[serde(rename = "nodeId")]
        node_id: String,
    },
    /// An edge, or one field of it.
    Edge {
        /// The edge id.
        #[serde(rename = "edgeId")]
        edge_id: String,
        /// The edge field, if the finding is about one.
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<&'static str>,
    },
    /// The document as a whole.
    Global,
}

impl Location {
    /// Location of a whole edge.
    pub fn edge(edge_id: impl Into<String>) -> Self {
        Self::Edge {
            edge_id: edge_id.into(),
            field: None,
        }
    }

    /// Location of one field of an edge.
    pub fn edge_field(edge_id: impl Into<String>, field: &'static str) -> Self {
        Self::Edge {
            edge_id: edge_id.into(),
            field: Some(field),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node { node_id } => write!(f, "node \"{node_id}\""),
            Self::Edge {
                edge_id,
                field: None,
            } => write!(f, "edge \"{edge_id}\""),
            Self::Edge {
                edge_id,
                field: Some(field),
            } => write!(f, "edge \"{edge_id}\" field \"{field}\""),
            Self::Global => f.write_str("(global)"),
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// The rule that produced this finding.
    pub rule_id: RuleId,
    /// The severity of this finding.
    pub severity: Severity,
    /// Where the finding applies.
    pub location: Location,
    /// A human-readable explanation.
    pub message: String,
}

impl Diagnostic {
    /// Constructs a new [`Diagnostic`].
    pub fn new(
        rule_id: RuleId,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_char = match self.severity {
            Severity::Error => 'E',
            Severity::Warning => 'W',
        };
        write!(
            f,
            "[{level_char}] {} {}: {}",
            self.rule_id, self.location, self.message
        )
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A stateless document rule.
///
/// Rules push zero or more [`Diagnostic`] values into `diags`. They receive the
/// normalizer configuration so their messages can say what the normalizer
/// will do about the finding.
pub trait CheckRule {
    /// The unique identifier for this rule.
    fn id(&self) -> RuleId;

    /// The severity of diagnostics produced by this rule.
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// Inspect `graph` and push any findings into `diags`.
    fn check(&self, graph: &ItineraryGraph, config: &NormalizeConfig, diags: &mut Vec<Diagnostic>);
}

/// Returns the document rules in reporting order.
pub fn build_registry() -> Vec<Box<dyn CheckRule>> {
    vec![
        Box::new(Nrm01),
        Box::new(Nrm02),
        Box::new(Nrm03),
        Box::new(Nrm04),
    ]
}

// ---------------------------------------------------------------------------
// Configuration and report
// ---------------------------------------------------------------------------

/// Settings for a [`check`] pass.
///
/// # Default
///
/// ```
/// # use itingraph_core::CheckConfig;
/// let cfg = CheckConfig::default();
/// assert!(cfg.run_lint);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Run the `NRM-01`..`NRM-04` document rules. Default `true`.
    pub run_lint: bool,
    /// Normalizer policies.
    pub normalize: NormalizeConfig,
    /// Validator limits.
    pub validator: ValidatorConfig,
    /// Date rendering for cycles quoted in messages.
    pub date_style: DateStyle,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            run_lint: true,
            normalize: NormalizeConfig::default(),
            validator: ValidatorConfig::default(),
            date_style: DateStyle::default(),
        }
    }
}

/// Everything a [`check`] pass found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckReport {
    /// All findings, lint rules first.
    pub diagnostics: Vec<Diagnostic>,
    /// The validator verdict; `None` when normalization was rejected.
    pub validation: Option<ValidationResult>,
}

impl CheckReport {
    /// Returns `true` if any diagnostic has [`Severity::Error`].
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` when validation ran and the itinerary is valid.
    pub fn is_valid(&self) -> bool {
        self.validation.as_ref().is_some_and(|v| v.valid)
    }

    /// Returns an iterator over all diagnostics with [`Severity::Error`].
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Returns an iterator over all diagnostics with [`Severity::Warning`].
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Returns an iterator over all diagnostics produced by the given rule.
    pub fn by_rule(&self, rule: RuleId) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.rule_id == rule)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Lints, normalizes and validates `graph`.
pub fn check(graph: &ItineraryGraph, config: &CheckConfig) -> CheckReport {
    let mut diags: Vec<Diagnostic> = Vec::new();
    if config.run_lint {
        for rule in build_registry() {
            rule.check(graph, &config.normalize, &mut diags);
        }
    }

    let flights = match normalize(graph, &config.normalize) {
        Ok(flights) => flights,
        Err(err) => {
            diags.push(rejection_diagnostic(&err));
            return CheckReport {
                diagnostics: diags,
                validation: None,
            };
        }
    };

    let result = validate(&flights, &config.validator);
    if let Some(cycle) = &result.invalid_cycle {
        let leg = cycle
            .first_violation()
            .and_then(|i| cycle.flights().get(i))
            .or_else(|| cycle.flights().first());
        let location = leg.map_or(Location::Global, |f| Location::edge(f.id.as_str()));
        diags.push(Diagnostic::new(
            RuleId::Cyc01,
            Severity::Error,
            location,
            format!(
                "cycle is not time-respecting: {}",
                format_cycle(Some(cycle), &config.date_style)
            ),
        ));
    }
    if let Some(limit) = &result.limit_exceeded {
        diags.push(Diagnostic::new(
            RuleId::Cyc02,
            Severity::Error,
            Location::Global,
            format!("itinerary could not be validated: {limit}"),
        ));
    }

    CheckReport {
        diagnostics: diags,
        validation: Some(result),
    }
}

fn rejection_diagnostic(err: &NormalizeError) -> Diagnostic {
    let location = match err {
        NormalizeError::MissingAirport { edge_id, .. } => Location::edge(edge_id.as_str()),
        NormalizeError::InvertedDateRange { edge_id, .. }
        | NormalizeError::MalformedDateRange { edge_id, .. } => {
            Location::edge_field(edge_id.as_str(), "dateRange")
        }
    };
    Diagnostic::new(RuleId::Nrm05, Severity::Error, location, err.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::normalize::{DateRangePolicy, MissingAirportPolicy};
    use crate::structures::{GraphEdge, GraphNode, RawDateRange};
    use crate::test_helpers::{date, edge};

    fn nodes() -> Vec<GraphNode> {
        vec![GraphNode::airport("a", &["AAA"]), GraphNode::airport("b", &["BBB"])]
    }

    #[test]
    fn rule_codes() {
        assert_eq!(RuleId::Nrm01.code(), "NRM-01");
        assert_eq!(RuleId::Nrm05.code(), "NRM-05");
        assert_eq!(RuleId::Cyc01.to_string(), "CYC-01");
        assert_eq!(RuleId::Cyc02.code(), "CYC-02");
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(
            RuleId::Nrm03,
            Severity::Warning,
            Location::edge_field("e1", "dateRange"),
            "range is inverted",
        );
        assert_eq!(
            d.to_string(),
            "[W] NRM-03 edge \"e1\" field \"dateRange\": range is inverted"
        );
        assert_eq!(Location::Global.to_string(), "(global)");
    }

    #[test]
    fn clean_round_trip_has_no_diagnostics() {
        let g = ItineraryGraph::new(
            nodes(),
            vec![
                edge("e1", "a", "b", "2024-01-01", "2024-01-01"),
                edge("e2", "b", "a", "2024-01-02", "2024-01-02"),
            ],
        );
        let report = check(&g, &CheckConfig::default());
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert!(report.is_valid());
        assert!(!report.has_errors());
    }

    #[test]
    fn time_paradox_reports_violating_leg() {
        let g = ItineraryGraph::new(
            nodes(),
            vec![
                edge("e1", "a", "b", "2024-01-05", "2024-01-05"),
                edge("e2", "b", "a", "2024-01-01", "2024-01-01"),
            ],
        );
        let report = check(&g, &CheckConfig::default());
        assert!(report.has_errors());
        assert!(!report.is_valid());
        let d = report.by_rule(RuleId::Cyc01).next().expect("CYC-01 present");
        assert_eq!(d.location, Location::edge("e2"));
        assert!(d.message.contains("AAA (2024-01-05) → BBB (2024-01-05)"));
    }

    #[test]
    fn permissive_coercions_are_warnings() {
        let mut undated = GraphEdge::new(
            "e3",
            "a",
            "b",
            crate::structures::DateRange::single(date("2024-01-01")),
        );
        undated.date_range = None;
        let g = ItineraryGraph::new(
            vec![GraphNode::airport("a", &["AAA"]), GraphNode::airport("empty", &[])],
            vec![
                edge("e1", "a", "empty", "2024-01-01", "2024-01-01"),
                edge("e2", "a", "ghost", "2024-01-05", "2024-01-02"),
                undated,
            ],
        );
        let cfg = CheckConfig {
            normalize: NormalizeConfig {
                fallback_date: Some(date("2024-06-01")),
                ..NormalizeConfig::default()
            },
            ..CheckConfig::default()
        };
        let report = check(&g, &cfg);
        let codes: Vec<&str> = report.warnings().map(|d| d.rule_id.code()).collect();
        assert_eq!(codes, ["NRM-01", "NRM-02", "NRM-03", "NRM-04"]);
        assert_eq!(report.errors().count(), 0);
        assert!(report.validation.is_some());
    }

    #[test]
    fn strict_rejection_is_an_error_without_verdict() {
        let g = ItineraryGraph::new(
            nodes(),
            vec![edge("e1", "a", "b", "2024-01-05", "2024-01-02")],
        );
        let cfg = CheckConfig {
            normalize: NormalizeConfig {
                inverted_range: DateRangePolicy::Reject,
                missing_airport: MissingAirportPolicy::Sentinel,
                fallback_date: None,
            },
            ..CheckConfig::default()
        };
        let report = check(&g, &cfg);
        assert!(report.validation.is_none());
        let d = report.by_rule(RuleId::Nrm05).next().expect("NRM-05 present");
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.location, Location::edge_field("e1", "dateRange"));
        // Lint findings are still collected.
        assert_eq!(report.by_rule(RuleId::Nrm03).count(), 1);
    }

    #[test]
    fn empty_range_strings_warn_then_strict_rejects() {
        let g = ItineraryGraph::new(
            nodes(),
            vec![GraphEdge::with_malformed_range(
                "e1",
                "a",
                "b",
                RawDateRange::new("", ""),
            )],
        );
        let cfg = CheckConfig {
            normalize: NormalizeConfig {
                fallback_date: Some(date("2024-06-01")),
                ..NormalizeConfig::default()
            },
            ..CheckConfig::default()
        };
        let report = check(&g, &cfg);
        assert!(report.is_valid());
        assert_eq!(report.by_rule(RuleId::Nrm04).count(), 1);
        assert_eq!(report.errors().count(), 0);

        let strict = CheckConfig {
            normalize: NormalizeConfig::strict(),
            ..CheckConfig::default()
        };
        let report = check(&g, &strict);
        assert!(report.validation.is_none());
        let d = report.by_rule(RuleId::Nrm05).next().expect("NRM-05 present");
        assert_eq!(d.location, Location::edge_field("e1", "dateRange"));
    }

    #[test]
    fn limit_exceeded_is_global_error() {
        let g = ItineraryGraph::new(
            nodes(),
            vec![
                edge("e1", "a", "b", "2024-01-01", "2024-01-01"),
                edge("e2", "b", "a", "2024-01-02", "2024-01-02"),
            ],
        );
        let cfg = CheckConfig {
            validator: ValidatorConfig {
                max_flights: 1,
                ..ValidatorConfig::default()
            },
            ..CheckConfig::default()
        };
        let report = check(&g, &cfg);
        let d = report.by_rule(RuleId::Cyc02).next().expect("CYC-02 present");
        assert_eq!(d.location, Location::Global);
        assert!(!report.is_valid());
    }

    #[test]
    fn lint_can_be_disabled() {
        let g = ItineraryGraph::new(
            vec![],
            vec![edge("e1", "x", "y", "2024-01-01", "2024-01-01")],
        );
        let cfg = CheckConfig {
            run_lint: false,
            ..CheckConfig::default()
        };
        let report = check(&g, &cfg);
        assert!(report.diagnostics.is_empty());
        assert!(report.is_valid());
    }

    #[test]
    fn diagnostic_serializes_with_code_and_location() {
        let d = Diagnostic::new(
            RuleId::Nrm02,
            Severity::Warning,
            Location::edge_field("e1", "target"),
            "missing node",
        );
        let v = serde_json::to_value(&d).expect("serialize");
        assert_eq!(v["ruleId"], "NRM-02");
        assert_eq!(v["severity"], "warning");
        assert_eq!(v["location"]["type"], "edge");
        assert_eq!(v["location"]["edgeId"], "e1");
        assert_eq!(v["location"]["field"], "target");
        assert!(v.get("rule_id").is_none());

        let node = serde_json::to_value(Location::Node {
            node_id: "n1".to_owned(),
        })
        .expect("serialize");
        assert_eq!(node["nodeId"], "n1");
    }
}
