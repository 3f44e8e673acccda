/// Command modules for the `itingraph` CLI.
///
/// Each submodule implements one subcommand. Its `run` function takes the
/// input text and parsed arguments, writes results to stdout and diagnostics
/// to stderr, and returns a [`CliError`] carrying the exit code on failure.
pub mod cycles;
pub mod unroll;
pub mod validate;

use std::io::Write;

use itingraph_core::{
    CalendarDate, DateStyle, EnumerationBudget, FlightRecord, ItineraryGraph, NormalizeConfig,
    ValidatorConfig, normalize,
};
use tracing::debug;

use crate::cli::{DocumentArgs, LimitArgs};
use crate::error::CliError;

/// Parses `content` as a graph document.
///
/// # Errors
///
/// [`CliError::ParseFailed`] with line and column when the JSON does not
/// match the document schema.
pub fn parse_document(content: &str) -> Result<ItineraryGraph, CliError> {
    let graph: ItineraryGraph =
        serde_json::from_str(content).map_err(|e| CliError::ParseFailed {
            detail: format!("line {}, column {}: {e}", e.line(), e.column()),
        })?;
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "parsed document"
    );
    Ok(graph)
}

/// Normalizes `graph`, reporting a strict rejection on `err`.
///
/// # Errors
///
/// [`CliError::NormalizationRejected`] when a strict policy refuses the
/// document; [`CliError::IoError`] if `err` cannot be written.
pub fn normalize_document<E: Write>(
    graph: &ItineraryGraph,
    document: &DocumentArgs,
    err: &mut E,
) -> Result<Vec<FlightRecord>, CliError> {
    match normalize(graph, &document.normalize_config()) {
        Ok(flights) => Ok(flights),
        Err(e) => {
            writeln!(err, "{e}").map_err(|io| CliError::write_failed("stderr", &io))?;
            Err(CliError::NormalizationRejected)
        }
    }
}

impl DocumentArgs {
    /// The normalizer configuration selected by `--strict`,
    /// `--date-range-policy` and `--fallback-date`.
    pub fn normalize_config(&self) -> NormalizeConfig {
        let mut config = if self.strict {
            NormalizeConfig::strict()
        } else {
            NormalizeConfig::default()
        };
        if let Some(policy) = self.date_range_policy {
            config.inverted_range = policy.into();
        }
        config.fallback_date = self.fallback_date.map(CalendarDate::from_naive);
        config
    }

    /// The rendering style selected by `--date-format`.
    ///
    /// # Errors
    ///
    /// [`CliError::InvalidDateFormat`] for a malformed pattern.
    pub fn date_style(&self) -> Result<DateStyle, CliError> {
        DateStyle::new(self.date_format.as_str()).map_err(|e| CliError::InvalidDateFormat {
            pattern: e.pattern,
        })
    }
}

impl LimitArgs {
    /// The validator limits selected by `--max-flights`, `--max-cycles` and
    /// `--max-steps`.
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            max_flights: self.max_flights,
            budget: EnumerationBudget {
                max_cycles: self.max_cycles,
                max_steps: self.max_steps,
            },
        }
    }
}
