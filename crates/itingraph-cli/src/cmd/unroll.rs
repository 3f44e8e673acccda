//! Implementation of `itingraph unroll <file> <airport>`.
//!
//! Prints every time-ordered route starting at an airport, one per line on
//! stdout. The graph is validated first; an itinerary with an impossible
//! cycle is refused with exit code 1.
use std::io::Write;

use chrono::NaiveDateTime;
use itingraph_core::unroll;
use tracing::debug;

use crate::cli::{DocumentArgs, LimitArgs};
use crate::cmd::{normalize_document, parse_document};
use crate::error::CliError;
use crate::format::{FormatterConfig, write_itinerary};

/// Route parameters for [`run`].
#[derive(Debug, Clone, Copy)]
pub struct RouteArgs<'a> {
    /// Airport code the routes start from.
    pub airport: &'a str,
    /// First legs must depart strictly after this instant.
    pub start_time: Option<NaiveDateTime>,
    /// Maximum legs per route.
    pub max_depth: usize,
}

/// Runs the `unroll` command against the process's stdout and stderr.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] or [`CliError::InvalidDateFormat`] (exit 2).
/// - [`CliError::NormalizationRejected`] or [`CliError::UnrollRefused`]
///   (exit 1).
pub fn run(
    content: &str,
    route: RouteArgs<'_>,
    document: &DocumentArgs,
    limits: &LimitArgs,
    fmt: &FormatterConfig,
) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    run_with(
        content,
        route,
        document,
        limits,
        fmt,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

/// [`run`] with explicit output streams.
///
/// # Errors
///
/// See [`run`].
pub fn run_with<O: Write, E: Write>(
    content: &str,
    route: RouteArgs<'_>,
    document: &DocumentArgs,
    limits: &LimitArgs,
    fmt: &FormatterConfig,
    out: &mut O,
    err: &mut E,
) -> Result<(), CliError> {
    let graph = parse_document(content)?;
    let style = document.date_style()?;
    let flights = normalize_document(&graph, document, err)?;

    let start_time = route.start_time.unwrap_or(NaiveDateTime::MIN);
    let routes = unroll(
        &flights,
        route.airport,
        start_time,
        route.max_depth,
        &limits.validator_config(),
    )
    .map_err(|e| CliError::UnrollRefused {
        detail: e.to_string(),
    })?;
    debug!(airport = route.airport, routes = routes.len(), "unrolled");

    for itinerary in &routes {
        write_itinerary(out, itinerary, &style, fmt)
            .map_err(|e| CliError::write_failed("stdout", &e))?;
    }
    Ok(())
}
