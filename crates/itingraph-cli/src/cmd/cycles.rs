//! Implementation of `itingraph cycles <file>`.
//!
//! Lists every distinct cycle of the flight graph, one per line on stdout,
//! marked with whether it can be flown in order. The listing is not a
//! verdict: a failing cycle still exits 0. Use `validate` for that.
use std::io::Write;
use std::time::Instant;

use itingraph_core::{LimitExceeded, find_cycles};
use serde_json::json;

use crate::cli::{DocumentArgs, LimitArgs};
use crate::cmd::{normalize_document, parse_document};
use crate::error::CliError;
use crate::format::{FormatMode, FormatterConfig, write_cycle, write_timing};

/// Runs the `cycles` command against the process's stdout and stderr.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] or [`CliError::InvalidDateFormat`] (exit 2).
/// - [`CliError::NormalizationRejected`] or [`CliError::LimitExceeded`]
///   (exit 1).
pub fn run(
    content: &str,
    document: &DocumentArgs,
    limits: &LimitArgs,
    fmt: &FormatterConfig,
) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    run_with(
        content,
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
    document: &DocumentArgs,
    limits: &LimitArgs,
    fmt: &FormatterConfig,
    out: &mut O,
    err: &mut E,
) -> Result<(), CliError> {
    let graph = parse_document(content)?;
    let style = document.date_style()?;
    let flights = normalize_document(&graph, document, err)?;

    let config = limits.validator_config();
    if flights.len() > config.max_flights {
        let limit = LimitExceeded::TooManyFlights {
            count: flights.len(),
            limit: config.max_flights,
        };
        return Err(CliError::LimitExceeded {
            detail: limit.to_string(),
        });
    }

    let started = Instant::now();
    let cycles = find_cycles(&flights, &config.budget).map_err(|e| CliError::LimitExceeded {
        detail: e.to_string(),
    })?;
    let stderr_err = |e: std::io::Error| CliError::write_failed("stderr", &e);
    write_timing(err, "enumerated", started.elapsed(), fmt).map_err(stderr_err)?;

    for cycle in &cycles {
        write_cycle(out, cycle, &style, fmt).map_err(|e| CliError::write_failed("stdout", &e))?;
    }

    if !fmt.quiet {
        let failing = cycles.iter().filter(|c| !c.is_time_respecting()).count();
        let written = match fmt.mode {
            FormatMode::Human => writeln!(
                err,
                "{} cycles, {failing} not time-respecting",
                cycles.len()
            ),
            FormatMode::Json => writeln!(
                err,
                "{}",
                json!({ "summary": { "cycles": cycles.len(), "failing": failing } })
            ),
        };
        written.map_err(stderr_err)?;
    }
    Ok(())
}
