//! Implementation of `itingraph validate <file>`.
//!
//! Parses a graph document, runs the lint pass and the cycle validator, and
//! reports. Diagnostics and the summary go to stderr; the verdict goes to
//! stdout.
//!
//! Exit codes:
//! - 0 = every cycle can be flown in order
//! - 1 = an invalid cycle, a limit hit, or a strict rejection
//! - 2 = the input could not be read or parsed
use std::io::Write;
use std::time::Instant;

use itingraph_core::{CheckConfig, check};

use crate::cli::{DocumentArgs, LimitArgs};
use crate::cmd::parse_document;
use crate::error::CliError;
use crate::format::{FormatterConfig, write_diagnostic, write_summary, write_timing, write_verdict};

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Runs the `validate` command against the process's stdout and stderr.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] or [`CliError::InvalidDateFormat`] (exit 2).
/// - [`CliError::InvalidItinerary`] or [`CliError::NormalizationRejected`]
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
    let config = CheckConfig {
        run_lint: true,
        normalize: document.normalize_config(),
        validator: limits.validator_config(),
        date_style: document.date_style()?,
    };

    let started = Instant::now();
    let report = check(&graph, &config);
    let stderr_err = |e: std::io::Error| CliError::write_failed("stderr", &e);
    write_timing(err, "checked", started.elapsed(), fmt).map_err(stderr_err)?;

    for diag in &report.diagnostics {
        write_diagnostic(err, diag, fmt).map_err(stderr_err)?;
    }
    write_summary(err, report.errors().count(), report.warnings().count(), fmt)
        .map_err(stderr_err)?;

    let Some(result) = &report.validation else {
        return Err(CliError::NormalizationRejected);
    };
    write_verdict(out, result, &config.date_style, fmt)
        .map_err(|e| CliError::write_failed("stdout", &e))?;

    if result.valid {
        Ok(())
    } else {
        Err(CliError::InvalidItinerary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
