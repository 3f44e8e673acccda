/// Output formatting: human-readable and JSON (NDJSON) modes.
///
/// Diagnostics and summaries go to stderr; verdicts, cycle listings and
/// itineraries go to stdout. Human mode colors severity tags unless
/// `--no-color` is set, `NO_COLOR` is present (per <https://no-color.org>),
/// or stderr is not a TTY. JSON mode writes one object per line.
use std::io::{IsTerminal as _, Write};
use std::time::Duration;

use itingraph_core::{
    Cycle, DateStyle, Diagnostic, Itinerary, Severity, ValidationResult, format_cycle,
    format_flights,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Output mode, mirroring the `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Human-readable, optionally colored output.
    Human,
    /// One JSON object per line.
    Json,
}

/// Formatter settings derived from the global CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Output mode.
    pub mode: FormatMode,
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress warnings and summaries.
    pub quiet: bool,
    /// Emit timing lines.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Builds a config from the raw flags. Color detection also checks the
    /// `NO_COLOR` env var and the stderr TTY state.
    pub fn from_flags(mode: FormatMode, no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            mode,
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colors {
            format!("{color}{text}{ANSI_RESET}")
        } else {
            text.to_owned()
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics (stderr)
// ---------------------------------------------------------------------------

/// Writes one [`Diagnostic`].
///
/// Human: `[E] CYC-01  edge "e2": cycle is not time-respecting: ...`.
/// JSON: the serialized diagnostic. Warnings are dropped in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_diagnostic<W: Write>(
    writer: &mut W,
    diag: &Diagnostic,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && diag.severity == Severity::Warning {
        return Ok(());
    }
    match config.mode {
        FormatMode::Human => {
            let (tag, color) = match diag.severity {
                Severity::Error => ("[E]", ANSI_RED),
                Severity::Warning => ("[W]", ANSI_YELLOW),
            };
            writeln!(
                writer,
                "{tag} {rule_id}  {location}: {message}",
                tag = config.paint(color, tag),
                rule_id = diag.rule_id,
                location = diag.location,
                message = diag.message,
            )
        }
        FormatMode::Json => {
            serde_json::to_writer(&mut *writer, diag)?;
            writeln!(writer)
        }
    }
}

/// Writes the `N errors, M warnings` summary. Suppressed in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary<W: Write>(
    writer: &mut W,
    errors: usize,
    warnings: usize,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    match config.mode {
        FormatMode::Human => writeln!(
            writer,
            "{errors} {}, {warnings} {}",
            pluralize(errors, "error", "errors"),
            pluralize(warnings, "warning", "warnings"),
        ),
        FormatMode::Json => writeln!(
            writer,
            "{}",
            json!({ "summary": { "errors": errors, "warnings": warnings } })
        ),
    }
}

/// Writes `"<label> in <n>ms"` in verbose human mode; a no-op otherwise.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing<W: Write>(
    writer: &mut W,
    label: &str,
    duration: Duration,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if !config.verbose || config.mode == FormatMode::Json {
        return Ok(());
    }
    writeln!(writer, "{label} in {}ms", duration.as_millis())
}

// ---------------------------------------------------------------------------
// Results (stdout)
// ---------------------------------------------------------------------------

/// Writes the validation verdict.
///
/// Human: `valid (N cycles)`, `invalid: <cycle>` or `invalid: <limit>`.
/// JSON: the serialized [`ValidationResult`].
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_verdict<W: Write>(
    writer: &mut W,
    result: &ValidationResult,
    style: &DateStyle,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    match config.mode {
        FormatMode::Human => {
            if result.valid {
                let n = result.cycles().len();
                writeln!(writer, "valid ({n} {})", pluralize(n, "cycle", "cycles"))
            } else if let Some(limit) = &result.limit_exceeded {
                writeln!(writer, "invalid: {limit}")
            } else {
                writeln!(
                    writer,
                    "invalid: {}",
                    format_cycle(result.invalid_cycle.as_ref(), style)
                )
            }
        }
        FormatMode::Json => {
            serde_json::to_writer(&mut *writer, result)?;
            writeln!(writer)
        }
    }
}

/// Writes one enumerated cycle with its time-respecting status.
///
/// Human: `ok    <cycle>` or `FAIL  <cycle>`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_cycle<W: Write>(
    writer: &mut W,
    cycle: &Cycle,
    style: &DateStyle,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    let respecting = cycle.is_time_respecting();
    let rendered = format_cycle(Some(cycle), style);
    match config.mode {
        FormatMode::Human => {
            let tag = if respecting {
                config.paint(ANSI_GREEN, "ok  ")
            } else {
                config.paint(ANSI_RED, "FAIL")
            };
            writeln!(writer, "{tag}  {rendered}")
        }
        FormatMode::Json => writeln!(
            writer,
            "{}",
            json!({
                "timeRespecting": respecting,
                "display": rendered,
                "flights": cycle.flights(),
            })
        ),
    }
}

/// Writes one unrolled itinerary.
///
/// Human: the legs rendered like a cycle, or the bare start airport when no
/// leg could be flown. JSON: `{"stops": [...]}`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_itinerary<W: Write>(
    writer: &mut W,
    itinerary: &Itinerary,
    style: &DateStyle,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    match config.mode {
        FormatMode::Human if itinerary.is_empty() => writeln!(writer, "{}", itinerary.start),
        FormatMode::Human => writeln!(writer, "{}", format_flights(&itinerary.flights, style)),
        FormatMode::Json => writeln!(writer, "{}", json!({ "stops": itinerary.stops() })),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
