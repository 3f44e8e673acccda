/// Human-readable rendering of cycles.
///
/// Each leg renders as `SRC (dep) → DST (arr)` and legs are joined with
/// `" → "`. Dates are rendered through a [`DateStyle`], a validated chrono
/// `strftime` pattern. Rendering never affects validation.
use std::fmt::{self, Write as _};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;

use crate::flight::{Cycle, FlightRecord};

/// Rendered in place of an absent or empty cycle.
pub const EMPTY_CYCLE: &str = "Empty cycle";

const LEG_SEPARATOR: &str = " → ";

// ---------------------------------------------------------------------------
// DateStyle
// ---------------------------------------------------------------------------

/// Error returned for a `strftime` pattern chrono cannot render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateStyle {
    /// The rejected pattern.
    pub pattern: String,
}

impl fmt::Display for InvalidDateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date format pattern {:?}", self.pattern)
    }
}

impl std::error::Error for InvalidDateStyle {}

/// Date presentation used when rendering cycles.
///
/// Only the date part of each instant is meant to be shown, but any chrono
/// `strftime` pattern is accepted, including time specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStyle {
    pattern: String,
}

impl DateStyle {
    /// ISO calendar date.
    pub const DEFAULT_PATTERN: &'static str = "%Y-%m-%d";

    /// Creates a style from a chrono `strftime` pattern.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDateStyle`] when the pattern contains a specifier
    /// chrono does not recognise.
    pub fn new(pattern: impl Into<String>) -> Result<Self, InvalidDateStyle> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(InvalidDateStyle { pattern });
        }
        Ok(Self { pattern })
    }

    /// The underlying pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Writes `instant` in this style.
    ///
    /// # Errors
    ///
    /// Propagates formatter errors from `out`.
    pub fn write_instant<W: fmt::Write>(&self, out: &mut W, instant: NaiveDateTime) -> fmt::Result {
        write!(out, "{}", instant.format(&self.pattern))
    }
}

impl Default for DateStyle {
    fn default() -> Self {
        Self {
            pattern: Self::DEFAULT_PATTERN.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Renders a flight sequence, or [`EMPTY_CYCLE`] when it has no flights.
pub fn format_flights(flights: &[FlightRecord], style: &DateStyle) -> String {
    if flights.is_empty() {
        return EMPTY_CYCLE.to_owned();
    }
    let mut out = String::new();
    if write_flights(&mut out, flights, style).is_err() {
        // Writing into a String only fails if chrono rejects the pattern,
        // which DateStyle::new already ruled out.
        return EMPTY_CYCLE.to_owned();
    }
    out
}

/// Renders `cycle`, or [`EMPTY_CYCLE`] when absent.
///
/// ```
/// # use itingraph_core::{format_cycle, DateStyle};
/// assert_eq!(format_cycle(None, &DateStyle::default()), "Empty cycle");
/// ```
pub fn format_cycle(cycle: Option<&Cycle>, style: &DateStyle) -> String {
    match cycle {
        Some(c) => format_flights(c.flights(), style),
        None => EMPTY_CYCLE.to_owned(),
    }
}

fn write_flights<W: fmt::Write>(
    out: &mut W,
    flights: &[FlightRecord],
    style: &DateStyle,
) -> fmt::Result {
    for (i, flight) in flights.iter().enumerate() {
        if i > 0 {
            out.write_str(LEG_SEPARATOR)?;
        }
        write!(out, "{} (", flight.source)?;
        style.write_instant(out, flight.departure)?;
        write!(out, "){LEG_SEPARATOR}{} (", flight.target)?;
        style.write_instant(out, flight.arrival)?;
        out.write_char(')')?;
    }
    Ok(())
}
