/// Validated newtype wrappers for the string-shaped values that cross the
/// graph-editor boundary.
///
/// [`CalendarDate`] enforces both the `YYYY-MM-DD` shape and calendar
/// validity at construction time via [`TryFrom<&str>`]; its `Deserialize`
/// impl re-runs the check so malformed dates cannot enter the type system from
/// untrusted JSON. [`AirportCode`] is deliberately unvalidated: codes are not
/// checked against any airport list, and the normalizer's `"Unknown"` sentinel
/// must be representable.
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing a validated newtype from an invalid string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewtypeError {
    /// The string did not match the expected format.
    InvalidFormat {
        /// Name of the type that rejected the input.
        type_name: &'static str,
        /// A human-readable description of the expected format.
        expected: &'static str,
        /// The input that was rejected.
        got: String,
    },
}

impl fmt::Display for NewtypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat {
                type_name,
                expected,
                got,
            } => write!(f, "invalid {type_name}: expected {expected}, got {got:?}"),
        }
    }
}

impl std::error::Error for NewtypeError {}

/// Matches `YYYY-MM-DD`.
static CALENDAR_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap_or_else(|_| unreachable!("regex engine broken"))
});

// ---------------------------------------------------------------------------
// CalendarDate
// ---------------------------------------------------------------------------

/// ISO 8601 calendar date in `YYYY-MM-DD` format, as produced by the date
/// pickers on graph edges.
///
/// Unlike a bare shape check, construction also rejects impossible dates
/// (`2024-02-30`), so every `CalendarDate` converts to a [`NaiveDate`]
/// infallibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Wraps an already-valid [`NaiveDate`].
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns the underlying [`NaiveDate`].
    pub fn naive(self) -> NaiveDate {
        self.0
    }
}

impl TryFrom<&str> for CalendarDate {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let invalid = || NewtypeError::InvalidFormat {
            type_name: "CalendarDate",
            expected: "YYYY-MM-DD (e.g. 2024-01-31)",
            got: s.to_owned(),
        };
        if !CALENDAR_DATE_RE.is_match(s) {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// AirportCode
// ---------------------------------------------------------------------------

/// A short airport identifier such as `"SFO"`.
///
/// Graph nodes are keyed by airport code, so two editor nodes carrying the
/// same code collapse into one graph node. Nodes with no usable airport all
/// map to [`AirportCode::UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirportCode(String);

impl AirportCode {
    /// Sentinel used when an edge endpoint has no node or no airport.
    pub const UNKNOWN: &'static str = "Unknown";

    /// Returns the [`AirportCode::UNKNOWN`] sentinel code.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_owned())
    }

    /// Returns `true` if this is the [`AirportCode::UNKNOWN`] sentinel.
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AirportCode {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

impl From<String> for AirportCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl Deref for AirportCode {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AirportCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for AirportCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
