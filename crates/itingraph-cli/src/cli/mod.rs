//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use itingraph_core::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_FLIGHTS, DateRangePolicy, EnumerationBudget};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// One JSON object per line.
    Json,
}

/// Handling of edges whose date range ends before it starts.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RangePolicy {
    /// Keep the range as given (default).
    Permissive,
    /// Refuse the document.
    Reject,
    /// Exchange start and end.
    Swap,
    /// Collapse the range to its start day.
    Clamp,
}

impl From<RangePolicy> for DateRangePolicy {
    fn from(policy: RangePolicy) -> Self {
        match policy {
            RangePolicy::Permissive => DateRangePolicy::Permissive,
            RangePolicy::Reject => DateRangePolicy::Reject,
            RangePolicy::Swap => DateRangePolicy::Swap,
            RangePolicy::Clamp => DateRangePolicy::Clamp,
        }
    }
}

/// Normalization and rendering flags shared by every subcommand that reads
/// a graph document.
#[derive(Args, Clone, Debug)]
pub struct DocumentArgs {
    /// Reject nodes without an airport and unusable date ranges.
    #[arg(long)]
    pub strict: bool,
    /// Inverted or malformed date range handling; overrides `--strict` for
    /// ranges.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub date_range_policy: Option<RangePolicy>,
    /// Date used for edges without a usable date range (default: today, UTC).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub fallback_date: Option<NaiveDate>,
    /// strftime pattern for dates in rendered cycles and routes.
    #[arg(long, default_value = "%Y-%m-%d", value_name = "PATTERN")]
    pub date_format: String,
}

/// Search limits shared by `validate`, `cycles` and `unroll`.
#[derive(Args, Clone, Copy, Debug)]
pub struct LimitArgs {
    /// Refuse inputs with more flights than this.
    #[arg(long, default_value_t = DEFAULT_MAX_FLIGHTS)]
    pub max_flights: usize,
    /// Give up after finding this many distinct cycles.
    #[arg(long, default_value_t = EnumerationBudget::DEFAULT_MAX_CYCLES)]
    pub max_cycles: usize,
    /// Give up after traversing this many flights.
    #[arg(long, default_value_t = EnumerationBudget::DEFAULT_MAX_STEPS)]
    pub max_steps: usize,
}

/// All top-level subcommands exposed by the `itingraph` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Check that every cycle in an itinerary graph can be flown in order.
    Validate {
        /// Path to a graph document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        #[command(flatten)]
        document: DocumentArgs,
        #[command(flatten)]
        limits: LimitArgs,
    },

    /// List every cycle with its time-respecting status.
    Cycles {
        /// Path to a graph document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        #[command(flatten)]
        document: DocumentArgs,
        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Print every time-ordered route starting at an airport.
    Unroll {
        /// Path to a graph document, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Airport code to start from.
        #[arg(value_name = "AIRPORT")]
        airport: String,
        /// Earliest instant the first leg may depart after (default: unbounded).
        #[arg(long, value_name = "DATETIME", value_parser = parse_start_time)]
        start_time: Option<NaiveDateTime>,
        /// Maximum legs per route.
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
        #[command(flatten)]
        document: DocumentArgs,
        #[command(flatten)]
        limits: LimitArgs,
    },
}

/// Root CLI struct for the `itingraph` binary.
///
/// Global flags are marked `global = true` so clap propagates them to every
/// subcommand.
#[derive(Parser)]
#[command(
    name = "itingraph",
    version,
    about = "Itinerary graph validator",
    long_about = "Validates dated flight itinerary graphs: every cycle of flights\n\
                  must be flyable in order, each leg departing after the previous\n\
                  one arrives. Also lists cycles and unrolls routes."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress warnings and summaries (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log search progress and print timings (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input size in bytes.
    ///
    /// Can also be set via `ITINGRAPH_MAX_FILE_SIZE`; the flag wins.
    /// Default: 16777216 (16 MiB).
    #[arg(
        long,
        global = true,
        env = "ITINGRAPH_MAX_FILE_SIZE",
        default_value = "16777216"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Accepts `YYYY-MM-DDTHH:MM[:SS]` or a bare `YYYY-MM-DD` (midnight).
fn parse_start_time(s: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    s.parse::<NaiveDate>()
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS], got {s:?}"))
}
