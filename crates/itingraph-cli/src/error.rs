/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `itingraph` binary. Every
/// variant maps to a stable exit code via [`CliError::exit_code`]:
///
/// - Exit code **2**: the input could not be read or parsed, or an argument
///   was unusable. Nothing was validated.
/// - Exit code **1**: the tool ran to completion and the itinerary failed
///   (invalid cycle, strict rejection, limit exceeded, unroll refused).
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `itingraph` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known (disk files only).
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// Any other I/O error, including failures writing output.
    IoError {
        /// The file or stream involved.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The input is not a graph document.
    ParseFailed {
        /// Parser message with line and column.
        detail: String,
    },

    /// `--date-format` is not a usable strftime pattern.
    InvalidDateFormat {
        /// The rejected pattern.
        pattern: String,
    },

    // --- Exit code 1: logical failures ---
    /// The itinerary has a cycle that is not time-respecting, or could not be
    /// checked within limits. Diagnostics have already been printed.
    InvalidItinerary,

    /// A strict normalization policy rejected the document. Diagnostics have
    /// already been printed.
    NormalizationRejected,

    /// Cycle enumeration ran out of budget.
    LimitExceeded {
        /// Which limit was hit.
        detail: String,
    },

    /// `unroll` refused the graph.
    UnrollRefused {
        /// The reason.
        detail: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::ParseFailed { .. }
            | Self::InvalidDateFormat { .. } => 2,

            Self::InvalidItinerary
            | Self::NormalizationRejected
            | Self::LimitExceeded { .. }
            | Self::UnrollRefused { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::ParseFailed { detail } => {
                format!("error: not an itinerary graph: {detail}")
            }
            Self::InvalidDateFormat { pattern } => {
                format!("error: invalid --date-format {pattern:?}")
            }
            Self::InvalidItinerary => {
                "error: itinerary contains a cycle that cannot be flown in order".to_owned()
            }
            Self::NormalizationRejected => {
                "error: document rejected by strict normalization".to_owned()
            }
            Self::LimitExceeded { detail } => format!("error: limit exceeded: {detail}"),
            Self::UnrollRefused { detail } => format!("error: cannot unroll: {detail}"),
        }
    }

    /// Wraps a failed write to one of the standard streams.
    pub fn write_failed(stream: &str, e: &std::io::Error) -> Self {
        Self::IoError {
            source: stream.to_owned(),
            detail: e.to_string(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
