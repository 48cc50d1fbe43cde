use std::path::PathBuf;
use thiserror::Error;

/// Why a single file could not be converted.
///
/// Per-file failures never abort a run; they are collected and reported after
/// the remaining files have been processed.
#[derive(Debug, Error)]
pub enum ConversionFailure {
    /// The converter process could not be started
    #[error("failed to start converter: {0}")]
    Spawn(#[source] std::io::Error),

    /// The converter exited with a non-zero status
    #[error("converter exited with status {code}: {details}")]
    ExitStatus {
        /// Exit code reported by the process
        code: i32,
        /// Condensed stderr of the process
        details: String,
    },

    /// The converter was terminated by a signal
    #[error("converter was killed by signal {signal}")]
    Signal {
        /// Signal number (0 when the platform does not report one)
        signal: i32,
    },

    /// The converter reported success but did not write the output file
    #[error("converter did not write {}", .0.display())]
    OutputNotWritten(PathBuf),

    /// A directory occupies the output path
    #[error("{} is a directory", .0.display())]
    DestinationIsDirectory(PathBuf),

    /// The output's parent directory could not be created
    #[error("destination directory {} could not be created", .0.display())]
    ParentUnavailable(PathBuf),
}

impl ConversionFailure {
    /// Build an exit status failure from raw stderr output
    #[must_use]
    pub fn from_exit(code: i32, stderr: &[u8]) -> Self {
        Self::ExitStatus {
            code,
            details: extract_meaningful_message(&String::from_utf8_lossy(stderr)),
        }
    }

    /// Get a short description of the failure type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Spawn(_) => "Spawn Error",
            Self::ExitStatus { .. } => "Converter Error",
            Self::Signal { .. } => "Converter Crashed",
            Self::OutputNotWritten(_) => "No Output",
            Self::DestinationIsDirectory(_) => "Path Conflict",
            Self::ParentUnavailable(_) => "Skipped",
        }
    }
}

/// Extract the most meaningful part of the converter's stderr
///
/// Krita and similar tools print a lot of startup noise; keep the last
/// non-empty lines, which usually carry the actual error.
fn extract_meaningful_message(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return "No error details available".to_string();
    }

    let start = lines.len().saturating_sub(3);
    lines[start..].join(" | ")
}
