//! Error taxonomy for a synchronization run.
//!
//! Fatal conditions ([`SyncError::InvalidArgument`], [`SyncError::Environment`])
//! abort before any filesystem mutation. Per-file converter failures are not
//! errors at this level; they are collected in the run report and surface here
//! only as the aggregate [`SyncError::ConversionsFailed`] once every file has
//! been processed.

use thiserror::Error;

/// Process exit code for a fully successful run.
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code when at least one conversion failed, or on unexpected errors.
pub const EXIT_FAILURE: i32 = 1;

/// Process exit code for invalid arguments (matches clap's usage error code).
pub const EXIT_USAGE: i32 = 2;

/// Process exit code when the converter tool is unavailable.
pub const EXIT_ENVIRONMENT: i32 = 3;

/// Errors that end a synchronization run with a non-zero exit status.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Bad or missing root paths, or an invalid configuration value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The external converter cannot be found or started.
    #[error("Environment error: {0}")]
    Environment(String),

    /// One or more files could not be converted; every other file was processed.
    #[error("{failed} of {total} conversion(s) failed")]
    ConversionsFailed {
        /// Number of failed conversions
        failed: usize,
        /// Number of conversions attempted
        total: usize,
    },

    /// Destination directories could not be created; the cards below them were skipped.
    #[error("{count} destination director(ies) could not be created")]
    DirectoriesFailed {
        /// Number of directories that could not be created
        count: usize,
    },

    /// Filesystem error outside of a single conversion (e.g. creating the destination root).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other unexpected failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Exit status the binary reports for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => EXIT_USAGE,
            Self::Environment(_) => EXIT_ENVIRONMENT,
            Self::ConversionsFailed { .. }
            | Self::DirectoriesFailed { .. }
            | Self::Io(_)
            | Self::Other(_) => EXIT_FAILURE,
        }
    }
}
