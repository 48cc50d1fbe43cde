#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::float_arithmetic)] // Required for percentage formatting

//! # Kritanet - Incremental Card Exporter
//!
//! Kritanet keeps a tree of exported preview images in step with a tree of
//! editable Krita cards (an antinet made of `.kra` files). Each run mirrors
//! the source directory structure into the destination, re-exports only the
//! cards whose preview is missing or older than the card, and warns about
//! destination entries that no longer have a card.
//!
//! ## Architecture
//!
//! - [`scanner`]: Walks both trees into relative-path observations; orphan detection
//! - [`mapping`]: Extension substitution between project and raster files
//! - [`plan`]: Freshness classification and the ordered work list
//! - [`converter`]: The external converter seam (Krita by default)
//! - [`commands`]: The synchronization run and its report
//! - [`config`]: Configuration parsing and validation
//! - [`output`]: Console output and verbosity
//! - [`utils`]: Path and formatting helpers
//!
//! Nothing is persisted between runs: staleness is recomputed from
//! modification times every time, so an interrupted run is safe to repeat.
//!
//! ## Example Usage
//!
//! ```no_run
//! use kritanet::KritanetContext;
//!
//! # fn main() -> Result<(), kritanet::error::SyncError> {
//! let ctx = KritanetContext::new("antinet".into(), "antinet-previews".into())?;
//! let report = kritanet::commands::sync::execute(&ctx)?;
//! report.ensure_success()?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// External converter invocation.
pub mod converter;

/// Error taxonomy and exit codes.
pub mod error;

/// Diagnostic logging setup.
pub mod logging;

/// Source/destination path mapping.
pub mod mapping;

/// Output formatting and progress display.
pub mod output;

/// Freshness classification and run planning.
pub mod plan;

/// Filesystem scanning and orphan detection.
pub mod scanner;

/// Utility functions and helpers.
pub mod utils;

#[cfg(test)]
mod test_utils;

use crate::config::Config;
use crate::config::validator::ConfigValidator;
use crate::error::SyncError;
use crate::mapping::PathMapping;
use crate::scanner::ScanOptions;
use std::path::{Path, PathBuf};

/// Current version of the kritanet binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/kritanet/config";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "KRITANET_CONFIG_PATH";

/// Everything a synchronization run needs to know.
///
/// # Examples
///
/// ```
/// use kritanet::KritanetContext;
/// use kritanet::config::Config;
///
/// let ctx = KritanetContext::with_config("cards".into(), "previews".into(), Config::default());
/// assert_eq!(ctx.mapping().target_extension(), "jpg");
/// assert!(!ctx.dry_run);
/// ```
#[derive(Debug, Clone)]
pub struct KritanetContext {
    /// Root of the card tree (read only).
    pub source: PathBuf,

    /// Root of the preview tree.
    pub destination: PathBuf,

    /// Configuration file the settings were loaded from, if any.
    pub config_path: Option<PathBuf>,

    /// Loaded configuration settings.
    pub config: Config,

    /// Report the plan without creating directories or running the converter.
    pub dry_run: bool,

    /// Create the destination root when it does not exist.
    pub create_destination: bool,
}

impl KritanetContext {
    /// Creates a context with the configuration from the default location.
    ///
    /// The location is `$KRITANET_CONFIG_PATH` or `~/.config/kritanet/config`;
    /// a missing file means default settings.
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidArgument`] if the configuration file is invalid.
    pub fn new(source: PathBuf, destination: PathBuf) -> Result<Self, SyncError> {
        let config_path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => Config::default_path().ok(),
        };
        Self::with_config_path(source, destination, config_path.as_deref())
    }

    /// Creates a context with the configuration loaded from `config_path`.
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidArgument`] if the configuration file is invalid.
    pub fn with_config_path(
        source: PathBuf,
        destination: PathBuf,
        config_path: Option<&Path>,
    ) -> Result<Self, SyncError> {
        let config = match config_path {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };

        let mut ctx = Self::with_config(source, destination, config);
        ctx.config_path = config_path.map(Path::to_path_buf);
        Ok(ctx)
    }

    /// Creates a context from an already loaded configuration.
    #[must_use]
    pub fn with_config(source: PathBuf, destination: PathBuf, config: Config) -> Self {
        Self {
            source,
            destination,
            config_path: None,
            config,
            dry_run: false,
            create_destination: false,
        }
    }

    /// Builds the context for a command line invocation.
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidArgument`] if a root is missing from the
    /// arguments, cannot be resolved, or the configuration is invalid.
    pub fn from_cli(args: &cli::Cli) -> Result<Self, SyncError> {
        let source = resolve_root(args.source.as_deref(), "--source")?;
        let destination = resolve_root(args.destination.as_deref(), "--destination")?;

        let mut ctx = match &args.config {
            Some(path) => Self::with_config_path(source, destination, Some(path))?,
            None => Self::new(source, destination)?,
        };

        if let Some(program) = &args.converter {
            ctx.config.converter.program.clone_from(program);
        }
        ctx.dry_run = args.dry_run;
        ctx.create_destination = args.create_destination;
        Ok(ctx)
    }

    /// Path mapping derived from the configuration.
    #[must_use]
    pub fn mapping(&self) -> PathMapping {
        PathMapping::from_config(&self.config.mapping)
    }

    /// Scan options derived from the configuration.
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidArgument`] if an ignore pattern is invalid.
    pub fn scan_options(&self) -> Result<ScanOptions, SyncError> {
        ScanOptions::from_config(&self.config.tracking)
            .map_err(|e| SyncError::InvalidArgument(format!("{e:#}")))
    }
}

/// Load and validate a configuration file, printing warnings for unknown fields.
fn load_config(path: &Path) -> Result<Config, SyncError> {
    let config = Config::load(path).map_err(|e| {
        SyncError::InvalidArgument(format!("configuration {}: {e:#}", path.display()))
    })?;

    match ConfigValidator::new().validate_config_file(path) {
        Ok(warnings) => {
            for warning in warnings {
                output::warning(&format!("Warning: {warning}"));
            }
        }
        Err(e) => tracing::debug!(error = %e, "Skipping configuration field validation"),
    }

    Ok(config)
}

/// Expand and absolutize a root argument.
fn resolve_root(path: Option<&Path>, flag: &str) -> Result<PathBuf, SyncError> {
    let path = path.ok_or_else(|| SyncError::InvalidArgument(format!("{flag} is required")))?;
    utils::expand_tilde(path)
        .and_then(|p| utils::make_absolute(&p))
        .map_err(|e| SyncError::InvalidArgument(format!("{flag} {}: {e:#}", path.display())))
}
