//! Diagnostic logging.
//!
//! Library code logs through `tracing`; the binary installs a compact stderr
//! subscriber. The filter comes from `KRITANET_LOG`, then `RUST_LOG`, then
//! the verbosity flags.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "KRITANET_LOG";

/// Default filter directive for the given verbosity.
#[must_use]
pub const fn default_directive(verbose: bool) -> &'static str {
    if verbose { "kritanet=debug" } else { "warn" }
}

/// Build the filter from the environment, falling back to `default_directive`.
///
/// # Errors
///
/// Returns an error if the fallback directive fails to parse
pub fn build_filter(verbose: bool) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(default_directive(verbose))?)
}

/// Initialize the global subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
///
/// # Errors
///
/// Returns an error if the filter cannot be built
pub fn init(verbose: bool) -> Result<()> {
    let filter = build_filter(verbose)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .compact();

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    Ok(())
}
