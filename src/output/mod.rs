//! Console output for a sync run.
//!
//! Everything here writes to stderr; stdout carries only `--completions`
//! scripts. Warnings and failures are shown at every verbosity, the summary
//! and per-card progress are hidden by `--quiet`, and "already current"
//! decisions only appear with `--verbose`.

mod progress;

use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

pub use progress::Progress;

/// How much a run prints, ordered from least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Orphan warnings and failures only (`--quiet`)
    Quiet = 0,
    /// Plus created directories, conversions and the summary
    Normal = 1,
    /// Plus every card whose preview is already current (`--verbose`)
    Verbose = 2,
}

impl Verbosity {
    /// Resolve the verbosity from the `--quiet` and `--verbose` flags.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Process-wide level, set once by the binary before the run starts.
static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Set the level used by every printing function in this module.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Current level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

fn shown_at(level: Verbosity) -> bool {
    get_verbosity() >= level
}

/// Summary line of a clean run, in green.
pub fn success(message: &str) {
    if shown_at(Verbosity::Normal) {
        eprintln!("{}", message.green());
    }
}

/// Summary line of a run with failures, in bold red. Never hidden.
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Orphan reports and configuration warnings, in bold yellow. Never hidden.
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Routine note, dimmed.
pub fn info(message: &str) {
    if shown_at(Verbosity::Normal) {
        eprintln!("{}", message.dimmed());
    }
}

/// Per-card detail for `--verbose`.
pub fn verbose(message: &str) {
    if shown_at(Verbosity::Verbose) {
        eprintln!("{}", message.dimmed());
    }
}

/// One step of the run with a bold verb, e.g. `Would create A/`.
pub fn action(verb: &str, message: &str) {
    if shown_at(Verbosity::Normal) {
        eprintln!("{} {message}", verb.bold());
    }
}

/// A card or directory that could not be handled. Never hidden.
pub fn failure(verb: &str, message: &str) {
    eprintln!("{} {message}", verb.red().bold());
}

/// Start the `[n/total]` counter for `total` conversions.
#[must_use]
pub fn start_progress(title: &str, total: usize) -> Progress {
    Progress::new(title, total)
}
