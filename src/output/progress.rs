//! Step counter for conversions.

use colored::Colorize;
use std::io::{self, IsTerminal};

/// Counts conversions as they run and prefixes each status line with `[n/total]`.
///
/// On a TTY the counter closes with a git-style summary line:
/// "Converting cards: 100% (6/6), done."
pub struct Progress {
    /// Title displayed in the final line
    title: String,
    /// Total number of items to process
    total: usize,
    /// Number of items started so far
    current: usize,
    /// Whether stderr is a TTY
    is_tty: bool,
}

impl Progress {
    /// Creates a new counter with the given title and total items.
    #[must_use]
    pub fn new(title: &str, total: usize) -> Self {
        Self {
            title: title.to_string(),
            total,
            current: 0,
            is_tty: io::stderr().is_terminal(),
        }
    }

    /// Advance to the next item and return its `[n/total]` prefix.
    pub fn step(&mut self) -> String {
        self.current = (self.current + 1).min(self.total);
        self.label()
    }

    /// Prefix for the current item, padded so columns line up.
    #[must_use]
    pub fn label(&self) -> String {
        let width = self.total.to_string().len();
        format!("[{:>width$}/{}]", self.current, self.total)
    }

    /// Percentage of items started.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.current as f64 / self.total as f64) * 100.0) as u8
    }

    /// Completes the counter and displays the final "done" line on a TTY.
    pub fn finish(self) {
        if self.is_tty && self.total > 0 && super::get_verbosity() != super::Verbosity::Quiet {
            eprintln!(
                "{}: {}% ({}/{}), done.",
                self.title.dimmed(),
                self.percent(),
                self.current,
                self.total
            );
        }
    }
}
