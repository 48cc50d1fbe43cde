//! Utility functions and helpers.
//!
//! - [`formatters`]: Console formatting for plans, timestamps and summaries
//! - [`paths`]: Path manipulation for the root arguments
//!
//! # Examples
//!
//! ```
//! use kritanet::utils::formatters::pluralize;
//!
//! assert_eq!(pluralize(1, "card"), "1 card");
//! assert_eq!(pluralize(3, "card"), "3 cards");
//! ```

/// Output formatting and colorization
pub mod formatters;
/// Path manipulation and resolution utilities
pub mod paths;

pub use paths::{expand_tilde, make_absolute};
