//! Command implementations.
//!
//! Kritanet has a single command: [`sync::execute`] mirrors the source tree
//! into the destination tree and reports what it did.

/// Directory mirroring, conversion and orphan reporting.
pub mod sync;
