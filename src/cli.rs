//! Command-line interface definitions for kritanet.
//!
//! The definitions are shared between the main binary and build tools (like
//! xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we allow
//! missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for kritanet.
#[derive(Parser, Debug)]
#[command(
    name = "kritanet",
    version = crate::VERSION,
    about = "Mirror a tree of Krita cards into JPEG previews",
    long_about = "Mirrors the directory tree of a Kritanet (an antinet made of Krita files) \
                  into a destination tree, exporting every .kra card whose preview is missing \
                  or older than the card, and warning about previews that no longer have a card."
)]
pub struct Cli {
    /// Source Kritanet directory
    #[arg(short, long, value_name = "DIR", required_unless_present = "completions")]
    pub source: Option<PathBuf>,

    /// Destination directory for the exported previews
    #[arg(
        short,
        long,
        visible_alias = "dest",
        value_name = "DIR",
        required_unless_present = "completions"
    )]
    pub destination: Option<PathBuf>,

    /// Create the destination directory if it does not exist
    #[arg(short = 'c', long)]
    pub create_destination: bool,

    /// Show what would be created and converted without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Converter program to run instead of the configured one
    #[arg(long, env = "KRITANET_CONVERTER", value_name = "PROGRAM")]
    pub converter: Option<String>,

    /// Configuration file (default: ~/.config/kritanet/config)
    #[arg(long, env = "KRITANET_CONFIG_PATH", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
