//! Configuration file (`~/.config/kritanet/config`).
//!
//! Every section and field is optional; a missing file means defaults.

/// TOML parsing and value validation.
pub mod parser;
/// Warnings for unknown configuration keys.
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Placeholder replaced with the project file path in converter arguments.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder replaced with the raster file path in converter arguments.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// External converter invocation
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Source and target extensions
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Which entries the scans look at
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// `[converter]`: the program that exports one card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Program name (looked up on PATH) or path to the converter binary
    #[serde(default = "default_program")]
    pub program: String,
    /// Argument template; `{input}` and `{output}` are substituted per file
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

/// `[mapping]`: extensions of cards and of their exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Extension of project files in the source tree, without the dot
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Extension of exported files in the destination tree, without the dot
    #[serde(default = "default_target_extension")]
    pub target_extension: String,
}

/// `[tracking]`: scan filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Glob patterns matched against entry file names in both trees
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
    /// Descend into symlinked directories (symlinked files are always read)
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            target_extension: default_target_extension(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: default_ignore_patterns(),
            follow_symlinks: false,
        }
    }
}

impl ConverterConfig {
    /// Expand the argument template for one conversion.
    ///
    /// Paths are spliced in as raw OS strings, so file names that are not
    /// valid UTF-8 reach the converter unchanged.
    #[must_use]
    pub fn render_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| render_arg(arg, input, output))
            .collect()
    }
}

/// Substitute every placeholder occurrence in one template argument.
fn render_arg(arg: &str, input: &Path, output: &Path) -> OsString {
    let mut rendered = OsString::new();
    let mut rest = arg;

    loop {
        let next = [(INPUT_PLACEHOLDER, input), (OUTPUT_PLACEHOLDER, output)]
            .into_iter()
            .filter_map(|(placeholder, path)| {
                rest.find(placeholder).map(|at| (at, placeholder, path))
            })
            .min_by_key(|(at, _, _)| *at);

        let Some((at, placeholder, path)) = next else {
            rendered.push(rest);
            return rendered;
        };

        rendered.push(&rest[..at]);
        rendered.push(path.as_os_str());
        rest = &rest[at + placeholder.len()..];
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// A missing file yields the defaults; nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }

    /// Default configuration file location (`~/.config/kritanet/config`)
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(crate::DEFAULT_CONFIG_PATH))
    }
}

// Default functions for serde
fn default_program() -> String {
    "krita".to_string()
}

fn default_args() -> Vec<String> {
    vec![
        INPUT_PLACEHOLDER.to_string(),
        "--export".to_string(),
        "--export-filename".to_string(),
        OUTPUT_PLACEHOLDER.to_string(),
    ]
}

fn default_source_extension() -> String {
    "kra".to_string()
}

fn default_target_extension() -> String {
    "jpg".to_string()
}

fn default_ignore_patterns() -> Vec<String> {
    vec![".git".to_string(), "*.kra~".to_string(), "*.tmp".to_string()]
}
