//! Warnings for configuration keys kritanet does not read.
//!
//! Unknown keys are almost always typos (`programme`, `target_ext`); they are
//! reported but never make loading fail.

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

/// Dotted names of every key the configuration file may contain.
const KNOWN_FIELDS: [&str; 6] = [
    "converter.program",
    "converter.args",
    "mapping.source_extension",
    "mapping.target_extension",
    "tracking.ignore_patterns",
    "tracking.follow_symlinks",
];

/// Tracks which configuration fields kritanet recognizes
pub struct ConfigValidator {
    /// Set of valid configuration fields
    known_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a validator for the current configuration layout
    #[must_use]
    pub fn new() -> Self {
        Self {
            known_fields: KNOWN_FIELDS.into_iter().collect(),
        }
    }

    /// Collect warnings about unknown fields in a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<Vec<String>> {
        if !config_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(config_path)?;
        let parsed: toml::Value = toml::from_str(&content)?;
        Ok(self.validate_value(&parsed))
    }

    /// Collect warnings for an already parsed TOML document
    #[must_use]
    pub fn validate_value(&self, parsed: &toml::Value) -> Vec<String> {
        let mut unknown = Vec::new();
        self.collect_unknown(parsed, "", &mut unknown);

        unknown
            .into_iter()
            .map(|field| format!("Unknown configuration field: {field}"))
            .collect()
    }

    /// Walk nested tables, pushing the dotted name of every unrecognized leaf
    fn collect_unknown(&self, value: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        let toml::Value::Table(table) = value else {
            return;
        };

        for (key, value) in table {
            let dotted = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if self.known_fields.contains(dotted.as_str()) {
                continue;
            }
            if value.is_table() {
                self.collect_unknown(value, &dotted, unknown);
            } else {
                unknown.push(dotted);
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
