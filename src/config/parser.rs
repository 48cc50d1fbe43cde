use super::{Config, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use anyhow::{Context, Result};
use std::path::Path;

/// Read, parse and validate a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or holds
/// an invalid value
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parse and validate configuration text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or holds an invalid value
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

/// Check values that serde accepts but a run cannot use.
///
/// # Errors
///
/// Returns an error naming the first invalid value
pub fn validate_config(config: &Config) -> Result<()> {
    if config.converter.program.trim().is_empty() {
        anyhow::bail!("Converter program cannot be empty");
    }

    let args = &config.converter.args;
    if !args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
        anyhow::bail!("Converter arguments must contain the {INPUT_PLACEHOLDER} placeholder");
    }
    if !args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
        anyhow::bail!("Converter arguments must contain the {OUTPUT_PLACEHOLDER} placeholder");
    }

    validate_extension("mapping.source_extension", &config.mapping.source_extension)?;
    validate_extension("mapping.target_extension", &config.mapping.target_extension)?;
    if config.mapping.source_extension == config.mapping.target_extension {
        anyhow::bail!(
            "Source and target extensions must differ (both are '{}')",
            config.mapping.source_extension
        );
    }

    for pattern in &config.tracking.ignore_patterns {
        glob::Pattern::new(pattern)
            .with_context(|| format!("Invalid ignore pattern: {pattern}"))?;
    }

    Ok(())
}

fn validate_extension(key: &str, extension: &str) -> Result<()> {
    if extension.is_empty() {
        anyhow::bail!("{key} cannot be empty");
    }
    if extension.contains('.') || extension.contains('/') || extension.contains('\\') {
        anyhow::bail!("{key} must be a bare extension without dots or separators: {extension}");
    }
    Ok(())
}
