use crate::config::MappingConfig;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Maps relative paths between the source tree and the destination tree.
///
/// Directories map to themselves. Project files map to raster files by
/// swapping the final extension, so `A/card1.kra` corresponds to `A/card1.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    /// Extension (without dot) of editable project files
    source_extension: String,
    /// Extension (without dot) of exported raster files
    target_extension: String,
}

impl PathMapping {
    /// Create a mapping between two extensions given without a leading dot.
    #[must_use]
    pub fn new(source_extension: &str, target_extension: &str) -> Self {
        Self {
            source_extension: source_extension.to_string(),
            target_extension: target_extension.to_string(),
        }
    }

    /// Build the mapping from the `[mapping]` configuration section.
    #[must_use]
    pub fn from_config(config: &MappingConfig) -> Self {
        Self::new(&config.source_extension, &config.target_extension)
    }

    /// Extension of editable project files.
    #[must_use]
    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    /// Extension of exported raster files.
    #[must_use]
    pub fn target_extension(&self) -> &str {
        &self.target_extension
    }

    /// Whether `path` names a convertible project file.
    #[must_use]
    pub fn is_source(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.source_extension))
    }

    /// Whether `path` names an exported raster file.
    #[must_use]
    pub fn is_target(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.target_extension))
    }

    /// Destination path for a project file, or `None` if it is not convertible.
    #[must_use]
    pub fn to_destination(&self, source: &Path) -> Option<PathBuf> {
        self.is_source(source)
            .then(|| source.with_extension(&self.target_extension))
    }

    /// Project file that would produce `destination`, or `None` for non-raster files.
    #[must_use]
    pub fn to_source(&self, destination: &Path) -> Option<PathBuf> {
        self.is_target(destination)
            .then(|| destination.with_extension(&self.source_extension))
    }
}

impl Default for PathMapping {
    fn default() -> Self {
        Self::from_config(&MappingConfig::default())
    }
}
