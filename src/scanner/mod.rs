/// Destination entries with no corresponding source entry.
pub mod orphans;

pub use orphans::{Orphan, find_orphans};

use crate::config::TrackingConfig;
use anyhow::{Context, Result};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{Level, debug, span, warn};
use walkdir::{DirEntry, WalkDir};

/// Kind of filesystem entry observed during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A directory
    Directory,
    /// A regular file
    File,
}

impl EntryKind {
    /// Lowercase name used in console output
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::File => "file",
        }
    }
}

/// One observation of a file or directory below a scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the scanned root
    pub relative: PathBuf,
    /// File or directory
    pub kind: EntryKind,
    /// Last modification time
    pub modified: SystemTime,
}

impl TreeEntry {
    /// Whether this entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Whether this entry is a regular file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Options controlling a tree scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Entries whose file name matches any pattern are skipped (with their subtree)
    pub ignore: Vec<glob::Pattern>,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
}

impl ScanOptions {
    /// Build scan options from the `[tracking]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if an ignore pattern is not a valid glob
    pub fn from_config(config: &TrackingConfig) -> Result<Self> {
        let ignore = config
            .ignore_patterns
            .iter()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid ignore pattern: {p}")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ignore,
            follow_symlinks: config.follow_symlinks,
        })
    }

    /// Whether a directory entry's file name matches an ignore pattern.
    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.ignore.iter().any(|p| p.matches(&name))
    }
}

/// Walk `root` recursively and return every file and directory below it.
///
/// The root itself is not included. Entries are sorted by relative path, so a
/// directory always precedes its contents. Unreadable entries are logged and
/// skipped. A symlink to a regular file is a file with its target's mtime;
/// symlinked directories are only entered when `follow_symlinks` is set.
///
/// # Errors
///
/// Returns an error if `root` cannot be read at all
pub fn scan_tree(root: &Path, options: &ScanOptions) -> Result<Vec<TreeEntry>> {
    let span = span!(Level::DEBUG, "scan_tree", root = %root.display());
    let _guard = span.enter();

    fs::read_dir(root).with_context(|| format!("Failed to read {}", root.display()))?;

    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !options.is_ignored(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let Some((kind, metadata)) = classify_entry(&entry) else {
            continue;
        };

        let modified = match metadata.modified() {
            Ok(time) => time,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Skipping entry without mtime");
                continue;
            }
        };

        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?
            .to_path_buf();

        entries.push(TreeEntry {
            relative,
            kind,
            modified,
        });
    }

    debug!(count = entries.len(), "Scan complete");
    Ok(entries)
}

/// Kind and metadata of a walked entry, or `None` if it is not scanned.
///
/// Unfollowed symlinks are resolved here: links to regular files count as
/// files, links to directories are left alone.
fn classify_entry(entry: &DirEntry) -> Option<(EntryKind, Metadata)> {
    let path = entry.path();
    let metadata = if entry.path_is_symlink() {
        fs::metadata(path)
    } else {
        entry.metadata().map_err(io::Error::from)
    };

    let metadata = match metadata {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping entry without metadata");
            return None;
        }
    };

    if metadata.is_file() {
        Some((EntryKind::File, metadata))
    } else if metadata.is_dir() && entry.file_type().is_dir() {
        Some((EntryKind::Directory, metadata))
    } else if metadata.is_dir() {
        debug!(path = %path.display(), "Not descending into symlinked directory");
        None
    } else {
        debug!(path = %path.display(), "Skipping non-regular entry");
        None
    }
}
