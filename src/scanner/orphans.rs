use super::{EntryKind, TreeEntry};
use crate::mapping::PathMapping;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A destination entry with no corresponding source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    /// Path relative to the destination root
    pub relative: PathBuf,
    /// File or directory
    pub kind: EntryKind,
    /// Project file that would have produced this entry, for raster files
    pub expected_source: Option<PathBuf>,
}

/// Find destination entries that no source entry maps to.
///
/// The expected destination set is every source directory plus the mapped path
/// of every convertible source file. Each destination entry outside that set is
/// reported once, in destination scan order. Nothing is modified.
#[must_use]
pub fn find_orphans(
    source: &[TreeEntry],
    destination: &[TreeEntry],
    mapping: &PathMapping,
) -> Vec<Orphan> {
    let expected_dirs: HashSet<&Path> = source
        .iter()
        .filter(|entry| entry.is_dir())
        .map(|entry| entry.relative.as_path())
        .collect();

    let expected_files: HashSet<PathBuf> = source
        .iter()
        .filter(|entry| entry.is_file())
        .filter_map(|entry| mapping.to_destination(&entry.relative))
        .collect();

    destination
        .iter()
        .filter(|entry| match entry.kind {
            EntryKind::Directory => !expected_dirs.contains(entry.relative.as_path()),
            EntryKind::File => !expected_files.contains(&entry.relative),
        })
        .map(|entry| Orphan {
            relative: entry.relative.clone(),
            kind: entry.kind,
            expected_source: match entry.kind {
                EntryKind::File => mapping.to_source(&entry.relative),
                EntryKind::Directory => None,
            },
        })
        .collect()
}
