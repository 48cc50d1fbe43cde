//! Conversion planning.
//!
//! A [`SyncPlan`] is computed from two tree scans before anything is mutated.
//! All directory creations come first, parents before children, so the
//! destination parent of every conversion exists by the time it runs.

use crate::mapping::PathMapping;
use crate::scanner::{EntryKind, TreeEntry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Freshness of a destination file relative to its project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Freshness {
    /// The destination file does not exist
    Missing,
    /// The destination file is older than the project file
    Stale,
    /// The destination file is at least as new as the project file
    Current,
}

impl Freshness {
    /// Whether the converter has to run for this file.
    #[must_use]
    pub const fn needs_build(&self) -> bool {
        matches!(self, Self::Missing | Self::Stale)
    }

    /// Short tag shown next to a planned conversion
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Missing => "new",
            Self::Stale => "stale",
            Self::Current => "current",
        }
    }
}

/// Classify a destination file against its project file.
///
/// Equal timestamps count as current.
#[must_use]
pub fn classify(
    source_modified: SystemTime,
    destination_modified: Option<SystemTime>,
) -> Freshness {
    match destination_modified {
        None => Freshness::Missing,
        Some(dest) if dest < source_modified => Freshness::Stale,
        Some(_) => Freshness::Current,
    }
}

/// One project file paired with its destination, relative to the two roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Project file, relative to the source root
    pub source: PathBuf,
    /// Raster file, relative to the destination root
    pub destination: PathBuf,
    /// Why the file is in the plan
    pub reason: Freshness,
}

/// Everything a run will do, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Destination directories to create, parents first
    pub directories: Vec<PathBuf>,
    /// Files to convert (missing or stale)
    pub conversions: Vec<Conversion>,
    /// Files that are already current
    pub current: Vec<Conversion>,
    /// Files whose destination path is occupied by a directory
    pub blocked: Vec<Conversion>,
    /// Source directories whose destination path is occupied by a file
    pub conflicts: Vec<PathBuf>,
    /// Files that would be written below a conflicting directory
    pub unreachable: Vec<Conversion>,
}

impl SyncPlan {
    /// Build the plan from a source scan and a destination scan.
    ///
    /// Only project files recognized by `mapping` are considered; other source
    /// files are ignored. Scan order is preserved, so sorted scans give a
    /// sorted plan.
    #[must_use]
    pub fn build(source: &[TreeEntry], destination: &[TreeEntry], mapping: &PathMapping) -> Self {
        let existing: HashMap<&Path, &TreeEntry> = destination
            .iter()
            .map(|entry| (entry.relative.as_path(), entry))
            .collect();

        let mut plan = Self::default();

        for entry in source {
            match entry.kind {
                EntryKind::Directory => {
                    if plan.conflict_above(&entry.relative).is_some() {
                        continue;
                    }
                    match existing.get(entry.relative.as_path()) {
                        Some(dest) if dest.is_dir() => {}
                        Some(_) => plan.conflicts.push(entry.relative.clone()),
                        None => plan.directories.push(entry.relative.clone()),
                    }
                }
                EntryKind::File => {
                    let Some(target) = mapping.to_destination(&entry.relative) else {
                        continue;
                    };

                    if plan.conflict_above(&target).is_some() {
                        plan.unreachable.push(Conversion {
                            source: entry.relative.clone(),
                            destination: target,
                            reason: Freshness::Missing,
                        });
                        continue;
                    }

                    let dest = existing.get(target.as_path());
                    if dest.is_some_and(|d| d.is_dir()) {
                        plan.blocked.push(Conversion {
                            source: entry.relative.clone(),
                            destination: target,
                            reason: Freshness::Missing,
                        });
                        continue;
                    }

                    let reason = classify(entry.modified, dest.map(|d| d.modified));
                    let conversion = Conversion {
                        source: entry.relative.clone(),
                        destination: target,
                        reason,
                    };
                    if reason.needs_build() {
                        plan.conversions.push(conversion);
                    } else {
                        plan.current.push(conversion);
                    }
                }
            }
        }

        plan
    }

    /// Whether the run has nothing to create or convert.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.directories.is_empty()
            && self.conversions.is_empty()
            && self.blocked.is_empty()
            && self.conflicts.is_empty()
            && self.unreachable.is_empty()
    }

    /// The conflicting directory that `path` lies in (or is), if any.
    #[must_use]
    pub fn conflict_above(&self, path: &Path) -> Option<&Path> {
        self.conflicts
            .iter()
            .map(PathBuf::as_path)
            .find(|conflict| path.starts_with(conflict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    const T: Duration = Duration::from_secs(1_700_000_000);

    fn at(offset: i64) -> SystemTime {
        let base = SystemTime::UNIX_EPOCH + T;
        if offset >= 0 {
            base + Duration::from_secs(offset.unsigned_abs())
        } else {
            base - Duration::from_secs(offset.unsigned_abs())
        }
    }

    fn dir(path: &str) -> TreeEntry {
        TreeEntry {
            relative: PathBuf::from(path),
            kind: EntryKind::Directory,
            modified: at(0),
        }
    }

    fn file(path: &str, offset: i64) -> TreeEntry {
        TreeEntry {
            relative: PathBuf::from(path),
            kind: EntryKind::File,
            modified: at(offset),
        }
    }

    #[rstest]
    #[case(None, Freshness::Missing)]
    #[case(Some(-1), Freshness::Stale)]
    #[case(Some(0), Freshness::Current)]
    #[case(Some(1), Freshness::Current)]
    fn test_classify(#[case] destination: Option<i64>, #[case] expected: Freshness) {
        assert_eq!(classify(at(0), destination.map(at)), expected);
    }

    #[test]
    fn test_classify_subsecond_staleness() {
        let source = at(0) + Duration::from_millis(500);
        assert_eq!(classify(source, Some(at(0))), Freshness::Stale);
    }

    #[test]
    fn test_new_card_into_empty_destination() {
        let source = vec![dir("A"), file("A/card1.kra", 0)];
        let plan = SyncPlan::build(&source, &[], &PathMapping::default());

        assert_eq!(plan.directories, vec![PathBuf::from("A")]);
        assert_eq!(plan.conversions.len(), 1);
        assert_eq!(plan.conversions[0].destination, PathBuf::from("A/card1.jpg"));
        assert_eq!(plan.conversions[0].reason, Freshness::Missing);
        assert!(!plan.is_up_to_date());
    }

    #[test]
    fn test_newer_preview_is_current() {
        let source = vec![dir("A"), file("A/card1.kra", 0)];
        let destination = vec![dir("A"), file("A/card1.jpg", 1)];
        let plan = SyncPlan::build(&source, &destination, &PathMapping::default());

        assert!(plan.directories.is_empty());
        assert!(plan.conversions.is_empty());
        assert_eq!(plan.current.len(), 1);
        assert!(plan.is_up_to_date());
    }

    #[test]
    fn test_only_stale_card_is_rebuilt() {
        let source = vec![file("a.kra", 10), file("b.kra", 0)];
        let destination = vec![file("a.jpg", 5), file("b.jpg", 5)];
        let plan = SyncPlan::build(&source, &destination, &PathMapping::default());

        assert_eq!(plan.conversions.len(), 1);
        assert_eq!(plan.conversions[0].source, PathBuf::from("a.kra"));
        assert_eq!(plan.conversions[0].reason, Freshness::Stale);
        assert_eq!(plan.current.len(), 1);
    }

    #[test]
    fn test_non_project_files_are_ignored() {
        let source = vec![file("notes.txt", 0), file("card.kra~", 0)];
        let plan = SyncPlan::build(&source, &[], &PathMapping::default());
        assert_eq!(plan, SyncPlan::default());
    }

    #[test]
    fn test_directory_in_place_of_preview_is_blocked() {
        let source = vec![file("card.kra", 0)];
        let destination = vec![dir("card.jpg")];
        let plan = SyncPlan::build(&source, &destination, &PathMapping::default());

        assert!(plan.conversions.is_empty());
        assert_eq!(plan.blocked.len(), 1);
        assert_eq!(plan.blocked[0].destination, PathBuf::from("card.jpg"));
    }

    #[test]
    fn test_file_in_place_of_directory_is_a_conflict() {
        let source = vec![
            dir("A"),
            dir("A/B"),
            file("A/B/deep.kra", 0),
            file("A/card1.kra", 0),
            dir("Z"),
            file("Z/card2.kra", 0),
        ];
        let destination = vec![file("A", 0)];
        let plan = SyncPlan::build(&source, &destination, &PathMapping::default());

        assert_eq!(plan.conflicts, vec![PathBuf::from("A")]);
        assert_eq!(plan.directories, vec![PathBuf::from("Z")]);
        let unreachable: Vec<_> = plan.unreachable.iter().map(|c| c.source.clone()).collect();
        assert_eq!(
            unreachable,
            vec![PathBuf::from("A/B/deep.kra"), PathBuf::from("A/card1.kra")]
        );
        assert_eq!(plan.conversions.len(), 1);
        assert_eq!(plan.conversions[0].source, PathBuf::from("Z/card2.kra"));
        assert_eq!(plan.conflict_above(Path::new("A/B/deep.jpg")), Some(Path::new("A")));
        assert_eq!(plan.conflict_above(Path::new("AB/x.jpg")), None);
        assert!(!plan.is_up_to_date());
    }

    #[test]
    fn test_directories_ordered_parents_first() {
        let source = vec![dir("A"), dir("A/B"), dir("A/B/C"), dir("D")];
        let destination = vec![dir("A")];
        let plan = SyncPlan::build(&source, &destination, &PathMapping::default());

        assert_eq!(
            plan.directories,
            vec![
                PathBuf::from("A/B"),
                PathBuf::from("A/B/C"),
                PathBuf::from("D")
            ]
        );
    }
}
