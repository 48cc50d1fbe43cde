//! The synchronization run.
//!
//! A run validates both roots, locates the converter, scans both trees once,
//! builds a [`SyncPlan`], then mirrors directories, converts missing and stale
//! cards one at a time, and finally lists orphaned destination entries.
//! Per-file failures are collected in the [`SyncReport`]; they never stop the
//! remaining conversions.

use crate::KritanetContext;
use crate::converter::{ConversionFailure, Converter, ExternalConverter};
use crate::error::SyncError;
use crate::output;
use crate::plan::{Conversion, SyncPlan};
use crate::scanner::{self, EntryKind, Orphan};
use crate::utils::formatters::{
    colored_reason, format_conversion, format_elapsed, format_timestamp, pluralize,
};
use crate::utils::paths::roots_overlap;
use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};

/// A conversion that did not produce its raster file.
#[derive(Debug)]
pub struct FailedConversion {
    /// The planned conversion
    pub conversion: Conversion,
    /// Why it failed
    pub failure: ConversionFailure,
}

/// A destination directory that could not be created.
///
/// Cards below it are reported as [`ConversionFailure::ParentUnavailable`].
#[derive(Debug)]
pub struct FailedDirectory {
    /// Directory, relative to the destination root
    pub path: PathBuf,
    /// Why it could not be created
    pub reason: String,
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Destination directories created (or, in a dry run, that would be)
    pub created_directories: Vec<PathBuf>,
    /// Conversions that succeeded (or, in a dry run, that would run)
    pub converted: Vec<Conversion>,
    /// Cards whose preview was already current
    pub current: Vec<Conversion>,
    /// Conversions that failed
    pub failures: Vec<FailedConversion>,
    /// Directories that could not be created
    pub failed_directories: Vec<FailedDirectory>,
    /// Destination entries with no corresponding source entry
    pub orphans: Vec<Orphan>,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl SyncReport {
    /// Number of conversions attempted, successful or not.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    /// Whether every directory was created and every attempted conversion succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.failed_directories.is_empty()
    }

    /// Turn per-file failures into the aggregate run error.
    ///
    /// Orphans never make a run fail.
    ///
    /// # Errors
    /// Returns [`SyncError::ConversionsFailed`] if any conversion failed, or
    /// [`SyncError::DirectoriesFailed`] if only directories did.
    pub fn ensure_success(&self) -> Result<(), SyncError> {
        if !self.failures.is_empty() {
            return Err(SyncError::ConversionsFailed {
                failed: self.failures.len(),
                total: self.attempted(),
            });
        }
        if !self.failed_directories.is_empty() {
            return Err(SyncError::DirectoriesFailed {
                count: self.failed_directories.len(),
            });
        }
        Ok(())
    }

    /// The failed directory that `path` lies in, if any.
    fn failed_parent(&self, path: &Path) -> Option<&Path> {
        self.failed_directories
            .iter()
            .map(|dir| dir.path.as_path())
            .find(|dir| path.starts_with(dir))
    }

    fn fail_directory(&mut self, path: PathBuf, reason: String) {
        warn!(directory = %path.display(), reason = %reason, "Cannot create directory");
        output::failure("Failed", &format!("{}/: {reason}", path.display()));
        self.failed_directories.push(FailedDirectory { path, reason });
    }

    fn fail(&mut self, conversion: Conversion, failure: ConversionFailure) {
        report_failure(&conversion, &failure);
        self.failures.push(FailedConversion {
            conversion,
            failure,
        });
    }

    /// Record a conversion skipped because its directory is missing.
    fn skip_below_failed(&mut self, conversion: Conversion) {
        let parent = self
            .failed_parent(&conversion.destination)
            .or_else(|| conversion.destination.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.fail(conversion, ConversionFailure::ParentUnavailable(parent));
    }
}

/// Reason recorded for a source directory whose destination path is a file.
const FILE_IN_THE_WAY: &str = "a file occupies this path";

/// Check that both roots exist and are directories.
///
/// # Errors
/// Returns [`SyncError::InvalidArgument`] naming the offending root.
pub fn validate_roots(source: &Path, destination: &Path) -> Result<(), SyncError> {
    validate_root("source", source)?;
    validate_root("destination", destination)?;
    check_overlap(source, destination)
}

/// Run a full synchronization with the configured external converter.
///
/// The roots are validated and the converter located before anything is
/// created, so both fatal errors leave the filesystem untouched.
///
/// # Errors
/// Returns [`SyncError::InvalidArgument`] or [`SyncError::Environment`] before
/// any work, or an I/O error if a destination directory cannot be created.
/// Per-file failures are reported in the returned [`SyncReport`].
pub fn execute(ctx: &KritanetContext) -> Result<SyncReport, SyncError> {
    check_roots(ctx)?;
    let converter = ExternalConverter::locate(&ctx.config.converter)?;
    run(ctx, &converter)
}

/// Run a full synchronization with the given converter.
///
/// # Errors
/// Same as [`execute`], minus the converter lookup.
pub fn execute_with(
    ctx: &KritanetContext,
    converter: &dyn Converter,
) -> Result<SyncReport, SyncError> {
    check_roots(ctx)?;
    run(ctx, converter)
}

fn validate_root(label: &str, path: &Path) -> Result<(), SyncError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SyncError::InvalidArgument(format!(
            "{label} {} is not a directory",
            path.display()
        ))),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SyncError::InvalidArgument(format!(
            "{label} {} does not exist",
            path.display()
        ))),
        Err(e) => Err(SyncError::InvalidArgument(format!(
            "{label} {} cannot be read: {e}",
            path.display()
        ))),
    }
}

fn check_overlap(source: &Path, destination: &Path) -> Result<(), SyncError> {
    if roots_overlap(source, destination) {
        return Err(SyncError::InvalidArgument(format!(
            "source {} and destination {} must not contain each other",
            source.display(),
            destination.display()
        )));
    }
    Ok(())
}

/// Validate roots, allowing a missing destination when it will be created.
fn check_roots(ctx: &KritanetContext) -> Result<(), SyncError> {
    if ctx.create_destination && !ctx.destination.exists() {
        validate_root("source", &ctx.source)?;
        return check_overlap(&ctx.source, &ctx.destination);
    }
    validate_roots(&ctx.source, &ctx.destination)
}

fn run(ctx: &KritanetContext, converter: &dyn Converter) -> Result<SyncReport, SyncError> {
    let start = Instant::now();
    let mapping = ctx.mapping();
    let options = ctx.scan_options()?;

    info!(
        source = %ctx.source.display(),
        destination = %ctx.destination.display(),
        converter = %converter.describe(),
        dry_run = ctx.dry_run,
        "Starting sync"
    );
    output::verbose(&format!(
        "Syncing {} -> {} at {}",
        ctx.source.display(),
        ctx.destination.display(),
        format_timestamp(SystemTime::now())
    ));

    let destination_exists = ctx.destination.is_dir();
    if !destination_exists && !ctx.dry_run {
        fs::create_dir_all(&ctx.destination).with_context(|| {
            format!("Failed to create destination {}", ctx.destination.display())
        })?;
        output::action("Created", &ctx.destination.display().to_string());
    }

    let source_entries = scanner::scan_tree(&ctx.source, &options)?;
    let destination_entries = if destination_exists {
        scanner::scan_tree(&ctx.destination, &options)?
    } else {
        Vec::new()
    };

    let plan = SyncPlan::build(&source_entries, &destination_entries, &mapping);
    let orphans = scanner::find_orphans(&source_entries, &destination_entries, &mapping);

    debug!(
        directories = plan.directories.len(),
        conversions = plan.conversions.len(),
        current = plan.current.len(),
        blocked = plan.blocked.len(),
        conflicts = plan.conflicts.len(),
        orphans = orphans.len(),
        "Plan built"
    );

    if plan.is_up_to_date() && !ctx.dry_run {
        output::info("Previews are up to date");
    }

    let mut report = if ctx.dry_run {
        preview(plan)
    } else {
        apply(ctx, plan, converter)
    };

    report.orphans = orphans;
    report.elapsed = start.elapsed();
    print_orphans(&report.orphans);
    print_summary(&report);

    Ok(report)
}

/// Describe the plan without touching the filesystem.
fn preview(plan: SyncPlan) -> SyncReport {
    let mut report = SyncReport {
        dry_run: true,
        ..SyncReport::default()
    };

    for path in plan.conflicts {
        report.fail_directory(path, FILE_IN_THE_WAY.to_string());
    }
    for dir in &plan.directories {
        output::action("Would create", &format!("{}/", dir.display()));
    }
    for conversion in &plan.conversions {
        output::action(
            "Would convert",
            &format!(
                "{} ({})",
                format_conversion(&conversion.source, &conversion.destination),
                colored_reason(conversion.reason)
            ),
        );
    }
    report_current(&plan.current);

    for conversion in plan.blocked {
        let failure = ConversionFailure::DestinationIsDirectory(conversion.destination.clone());
        report.fail(conversion, failure);
    }
    for conversion in plan.unreachable {
        report.skip_below_failed(conversion);
    }

    report.created_directories = plan.directories;
    report.converted = plan.conversions;
    report.current = plan.current;
    report
}

/// Mirror directories, then run every pending conversion.
///
/// A directory that cannot be created fails the cards below it; everything
/// else still runs.
fn apply(ctx: &KritanetContext, plan: SyncPlan, converter: &dyn Converter) -> SyncReport {
    let mut report = SyncReport::default();

    for path in plan.conflicts {
        report.fail_directory(path, FILE_IN_THE_WAY.to_string());
    }

    for dir in plan.directories {
        if report.failed_parent(&dir).is_some() {
            continue;
        }
        let target = ctx.destination.join(&dir);
        match fs::create_dir_all(&target) {
            Ok(()) => {
                debug!(directory = %dir.display(), "Created directory");
                report.created_directories.push(dir);
            }
            Err(e) => report.fail_directory(dir, e.to_string()),
        }
    }

    report_current(&plan.current);
    report.current = plan.current;

    for conversion in plan.blocked {
        let failure = ConversionFailure::DestinationIsDirectory(conversion.destination.clone());
        report.fail(conversion, failure);
    }
    for conversion in plan.unreachable {
        report.skip_below_failed(conversion);
    }

    let mut progress = output::start_progress("Converting cards", plan.conversions.len());
    for conversion in plan.conversions {
        let label = progress.step();
        if report.failed_parent(&conversion.destination).is_some() {
            report.skip_below_failed(conversion);
            continue;
        }

        output::action(
            &format!("{label} Converting"),
            &format!(
                "{} ({})",
                format_conversion(&conversion.source, &conversion.destination),
                colored_reason(conversion.reason)
            ),
        );

        let input = ctx.source.join(&conversion.source);
        let output_path = ctx.destination.join(&conversion.destination);

        match converter.convert(&input, &output_path) {
            Ok(()) => report.converted.push(conversion),
            Err(failure) => report.fail(conversion, failure),
        }
    }
    progress.finish();

    report
}

fn report_current(current: &[Conversion]) {
    for conversion in current {
        output::verbose(&format!("Current {}", conversion.destination.display()));
    }
}

fn report_failure(conversion: &Conversion, failure: &ConversionFailure) {
    warn!(
        source = %conversion.source.display(),
        kind = failure.error_type(),
        "Conversion failed"
    );
    output::failure(
        "Failed",
        &format!(
            "{}: {failure}",
            format_conversion(&conversion.source, &conversion.destination)
        ),
    );
}

fn print_orphans(orphans: &[Orphan]) {
    if orphans.is_empty() {
        return;
    }

    output::warning(&format!(
        "Warning: {} in the destination without a matching source:",
        pluralize(orphans.len(), "entry")
    ));
    for orphan in orphans {
        let suffix = if orphan.kind == EntryKind::Directory { "/" } else { "" };
        let mut line = format!(
            "  orphan {}: {}{suffix}",
            orphan.kind.name(),
            orphan.relative.display()
        );
        if let Some(source) = &orphan.expected_source {
            line.push_str(&format!(" (no {})", source.display()));
        }
        output::warning(&line);
    }
}

fn print_summary(report: &SyncReport) {
    let (converted, created) = if report.dry_run {
        ("would convert", "would create")
    } else {
        ("converted", "created")
    };

    let summary = format!(
        "{converted} {}, {created} {}, {} current, {} failed, {} in {}",
        pluralize(report.converted.len(), "card"),
        pluralize(report.created_directories.len(), "directory"),
        report.current.len(),
        report.failures.len() + report.failed_directories.len(),
        pluralize(report.orphans.len(), "orphan"),
        format_elapsed(report.elapsed)
    );

    if report.is_success() {
        output::success(&capitalize(&summary));
    } else {
        output::error(&capitalize(&summary));
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
