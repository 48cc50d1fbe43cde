//! # External Converter
//!
//! Kritanet never renders images itself. Every conversion is delegated to an
//! external program (Krita by default) invoked once per file:
//!
//! ```text
//! krita <input.kra> --export --export-filename <output.jpg>
//! ```
//!
//! The [`Converter`] trait is the seam between the synchronizer and that
//! program, so the run logic can be exercised with an in-process converter.
//!
//! ## Failure handling
//!
//! [`ExternalConverter::locate`] resolves the program before any work starts;
//! a missing program is an environment error for the whole run. Once located,
//! each invocation reports its own [`ConversionFailure`]: spawn errors,
//! non-zero exits, signals, and the case where the program exits cleanly
//! without touching the output file.

use crate::config::ConverterConfig;
use crate::error::SyncError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::SystemTime;
use tracing::{Level, debug, span};

/// Per-file failure categorization
pub mod errors;

pub use errors::ConversionFailure;

/// Converts one project file into one raster file.
pub trait Converter {
    /// Human-readable name for logs and dry-run output
    fn describe(&self) -> String;

    /// Write the raster export of `input` to `output`.
    ///
    /// The parent directory of `output` already exists.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionFailure`] describing why this file failed
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionFailure>;
}

/// Runs a converter program as a child process.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    /// Resolved path of the converter binary
    program: PathBuf,
    /// Argument template
    config: ConverterConfig,
}

impl ExternalConverter {
    /// Resolve the configured program on `PATH` (or as a path).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Environment`] if the program cannot be found
    pub fn locate(config: &ConverterConfig) -> Result<Self, SyncError> {
        let program = which::which(&config.program).map_err(|e| {
            SyncError::Environment(format!(
                "converter '{}' not found: {e}. Install it or set --converter",
                config.program
            ))
        })?;

        debug!(program = %program.display(), "Located converter");

        Ok(Self {
            program,
            config: config.clone(),
        })
    }

    /// Build the command for one conversion without running it.
    #[must_use]
    pub fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.config.render_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Converter for ExternalConverter {
    fn describe(&self) -> String {
        self.program.display().to_string()
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionFailure> {
        let span = span!(Level::DEBUG, "convert", input = %input.display());
        let _guard = span.enter();

        let before = modified(output);

        let result = self
            .command(input, output)
            .output()
            .map_err(ConversionFailure::Spawn)?;

        debug!(
            status = ?result.status,
            stdout = %String::from_utf8_lossy(&result.stdout).trim(),
            "Converter finished"
        );

        check_status(&result)?;

        match (before, modified(output)) {
            (_, None) => Err(ConversionFailure::OutputNotWritten(output.to_path_buf())),
            (Some(old), Some(new)) if new == old => {
                Err(ConversionFailure::OutputNotWritten(output.to_path_buf()))
            }
            _ => Ok(()),
        }
    }
}

/// Map a finished process to a failure when it did not exit cleanly.
fn check_status(result: &Output) -> Result<(), ConversionFailure> {
    if result.status.success() {
        return Ok(());
    }

    if let Some(code) = result.status.code() {
        return Err(ConversionFailure::from_exit(code, &result.stderr));
    }

    Err(ConversionFailure::Signal {
        signal: signal_of(result),
    })
}

#[cfg(unix)]
fn signal_of(result: &Output) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    result.status.signal().unwrap_or(0)
}

#[cfg(not(unix))]
fn signal_of(_result: &Output) -> i32 {
    0
}

/// Modification time of a regular file, if it exists.
fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path)
        .ok()
        .filter(std::fs::Metadata::is_file)
        .and_then(|m| m.modified().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_missing_program() {
        let config = ConverterConfig {
            program: "kritanet-no-such-converter-binary".to_string(),
            ..ConverterConfig::default()
        };
        let err = ExternalConverter::locate(&config).unwrap_err();
        assert!(matches!(err, SyncError::Environment(_)));
        assert!(err.to_string().contains("kritanet-no-such-converter-binary"));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn script(dir: &Path, body: &str) -> ConverterConfig {
            let path = dir.join("fake-converter");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            ConverterConfig {
                program: path.to_string_lossy().into_owned(),
                ..ConverterConfig::default()
            }
        }

        #[test]
        fn test_command_uses_template() {
            let temp = TempDir::new().unwrap();
            let converter = ExternalConverter::locate(&script(temp.path(), "exit 0")).unwrap();
            let cmd = converter.command(Path::new("in.kra"), Path::new("out.jpg"));
            let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
            assert_eq!(args, vec!["in.kra", "--export", "--export-filename", "out.jpg"]);
        }

        #[test]
        fn test_successful_conversion() {
            let temp = TempDir::new().unwrap();
            let converter =
                ExternalConverter::locate(&script(temp.path(), "cp \"$1\" \"$4\"")).unwrap();
            let input = temp.path().join("card.kra");
            let output = temp.path().join("card.jpg");
            fs::write(&input, "pixels").unwrap();

            converter.convert(&input, &output).unwrap();
            assert_eq!(fs::read_to_string(&output).unwrap(), "pixels");
        }

        #[test]
        fn test_non_utf8_card_name() {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            let temp = TempDir::new().unwrap();
            let converter = ExternalConverter::locate(&script(
                temp.path(),
                "test -f \"$1\" || exit 7\ncp \"$1\" \"$4\"",
            ))
            .unwrap();
            let input = temp.path().join(OsStr::from_bytes(b"caf\xe9.kra"));
            let output = temp.path().join(OsStr::from_bytes(b"caf\xe9.jpg"));
            fs::write(&input, "pixels").unwrap();

            converter.convert(&input, &output).unwrap();
            assert_eq!(fs::read_to_string(&output).unwrap(), "pixels");
        }

        #[test]
        fn test_non_zero_exit() {
            let temp = TempDir::new().unwrap();
            let converter = ExternalConverter::locate(&script(
                temp.path(),
                "echo 'could not load document' >&2; exit 4",
            ))
            .unwrap();
            let err = converter
                .convert(&temp.path().join("a.kra"), &temp.path().join("a.jpg"))
                .unwrap_err();
            match err {
                ConversionFailure::ExitStatus { code, details } => {
                    assert_eq!(code, 4);
                    assert_eq!(details, "could not load document");
                }
                other => panic!("unexpected failure: {other:?}"),
            }
        }

        #[test]
        fn test_clean_exit_without_output() {
            let temp = TempDir::new().unwrap();
            let converter = ExternalConverter::locate(&script(temp.path(), "exit 0")).unwrap();
            let err = converter
                .convert(&temp.path().join("a.kra"), &temp.path().join("a.jpg"))
                .unwrap_err();
            assert!(matches!(err, ConversionFailure::OutputNotWritten(_)));
        }

        #[test]
        fn test_killed_by_signal() {
            let temp = TempDir::new().unwrap();
            let converter = ExternalConverter::locate(&script(temp.path(), "kill -9 $$")).unwrap();
            let err = converter
                .convert(&temp.path().join("a.kra"), &temp.path().join("a.jpg"))
                .unwrap_err();
            assert!(matches!(err, ConversionFailure::Signal { signal: 9 }));
        }
    }
}
