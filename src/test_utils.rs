#[cfg(test)]
pub mod fixtures {
    use crate::KritanetContext;
    use crate::config::Config;
    use crate::converter::{ConversionFailure, Converter};
    use anyhow::Result;
    use filetime::FileTime;
    use std::cell::RefCell;
    use std::ffi::OsStr;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// Fixed base time so tests do not depend on the clock.
    pub const BASE: Duration = Duration::from_secs(1_700_000_000);

    pub struct TestArchive {
        pub temp_dir: TempDir,
        pub source: PathBuf,
        pub destination: PathBuf,
    }

    impl TestArchive {
        pub fn new() -> Result<Self> {
            let temp_dir = tempfile::tempdir()?;
            let source = temp_dir.path().join("source");
            let destination = temp_dir.path().join("destination");
            fs::create_dir_all(&source)?;
            fs::create_dir_all(&destination)?;

            Ok(Self {
                temp_dir,
                source,
                destination,
            })
        }

        pub fn context(&self) -> KritanetContext {
            KritanetContext::with_config(
                self.source.clone(),
                self.destination.clone(),
                Config::default(),
            )
        }

        /// Create a card at `BASE`.
        pub fn card(&self, relative: &str) -> Result<PathBuf> {
            write_at(&self.source.join(relative), relative, Duration::ZERO)
        }

        /// Create a preview at `BASE + offset`.
        pub fn preview(&self, relative: &str, offset: Duration) -> Result<PathBuf> {
            write_at(&self.destination.join(relative), relative, offset)
        }
    }

    fn write_at(path: &Path, content: &str, offset: Duration) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        set_mtime(path, SystemTime::UNIX_EPOCH + BASE + offset)?;
        Ok(path.to_path_buf())
    }

    pub fn set_mtime(path: &Path, time: SystemTime) -> Result<()> {
        filetime::set_file_mtime(path, FileTime::from_system_time(time))?;
        Ok(())
    }

    /// Converter that copies the input and records every call.
    #[derive(Default)]
    pub struct RecordingConverter {
        calls: RefCell<Vec<(PathBuf, PathBuf)>>,
        fail_on: Option<String>,
    }

    impl RecordingConverter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail for any input whose file name is `name`.
        pub fn failing_on(name: &str) -> Self {
            Self {
                fail_on: Some(name.to_string()),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
            self.calls.borrow().clone()
        }
    }

    impl Converter for RecordingConverter {
        fn describe(&self) -> String {
            "recording converter".to_string()
        }

        fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionFailure> {
            self.calls
                .borrow_mut()
                .push((input.to_path_buf(), output.to_path_buf()));

            if self.fail_on.as_deref().map(OsStr::new) == input.file_name() {
                return Err(ConversionFailure::from_exit(1, b"could not load document"));
            }

            fs::copy(input, output).map_err(ConversionFailure::Spawn)?;
            Ok(())
        }
    }
}
