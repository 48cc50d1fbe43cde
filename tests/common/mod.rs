#![allow(dead_code)]

use anyhow::Result;
use filetime::FileTime;
use kritanet::KritanetContext;
use kritanet::config::Config;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Fixed base time so tests do not depend on the clock.
pub const BASE: Duration = Duration::from_secs(1_700_000_000);

/// A source tree and a destination tree inside one temporary directory.
pub struct TestArchive {
    pub temp_dir: TempDir,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl TestArchive {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let source = temp_dir.path().join("antinet");
        let destination = temp_dir.path().join("previews");
        fs::create_dir_all(&source)?;
        fs::create_dir_all(&destination)?;

        Ok(Self {
            temp_dir,
            source,
            destination,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Context with default settings, independent of the user's config file.
    pub fn context(&self) -> KritanetContext {
        KritanetContext::with_config(
            self.source.clone(),
            self.destination.clone(),
            Config::default(),
        )
    }

    /// Write a card with mtime `BASE + offset`.
    pub fn card(&self, relative: &str, offset: Duration) -> Result<PathBuf> {
        write_at(&self.source.join(relative), relative, offset)
    }

    /// Write a preview with mtime `BASE + offset`.
    pub fn preview(&self, relative: &str, offset: Duration) -> Result<PathBuf> {
        write_at(&self.destination.join(relative), relative, offset)
    }

    /// Path of a config file that does not exist, so defaults apply.
    pub fn missing_config(&self) -> PathBuf {
        self.temp_dir.path().join("no-config.toml")
    }

    /// Write an executable shell script acting as the converter.
    ///
    /// The script receives the default arguments:
    /// `<input> --export --export-filename <output>`.
    #[cfg(unix)]
    pub fn converter_script(&self, name: &str, body: &str) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.temp_dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}

pub fn write_at(path: &Path, content: &str, offset: Duration) -> Result<PathBuf> {
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

pub fn modified(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}
