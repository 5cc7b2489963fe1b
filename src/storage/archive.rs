//! Directory-backed timestamp archive
//!
//! Each completed run leaves an empty file named
//! `<YYYY-MM-DD HH:MM:SS[.ffffff]>.timestamp`. The name is the data; content
//! is never read.

use crate::storage::traits::{StorageError, StorageResult, TimestampStore};
use crate::timestamp::{format_archive_stem, format_for_display, parse_instant};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Filename suffix of archive markers
pub const ARCHIVE_SUFFIX: &str = ".timestamp";

/// Timestamp store kept as marker files in one directory
#[derive(Debug, Clone)]
pub struct TimestampArchive {
    dir: PathBuf,
}

impl TimestampArchive {
    /// Opens an archive rooted at `dir`, creating the directory if absent
    pub fn open(dir: &Path) -> StorageResult<Self> {
        if !dir.is_dir() {
            fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
            tracing::info!("Created directory '{}' for timestamps", dir.display());
        }

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the marker that records `instant`
    pub fn entry_path(&self, instant: &DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("{}{}", format_archive_stem(instant), ARCHIVE_SUFFIX))
    }
}

impl TimestampStore for TimestampArchive {
    fn recorded(&self) -> StorageResult<Vec<DateTime<Utc>>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        let mut instants = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|source| io_error(&self.dir, source))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();

            match parse_entry(&entry.path(), &file_name) {
                Ok(instant) => {
                    tracing::debug!("Found recorded timestamp {}", format_for_display(&instant));
                    instants.push(instant);
                }
                Err(e) => {
                    tracing::warn!("Ignoring '{}' in timestamp archive: {}", file_name, e);
                }
            }
        }

        Ok(instants)
    }

    fn record(&mut self, instant: &DateTime<Utc>) -> StorageResult<()> {
        let path = self.entry_path(instant);

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| io_error(&path, source))?;

        tracing::info!(
            "Recorded {} in timestamp archive ({})",
            format_for_display(instant),
            path.display()
        );
        Ok(())
    }
}

fn parse_entry(path: &Path, file_name: &str) -> StorageResult<DateTime<Utc>> {
    if !path.is_file() {
        return Err(StorageError::InvalidEntry("not a regular file".to_string()));
    }

    let stem = file_name
        .strip_suffix(ARCHIVE_SUFFIX)
        .ok_or_else(|| StorageError::InvalidEntry(format!("missing '{}' suffix", ARCHIVE_SUFFIX)))?;

    parse_instant(stem).map_err(|e| StorageError::InvalidEntry(e.to_string()))
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
