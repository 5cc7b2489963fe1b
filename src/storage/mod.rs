//! Storage module for the run high-water mark
//!
//! This module records which generated instants have been fully processed:
//! - A `TimestampStore` trait for the gate's view of past runs
//! - A directory-backed archive with one empty `.timestamp` marker per run

mod archive;
mod traits;

pub use archive::{TimestampArchive, ARCHIVE_SUFFIX};
pub use traits::{StorageError, StorageResult, TimestampStore};

use crate::WatchError;
use std::path::Path;

/// Opens the timestamp archive at `dir`, creating the directory if needed
///
/// # Arguments
///
/// * `dir` - Directory holding the `.timestamp` markers
///
/// # Returns
///
/// * `Ok(TimestampArchive)` - Ready-to-use archive
/// * `Err(WatchError)` - The directory could not be created
pub fn open_archive(dir: &Path) -> Result<TimestampArchive, WatchError> {
    Ok(TimestampArchive::open(dir)?)
}
