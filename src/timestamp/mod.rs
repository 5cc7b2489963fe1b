//! Timestamp handling for run gating
//!
//! Every instant the crate deals with is a `DateTime<Utc>`:
//! - Parsing free-text timestamps from page content and archive filenames
//! - Locating the root page's "Generated: ... UTC" stamp
//! - Formatting instants for logs, output directories and archive entries

mod format;
mod parse;

pub use format::{format_archive_stem, format_dir_token, format_for_display};
pub use parse::{extract_generated_instant, parse_instant};
