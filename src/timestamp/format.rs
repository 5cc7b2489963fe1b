use chrono::{DateTime, Utc};

/// Formats an instant for log output
///
/// Fractional seconds are printed only when non-zero, so the output parses back
/// to the same instant.
pub fn format_for_display(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S%.f UTC").to_string()
}

/// Formats an instant as a directory-safe token, e.g. `20160720_203436`
///
/// Built from the whole-second display form: spaces become underscores,
/// hyphens and colons are dropped, and the trailing `_UTC` is cut.
pub fn format_dir_token(instant: &DateTime<Utc>) -> String {
    let display = instant.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let token = display.replace(' ', "_").replace(['-', ':'], "");

    match token.strip_suffix("_UTC") {
        Some(stripped) => stripped.to_string(),
        None => token,
    }
}

/// Formats an instant as the stem of a timestamp archive entry
///
/// Keeps fractional seconds so the recorded high-water mark compares equal to
/// the instant that was observed.
pub fn format_archive_stem(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}
