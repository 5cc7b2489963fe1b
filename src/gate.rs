//! Update gate
//!
//! Decides whether the root page's stamp warrants a full crawl. This is the
//! only guard against processing the same dataset twice.

use crate::timestamp::format_for_display;
use chrono::{DateTime, Utc};

/// Returns true when a run is warranted
///
/// * No previous instant → first ever run
/// * `current <= previous` → nothing new
/// * `current > previous` → new data
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use state_watch::gate::should_run;
///
/// let previous = Utc.with_ymd_and_hms(2016, 7, 19, 0, 0, 0).unwrap();
/// let current = Utc.with_ymd_and_hms(2016, 7, 20, 0, 0, 0).unwrap();
/// assert!(should_run(None, current));
/// assert!(should_run(Some(previous), current));
/// assert!(!should_run(Some(current), previous));
/// ```
pub fn should_run(previous: Option<DateTime<Utc>>, current: DateTime<Utc>) -> bool {
    let Some(previous) = previous else {
        tracing::info!("No previous timestamp, doing complete run");
        return true;
    };

    if current <= previous {
        tracing::info!(
            "No new data to retrieve ({} <= {})",
            format_for_display(&current),
            format_for_display(&previous)
        );
        return false;
    }

    tracing::info!(
        "Previous timestamp of {} < {} indicates we need to do complete run",
        format_for_display(&previous),
        format_for_display(&current)
    );
    true
}
