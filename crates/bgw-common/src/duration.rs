//! Wall-clock duration formatting
//!
//! Update jobs report their elapsed time in `HH:MM:SS` form, matching the
//! cache updater's historical log output.

use std::time::Duration;

/// Format a duration as `HH:MM:SS`, truncating sub-second precision.
///
/// Durations of a day or more keep counting hours (`25:00:00`) rather than
/// rolling over.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
