/*!
 * Core Types
 * Common types used across the scheduler
 */

use time::macros::format_description;
use time::OffsetDateTime;

/// Worker core index (0..core_count)
pub type CoreId = usize;

/// Count of work units
pub type Units = u32;

/// Format a timestamp as `MM/DD/YYYY, HH:MM:SS AM/PM`
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!(
        "[month]/[day]/[year], [hour repr:12]:[minute]:[second] [period]"
    );
    at.format(format).unwrap_or_else(|_| at.to_string())
}

/// Current wall-clock time in display format
///
/// Uses the local offset when it can be determined soundly, UTC otherwise.
pub fn now_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_timestamp(now)
}
