//! Wall-clock timestamps in whole seconds since the Unix epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time as whole seconds since the Unix epoch.
///
/// A system clock set before 1970 yields `0` rather than an error.
pub fn unix_timestamp_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
