//! Wall-clock helpers.

use std::time::{SystemTime, UNIX_EPOCH};

/// Whole seconds since the unix epoch.
///
/// Returns 0 if the system clock is set before the epoch.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
