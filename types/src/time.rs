//! `H:M:S.ms` timestamps for transcript lines and outcome labels.

use chrono::Timelike;

/// Millisecond component of `time`, always in `0..=999`.
///
/// chrono represents a leap second as a nanosecond value past one billion;
/// that spill-over folds back into the same range.
#[inline]
#[must_use]
pub fn millis_of(time: &impl Timelike) -> u32 {
    (time.nanosecond() / 1_000_000) % 1_000
}

/// Format `time` as `H:M:S.ms` with no zero padding, e.g. `9:5:3.42`.
#[must_use]
pub fn at_time(time: &impl Timelike) -> String {
    format!(
        "{}:{}:{}.{}",
        time.hour(),
        time.minute(),
        time.second(),
        millis_of(time)
    )
}
