//! Reply formatting for queries.

use crate::device::FrequencyRange;

/// Femtoseconds per second.
pub const FS_PER_SECOND: f64 = 1e15;

/// Slowest sample rate advertised by `RATES?`, whatever the device allows.
const RATE_FLOOR_HZ: f64 = 1000.0;

/// Sample intervals in femtoseconds for the 1-2-5 rate ladder.
///
/// Starting at the device maximum, each decade contributes the rate itself,
/// half of it and a fifth of it, until the rate drops below
/// `max(min_hz, 1 kHz)`.
#[must_use]
pub fn sample_intervals_fs(range: FrequencyRange) -> Vec<f64> {
    let floor = range.min_hz.max(RATE_FLOOR_HZ);
    let mut intervals = Vec::new();
    let mut frequency = range.max_hz;
    while frequency.is_finite() && frequency >= floor {
        for divisor in [1.0, 2.0, 5.0] {
            intervals.push(FS_PER_SECOND / (frequency / divisor));
        }
        frequency /= 10.0;
    }
    intervals
}

/// Formats a comma-terminated list, one entry per value.
pub(crate) fn comma_list<T: std::fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values.into_iter().map(|value| format!("{value},")).collect()
}

/// `RATES?` reply body.
pub(crate) fn rates_reply(range: FrequencyRange) -> String {
    comma_list(
        sample_intervals_fs(range)
            .into_iter()
            .map(|interval| format!("{interval:.0}")),
    )
}
