//! Base-60 duration arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// A normalized hours/minutes/seconds duration.
///
/// `minutes` and `seconds` always stay below 60. `hours` has no upper
/// bound; there is no larger unit to carry into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub hours: u64,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimeSpan {
    /// The zero duration.
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Decomposes a millisecond count into a normalized span.
    ///
    /// Sub-second remainders are discarded.
    #[must_use]
    pub const fn from_millis(elapsed_ms: u64) -> Self {
        Self {
            hours: elapsed_ms / MILLIS_PER_HOUR,
            minutes: ((elapsed_ms / MILLIS_PER_MINUTE) % 60) as u32,
            seconds: ((elapsed_ms / MILLIS_PER_SECOND) % 60) as u32,
        }
    }

    /// Adds two normalized spans, carrying seconds into minutes and
    /// minutes into hours.
    ///
    /// With both inputs normalized, each component sum is at most 119,
    /// so a single carry per position suffices.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        let mut seconds = self.seconds + other.seconds;
        let mut minutes = self.minutes + other.minutes;
        let mut hours = self.hours + other.hours;
        if seconds >= 60 {
            seconds -= 60;
            minutes += 1;
        }
        if minutes >= 60 {
            minutes -= 60;
            hours += 1;
        }
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Adds an elapsed millisecond delta to this span.
    #[must_use]
    pub const fn add_elapsed(self, elapsed_ms: u64) -> Self {
        self.add(Self::from_millis(elapsed_ms))
    }

    /// The span expressed as a single fractional-hour number, rounded to
    /// six decimal places.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fractional_hours(self) -> f64 {
        let hours =
            self.hours as f64 + (f64::from(self.minutes) + f64::from(self.seconds) / 60.0) / 60.0;
        (hours * 1_000_000.0).round() / 1_000_000.0
    }
}

impl fmt::Display for TimeSpan {
    /// Status-line form, e.g. `"2 hs 15 mins "`. Seconds are not shown;
    /// the trailing space separates the text from a host-appended icon.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hs {} mins ", self.hours, self.minutes)
    }
}
