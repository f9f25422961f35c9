//! Flat day-overview rollup consumed by the visualization layer.

use serde::{Deserialize, Serialize};

/// Ordered `(date, fractional hours)` pairs, one entry per calendar day
/// ever recorded, independent of the per-day statistic tree.
///
/// Serializes as a JSON array of `["YYYY/M/D", hours]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overview {
    entries: Vec<(String, f64)>,
}

impl Overview {
    /// Records a day's recomputed total.
    ///
    /// If the last entry is already for `date` it is replaced, otherwise
    /// a new entry is appended; the sequence grows by at most one entry
    /// per calendar day and stays in date order.
    pub fn record(&mut self, date: &str, hours: f64) {
        match self.entries.last_mut() {
            Some(last) if last.0 == date => last.1 = hours,
            _ => self.entries.push((date.to_string(), hours)),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
