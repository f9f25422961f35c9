//! The nested day/project/language statistic tree.
//!
//! All construction is lazy and purely additive: a lookup that would
//! miss a key inserts a zeroed record instead, and nothing ever deletes
//! or renames existing keys. `BTreeMap` keeps serialized documents and
//! rendered reports deterministic.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::TimeSpan;

/// The date-string key used throughout the persisted documents:
/// unpadded `YYYY/M/D`, e.g. `"2025/8/6"`.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

/// Per-language totals, nested at day or project scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageBucket {
    pub totals: TimeSpan,

    /// Reserved time-period markers. Always constructed empty; kept for
    /// document-shape compatibility with the visualization consumer.
    #[serde(default)]
    pub time_period: Vec<serde_json::Value>,
}

/// Per-project rollup for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub totals: TimeSpan,

    #[serde(default)]
    pub languages: BTreeMap<String, LanguageBucket>,

    /// Reserved, see [`LanguageBucket::time_period`].
    #[serde(default)]
    pub time_period: Vec<serde_json::Value>,
}

impl ProjectRecord {
    /// A zeroed project record with a single language bucket.
    #[must_use]
    pub fn seeded(language: &str) -> Self {
        let mut record = Self::default();
        record
            .languages
            .insert(language.to_string(), LanguageBucket::default());
        record
    }

    /// Returns the bucket for `language`, inserting a zeroed one if
    /// absent.
    pub fn ensure_language(&mut self, language: &str) -> &mut LanguageBucket {
        self.languages.entry(language.to_string()).or_default()
    }
}

/// The complete statistic tree for one calendar day.
///
/// Invariants, restored by every flush: `totals` equals the sum of all
/// project totals, and each day-scope language bucket equals the sum of
/// that language's buckets across projects. The day- and project-scope
/// buckets for a language are separate values, never aliased.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub totals: TimeSpan,

    /// Day-wide per-language rollup.
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageBucket>,

    /// Per-project breakdown.
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectRecord>,
}

impl DayRecord {
    /// A zeroed day seeded with one project and one language bucket at
    /// both scopes.
    #[must_use]
    pub fn seeded(language: &str, project: &str) -> Self {
        let mut day = Self::default();
        day.languages
            .insert(language.to_string(), LanguageBucket::default());
        day.projects
            .insert(project.to_string(), ProjectRecord::seeded(language));
        day
    }

    /// Returns the record for `project`, inserting a zeroed one (seeded
    /// with `language`) if absent. Existing projects are untouched.
    pub fn ensure_project(&mut self, project: &str, language: &str) -> &mut ProjectRecord {
        self.projects
            .entry(project.to_string())
            .or_insert_with(|| ProjectRecord::seeded(language))
    }

    /// Returns the day-scope bucket for `language`, inserting a zeroed
    /// one if absent.
    pub fn ensure_language(&mut self, language: &str) -> &mut LanguageBucket {
        self.languages.entry(language.to_string()).or_default()
    }
}

/// One calendar month of day records, keyed by [`date_key`] strings.
///
/// This is the persisted unit: the whole document is rewritten on every
/// save, never diffed incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthDocument(BTreeMap<String, DayRecord>);

impl MonthDocument {
    #[must_use]
    pub fn day(&self, date: &str) -> Option<&DayRecord> {
        self.0.get(date)
    }

    pub fn day_mut(&mut self, date: &str) -> Option<&mut DayRecord> {
        self.0.get_mut(date)
    }

    /// Returns the record for `date`, building a fresh seeded day if
    /// none exists.
    pub fn ensure_day(&mut self, date: &str, language: &str, project: &str) -> &mut DayRecord {
        self.0
            .entry(date.to_string())
            .or_insert_with(|| DayRecord::seeded(language, project))
    }

    pub fn insert_day(&mut self, date: &str, day: DayRecord) {
        self.0.insert(date.to_string(), day);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DayRecord)> {
        self.0.iter()
    }
}
