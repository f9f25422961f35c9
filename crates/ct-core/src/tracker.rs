//! The accounting engine: samples elapsed wall time and routes it into
//! the statistic tree.
//!
//! Every entry point takes the current wall clock explicitly; the host
//! passes `Utc::now()`. Keeping the clock out of the engine makes the
//! accounting deterministic under test.

use chrono::{DateTime, NaiveDate, Utc};

use crate::reconcile::reconcile;
use crate::stats::{DayRecord, MonthDocument, date_key};

const UNKNOWN: &str = "unknown";

/// The project and language a session attributes time to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub project: String,
    pub language: String,
}

impl SessionContext {
    pub fn new(project: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            language: language.into(),
        }
    }

    /// Builds a context from whatever the host could determine; missing
    /// pieces fall back to `"unknown"`.
    #[must_use]
    pub fn from_host(project: Option<String>, language: Option<String>) -> Self {
        Self {
            project: project.unwrap_or_else(|| UNKNOWN.to_string()),
            language: language.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }
}

/// The accounting engine.
///
/// Owns the single mutable [`DayRecord`] for the session's date plus
/// the month document it was reconciled from. The date is fixed at
/// construction: time elapsed past midnight is still credited to the
/// original day until the process restarts.
#[derive(Debug)]
pub struct Tracker {
    active_date: String,
    active_project: String,
    active_language: String,
    month: MonthDocument,
    day: DayRecord,
    last_sample: DateTime<Utc>,
    update_in_progress: bool,
    pending_language: Option<String>,
}

impl Tracker {
    /// Reconciles `context` against a previously persisted month (if
    /// any) and starts sampling from `now`.
    ///
    /// `today` is the host-resolved local date the whole session will
    /// be accounted under.
    #[must_use]
    pub fn new(
        context: SessionContext,
        prior: Option<MonthDocument>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        let active_date = date_key(today);
        let mut month = prior.unwrap_or_default();
        let day = reconcile(&mut month, &active_date, &context.project, &context.language);
        Self {
            active_date,
            active_project: context.project,
            active_language: context.language,
            month,
            day,
            last_sample: now,
            update_in_progress: false,
            pending_language: None,
        }
    }

    /// The `YYYY/M/D` key all of this session's time is credited to.
    #[must_use]
    pub fn active_date(&self) -> &str {
        &self.active_date
    }

    #[must_use]
    pub fn active_project(&self) -> &str {
        &self.active_project
    }

    #[must_use]
    pub fn active_language(&self) -> &str {
        &self.active_language
    }

    /// Flushes, then returns today's total as fractional hours (six
    /// decimal places).
    pub fn hours_today(&mut self, now: DateTime<Utc>) -> f64 {
        self.flush(now);
        self.day.totals.fractional_hours()
    }

    /// Flushes, then returns the status-line text, e.g. `"2 hs 15 mins "`.
    pub fn formatted_today(&mut self, now: DateTime<Utc>) -> String {
        self.flush(now);
        self.day.totals.to_string()
    }

    /// Switches the language future time is attributed to.
    ///
    /// Elapsed time up to this call is flushed under the previous
    /// language first. `None` (the host could not determine a language)
    /// is a no-op. If an update is in progress the switch is deferred
    /// and drained by the flush path once the elapsed time has been
    /// credited; the event is never dropped.
    pub fn language_changed(&mut self, language: Option<&str>, now: DateTime<Utc>) {
        let Some(language) = language else { return };
        if self.update_in_progress {
            tracing::debug!(language, "language change deferred: update in progress");
            self.pending_language = Some(language.to_string());
            return;
        }
        self.flush(now);
        self.switch_language(language);
    }

    /// Flushes, folds today's record back into the month document under
    /// the active date, and returns the full document for persistence.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> &MonthDocument {
        self.flush(now);
        self.month.insert_day(&self.active_date, self.day.clone());
        &self.month
    }

    /// Samples wall time since the last flush and credits it to all
    /// four aggregates addressed by the active date, project, and
    /// language.
    ///
    /// Skipped entirely while an update is already in progress; callers
    /// then observe the last flushed state.
    fn flush(&mut self, now: DateTime<Utc>) {
        if self.update_in_progress {
            tracing::debug!("flush skipped: update already in progress");
            return;
        }
        self.update_in_progress = true;

        let elapsed_ms = u64::try_from((now - self.last_sample).num_milliseconds()).unwrap_or(0);
        self.last_sample = now;
        self.apply_elapsed(elapsed_ms);

        // A deferred switch is applied only after the elapsed time has
        // been credited to the language it was typed in.
        if let Some(language) = self.pending_language.take() {
            self.switch_language(&language);
        }
        self.update_in_progress = false;
    }

    /// Adds the same delta to the day total, the day-scope language
    /// bucket, the project total, and the project-scope language
    /// bucket. Each target is read, added to, and written back as a
    /// value, so no update can observe another's partial state.
    fn apply_elapsed(&mut self, elapsed_ms: u64) {
        self.day.totals = self.day.totals.add_elapsed(elapsed_ms);

        let day_bucket = self.day.ensure_language(&self.active_language);
        day_bucket.totals = day_bucket.totals.add_elapsed(elapsed_ms);

        let project = self
            .day
            .ensure_project(&self.active_project, &self.active_language);
        project.totals = project.totals.add_elapsed(elapsed_ms);

        let project_bucket = project.ensure_language(&self.active_language);
        project_bucket.totals = project_bucket.totals.add_elapsed(elapsed_ms);
    }

    /// Makes `language` the active one, lazily ensuring its buckets at
    /// both scopes.
    fn switch_language(&mut self, language: &str) {
        tracing::debug!(from = %self.active_language, to = language, "active language changed");
        self.active_language = language.to_string();
        self.day.ensure_language(language);
        self.day
            .ensure_project(&self.active_project, language)
            .ensure_language(language);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeSpan;
    use chrono::{Duration, TimeZone};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 6).expect("valid test date")
    }

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 6, 9, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::seconds(seconds)
    }

    fn tracker(project: &str, language: &str) -> Tracker {
        Tracker::new(
            SessionContext::new(project, language),
            None,
            today(),
            ts(0),
        )
    }

    fn total_millis(t: TimeSpan) -> u64 {
        ((t.hours * 60 + u64::from(t.minutes)) * 60 + u64::from(t.seconds)) * 1000
    }

    fn assert_rollup_invariants(day: &DayRecord) {
        let project_sum: u64 = day.projects.values().map(|p| total_millis(p.totals)).sum();
        assert_eq!(total_millis(day.totals), project_sum);

        for (language, bucket) in &day.languages {
            let per_project: u64 = day
                .projects
                .values()
                .filter_map(|p| p.languages.get(language))
                .map(|b| total_millis(b.totals))
                .sum();
            assert_eq!(total_millis(bucket.totals), per_project, "language {language}");
        }
    }

    #[test]
    fn flush_credits_all_four_aggregates() {
        let mut tracker = tracker("ct", "rust");
        tracker.snapshot(ts(90));

        let day = &tracker.day;
        let expected = TimeSpan {
            hours: 0,
            minutes: 1,
            seconds: 30,
        };
        assert_eq!(day.totals, expected);
        assert_eq!(day.languages["rust"].totals, expected);
        assert_eq!(day.projects["ct"].totals, expected);
        assert_eq!(day.projects["ct"].languages["rust"].totals, expected);
        assert_rollup_invariants(day);
    }

    #[test]
    fn zero_elapsed_flush_changes_nothing() {
        let mut tracker = tracker("ct", "rust");
        tracker.snapshot(ts(45));
        let before = tracker.day.clone();

        // Same instant again: elapsed is zero.
        tracker.snapshot(ts(45));
        assert_eq!(tracker.day, before);
    }

    #[test]
    fn clock_going_backwards_credits_nothing() {
        let mut tracker = tracker("ct", "rust");
        tracker.snapshot(ts(60));
        tracker.snapshot(ts(30));
        assert_eq!(tracker.day.totals.minutes, 1);
        assert_eq!(tracker.day.totals.seconds, 0);
    }

    #[test]
    fn language_switch_credits_old_language_first() {
        let mut tracker = tracker("demo", "python");

        // 90 seconds under python, then switch to go, then 30 more.
        tracker.language_changed(Some("go"), ts(90));
        tracker.snapshot(ts(120));

        let day = &tracker.day;
        assert_eq!(
            day.languages["python"].totals,
            TimeSpan {
                hours: 0,
                minutes: 1,
                seconds: 30
            }
        );
        assert_eq!(
            day.languages["go"].totals,
            TimeSpan {
                hours: 0,
                minutes: 0,
                seconds: 30
            }
        );
        assert_eq!(
            day.totals,
            TimeSpan {
                hours: 0,
                minutes: 2,
                seconds: 0
            }
        );
        // Mirrored at project scope.
        assert_eq!(day.projects["demo"].languages["python"].totals.seconds, 30);
        assert_eq!(day.projects["demo"].languages["go"].totals.seconds, 30);
        assert_rollup_invariants(day);
    }

    #[test]
    fn undefined_language_change_is_a_no_op() {
        let mut tracker = tracker("ct", "rust");
        tracker.language_changed(None, ts(30));

        assert_eq!(tracker.active_language(), "rust");
        // Not even a flush happened.
        assert_eq!(tracker.last_sample, ts(0));
    }

    #[test]
    fn guarded_entry_points_do_not_sample() {
        let mut tracker = tracker("ct", "rust");
        tracker.update_in_progress = true;

        let formatted = tracker.formatted_today(ts(300));
        assert_eq!(formatted, "0 hs 0 mins ");
        assert_eq!(tracker.last_sample, ts(0));
        assert_eq!(tracker.day.totals, TimeSpan::ZERO);
    }

    #[test]
    fn language_change_during_update_is_deferred_not_dropped() {
        let mut tracker = tracker("demo", "python");

        tracker.update_in_progress = true;
        tracker.language_changed(Some("go"), ts(30));
        assert_eq!(tracker.active_language(), "python");
        assert_eq!(tracker.pending_language.as_deref(), Some("go"));

        // Update completes; the next flush drains the queue after
        // crediting the elapsed time to the old language.
        tracker.update_in_progress = false;
        tracker.snapshot(ts(60));

        assert_eq!(tracker.active_language(), "go");
        assert!(tracker.pending_language.is_none());
        assert_eq!(tracker.day.languages["python"].totals.seconds, 0);
        assert_eq!(tracker.day.languages["python"].totals.minutes, 1);
        assert_eq!(tracker.day.languages["go"].totals, TimeSpan::ZERO);
        assert_rollup_invariants(&tracker.day);
    }

    #[test]
    fn prior_document_accumulates_across_projects() {
        // Yesterday's session left project "a" with 1h30m of python.
        let mut prior = MonthDocument::default();
        let date = date_key(today());
        let span = TimeSpan {
            hours: 1,
            minutes: 30,
            seconds: 0,
        };
        let day = prior.ensure_day(&date, "python", "a");
        day.totals = span;
        day.ensure_language("python").totals = span;
        let project = day.ensure_project("a", "python");
        project.totals = span;
        project.ensure_language("python").totals = span;

        let mut tracker = Tracker::new(
            SessionContext::new("b", "python"),
            Some(prior),
            today(),
            ts(0),
        );
        tracker.snapshot(ts(30 * 60));

        let day = &tracker.day;
        assert_eq!(day.projects["a"].totals.minutes, 30);
        assert_eq!(day.projects["a"].totals.hours, 1);
        assert_eq!(day.projects["b"].totals.minutes, 30);
        assert_eq!(
            day.totals,
            TimeSpan {
                hours: 2,
                minutes: 0,
                seconds: 0
            }
        );
        assert_rollup_invariants(day);
    }

    #[test]
    fn active_date_never_rolls_past_midnight() {
        let mut tracker = tracker("ct", "rust");
        let next_day = ts(26 * 3600);
        let month = tracker.snapshot(next_day);

        assert_eq!(month.len(), 1);
        let day = month.day("2025/4/6").expect("session day present");
        assert_eq!(day.totals.hours, 26);
    }

    #[test]
    fn snapshot_folds_day_into_month() {
        let mut tracker = tracker("ct", "rust");
        tracker.snapshot(ts(60));

        let month = tracker.snapshot(ts(60));
        let day = month.day("2025/4/6").expect("day present");
        assert_eq!(day.totals.minutes, 1);
    }

    #[test]
    fn hours_today_reports_six_decimal_fraction() {
        let mut tracker = tracker("ct", "rust");
        let hours = tracker.hours_today(ts(2 * 60));
        assert!((hours - 0.033_333).abs() < 1e-9);
    }

    #[test]
    fn from_host_defaults_to_unknown() {
        let context = SessionContext::from_host(None, Some("rust".to_string()));
        assert_eq!(context.project, "unknown");
        assert_eq!(context.language, "rust");
        assert_eq!(SessionContext::default().language, "unknown");
    }
}
