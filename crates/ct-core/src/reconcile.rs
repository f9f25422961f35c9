//! Startup reconciliation between the session context and a previously
//! persisted month document.

use crate::stats::{DayRecord, MonthDocument};

/// Which lazy-construction path applies when a session starts against a
/// prior document.
///
/// Classification runs in priority order: missing day first, then
/// missing project, then missing day-scope language. Exactly one path
/// fires per startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupCase {
    /// The document has no record for today (also the shape of a brand
    /// new, empty document).
    NewDay,
    /// Today exists but has no record for the active project.
    NewProject,
    /// Today and the project exist, but the day-wide rollup has no
    /// bucket for the active language.
    NewLanguage,
    /// Today, project, and language are all present; adopt unchanged.
    Existing,
}

impl StartupCase {
    /// Classifies a startup against `prior` without modifying it.
    #[must_use]
    pub fn classify(prior: &MonthDocument, date: &str, project: &str, language: &str) -> Self {
        let Some(day) = prior.day(date) else {
            return Self::NewDay;
        };
        if !day.projects.contains_key(project) {
            return Self::NewProject;
        }
        if !day.languages.contains_key(language) {
            return Self::NewLanguage;
        }
        Self::Existing
    }
}

/// Merges the active context into `month` and returns today's record.
///
/// Fires the single lazy-construction path selected by
/// [`StartupCase::classify`]; existing days, projects, and languages
/// are never modified.
pub(crate) fn reconcile(
    month: &mut MonthDocument,
    date: &str,
    project: &str,
    language: &str,
) -> DayRecord {
    let case = StartupCase::classify(month, date, project, language);
    tracing::debug!(?case, date, project, language, "reconciled startup state");

    let day = month.ensure_day(date, language, project);
    match case {
        // ensure_day already seeded the fresh record.
        StartupCase::NewDay | StartupCase::Existing => {}
        StartupCase::NewProject => {
            day.ensure_project(project, language);
            // Pair the day-level bucket if the day lacks this language.
            day.ensure_language(language);
        }
        StartupCase::NewLanguage => {
            day.ensure_language(language);
            // Mirror the bucket into the project scope.
            day.ensure_project(project, language).ensure_language(language);
        }
    }
    day.clone()
}
