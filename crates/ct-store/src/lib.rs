//! Storage layer for the coding-time tracker.
//!
//! Persists month documents and the day overview as JSON files:
//!
//! - `<data_dir>/<year>/<month>.json` — one [`MonthDocument`] per
//!   calendar month (e.g. `2025/4.json`)
//! - `<data_dir>/overview.json` — the flat [`Overview`] sequence
//!
//! Documents are rewritten in full on every save; there is no
//! incremental diffing and no retry on failure. Callers decide what a
//! failed save means (the tracking host re-saves on its next periodic
//! cycle).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use ct_core::{MonthDocument, Overview};

/// What failed underneath a [`StoreError`].
#[derive(Debug, Error)]
pub enum StoreErrorKind {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Storage errors: what was being read or written, the operation it
/// happened during, and the underlying cause.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The resource was missing or malformed on read.
    #[error("reading {what} failed during {context}")]
    Read {
        what: String,
        context: &'static str,
        #[source]
        source: StoreErrorKind,
    },
    /// The resource could not be written.
    #[error("writing {what} failed during {context}")]
    Write {
        what: String,
        context: &'static str,
        #[source]
        source: StoreErrorKind,
    },
}

/// Addresses one month document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// The key for the month containing `date`.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.month)
    }
}

/// The load/save contract the host mediates between the engine and
/// durable storage.
pub trait Store {
    fn month_exists(&self, key: MonthKey) -> bool;
    fn load_month(&self, key: MonthKey, context: &'static str) -> Result<MonthDocument, StoreError>;
    fn save_month(
        &self,
        key: MonthKey,
        document: &MonthDocument,
        context: &'static str,
    ) -> Result<(), StoreError>;
    fn overview_exists(&self) -> bool;
    fn load_overview(&self, context: &'static str) -> Result<Overview, StoreError>;
    fn save_overview(&self, overview: &Overview, context: &'static str) -> Result<(), StoreError>;
}

/// File-backed store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn month_path(&self, key: MonthKey) -> PathBuf {
        self.data_dir
            .join(key.year.to_string())
            .join(format!("{}.json", key.month))
    }

    fn overview_path(&self) -> PathBuf {
        self.data_dir.join("overview.json")
    }

    fn read_json<T: DeserializeOwned>(path: &Path, context: &'static str) -> Result<T, StoreError> {
        let parse = || -> Result<T, StoreErrorKind> {
            let raw = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        };
        tracing::debug!(path = %path.display(), context, "loading document");
        parse().map_err(|source| StoreError::Read {
            what: path.display().to_string(),
            context,
            source,
        })
    }

    /// Serializes `value` to `path`, creating parent directories as
    /// needed. The file is replaced wholesale.
    fn write_json<T: Serialize>(
        path: &Path,
        value: &T,
        context: &'static str,
    ) -> Result<(), StoreError> {
        let write = || -> Result<(), StoreErrorKind> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let raw = serde_json::to_string(value)?;
            fs::write(path, raw)?;
            Ok(())
        };
        tracing::debug!(path = %path.display(), context, "saving document");
        write().map_err(|source| StoreError::Write {
            what: path.display().to_string(),
            context,
            source,
        })
    }
}

impl Store for JsonStore {
    fn month_exists(&self, key: MonthKey) -> bool {
        self.month_path(key).exists()
    }

    fn load_month(&self, key: MonthKey, context: &'static str) -> Result<MonthDocument, StoreError> {
        Self::read_json(&self.month_path(key), context)
    }

    fn save_month(
        &self,
        key: MonthKey,
        document: &MonthDocument,
        context: &'static str,
    ) -> Result<(), StoreError> {
        Self::write_json(&self.month_path(key), document, context)
    }

    fn overview_exists(&self) -> bool {
        self.overview_path().exists()
    }

    fn load_overview(&self, context: &'static str) -> Result<Overview, StoreError> {
        Self::read_json(&self.overview_path(), context)
    }

    fn save_overview(&self, overview: &Overview, context: &'static str) -> Result<(), StoreError> {
        Self::write_json(&self.overview_path(), overview, context)
    }
}
