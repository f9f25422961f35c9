//! Core accounting engine for the coding-time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - `TimeSpan`: base-60 duration arithmetic
//! - the statistic tree: day / project / language rollups with lazy,
//!   purely additive construction
//! - `Tracker`: sampling elapsed wall time into the tree
//! - startup reconciliation against a previously persisted month
//! - the flat day overview fed to visualizations

mod overview;
mod reconcile;
mod stats;
mod timespan;
mod tracker;

pub use overview::Overview;
pub use reconcile::StartupCase;
pub use stats::{DayRecord, LanguageBucket, MonthDocument, ProjectRecord, date_key};
pub use timespan::TimeSpan;
pub use tracker::{SessionContext, Tracker};
