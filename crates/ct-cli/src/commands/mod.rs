//! Subcommand implementations.

pub mod overview;
pub mod report;
pub mod track;
