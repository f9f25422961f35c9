//! Coding-time tracker CLI library.
//!
//! This crate provides the `ct` command-line interface: the tracking
//! session host plus read-only views over the stored documents.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
