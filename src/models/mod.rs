// src/models/mod.rs

//! Domain models for the watcher application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod run;

// Re-export all public types
pub use config::{Config, NotifyConfig, SourceConfig, StoreConfig};
pub use record::{EnforcementRecord, RawRecord};
pub use run::{NotifyOutcome, RunState, RunSummary};
