//! Shared domain types and configuration for postbatch.
//!
//! Everything here is free of I/O except configuration loading and the
//! store registry file, so the parsing and pipeline crates can depend on it
//! without pulling in HTTP or spreadsheet stacks.

pub mod actions;
pub mod app_config;
pub mod config;
pub mod error;
pub mod schedule;
pub mod stores;
pub mod submission;

pub use app_config::{AppConfig, DEFAULT_ASSET_URL_TEMPLATE};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use schedule::TriggerSchedule;
pub use stores::{load_store_registry, mark_uploaded, save_store_registry, StoreRecord};
pub use submission::{
    FileRoutingState, ParsedSubmission, RowOutcome, SubmissionHeader, SubmissionRow,
};
