//! `launchpad` - A small service that tracks space launches
//!
//! This library ingests the launch catalog from an external provider,
//! persists launches in `SQLite`, and exposes scheduling, listing and abort
//! operations over HTTP.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod launch;
pub mod logging;
pub mod manager;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{IngestReport, LaunchProvider, SpaceXProvider};
pub use launch::{Launch, LaunchRequest, NewLaunch, Page, Planet};
pub use logging::init_logging;
pub use manager::{LaunchManager, SeedOutcome};
pub use storage::{LaunchRepository, Storage, StorageStats};
