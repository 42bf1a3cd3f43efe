//! Command-line interface for launchpad.
//!
//! This module provides the CLI structure for the `launchpad` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, IngestCommand, LaunchesCommand, PlanetsCommand, ServeCommand};

use crate::logging::Verbosity;

/// launchpad - Track space launches
///
/// Ingests the launch catalog from the provider, stores it, and serves
/// schedule, list and abort operations over HTTP.
#[derive(Debug, Parser)]
#[command(name = "launchpad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Load the launch catalog from the provider
    Ingest(IngestCommand),

    /// Inspect or abort launches
    #[command(subcommand)]
    Launches(LaunchesCommand),

    /// Manage the planet reference set
    #[command(subcommand)]
    Planets(PlanetsCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
