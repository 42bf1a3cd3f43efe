//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Skip the initial launch data load
    #[arg(long)]
    pub no_seed: bool,
}

/// Ingest command arguments.
#[derive(Debug, Args)]
pub struct IngestCommand {
    /// Download the catalog even if it was already loaded
    #[arg(short, long)]
    pub force: bool,
}

/// Launch record commands.
#[derive(Debug, Subcommand)]
pub enum LaunchesCommand {
    /// List launches in flight number order
    List {
        /// Number of launches to skip
        #[arg(long, default_value = "0")]
        skip: u64,

        /// Maximum number of launches (0 for all)
        #[arg(short, long, default_value = "0")]
        limit: u64,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Abort an upcoming launch
    Abort {
        /// Flight number of the launch to abort
        flight_number: i64,
    },
}

/// Planet reference set commands.
#[derive(Debug, Subcommand)]
pub enum PlanetsCommand {
    /// Add planets to the reference set
    Add {
        /// Kepler names, e.g. "Kepler-442 b"
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List the reference set
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launches_command_debug() {
        let cmd = LaunchesCommand::Abort { flight_number: 101 };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Abort"));
        assert!(debug_str.contains("101"));
    }

    #[test]
    fn test_planets_command_debug() {
        let cmd = PlanetsCommand::Add {
            names: vec!["Kepler-62 f".to_string()],
        };
        assert!(format!("{cmd:?}").contains("Kepler-62 f"));
    }
}
