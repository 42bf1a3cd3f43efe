//! `launchpad` - CLI and HTTP server for launch tracking
//!
//! This binary serves the launch API and provides maintenance commands for
//! the launch store and planet reference set.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use launchpad::api::{self, AppState};
use launchpad::cli::{
    Cli, Command, ConfigCommand, IngestCommand, LaunchesCommand, PlanetsCommand, ServeCommand,
};
use launchpad::{
    init_logging, Config, LaunchManager, Page, Planet, SeedOutcome, SpaceXProvider, Storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(&config, &serve_cmd).await,
        Command::Ingest(ingest_cmd) => handle_ingest(&config, &ingest_cmd).await,
        Command::Launches(launches_cmd) => handle_launches(&config, launches_cmd).await,
        Command::Planets(planets_cmd) => handle_planets(&config, planets_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Arc<Storage>> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("opening launch database {}", path.display()))?;
    Ok(Arc::new(storage))
}

fn provider(config: &Config) -> anyhow::Result<SpaceXProvider> {
    Ok(SpaceXProvider::new(
        config.ingest.provider_url.clone(),
        config.provider_timeout(),
    )?)
}

async fn handle_serve(config: &Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    let manager = LaunchManager::new(open_storage(config)?);

    if config.ingest.load_on_startup && !cmd.no_seed {
        // A failed load leaves the service usable with whatever is stored.
        match manager.load_initial_data(&provider(config)?).await {
            Ok(SeedOutcome::AlreadyLoaded) => {}
            Ok(SeedOutcome::Loaded(report)) => info!(
                saved = report.saved,
                failed = report.failed,
                "Initial launch data loaded"
            ),
            Err(e) => warn!(error = %e, "Initial launch data load failed"),
        }
    }

    let state = Arc::new(AppState::new(manager, config.api.clone()));
    api::serve(config.bind_addr()?, state).await?;
    Ok(())
}

async fn handle_ingest(config: &Config, cmd: &IngestCommand) -> anyhow::Result<()> {
    let manager = LaunchManager::new(open_storage(config)?);
    let provider = provider(config)?;

    let report = if cmd.force {
        manager.ingest(&provider).await?
    } else {
        match manager.load_initial_data(&provider).await? {
            SeedOutcome::AlreadyLoaded => {
                println!("Launch data already loaded. Use --force to download again.");
                return Ok(());
            }
            SeedOutcome::Loaded(report) => report,
        }
    };

    println!(
        "Fetched {} launches: {} saved, {} failed.",
        report.fetched, report.saved, report.failed
    );
    Ok(())
}

async fn handle_launches(config: &Config, cmd: LaunchesCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let manager = LaunchManager::new(storage.clone());

    match cmd {
        LaunchesCommand::List { skip, limit, json } => {
            let launches = manager.get_launches(Page::new(skip, limit)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&launches)?);
                return Ok(());
            }

            println!(
                "{:>6}  {:<10}  {:<28}  {:<14}  {:<9}  {}",
                "FLIGHT", "DATE", "MISSION", "ROCKET", "UPCOMING", "SUCCESS"
            );
            for launch in &launches {
                let success = match launch.success {
                    Some(true) => "yes",
                    Some(false) => "no",
                    None => "unknown",
                };
                println!(
                    "{:>6}  {:<10}  {:<28}  {:<14}  {:<9}  {}",
                    launch.flight_number,
                    launch.launch_date.format("%Y-%m-%d"),
                    launch.mission,
                    launch.rocket,
                    launch.upcoming,
                    success
                );
            }

            let stats = storage.stats()?;
            println!();
            println!(
                "{} shown, {} stored ({} upcoming)",
                launches.len(),
                stats.total_launches,
                stats.upcoming_launches
            );
        }
        LaunchesCommand::Abort { flight_number } => {
            if !manager.launch_exists(flight_number).await {
                anyhow::bail!("launch {flight_number} not found");
            }
            if !manager.abort_launch(flight_number).await {
                anyhow::bail!("launch {flight_number} was not aborted");
            }
            println!("Aborted launch {flight_number}.");
        }
    }
    Ok(())
}

fn handle_planets(config: &Config, cmd: PlanetsCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;

    match cmd {
        PlanetsCommand::Add { names } => {
            for name in names {
                let planet = Planet::new(name.trim());
                if storage.insert_planet(&planet)? {
                    println!("Added {}", planet.kepler_name);
                } else {
                    println!("{} already present", planet.kepler_name);
                }
            }
        }
        PlanetsCommand::List { json } => {
            let planets = storage.list_planets()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&planets)?);
            } else {
                for planet in &planets {
                    println!("{}", planet.kepler_name);
                }
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!();
                println!("[Ingest]");
                println!("  Provider URL:       {}", config.ingest.provider_url);
                println!("  Load on startup:    {}", config.ingest.load_on_startup);
                println!("  Timeout (s):        {}", config.ingest.timeout_secs);
                println!();
                println!("[API]");
                println!("  Default limit:      {}", config.api.default_limit);
                println!("  Max limit:          {}", config.api.max_limit);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
