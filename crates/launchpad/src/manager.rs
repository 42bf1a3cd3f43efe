//! Launch business rules.
//!
//! [`LaunchManager`] owns flight number assignment, target validation,
//! aborting, and the idempotent initial data load. Storage failures on the
//! write paths are logged here and never leak past this boundary.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::ingest::{populate_launches, IngestReport, LaunchProvider};
use crate::launch::{
    Launch, LaunchFilter, LaunchStatus, NewLaunch, Page, Planet, DEFAULT_FLIGHT_NUMBER,
};
use crate::storage::LaunchRepository;

/// Flight number of the launch used to detect a completed initial load.
pub const SENTINEL_FLIGHT_NUMBER: i64 = 1;

/// Rocket of the sentinel launch.
pub const SENTINEL_ROCKET: &str = "Falcon 1";

/// Mission of the sentinel launch.
pub const SENTINEL_MISSION: &str = "FalconSat";

/// What [`LaunchManager::load_initial_data`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The sentinel launch was present; nothing was downloaded.
    AlreadyLoaded,
    /// The catalog was downloaded.
    Loaded(IngestReport),
}

/// Read and write operations on launch records.
#[derive(Clone)]
pub struct LaunchManager {
    repo: Arc<dyn LaunchRepository>,
}

impl std::fmt::Debug for LaunchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchManager").finish_non_exhaustive()
    }
}

impl LaunchManager {
    /// Create a manager over the given repository.
    #[must_use]
    pub fn new(repo: Arc<dyn LaunchRepository>) -> Self {
        Self { repo }
    }

    /// Check whether a launch with the given flight number exists.
    ///
    /// A storage failure is logged and reported as `false`.
    pub async fn launch_exists(&self, flight_number: i64) -> bool {
        match self
            .repo
            .find_launch(&LaunchFilter::flight_number(flight_number))
            .await
        {
            Ok(found) => found.is_some(),
            Err(e) => {
                error!(flight_number, error = %e, "Failed to look up launch");
                false
            }
        }
    }

    /// List launches sorted by flight number.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository query fails.
    pub async fn get_launches(&self, page: Page) -> Result<Vec<Launch>> {
        self.repo.list_launches(page).await
    }

    /// List the planet reference set.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository query fails.
    pub async fn get_planets(&self) -> Result<Vec<Planet>> {
        self.repo.list_planets().await
    }

    /// The flight number the next scheduled launch will receive.
    ///
    /// Derived from the highest stored flight number; [`DEFAULT_FLIGHT_NUMBER`]
    /// when there are no launches.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository query fails.
    pub async fn next_flight_number(&self) -> Result<i64> {
        let latest = self
            .repo
            .latest_flight_number()
            .await?
            .unwrap_or(DEFAULT_FLIGHT_NUMBER - 1);
        Ok(latest + 1)
    }

    /// Schedule a new launch.
    ///
    /// Flight number assignment reads the current maximum and then upserts,
    /// without a lock. Two concurrent calls can pick the same number, in
    /// which case the later write replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetNotFound`] if the target is not a known planet,
    /// or [`Error::ScheduleFailed`] if storage fails at any step.
    pub async fn schedule_launch(&self, new_launch: NewLaunch) -> Result<Launch> {
        let planet = self
            .repo
            .find_planet(&new_launch.target)
            .await
            .map_err(|e| {
                error!(planet = %new_launch.target, error = %e, "Failed to look up target planet");
                Error::ScheduleFailed
            })?;
        if planet.is_none() {
            warn!(planet = %new_launch.target, "No matching planet found");
            return Err(Error::target_not_found(new_launch.target));
        }

        let flight_number = self.next_flight_number().await.map_err(|e| {
            error!(error = %e, "Failed to compute next flight number");
            Error::ScheduleFailed
        })?;

        let launch = Launch::scheduled(flight_number, new_launch);
        match self.repo.upsert_launch(&launch).await {
            Ok(saved) => {
                info!(
                    flight_number = saved.flight_number,
                    mission = %saved.mission,
                    "Scheduled launch"
                );
                Ok(saved)
            }
            Err(e) => {
                error!(flight_number, error = %e, "An error occurred scheduling launch");
                Err(Error::ScheduleFailed)
            }
        }
    }

    /// Abort the launch with the given flight number.
    ///
    /// Returns `true` only if exactly one launch was matched and modified.
    /// A missing launch, an already-aborted launch, and a storage failure all
    /// yield `false`.
    pub async fn abort_launch(&self, flight_number: i64) -> bool {
        match self
            .repo
            .update_launch_status(flight_number, LaunchStatus::ABORTED)
            .await
        {
            Ok(outcome) => {
                let aborted = outcome.matched == 1 && outcome.modified == 1;
                if aborted {
                    info!(flight_number, "Aborted launch");
                } else {
                    warn!(
                        flight_number,
                        matched = outcome.matched,
                        modified = outcome.modified,
                        "Launch not aborted"
                    );
                }
                aborted
            }
            Err(e) => {
                error!(flight_number, error = %e, "Error aborting launch");
                false
            }
        }
    }

    /// Load the provider catalog unless it has already been loaded.
    ///
    /// The sentinel launch (flight 1, Falcon 1, `FalconSat`) marks a
    /// completed load, which makes repeated startups safe.
    ///
    /// # Errors
    ///
    /// Returns an error if the sentinel lookup or the catalog download fails.
    pub async fn load_initial_data(&self, provider: &dyn LaunchProvider) -> Result<SeedOutcome> {
        let sentinel = LaunchFilter::flight_number(SENTINEL_FLIGHT_NUMBER)
            .with_rocket(SENTINEL_ROCKET)
            .with_mission(SENTINEL_MISSION);

        if self.repo.find_launch(&sentinel).await?.is_some() {
            info!("Launch data already loaded");
            return Ok(SeedOutcome::AlreadyLoaded);
        }

        self.ingest(provider).await.map(SeedOutcome::Loaded)
    }

    /// Run a full ingestion pass regardless of the sentinel.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog download fails.
    pub async fn ingest(&self, provider: &dyn LaunchProvider) -> Result<IngestReport> {
        populate_launches(self.repo.as_ref(), provider).await
    }
}
