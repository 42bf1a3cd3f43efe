//! The data-access contract used by the launch manager and ingestion.

use async_trait::async_trait;

use crate::error::Result;
use crate::launch::{Launch, LaunchFilter, LaunchStatus, Page, Planet, UpdateOutcome};

use super::Storage;

/// Keyed document-store operations over launches and planets.
///
/// Implementations are free to block briefly; callers treat every method as
/// a suspension point.
#[async_trait]
pub trait LaunchRepository: Send + Sync {
    /// Find the first launch matching the filter.
    async fn find_launch(&self, filter: &LaunchFilter) -> Result<Option<Launch>>;

    /// Insert or update a launch keyed by flight number, returning the stored record.
    async fn upsert_launch(&self, launch: &Launch) -> Result<Launch>;

    /// Update the status fields of a single launch.
    async fn update_launch_status(
        &self,
        flight_number: i64,
        status: LaunchStatus,
    ) -> Result<UpdateOutcome>;

    /// List launches in ascending flight number order.
    async fn list_launches(&self, page: Page) -> Result<Vec<Launch>>;

    /// Highest stored flight number, if any.
    async fn latest_flight_number(&self) -> Result<Option<i64>>;

    /// Look up a planet by Kepler name.
    async fn find_planet(&self, kepler_name: &str) -> Result<Option<Planet>>;

    /// List the planet reference set.
    async fn list_planets(&self) -> Result<Vec<Planet>>;
}

#[async_trait]
impl LaunchRepository for Storage {
    async fn find_launch(&self, filter: &LaunchFilter) -> Result<Option<Launch>> {
        Storage::find_launch(self, filter)
    }

    async fn upsert_launch(&self, launch: &Launch) -> Result<Launch> {
        Storage::upsert_launch(self, launch)
    }

    async fn update_launch_status(
        &self,
        flight_number: i64,
        status: LaunchStatus,
    ) -> Result<UpdateOutcome> {
        Storage::update_launch_status(self, flight_number, status)
    }

    async fn list_launches(&self, page: Page) -> Result<Vec<Launch>> {
        Storage::list_launches(self, page)
    }

    async fn latest_flight_number(&self) -> Result<Option<i64>> {
        Storage::latest_flight_number(self)
    }

    async fn find_planet(&self, kepler_name: &str) -> Result<Option<Planet>> {
        Storage::find_planet(self, kepler_name)
    }

    async fn list_planets(&self) -> Result<Vec<Planet>> {
        Storage::list_planets(self)
    }
}
