//! Storage layer for launchpad.
//!
//! This module provides `SQLite`-based persistent storage for launch records
//! and the planet reference set. [`Storage`] implements the
//! [`LaunchRepository`] contract the launch manager depends on.

pub mod migrations;
mod repository;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::launch::{Launch, LaunchFilter, LaunchStatus, Page, Planet, UpdateOutcome};

pub use repository::LaunchRepository;

const LAUNCH_COLUMNS: &str =
    "flight_number, mission, rocket, launch_date, target, customers, upcoming, success";

/// Storage engine for launches and planets.
///
/// The connection sits behind a mutex so a single `Storage` can be shared
/// between request handlers.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection mutex poisoned"))
    }

    /// Find the first launch matching the filter, in flight number order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_launch(&self, filter: &LaunchFilter) -> Result<Option<Launch>> {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(flight_number) = filter.flight_number {
            values.push(Value::Integer(flight_number));
            clauses.push(format!("flight_number = ?{}", values.len()));
        }
        if let Some(rocket) = &filter.rocket {
            values.push(Value::Text(rocket.clone()));
            clauses.push(format!("rocket = ?{}", values.len()));
        }
        if let Some(mission) = &filter.mission {
            values.push(Value::Text(mission.clone()));
            clauses.push(format!("mission = ?{}", values.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {LAUNCH_COLUMNS} FROM launches {where_clause} ORDER BY flight_number ASC LIMIT 1"
        );

        let conn = self.conn()?;
        let row = conn
            .query_row(&sql, params_from_iter(values), LaunchRow::from_row)
            .optional()?;
        row.map(LaunchRow::into_launch).transpose()
    }

    /// Insert a launch, or replace the fields of the launch with the same
    /// flight number.
    ///
    /// A stored `target` is kept when the incoming record has none, so
    /// re-ingesting the provider feed does not wipe scheduled targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert_launch(&self, launch: &Launch) -> Result<Launch> {
        let customers = serde_json::to_string(&launch.customers)?;
        let conn = self.conn()?;

        conn.execute(
            r"
            INSERT INTO launches
                (flight_number, mission, rocket, launch_date, target, customers, upcoming, success)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(flight_number) DO UPDATE SET
                mission = excluded.mission,
                rocket = excluded.rocket,
                launch_date = excluded.launch_date,
                target = COALESCE(excluded.target, launches.target),
                customers = excluded.customers,
                upcoming = excluded.upcoming,
                success = excluded.success,
                updated_at = datetime('now')
            ",
            params![
                launch.flight_number,
                launch.mission,
                launch.rocket,
                launch.launch_date.to_rfc3339(),
                launch.target,
                customers,
                launch.upcoming,
                launch.success,
            ],
        )?;

        let row = conn.query_row(
            &format!("SELECT {LAUNCH_COLUMNS} FROM launches WHERE flight_number = ?1"),
            [launch.flight_number],
            LaunchRow::from_row,
        )?;
        debug!("Upserted launch {}", launch.flight_number);
        row.into_launch()
    }

    /// Set the status fields of the launch with the given flight number.
    ///
    /// `modified` only counts a row whose values actually changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_launch_status(
        &self,
        flight_number: i64,
        status: LaunchStatus,
    ) -> Result<UpdateOutcome> {
        let conn = self.conn()?;

        let matched: i64 = conn.query_row(
            "SELECT COUNT(*) FROM launches WHERE flight_number = ?1",
            [flight_number],
            |row| row.get(0),
        )?;

        let modified = conn.execute(
            r"
            UPDATE launches
            SET upcoming = ?2, success = ?3, updated_at = datetime('now')
            WHERE flight_number = ?1 AND (upcoming IS NOT ?2 OR success IS NOT ?3)
            ",
            params![flight_number, status.upcoming, status.success],
        )?;

        Ok(UpdateOutcome {
            matched: u64::try_from(matched).unwrap_or(0),
            modified: modified as u64,
        })
    }

    /// List launches in ascending flight number order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_launches(&self, page: Page) -> Result<Vec<Launch>> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = if page.limit == 0 {
            -1
        } else {
            i64::try_from(page.limit).unwrap_or(i64::MAX)
        };
        let offset = i64::try_from(page.skip).unwrap_or(i64::MAX);

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LAUNCH_COLUMNS} FROM launches ORDER BY flight_number ASC LIMIT ?1 OFFSET ?2"
        ))?;

        let rows = stmt
            .query_map([limit, offset], LaunchRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(LaunchRow::into_launch).collect()
    }

    /// Get the highest flight number in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn latest_flight_number(&self) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let latest: Option<i64> =
            conn.query_row("SELECT MAX(flight_number) FROM launches", [], |row| {
                row.get(0)
            })?;
        Ok(latest)
    }

    /// Find a planet by its Kepler name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_planet(&self, kepler_name: &str) -> Result<Option<Planet>> {
        let conn = self.conn()?;
        let planet = conn
            .query_row(
                "SELECT kepler_name FROM planets WHERE kepler_name = ?1",
                [kepler_name],
                |row| Ok(Planet::new(row.get::<_, String>(0)?)),
            )
            .optional()?;
        Ok(planet)
    }

    /// List all planets ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_planets(&self) -> Result<Vec<Planet>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT kepler_name FROM planets ORDER BY kepler_name")?;
        let planets = stmt
            .query_map([], |row| Ok(Planet::new(row.get::<_, String>(0)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(planets)
    }

    /// Add a planet to the reference set.
    ///
    /// Returns `true` if the planet was added, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_planet(&self, planet: &Planet) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "INSERT OR IGNORE INTO planets (kepler_name) VALUES (?1)",
            [&planet.kepler_name],
        )?;
        Ok(affected > 0)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let conn = self.conn()?;

        let total_launches: i64 =
            conn.query_row("SELECT COUNT(*) FROM launches", [], |row| row.get(0))?;
        let upcoming_launches: i64 = conn.query_row(
            "SELECT COUNT(*) FROM launches WHERE upcoming = 1",
            [],
            |row| row.get(0),
        )?;
        let total_planets: i64 =
            conn.query_row("SELECT COUNT(*) FROM planets", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_launches,
            upcoming_launches,
            total_planets,
            db_size_bytes,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of launches stored.
    pub total_launches: i64,
    /// Number of launches still marked upcoming.
    pub upcoming_launches: i64,
    /// Number of planets in the reference set.
    pub total_planets: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// Raw column values of a `launches` row.
struct LaunchRow {
    flight_number: i64,
    mission: String,
    rocket: String,
    launch_date: String,
    target: Option<String>,
    customers: String,
    upcoming: bool,
    success: Option<bool>,
}

impl LaunchRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            flight_number: row.get(0)?,
            mission: row.get(1)?,
            rocket: row.get(2)?,
            launch_date: row.get(3)?,
            target: row.get(4)?,
            customers: row.get(5)?,
            upcoming: row.get(6)?,
            success: row.get(7)?,
        })
    }

    fn into_launch(self) -> Result<Launch> {
        let launch_date = DateTime::parse_from_rfc3339(&self.launch_date)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::CorruptRecord {
                flight_number: self.flight_number,
                message: format!("launch_date {:?}: {e}", self.launch_date),
            })?;

        let customers: Vec<String> =
            serde_json::from_str(&self.customers).map_err(|e| Error::CorruptRecord {
                flight_number: self.flight_number,
                message: format!("customers: {e}"),
            })?;

        Ok(Launch {
            flight_number: self.flight_number,
            mission: self.mission,
            rocket: self.rocket,
            launch_date,
            target: self.target,
            customers,
            upcoming: self.upcoming,
            success: self.success,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn create_test_launch(flight_number: i64) -> Launch {
        Launch {
            flight_number,
            mission: format!("Mission {flight_number}"),
            rocket: "Falcon 9".to_string(),
            launch_date: Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap(),
            target: None,
            customers: vec!["NASA".to_string(), "NASA".to_string()],
            upcoming: true,
            success: None,
        }
    }

    #[test]
    fn test_open_in_memory() {
        assert!(Storage::open_in_memory().is_ok());
    }

    #[test]
    fn test_upsert_and_find() {
        let storage = create_test_storage();
        let launch = create_test_launch(5);

        let stored = storage.upsert_launch(&launch).unwrap();
        assert_eq!(stored, launch);

        let found = storage
            .find_launch(&LaunchFilter::flight_number(5))
            .unwrap()
            .unwrap();
        assert_eq!(found, launch);
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let storage = create_test_storage();
        storage.upsert_launch(&create_test_launch(5)).unwrap();

        let mut updated = create_test_launch(5);
        updated.mission = "Renamed".to_string();
        updated.success = Some(true);
        storage.upsert_launch(&updated).unwrap();

        assert_eq!(storage.stats().unwrap().total_launches, 1);
        let found = storage
            .find_launch(&LaunchFilter::flight_number(5))
            .unwrap()
            .unwrap();
        assert_eq!(found.mission, "Renamed");
        assert_eq!(found.success, Some(true));
    }

    #[test]
    fn test_upsert_keeps_target_when_incoming_has_none() {
        let storage = create_test_storage();
        let mut scheduled = create_test_launch(5);
        scheduled.target = Some("Kepler-442 b".to_string());
        storage.upsert_launch(&scheduled).unwrap();

        let stored = storage.upsert_launch(&create_test_launch(5)).unwrap();
        assert_eq!(stored.target.as_deref(), Some("Kepler-442 b"));
    }

    #[test]
    fn test_find_with_combined_filter() {
        let storage = create_test_storage();
        let mut first = create_test_launch(1);
        first.rocket = "Falcon 1".to_string();
        first.mission = "FalconSat".to_string();
        storage.upsert_launch(&first).unwrap();

        let sentinel = LaunchFilter::flight_number(1)
            .with_rocket("Falcon 1")
            .with_mission("FalconSat");
        assert!(storage.find_launch(&sentinel).unwrap().is_some());

        let wrong_rocket = LaunchFilter::flight_number(1).with_rocket("Falcon 9");
        assert!(storage.find_launch(&wrong_rocket).unwrap().is_none());
    }

    #[test]
    fn test_find_nonexistent() {
        let storage = create_test_storage();
        let result = storage.find_launch(&LaunchFilter::flight_number(99_999));
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_list_launches_sorted_and_paginated() {
        let storage = create_test_storage();
        for flight_number in [7, 3, 9, 1, 5] {
            storage
                .upsert_launch(&create_test_launch(flight_number))
                .unwrap();
        }

        let all: Vec<i64> = storage
            .list_launches(Page::default())
            .unwrap()
            .iter()
            .map(|l| l.flight_number)
            .collect();
        assert_eq!(all, vec![1, 3, 5, 7, 9]);

        let page: Vec<i64> = storage
            .list_launches(Page::new(1, 2))
            .unwrap()
            .iter()
            .map(|l| l.flight_number)
            .collect();
        assert_eq!(page, vec![3, 5]);
    }

    #[test]
    fn test_list_launches_skip_past_end() {
        let storage = create_test_storage();
        storage.upsert_launch(&create_test_launch(1)).unwrap();
        assert!(storage.list_launches(Page::new(10, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_latest_flight_number() {
        let storage = create_test_storage();
        assert_eq!(storage.latest_flight_number().unwrap(), None);

        storage.upsert_launch(&create_test_launch(42)).unwrap();
        storage.upsert_launch(&create_test_launch(7)).unwrap();
        assert_eq!(storage.latest_flight_number().unwrap(), Some(42));
    }

    #[test]
    fn test_update_launch_status_modifies_once() {
        let storage = create_test_storage();
        storage.upsert_launch(&create_test_launch(3)).unwrap();

        let first = storage
            .update_launch_status(3, LaunchStatus::ABORTED)
            .unwrap();
        assert_eq!(first, UpdateOutcome { matched: 1, modified: 1 });

        let second = storage
            .update_launch_status(3, LaunchStatus::ABORTED)
            .unwrap();
        assert_eq!(second, UpdateOutcome { matched: 1, modified: 0 });

        let launch = storage
            .find_launch(&LaunchFilter::flight_number(3))
            .unwrap()
            .unwrap();
        assert!(launch.is_aborted());
    }

    #[test]
    fn test_update_launch_status_no_match() {
        let storage = create_test_storage();
        let outcome = storage
            .update_launch_status(404, LaunchStatus::ABORTED)
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
    }

    #[test]
    fn test_planets() {
        let storage = create_test_storage();
        assert!(storage.insert_planet(&Planet::new("Kepler-442 b")).unwrap());
        assert!(!storage.insert_planet(&Planet::new("Kepler-442 b")).unwrap());
        storage.insert_planet(&Planet::new("Kepler-186 f")).unwrap();

        assert!(storage.find_planet("Kepler-442 b").unwrap().is_some());
        assert!(storage.find_planet("Earth").unwrap().is_none());

        let names: Vec<String> = storage
            .list_planets()
            .unwrap()
            .into_iter()
            .map(|p| p.kepler_name)
            .collect();
        assert_eq!(names, vec!["Kepler-186 f", "Kepler-442 b"]);
    }

    #[test]
    fn test_stats() {
        let storage = create_test_storage();
        storage.upsert_launch(&create_test_launch(1)).unwrap();
        let mut past = create_test_launch(2);
        past.upcoming = false;
        storage.upsert_launch(&past).unwrap();
        storage.insert_planet(&Planet::new("Kepler-62 f")).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_launches, 2);
        assert_eq!(stats.upcoming_launches, 1);
        assert_eq!(stats.total_planets, 1);
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_corrupt_launch_date_is_reported() {
        let storage = create_test_storage();
        storage
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO launches (flight_number, mission, rocket, launch_date, upcoming)
                 VALUES (8, 'm', 'r', 'not a date', 1)",
                [],
            )
            .unwrap();

        let err = storage
            .find_launch(&LaunchFilter::flight_number(8))
            .unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { flight_number: 8, .. }));
    }

    #[test]
    fn test_open_file_based() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!("launchpad_test_{}.db", std::process::id()));

        let storage = Storage::open(&db_path).unwrap();
        storage.upsert_launch(&create_test_launch(1)).unwrap();
        assert_eq!(storage.path(), db_path);
        assert!(storage.stats().unwrap().db_size_bytes > 0);

        drop(storage);
        let reopened = Storage::open(&db_path).unwrap();
        assert_eq!(reopened.latest_flight_number().unwrap(), Some(1));

        drop(reopened);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = std::env::temp_dir();
        let root = temp_dir.join(format!("launchpad_test_dirs_{}", std::process::id()));
        let nested_path = root.join("nested/launches.db");
        let _ = std::fs::remove_dir_all(&root);

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(storage);
        let _ = std::fs::remove_dir_all(&root);
    }
}
