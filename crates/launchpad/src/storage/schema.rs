//! `SQLite` schema definitions for launchpad.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the launches table.
///
/// `customers` holds a JSON array of strings. `success` is NULL when the
/// outcome is unknown.
pub const CREATE_LAUNCHES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS launches (
    flight_number INTEGER PRIMARY KEY,
    mission TEXT NOT NULL,
    rocket TEXT NOT NULL,
    launch_date TEXT NOT NULL,
    target TEXT,
    customers TEXT NOT NULL DEFAULT '[]',
    upcoming INTEGER NOT NULL,
    success INTEGER,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index supporting the sentinel lookup.
pub const CREATE_ROCKET_MISSION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_launches_rocket_mission ON launches(rocket, mission)
";

/// SQL statement to create the planets reference table.
pub const CREATE_PLANETS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS planets (
    kepler_name TEXT PRIMARY KEY
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_LAUNCHES_TABLE,
    CREATE_ROCKET_MISSION_INDEX,
    CREATE_PLANETS_TABLE,
    CREATE_METADATA_TABLE,
];
