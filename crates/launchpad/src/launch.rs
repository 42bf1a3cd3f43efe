//! Core launch and planet types for launchpad.
//!
//! This module defines the records persisted by the storage layer, the
//! validated input shape used for manual scheduling, and the small filter and
//! pagination types passed to the repository.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Flight number assigned to the first manually scheduled launch.
pub const DEFAULT_FLIGHT_NUMBER: i64 = 100;

/// Sponsors attached to every manually scheduled launch.
pub const DEFAULT_CUSTOMERS: &[&str] = &["Zero to Mastery", "NASA"];

/// A launch record.
///
/// `flight_number` is the sole identity key; there is no separate internal id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Launch {
    /// Unique flight number.
    pub flight_number: i64,

    /// Mission name.
    pub mission: String,

    /// Rocket name.
    pub rocket: String,

    /// Scheduled (or historical) launch time.
    pub launch_date: DateTime<Utc>,

    /// Destination planet. Absent for ingested launches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Customers in provider order, duplicates preserved.
    #[serde(default)]
    pub customers: Vec<String>,

    /// Whether the launch is still in the future.
    pub upcoming: bool,

    /// Outcome of the launch; `None` when unknown.
    pub success: Option<bool>,
}

impl Launch {
    /// Build a freshly scheduled launch from validated input.
    ///
    /// Fills in the default sponsor list and marks the launch as upcoming
    /// and successful.
    #[must_use]
    pub fn scheduled(flight_number: i64, new_launch: NewLaunch) -> Self {
        Self {
            flight_number,
            mission: new_launch.mission,
            rocket: new_launch.rocket,
            launch_date: new_launch.launch_date,
            target: Some(new_launch.target),
            customers: DEFAULT_CUSTOMERS.iter().map(ToString::to_string).collect(),
            upcoming: true,
            success: Some(true),
        }
    }

    /// Check if the launch has been aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        !self.upcoming && self.success == Some(false)
    }
}

/// A validated request to schedule a new launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLaunch {
    /// Mission name.
    pub mission: String,
    /// Rocket name.
    pub rocket: String,
    /// Destination planet name.
    pub target: String,
    /// Launch time.
    pub launch_date: DateTime<Utc>,
}

/// The raw body of a scheduling request.
///
/// Every field is optional so that a missing property can be reported with a
/// precise error instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    /// Mission name.
    pub mission: Option<String>,
    /// Rocket name.
    pub rocket: Option<String>,
    /// Destination planet name.
    pub target: Option<String>,
    /// Launch date in any format accepted by [`parse_launch_date`].
    ///
    /// Kept as raw JSON so a non-string date is reported as an invalid date
    /// rather than a malformed body.
    pub launch_date: Option<Value>,
}

impl LaunchRequest {
    /// Validate the request into a [`NewLaunch`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingLaunchProperty`] if any field is absent or
    /// blank, and [`Error::InvalidLaunchDate`] if the date is not a string or
    /// does not parse.
    pub fn validate(self) -> Result<NewLaunch> {
        let launch_date = match self.launch_date {
            None | Some(Value::Null) => None,
            Some(Value::String(date)) => non_blank(Some(date)).map(Ok),
            Some(_) => Some(Err(Error::InvalidLaunchDate)),
        };

        let (Some(mission), Some(rocket), Some(target), Some(launch_date)) = (
            non_blank(self.mission),
            non_blank(self.rocket),
            non_blank(self.target),
            launch_date,
        ) else {
            return Err(Error::MissingLaunchProperty);
        };

        let launch_date = parse_launch_date(&launch_date?)?;

        Ok(NewLaunch {
            mission,
            rocket,
            target,
            launch_date,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a launch date into a UTC timestamp.
///
/// Accepts RFC 3339 (`2030-10-10T00:00:00Z`), a plain date (`2030-10-10`,
/// taken as midnight UTC), a naive date-time (`2030-10-10T12:00:00`, taken as
/// UTC) and the long form `December 27, 2030`.
///
/// # Errors
///
/// Returns [`Error::InvalidLaunchDate`] if no format matches.
pub fn parse_launch_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    for format in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Ok(date.and_hms_opt(0, 0, 0).ok_or(Error::InvalidLaunchDate)?.and_utc());
        }
    }

    Err(Error::InvalidLaunchDate)
}

/// A destination body in the reference set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    /// Human-readable Kepler name, e.g. `Kepler-442 b`.
    pub kepler_name: String,
}

impl Planet {
    /// Create a planet with the given name.
    #[must_use]
    pub fn new(kepler_name: impl Into<String>) -> Self {
        Self {
            kepler_name: kepler_name.into(),
        }
    }
}

/// Equality filter over launch fields. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchFilter {
    /// Match on flight number.
    pub flight_number: Option<i64>,
    /// Match on rocket name.
    pub rocket: Option<String>,
    /// Match on mission name.
    pub mission: Option<String>,
}

impl LaunchFilter {
    /// A filter matching a single flight number.
    #[must_use]
    pub fn flight_number(flight_number: i64) -> Self {
        Self {
            flight_number: Some(flight_number),
            ..Self::default()
        }
    }

    /// Additionally require the given rocket name.
    #[must_use]
    pub fn with_rocket(mut self, rocket: impl Into<String>) -> Self {
        self.rocket = Some(rocket.into());
        self
    }

    /// Additionally require the given mission name.
    #[must_use]
    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }
}

/// New values for the mutable status fields of a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchStatus {
    /// New `upcoming` value.
    pub upcoming: bool,
    /// New `success` value.
    pub success: Option<bool>,
}

impl LaunchStatus {
    /// The status of an aborted launch.
    pub const ABORTED: Self = Self {
        upcoming: false,
        success: Some(false),
    };
}

/// Result of an update-by-filter operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of records matching the filter.
    pub matched: u64,
    /// Number of records whose values actually changed.
    pub modified: u64,
}

/// Skip/limit pagination. A `limit` of 0 means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Number of records to skip.
    pub skip: u64,
    /// Maximum number of records to return, 0 for unlimited.
    pub limit: u64,
}

impl Page {
    /// Create a page.
    #[must_use]
    pub fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }
}
