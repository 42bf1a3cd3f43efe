//! Launch catalog ingestion.
//!
//! Downloads the full launch catalog from the provider in a single
//! non-paginated query and upserts each launch keyed by flight number.
//! Documents are decoded one at a time, so a malformed document only costs
//! that launch.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::launch::{parse_launch_date, Launch};
use crate::storage::LaunchRepository;

/// A launch document as returned by the provider, with rocket and payloads
/// expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLaunch {
    /// Provider flight number.
    pub flight_number: i64,
    /// Mission name.
    pub name: String,
    /// Expanded rocket document.
    pub rocket: ProviderRocket,
    /// Local launch time with UTC offset.
    pub date_local: String,
    /// Whether the launch is in the future.
    pub upcoming: bool,
    /// Launch outcome, `null` when unknown.
    #[serde(default)]
    pub success: Option<bool>,
    /// Expanded payload documents.
    #[serde(default)]
    pub payloads: Vec<ProviderPayload>,
}

/// The rocket fields selected from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRocket {
    /// Rocket name.
    pub name: String,
}

/// The payload fields selected from the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPayload {
    /// Customers of this payload.
    #[serde(default)]
    pub customers: Vec<String>,
}

impl ProviderLaunch {
    /// Decode a single raw provider document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderDocument`] if the document does not have the
    /// expected shape. The flight number in the error is 0 when the document
    /// has none.
    pub fn from_document(doc: Value) -> Result<Self> {
        let flight_number = doc
            .get("flight_number")
            .and_then(Value::as_i64)
            .unwrap_or_default();
        serde_json::from_value(doc)
            .map_err(|e| Error::provider_document(flight_number, e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    docs: Vec<Value>,
}

/// A source of launch documents.
#[async_trait]
pub trait LaunchProvider: Send + Sync {
    /// Fetch the full launch catalog as raw documents.
    async fn fetch_launches(&self) -> Result<Vec<Value>>;
}

/// Client for the `SpaceX` v4 `launches/query` endpoint.
#[derive(Debug, Clone)]
pub struct SpaceXProvider {
    client: reqwest::Client,
    url: String,
}

impl SpaceXProvider {
    /// Create a provider for the given query URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The query URL this provider posts to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Body of the catalog query: every launch, no pagination, rocket name and
/// payload customers expanded.
fn catalog_query() -> serde_json::Value {
    json!({
        "query": {},
        "options": {
            "pagination": false,
            "populate": [
                { "path": "rocket", "select": { "name": 1 } },
                { "path": "payloads", "select": { "customers": 1 } }
            ]
        }
    })
}

#[async_trait]
impl LaunchProvider for SpaceXProvider {
    async fn fetch_launches(&self) -> Result<Vec<Value>> {
        info!("Downloading launch data from {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&catalog_query())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Problem downloading launch data");
            return Err(Error::IngestionFailed {
                status: status.as_u16(),
            });
        }

        let body: QueryResponse = response.json().await?;
        debug!("Provider returned {} launches", body.docs.len());
        Ok(body.docs)
    }
}

/// Map a provider document into a launch record.
///
/// Customers are flattened in payload order, then customer order within a
/// payload. Duplicates are kept. `target` is left unset.
///
/// # Errors
///
/// Returns [`Error::ProviderDocument`] if `date_local` is not a valid timestamp.
pub fn map_provider_launch(doc: &ProviderLaunch) -> Result<Launch> {
    let launch_date = parse_launch_date(&doc.date_local).map_err(|_| {
        Error::provider_document(
            doc.flight_number,
            format!("invalid date_local {:?}", doc.date_local),
        )
    })?;

    let customers = doc
        .payloads
        .iter()
        .flat_map(|payload| payload.customers.iter().cloned())
        .collect();

    Ok(Launch {
        flight_number: doc.flight_number,
        mission: doc.name.clone(),
        rocket: doc.rocket.name.clone(),
        launch_date,
        target: None,
        customers,
        upcoming: doc.upcoming,
        success: doc.success,
    })
}

/// Outcome of an ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents received from the provider.
    pub fetched: usize,
    /// Launches successfully upserted.
    pub saved: usize,
    /// Documents that could not be mapped or saved.
    pub failed: usize,
}

/// Download the launch catalog and upsert every launch.
///
/// Loading is best effort: a document that fails to decode, map or save is
/// logged and counted, and the remaining documents are still processed. There is
/// no atomicity across the batch.
///
/// # Errors
///
/// Returns an error only if the catalog itself cannot be fetched.
pub async fn populate_launches(
    repo: &dyn LaunchRepository,
    provider: &dyn LaunchProvider,
) -> Result<IngestReport> {
    let docs = provider.fetch_launches().await?;
    let mut report = IngestReport {
        fetched: docs.len(),
        ..IngestReport::default()
    };

    for doc in docs {
        let launch = match ProviderLaunch::from_document(doc)
            .and_then(|doc| map_provider_launch(&doc))
        {
            Ok(launch) => launch,
            Err(e) => {
                warn!(error = %e, "Skipping launch document");
                report.failed += 1;
                continue;
            }
        };

        debug!("{} {}", launch.flight_number, launch.mission);
        match repo.upsert_launch(&launch).await {
            Ok(_) => report.saved += 1,
            Err(e) => {
                warn!(flight_number = launch.flight_number, error = %e, "Failed to save launch");
                report.failed += 1;
            }
        }
    }

    info!(
        fetched = report.fetched,
        saved = report.saved,
        failed = report.failed,
        "Launch data ingested"
    );
    Ok(report)
}
