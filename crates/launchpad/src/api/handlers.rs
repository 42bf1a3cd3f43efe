//! HTTP handlers for launches and planets.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::error::ApiError;
use super::AppState;
use crate::error::Error;
use crate::launch::{Launch, LaunchRequest, Planet};

/// Raw pagination parameters; parsed by hand so malformed values get the
/// API's own error body.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    skip: Option<String>,
    limit: Option<String>,
}

fn parse_param(value: Option<&str>) -> Result<Option<u64>, Error> {
    value
        .map(|v| v.trim().parse::<u64>().map_err(|_| Error::InvalidPagination))
        .transpose()
}

/// `GET /launches`
pub async fn list_launches(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Vec<Launch>>, ApiError> {
    let skip = parse_param(query.skip.as_deref())?;
    let limit = parse_param(query.limit.as_deref())?;
    let page = state.api.page(skip, limit);

    debug!(skip = page.skip, limit = page.limit, "Listing launches");
    let launches = state.manager.get_launches(page).await?;
    Ok(Json(launches))
}

/// `POST /launches`
pub async fn schedule_launch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LaunchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Launch>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected launch body");
        Error::InvalidRequestBody
    })?;

    let new_launch = request.validate()?;
    let launch = state.manager.schedule_launch(new_launch).await?;
    Ok((StatusCode::CREATED, Json(launch)))
}

/// `DELETE /launches/:flight_number`
pub async fn abort_launch(
    State(state): State<Arc<AppState>>,
    Path(flight_number): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let flight_number: i64 = flight_number
        .trim()
        .parse()
        .map_err(|_| Error::InvalidFlightNumber)?;

    if !state.manager.launch_exists(flight_number).await {
        return Err(Error::LaunchNotFound { flight_number }.into());
    }

    if !state.manager.abort_launch(flight_number).await {
        return Err(Error::AbortFailed { flight_number }.into());
    }

    Ok(Json(json!({ "ok": true })))
}

/// `GET /planets`
pub async fn list_planets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Planet>>, ApiError> {
    let planets = state.manager.get_planets().await?;
    Ok(Json(planets))
}

/// `GET /health`
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "launchpad",
        "timestamp": Utc::now().to_rfc3339()
    }))
}
