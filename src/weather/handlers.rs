use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::models::{CurrentConditions, UnitSystem};
use crate::forecast::{summarize, DailySummary};
use crate::widget::QueryError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Units: metric or imperial
    pub units: Option<UnitSystem>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Current conditions plus the per-day forecast summary for one city
#[derive(Debug, Serialize, ToSchema)]
pub struct LookupResponse {
    pub units: UnitSystem,
    pub current: CurrentConditions,
    pub daily: Vec<DailySummary>,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Stateless lookup that leaves the widget untouched
#[utoipa::path(
    get,
    path = "/api/v1/weather/{city}",
    tag = "weather",
    params(
        ("city" = String, Path, description = "City name"),
        ("units" = Option<UnitSystem>, Query, description = "metric or imperial")
    ),
    responses(
        (status = 200, body = LookupResponse),
        (status = 404, body = crate::error::ErrorResponse)
    )
)]
pub async fn lookup(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, QueryError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(QueryError::Validation);
    }
    let units = query.units.unwrap_or_default();

    let current = state.weather_source.fetch_current(city, units).await?;
    let entries = state.weather_source.fetch_forecast(city, units).await?;

    Ok(Json(LookupResponse {
        units,
        current,
        daily: summarize(&entries),
    }))
}
