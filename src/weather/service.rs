use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::models::*;
use crate::error::HttpError;
use crate::impl_into_response;

pub const OPENWEATHERMAP_API_URL: &str = "https://api.openweathermap.org/data/2.5";

const FORECAST_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("City not found. Please check your input.")]
    NotFound,

    #[error("Failed to fetch weather data: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Forecast unavailable: {0}")]
    ForecastUnavailable(String),
}

impl HttpError for WeatherError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ForecastUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::NotFound => Some("CITY_NOT_FOUND"),
            Self::Network(_) => Some("REQUEST_ERROR"),
            Self::InvalidResponse(_) => Some("INVALID_RESPONSE"),
            Self::ForecastUnavailable(_) => Some("FORECAST_UNAVAILABLE"),
        }
    }
}

impl_into_response!(WeatherError);

#[derive(Debug, Deserialize)]
struct OpenWeatherMapError {
    message: String,
}

/// Source of current conditions and forecast entries for a city
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the present-moment weather for a city
    async fn fetch_current(
        &self,
        city: &str,
        unit: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError>;

    /// Fetch the 5-day / 3-hour forecast for a city
    async fn fetch_forecast(
        &self,
        city: &str,
        unit: UnitSystem,
    ) -> Result<Vec<ForecastEntry>, WeatherError>;
}

pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn new(client: Client, api_key: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get(
        &self,
        endpoint: &str,
        city: &str,
        unit: UnitSystem,
    ) -> Result<reqwest::Response, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        tracing::debug!(endpoint = %endpoint, city = %city, units = %unit, "Requesting OpenWeatherMap");

        // Query builder handles URL encoding of spaces and special chars
        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", &self.api_key), ("units", unit.as_str())])
            .send()
            .await?;

        tracing::debug!(endpoint = %endpoint, status = %response.status(), "Received API response");

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, WeatherError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| WeatherError::InvalidResponse(e.to_string()))
    }

    fn to_current(data: CurrentWeatherResponse) -> Result<CurrentConditions, WeatherError> {
        let weather_info = data.weather.into_iter().next().ok_or_else(|| {
            WeatherError::InvalidResponse("No weather information available".to_string())
        })?;

        Ok(CurrentConditions {
            location: data.name,
            temperature: data.main.temp,
            description: weather_info.description,
            icon: weather_info.icon,
            humidity: data.main.humidity,
            wind_speed: data.wind.speed,
            lat: data.coord.lat,
            lon: data.coord.lon,
        })
    }

    /// Prefer the local `dt_txt` wall-clock time; fall back to the unix `dt` field
    fn entry_timestamp(item: &ForecastItem) -> Option<NaiveDateTime> {
        item.dt_txt
            .as_deref()
            .and_then(|txt| NaiveDateTime::parse_from_str(txt, FORECAST_TIMESTAMP_FORMAT).ok())
            .or_else(|| DateTime::from_timestamp(item.dt, 0).map(|dt| dt.naive_utc()))
    }

    fn to_entries(data: ForecastResponse) -> Result<Vec<ForecastEntry>, WeatherError> {
        data.list
            .into_iter()
            .map(|item| {
                let timestamp = Self::entry_timestamp(&item).ok_or_else(|| {
                    WeatherError::InvalidResponse(format!("Invalid forecast timestamp: {}", item.dt))
                })?;
                let icon = item
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| w.icon)
                    .unwrap_or_default();

                Ok(ForecastEntry {
                    timestamp,
                    temperature: item.main.temp,
                    icon,
                })
            })
            .collect()
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch_current(
        &self,
        city: &str,
        unit: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        let response = self.get("weather", city, unit).await?;

        if !response.status().is_success() {
            return Err(WeatherError::NotFound);
        }

        let data: CurrentWeatherResponse = Self::decode(response).await?;
        let current = Self::to_current(data)?;

        tracing::info!(city = %current.location, temp = %current.temperature, "Current conditions fetched");

        Ok(current)
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        unit: UnitSystem,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let response = self.get("forecast", city, unit).await?;

        let status = response.status();
        if !status.is_success() {
            let error: OpenWeatherMapError = response.json().await.unwrap_or(OpenWeatherMapError {
                message: format!("HTTP {}", status),
            });
            return Err(WeatherError::ForecastUnavailable(error.message));
        }

        let data: ForecastResponse = Self::decode(response).await?;
        let entries = Self::to_entries(data)?;

        tracing::info!(city = %city, entries = entries.len(), "Forecast fetched");

        Ok(entries)
    }
}
