use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Unit System
// ============================================================================

/// Unit system sent to OpenWeatherMap and used for display labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    /// OpenWeatherMap reports wind in m/s for metric and mph for imperial
    pub fn wind_speed_label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown unit system: {0}")]
pub struct ParseUnitError(pub String);

impl FromStr for UnitSystem {
    type Err = ParseUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(ParseUnitError(other.to_string())),
        }
    }
}

// ============================================================================
// Domain Models
// ============================================================================

/// Present-moment weather snapshot for a location
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentConditions {
    pub location: String,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u32,
    pub wind_speed: f64,
    pub lat: f64,
    pub lon: f64,
}

/// One timestamped forecast data point (3-hour resolution)
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub icon: String,
}

// ============================================================================
// OpenWeatherMap API Responses (Internal)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub name: String,
    pub coord: Coordinates,
    pub main: MainInfo,
    pub weather: Vec<WeatherInfo>,
    pub wind: WindInfo,
}

#[derive(Debug, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct MainInfo {
    pub temp: f64,
    #[serde(default)]
    pub humidity: u32,
}

#[derive(Debug, Deserialize)]
pub struct WeatherInfo {
    #[serde(default)]
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct WindInfo {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: MainInfo,
    pub weather: Vec<WeatherInfo>,
    pub dt_txt: Option<String>,
}
