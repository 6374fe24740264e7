use config::{Case, Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::weather::service::OPENWEATHERMAP_API_URL;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// OpenWeatherMap API key
    pub openweathermap_api_key: String,

    /// Base URL of the OpenWeatherMap 2.5 data API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// JSON file holding favorites, theme and unit
    #[serde(default = "default_prefs_path")]
    pub prefs_path: String,

    /// Overall timeout for outbound weather requests
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Map display configuration
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    /// Zoom level the map opens at
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Tile server URL template with {s}, {z}, {x} and {y} placeholders
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            max_zoom: default_max_zoom(),
            tile_url: default_tile_url(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_base_url() -> String {
    OPENWEATHERMAP_API_URL.to_string()
}

fn default_prefs_path() -> String {
    "data/preferences.json".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_zoom() -> u8 {
    13
}

fn default_max_zoom() -> u8 {
    19
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .set_default("api_base_url", default_api_base_url())?
            .set_default("prefs_path", default_prefs_path())?
            // Load from config file if present
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config.local").required(false))
            // Override with environment variables (prefixed with WEATHERVANE_)
            // Convert SCREAMING_SNAKE_CASE env vars to snake_case config keys
            .add_source(
                Environment::with_prefix("WEATHERVANE")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(Case::Snake)
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
