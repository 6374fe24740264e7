pub mod handlers;
pub mod models;
pub mod service;

pub use models::{CurrentConditions, ForecastEntry, UnitSystem};
pub use service::{WeatherClient, WeatherError, WeatherSource};
