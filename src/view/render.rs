//! Pure projections from domain data to panels.

use super::models::*;
use crate::forecast::DailySummary;
use crate::prefs::Theme;
use crate::weather::{CurrentConditions, UnitSystem};

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

pub fn icon_url(icon: &str) -> String {
    format!("{}/{}@2x.png", ICON_URL_BASE, icon)
}

pub fn render_weather(current: &CurrentConditions, unit: UnitSystem) -> WeatherPanel {
    WeatherPanel {
        title: current.location.clone(),
        lines: vec![
            format!("Temperature: {} {}", current.temperature, unit.temperature_label()),
            format!("Weather: {}", current.description),
            format!("Humidity: {}%", current.humidity),
            format!("Wind Speed: {} {}", current.wind_speed, unit.wind_speed_label()),
        ],
        icon_url: icon_url(&current.icon),
    }
}

pub fn render_forecast(days: &[DailySummary], unit: UnitSystem) -> ForecastPanel {
    ForecastPanel {
        days: days
            .iter()
            .map(|day| ForecastDay {
                date: day.date.format("%Y-%m-%d").to_string(),
                average: format!(
                    "Average Temperature: {:.1} {}",
                    day.mean_temperature,
                    unit.temperature_label()
                ),
                icon_url: icon_url(&day.icon),
            })
            .collect(),
    }
}

pub fn render_error(message: &str) -> ErrorPanel {
    ErrorPanel {
        message: format!("Error: {}", message),
    }
}

pub fn render_styling(theme: Theme) -> ThemeStyling {
    ThemeStyling {
        theme,
        dark_regions: match theme {
            Theme::Dark => Region::ALL.to_vec(),
            Theme::Light => Vec::new(),
        },
    }
}
