use super::models::*;
use super::render;
use crate::forecast::DailySummary;
use crate::map::MapView;
use crate::weather::{CurrentConditions, UnitSystem};

/// Visibility and content of the query panels.
///
/// Every transition returns the event that describes it so the caller can
/// publish it.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub phase: Phase,
    pub loading: bool,
    pub weather: Option<WeatherPanel>,
    pub forecast: Option<ForecastPanel>,
    pub error: Option<ErrorPanel>,
    pub map: Option<MapView>,
    pub save_favorite_visible: bool,
}

impl ViewState {
    /// Back to idle with every panel cleared
    pub fn reset(&mut self) -> ViewEvent {
        *self = ViewState::default();
        ViewEvent::Reset
    }

    pub fn begin_loading(&mut self) -> ViewEvent {
        self.phase = Phase::Loading;
        self.weather = None;
        self.forecast = None;
        self.error = None;
        self.map = None;
        self.loading = true;
        ViewEvent::Loading
    }

    pub fn show_weather(&mut self, current: &CurrentConditions, unit: UnitSystem) -> ViewEvent {
        let panel = render::render_weather(current, unit);
        self.phase = Phase::Result;
        self.weather = Some(panel.clone());
        self.save_favorite_visible = true;
        ViewEvent::Weather(panel)
    }

    pub fn show_forecast(&mut self, days: &[DailySummary], unit: UnitSystem) -> ViewEvent {
        let panel = render::render_forecast(days, unit);
        self.forecast = Some(panel.clone());
        ViewEvent::Forecast(panel)
    }

    /// Replaces whatever map was shown before
    pub fn show_map(&mut self, map: MapView) -> ViewEvent {
        self.map = Some(map.clone());
        ViewEvent::Map(map)
    }

    pub fn show_error(&mut self, message: &str) -> ViewEvent {
        let panel = render::render_error(message);
        self.phase = Phase::Error;
        self.error = Some(panel.clone());
        ViewEvent::Error(panel.message)
    }

    pub fn finish_loading(&mut self) -> ViewEvent {
        self.loading = false;
        ViewEvent::LoadingCleared
    }
}
