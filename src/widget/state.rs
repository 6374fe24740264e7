use crate::prefs::{Favorites, Preferences, Theme};
use crate::view::{render, ViewModel, ViewState};
use crate::weather::UnitSystem;

/// Application state owned by the controller
#[derive(Debug, Clone, Default)]
pub struct WidgetState {
    /// Contents of the city input field
    pub city: String,
    pub favorites: Favorites,
    pub theme: Theme,
    pub unit: UnitSystem,
    pub view: ViewState,
}

impl WidgetState {
    pub fn from_preferences(preferences: Preferences) -> Self {
        Self {
            city: String::new(),
            favorites: preferences.favorites,
            theme: preferences.theme,
            unit: preferences.unit,
            view: ViewState::default(),
        }
    }

    pub fn view_model(&self) -> ViewModel {
        ViewModel {
            phase: self.view.phase,
            city: self.city.clone(),
            unit: self.unit,
            loading: self.view.loading,
            weather: self.view.weather.clone(),
            forecast: self.view.forecast.clone(),
            error: self.view.error.clone(),
            map: self.view.map.clone(),
            save_favorite_visible: self.view.save_favorite_visible,
            favorites: self.favorites.iter().map(str::to_string).collect(),
            styling: render::render_styling(self.theme),
        }
    }
}
