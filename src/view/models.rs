use serde::Serialize;
use utoipa::ToSchema;

use crate::map::MapView;
use crate::prefs::Theme;
use crate::weather::UnitSystem;

/// Where the widget is in its query lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Result,
    Error,
}

/// Current-conditions panel
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeatherPanel {
    pub title: String,
    pub lines: Vec<String>,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastDay {
    pub date: String,
    pub average: String,
    pub icon_url: String,
}

/// Forecast panel, one block per day
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastPanel {
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorPanel {
    pub message: String,
}

/// Page regions that switch styling with the theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Body,
    Container,
    Headings,
    Buttons,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Body,
        Region::Container,
        Region::Headings,
        Region::Buttons,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ThemeStyling {
    pub theme: Theme,
    /// Regions carrying the `dark` class
    pub dark_regions: Vec<Region>,
}

impl ThemeStyling {
    pub fn is_dark(&self, region: Region) -> bool {
        self.dark_regions.contains(&region)
    }

    pub fn class_for(&self, region: Region) -> &'static str {
        if self.is_dark(region) {
            "dark"
        } else {
            ""
        }
    }
}

/// Everything the page shows, decoupled from any UI toolkit
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ViewModel {
    pub phase: Phase,
    pub city: String,
    pub unit: UnitSystem,
    pub loading: bool,
    pub weather: Option<WeatherPanel>,
    pub forecast: Option<ForecastPanel>,
    pub error: Option<ErrorPanel>,
    pub map: Option<MapView>,
    pub save_favorite_visible: bool,
    pub favorites: Vec<String>,
    pub styling: ThemeStyling,
}

/// A single visible transition, published to observers as it happens
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Reset,
    Loading,
    Weather(WeatherPanel),
    Forecast(ForecastPanel),
    Map(MapView),
    Error(String),
    LoadingCleared,
    Favorites(Vec<String>),
    Theme(Theme),
}
