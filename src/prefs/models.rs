use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::weather::UnitSystem;

/// Light/dark theme applied to the themed page regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown theme: {0}")]
pub struct ParseThemeError(pub String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// Saved cities in insertion order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Favorites(IndexSet<String>);

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a city. Returns false if it is blank or already saved.
    pub fn add(&mut self, city: &str) -> bool {
        let city = city.trim();
        if city.is_empty() {
            return false;
        }
        self.0.insert(city.to_string())
    }

    pub fn contains(&self, city: &str) -> bool {
        self.0.contains(city.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Favorites {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut favorites = Favorites::new();
        for city in iter {
            favorites.add(city.as_ref());
        }
        favorites
    }
}

/// Everything persisted across sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub favorites: Favorites,
    pub theme: Theme,
    pub unit: UnitSystem,
}
