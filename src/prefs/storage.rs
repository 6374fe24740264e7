use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::RwLock;

use super::models::{Favorites, Preferences, Theme};
use crate::weather::UnitSystem;

const FAVORITES_KEY: &str = "favorites";
const THEME_KEY: &str = "theme";
const UNIT_KEY: &str = "unit";

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// File-backed key/value storage for user preferences.
///
/// The file holds a flat string map with one entry per key. Failures never
/// reach the caller: reads fall back to defaults and writes are logged while
/// the in-memory copy keeps serving.
pub struct PreferenceStore {
    entries: RwLock<BTreeMap<String, String>>,
    file_path: PathBuf,
}

impl PreferenceStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            file_path: file_path.into(),
        }
    }

    /// Read persisted preferences, substituting defaults for missing or unparseable keys
    pub async fn load(&self) -> Preferences {
        let entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %self.file_path.display(),
                    error = %e,
                    "Could not read preferences, using defaults"
                );
                BTreeMap::new()
            }
        };

        let preferences = Preferences {
            favorites: parse_favorites(entries.get(FAVORITES_KEY)),
            theme: parse_or_default(THEME_KEY, entries.get(THEME_KEY)),
            unit: parse_or_default(UNIT_KEY, entries.get(UNIT_KEY)),
        };

        *self.entries.write().await = entries;

        tracing::info!(
            favorites = preferences.favorites.len(),
            theme = %preferences.theme,
            unit = %preferences.unit,
            "Loaded preferences"
        );

        preferences
    }

    pub async fn save_favorites(&self, favorites: &Favorites) {
        match serde_json::to_string(favorites) {
            Ok(value) => self.set(FAVORITES_KEY, value).await,
            Err(e) => tracing::warn!(error = %e, "Could not serialize favorites"),
        }
    }

    pub async fn save_theme(&self, theme: Theme) {
        self.set(THEME_KEY, theme.as_str().to_string()).await;
    }

    pub async fn save_unit(&self, unit: UnitSystem) {
        self.set(UNIT_KEY, unit.as_str().to_string()).await;
    }

    async fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);

        if let Err(e) = self.persist(&entries).await {
            tracing::warn!(
                key = %key,
                path = %self.file_path.display(),
                error = %e,
                "Could not persist preference, keeping it in memory"
            );
        } else {
            tracing::debug!(key = %key, "Saved preference");
        }
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, PrefsError> {
        if !self.file_path.exists() {
            tracing::debug!("Preference file does not exist, starting fresh");
            return Ok(BTreeMap::new());
        }

        let content = tokio::fs::read_to_string(&self.file_path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write to a sibling temp file and rename it over the real one
    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), PrefsError> {
        let content = serde_json::to_string_pretty(entries)?;

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = temp_path(&self.file_path);
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.file_path).await?;

        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn parse_favorites(raw: Option<&String>) -> Favorites {
    let Some(raw) = raw else {
        return Favorites::new();
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(cities) => cities.into_iter().collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored favorites are unreadable, starting with none");
            Favorites::new()
        }
    }
}

fn parse_or_default<T>(key: &str, raw: Option<&String>) -> T
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    match raw.map(|value| value.parse::<T>()) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            tracing::warn!(key = %key, error = %e, "Stored preference is unreadable, using default");
            T::default()
        }
        None => T::default(),
    }
}
