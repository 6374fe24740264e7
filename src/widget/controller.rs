use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

use super::state::WidgetState;
use crate::error::HttpError;
use crate::forecast::summarize;
use crate::map::MapPresenter;
use crate::prefs::{PreferenceStore, Theme};
use crate::view::{ViewEvent, ViewModel, ViewState};
use crate::weather::{UnitSystem, WeatherError, WeatherSource};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Please enter a city name.")]
    Validation,

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl HttpError for QueryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Weather(e) => e.status_code(),
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Validation => Some("VALIDATION_ERROR"),
            Self::Weather(e) => e.error_code(),
        }
    }
}

crate::impl_into_response!(QueryError);

/// How a query run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Completed,
    Failed,
    Invalid,
    /// A newer query started before this one settled; its results were dropped
    Superseded,
}

/// Orchestrates user actions: validation, fetching, rendering and persistence.
///
/// Each query takes a generation number. Results are only applied while that
/// generation is still the latest, so a slow response can never overwrite a
/// newer one. The state lock is never held across a weather request.
pub struct WidgetController {
    source: Arc<dyn WeatherSource>,
    store: PreferenceStore,
    map: MapPresenter,
    state: RwLock<WidgetState>,
    generation: AtomicU64,
    events: broadcast::Sender<ViewEvent>,
}

impl WidgetController {
    /// Create the controller, loading persisted preferences
    pub async fn new(
        source: Arc<dyn WeatherSource>,
        store: PreferenceStore,
        map: MapPresenter,
    ) -> Self {
        let preferences = store.load().await;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            source,
            store,
            map,
            state: RwLock::new(WidgetState::from_preferences(preferences)),
            generation: AtomicU64::new(0),
            events,
        }
    }

    /// Receive every view transition from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ViewModel {
        self.state.read().await.view_model()
    }

    fn publish(&self, event: ViewEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Apply a view transition if `generation` is still the latest query
    async fn apply<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut ViewState) -> ViewEvent,
    {
        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            return false;
        }
        let event = update(&mut state.view);
        self.publish(event);
        true
    }

    /// Run the query flow for the given city input
    pub async fn submit_query(&self, input: &str) -> QueryOutcome {
        let city = input.trim().to_string();

        let (generation, unit) = {
            let mut state = self.state.write().await;
            // Claim a new generation first so in-flight queries stop applying
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.city = city.clone();
            self.publish(state.view.reset());

            if city.is_empty() {
                self.publish(state.view.show_error(&QueryError::Validation.to_string()));
                tracing::debug!("Rejected empty city query");
                return QueryOutcome::Invalid;
            }

            self.publish(state.view.begin_loading());
            (generation, state.unit)
        };

        tracing::debug!(city = %city, units = %unit, generation, "Query started");

        let result = self.fetch_and_render(generation, &city, unit).await;

        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            tracing::debug!(city = %city, generation, "Discarding superseded query");
            return QueryOutcome::Superseded;
        }

        let outcome = match result {
            Ok(()) => {
                tracing::info!(city = %city, "Query completed");
                QueryOutcome::Completed
            }
            Err(e) => {
                tracing::warn!(city = %city, error = %e, "Query failed");
                self.publish(state.view.show_error(&e.to_string()));
                QueryOutcome::Failed
            }
        };
        self.publish(state.view.finish_loading());

        outcome
    }

    /// Returns early without error when the query is superseded; the caller rechecks
    async fn fetch_and_render(
        &self,
        generation: u64,
        city: &str,
        unit: UnitSystem,
    ) -> Result<(), QueryError> {
        let current = self.source.fetch_current(city, unit).await?;
        if !self
            .apply(generation, |view| view.show_weather(&current, unit))
            .await
        {
            return Ok(());
        }

        let entries = self.source.fetch_forecast(city, unit).await?;
        let days = summarize(&entries);
        if !self
            .apply(generation, |view| view.show_forecast(&days, unit))
            .await
        {
            return Ok(());
        }

        let map = self.map.show(current.lat, current.lon);
        self.apply(generation, |view| view.show_map(map)).await;

        Ok(())
    }

    /// Re-run the query for whatever city is in the input field
    pub async fn rerun_query(&self) -> QueryOutcome {
        let city = self.state.read().await.city.clone();
        self.submit_query(&city).await
    }

    /// Save the current city as a favorite. Returns false unless a lookup for it
    /// succeeded, or if it is already saved.
    pub async fn save_favorite(&self) -> bool {
        let mut state = self.state.write().await;
        let city = state.city.clone();

        if !state.view.save_favorite_visible {
            tracing::debug!(city = %city, "No successful lookup to save");
            return false;
        }

        if !state.favorites.add(&city) {
            tracing::debug!(city = %city, "Favorite not added");
            return false;
        }

        self.store.save_favorites(&state.favorites).await;
        tracing::info!(city = %city.trim(), count = state.favorites.len(), "Favorite saved");
        self.publish(ViewEvent::Favorites(
            state.favorites.iter().map(str::to_string).collect(),
        ));

        true
    }

    /// Put a favorite into the input field and query it
    pub async fn select_favorite(&self, city: &str) -> QueryOutcome {
        tracing::debug!(city = %city, "Favorite selected");
        self.submit_query(city).await
    }

    pub async fn toggle_theme(&self) -> Theme {
        let mut state = self.state.write().await;
        state.theme = state.theme.toggled();

        self.store.save_theme(state.theme).await;
        tracing::info!(theme = %state.theme, "Theme changed");
        self.publish(ViewEvent::Theme(state.theme));

        state.theme
    }

    /// Persist the new unit and re-run the query for the current city
    pub async fn change_unit(&self, unit: UnitSystem) -> QueryOutcome {
        {
            let mut state = self.state.write().await;
            state.unit = unit;
            self.store.save_unit(unit).await;
        }
        tracing::info!(unit = %unit, "Unit changed");

        self.rerun_query().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::view::Phase;
    use crate::weather::{CurrentConditions, ForecastEntry};
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeSource {
        known: HashMap<String, CurrentConditions>,
        forecast_down: bool,
        gates: HashMap<String, Arc<Notify>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with_city(mut self, current: CurrentConditions) -> Self {
            self.known.insert(current.location.clone(), current);
            self
        }

        fn gated(mut self, city: &str, gate: Arc<Notify>) -> Self {
            self.gates.insert(city.to_string(), gate);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn fetch_current(
            &self,
            city: &str,
            unit: UnitSystem,
        ) -> Result<CurrentConditions, WeatherError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("current:{city}:{unit}"));
            if let Some(gate) = self.gates.get(city) {
                gate.notified().await;
            }
            self.known.get(city).cloned().ok_or(WeatherError::NotFound)
        }

        async fn fetch_forecast(
            &self,
            city: &str,
            _unit: UnitSystem,
        ) -> Result<Vec<ForecastEntry>, WeatherError> {
            self.calls.lock().unwrap().push(format!("forecast:{city}"));
            if self.forecast_down {
                return Err(WeatherError::ForecastUnavailable("HTTP 500".to_string()));
            }
            Ok(vec![
                entry("2024-06-01 12:00:00", 10.0, "01d"),
                entry("2024-06-01 15:00:00", 20.0, "02d"),
                entry("2024-06-02 00:00:00", 8.0, "10n"),
            ])
        }
    }

    fn entry(ts: &str, temperature: f64, icon: &str) -> ForecastEntry {
        ForecastEntry {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            temperature,
            icon: icon.to_string(),
        }
    }

    fn conditions(city: &str, temperature: f64) -> CurrentConditions {
        CurrentConditions {
            location: city.to_string(),
            temperature,
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            humidity: 60,
            wind_speed: 3.2,
            lat: 48.8534,
            lon: 2.3488,
        }
    }

    async fn controller_with(
        source: Arc<FakeSource>,
        dir: &tempfile::TempDir,
    ) -> WidgetController {
        WidgetController::new(
            source,
            PreferenceStore::new(dir.path().join("preferences.json")),
            MapPresenter::new(&MapConfig::default()),
        )
        .await
    }

    fn drain(rx: &mut broadcast::Receiver<ViewEvent>) -> Vec<ViewEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_paris_query_renders_everything() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default().with_city(conditions("Paris", 18.5)));
        let controller = controller_with(source.clone(), &dir).await;

        let outcome = controller.submit_query("  Paris ").await;
        let view = controller.snapshot().await;

        assert_eq!(outcome, QueryOutcome::Completed);
        assert_eq!(view.phase, Phase::Result);
        assert_eq!(view.city, "Paris");
        assert!(!view.loading);
        assert!(view.save_favorite_visible);
        assert!(view.error.is_none());

        let weather = view.weather.unwrap();
        assert_eq!(
            weather.lines,
            vec![
                "Temperature: 18.5 °C",
                "Weather: clear sky",
                "Humidity: 60%",
                "Wind Speed: 3.2 m/s",
            ]
        );

        let forecast = view.forecast.unwrap();
        assert_eq!(forecast.days.len(), 2);
        assert_eq!(forecast.days[0].average, "Average Temperature: 15.0 °C");

        let map = view.map.unwrap();
        assert_eq!(map.marker.label, "Location");
        assert_eq!(map.zoom, 13);

        assert_eq!(source.calls(), vec!["current:Paris:metric", "forecast:Paris"]);
    }

    #[tokio::test]
    async fn test_loading_published_before_results() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default().with_city(conditions("Paris", 18.5)));
        let controller = controller_with(source, &dir).await;
        let mut rx = controller.subscribe();

        controller.submit_query("Paris").await;
        let events = drain(&mut rx);

        assert_eq!(events.len(), 6);
        assert_eq!(events[0], ViewEvent::Reset);
        assert_eq!(events[1], ViewEvent::Loading);
        assert!(matches!(events[2], ViewEvent::Weather(_)));
        assert!(matches!(events[3], ViewEvent::Forecast(_)));
        assert!(matches!(events[4], ViewEvent::Map(_)));
        assert_eq!(events[5], ViewEvent::LoadingCleared);
    }

    #[tokio::test]
    async fn test_blank_city_never_hits_network() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let controller = controller_with(source.clone(), &dir).await;
        let mut rx = controller.subscribe();

        let outcome = controller.submit_query("   ").await;
        let view = controller.snapshot().await;

        assert_eq!(outcome, QueryOutcome::Invalid);
        assert!(source.calls().is_empty());
        assert_eq!(view.error.unwrap().message, "Error: Please enter a city name.");
        assert!(!view.loading);
        assert!(!drain(&mut rx).contains(&ViewEvent::Loading));
    }

    #[tokio::test]
    async fn test_not_found_skips_forecast_and_map() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let controller = controller_with(source.clone(), &dir).await;

        let outcome = controller.submit_query("Atlantis").await;
        let view = controller.snapshot().await;

        assert_eq!(outcome, QueryOutcome::Failed);
        assert_eq!(view.phase, Phase::Error);
        assert_eq!(
            view.error.unwrap().message,
            "Error: City not found. Please check your input."
        );
        assert!(view.weather.is_none());
        assert!(view.forecast.is_none());
        assert!(view.map.is_none());
        assert!(!view.loading);
        assert_eq!(source.calls(), vec!["current:Atlantis:metric"]);
    }

    #[tokio::test]
    async fn test_forecast_failure_keeps_current_panel() {
        let dir = tempfile::tempdir().unwrap();
        let mut fake = FakeSource::default().with_city(conditions("Paris", 18.5));
        fake.forecast_down = true;
        let controller = controller_with(Arc::new(fake), &dir).await;

        let outcome = controller.submit_query("Paris").await;
        let view = controller.snapshot().await;

        assert_eq!(outcome, QueryOutcome::Failed);
        assert!(view.weather.is_some());
        assert!(view.forecast.is_none());
        assert!(view.map.is_none());
        assert_eq!(view.error.unwrap().message, "Error: Forecast unavailable: HTTP 500");
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(Notify::new());
        let source = Arc::new(
            FakeSource::default()
                .with_city(conditions("Slowtown", -5.0))
                .with_city(conditions("Paris", 18.5))
                .gated("Slowtown", gate.clone()),
        );
        let controller = Arc::new(controller_with(source.clone(), &dir).await);

        let slow = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit_query("Slowtown").await }
        });

        // Wait until the slow query is parked inside its fetch
        while !source.calls().iter().any(|c| c.starts_with("current:Slowtown")) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(controller.submit_query("Paris").await, QueryOutcome::Completed);

        gate.notify_one();
        assert_eq!(slow.await.unwrap(), QueryOutcome::Superseded);

        let view = controller.snapshot().await;
        assert_eq!(view.city, "Paris");
        assert_eq!(view.weather.unwrap().title, "Paris");
        assert!(!source.calls().contains(&"forecast:Slowtown".to_string()));
    }

    #[tokio::test]
    async fn test_save_favorite_rejects_duplicates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default().with_city(conditions("Paris", 18.5)));
        let controller = controller_with(source, &dir).await;

        controller.submit_query("Paris").await;
        assert!(controller.save_favorite().await);
        assert!(!controller.save_favorite().await);

        assert_eq!(controller.snapshot().await.favorites, vec!["Paris"]);

        let reloaded = PreferenceStore::new(dir.path().join("preferences.json"))
            .load()
            .await;
        assert_eq!(reloaded.favorites.iter().collect::<Vec<_>>(), vec!["Paris"]);
    }

    #[tokio::test]
    async fn test_save_favorite_ignores_blank_city() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller_with(Arc::new(FakeSource::default()), &dir).await;

        assert!(!controller.save_favorite().await);
        assert!(controller.snapshot().await.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_save_favorite_refused_after_failed_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller_with(Arc::new(FakeSource::default()), &dir).await;

        assert_eq!(controller.submit_query("Atlantis").await, QueryOutcome::Failed);
        assert!(!controller.save_favorite().await);

        assert!(controller.snapshot().await.favorites.is_empty());
        let reloaded = PreferenceStore::new(dir.path().join("preferences.json"))
            .load()
            .await;
        assert!(reloaded.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_save_favorite_refused_while_loading() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(Notify::new());
        let source = Arc::new(
            FakeSource::default()
                .with_city(conditions("Paris", 18.5))
                .gated("Paris", gate.clone()),
        );
        let controller = Arc::new(controller_with(source, &dir).await);

        let pending = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit_query("Paris").await }
        });
        while !controller.snapshot().await.loading {
            tokio::task::yield_now().await;
        }

        assert!(!controller.save_favorite().await);

        gate.notify_one();
        assert_eq!(pending.await.unwrap(), QueryOutcome::Completed);
        assert!(controller.save_favorite().await);
        assert_eq!(controller.snapshot().await.favorites, vec!["Paris"]);
    }

    #[tokio::test]
    async fn test_select_favorite_fills_input_and_queries() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default().with_city(conditions("Paris", 18.5)));
        let controller = controller_with(source.clone(), &dir).await;

        let outcome = controller.select_favorite("Paris").await;

        assert_eq!(outcome, QueryOutcome::Completed);
        assert_eq!(controller.snapshot().await.city, "Paris");
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_theme_twice_restores_light() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller_with(Arc::new(FakeSource::default()), &dir).await;
        let original = controller.snapshot().await.styling;

        assert_eq!(controller.toggle_theme().await, Theme::Dark);
        assert!(!controller.snapshot().await.styling.dark_regions.is_empty());
        assert_eq!(controller.toggle_theme().await, Theme::Light);

        assert_eq!(controller.snapshot().await.styling, original);
        let reloaded = PreferenceStore::new(dir.path().join("preferences.json"))
            .load()
            .await;
        assert_eq!(reloaded.theme, Theme::Light);
    }

    #[tokio::test]
    async fn test_change_unit_persists_and_requeries() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default().with_city(conditions("Paris", 65.3)));
        let controller = controller_with(source.clone(), &dir).await;

        controller.submit_query("Paris").await;
        let outcome = controller.change_unit(UnitSystem::Imperial).await;
        let view = controller.snapshot().await;

        assert_eq!(outcome, QueryOutcome::Completed);
        assert_eq!(view.unit, UnitSystem::Imperial);
        assert_eq!(view.weather.unwrap().lines[0], "Temperature: 65.3 °F");
        assert!(source.calls().contains(&"current:Paris:imperial".to_string()));

        let reloaded = PreferenceStore::new(dir.path().join("preferences.json"))
            .load()
            .await;
        assert_eq!(reloaded.unit, UnitSystem::Imperial);
    }

    #[tokio::test]
    async fn test_persisted_preferences_loaded_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("preferences.json"));
        store.save_theme(Theme::Dark).await;
        store.save_unit(UnitSystem::Imperial).await;

        let controller = controller_with(Arc::new(FakeSource::default()), &dir).await;
        let view = controller.snapshot().await;

        assert_eq!(view.styling.theme, Theme::Dark);
        assert_eq!(view.unit, UnitSystem::Imperial);
        assert_eq!(view.phase, Phase::Idle);
    }
}
