mod config;
mod error;
mod forecast;
mod map;
mod openapi;
mod prefs;
mod routes;
mod view;
mod weather;
mod widget;

use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::map::MapPresenter;
use crate::prefs::PreferenceStore;
use crate::weather::{WeatherClient, WeatherSource};
use crate::widget::WidgetController;

/// Shared HTTP client configuration
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

#[derive(Clone)]
pub struct AppState {
    pub weather_source: Arc<dyn WeatherSource>,
    pub controller: Arc<WidgetController>,
}

/// Create the outbound HTTP client used for OpenWeatherMap
fn create_http_client(config: &AppConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .build()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weathervane=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::info!("Configuration loaded successfully");

    let http_client = create_http_client(&config)?;
    tracing::debug!(timeout_secs = config.http_timeout_secs, "HTTP client created");

    let weather_source: Arc<dyn WeatherSource> = Arc::new(WeatherClient::new(
        http_client,
        &config.openweathermap_api_key,
        &config.api_base_url,
    ));

    let controller = Arc::new(
        WidgetController::new(
            Arc::clone(&weather_source),
            PreferenceStore::new(&config.prefs_path),
            MapPresenter::new(&config.map),
        )
        .await,
    );

    let state = AppState {
        weather_source,
        controller,
    };

    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Widget listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
