use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    BoxError, Router,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::openapi::openapi_json;
use crate::weather::handlers as weather_handlers;
use crate::widget::handlers as widget_handlers;
use crate::AppState;

/// Upper bound for a whole request, including both weather calls
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Handle request timeout errors
async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", err),
        )
    }
}

/// Page and form-post routes driving the widget
fn widget_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(widget_handlers::index))
        .route("/query", post(widget_handlers::submit_query))
        .route("/unit", post(widget_handlers::change_unit))
        .route("/theme", post(widget_handlers::toggle_theme))
        .route("/favorites", post(widget_handlers::save_favorite))
        .route(
            "/favorites/select",
            post(widget_handlers::select_favorite),
        )
}

/// Build all API v1 routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/view", get(widget_handlers::view))
        .route("/weather/{city}", get(weather_handlers::lookup))
        .layer(CorsLayer::permissive())
}

/// Build the complete application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(weather_handlers::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(widget_routes())
        .nest("/api/v1", api_v1_routes())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
