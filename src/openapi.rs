use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::view::ViewModel;
use crate::weather::handlers::LookupResponse;

/// OpenAPI documentation for the JSON endpoints
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weathervane API",
        version = "1.0.0",
        description = "City weather lookup widget backed by OpenWeatherMap. Exposes the widget view-model and a stateless lookup.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::widget::handlers::view,
        crate::weather::handlers::lookup,
    ),
    tags(
        (name = "widget", description = "Widget view-model"),
        (name = "weather", description = "Current weather and daily forecast summaries")
    ),
    components(
        schemas(
            ErrorResponse,
            ViewModel,
            LookupResponse,
        )
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
