use axum::{
    extract::{Form, State},
    response::{Html, Redirect},
    Json,
};
use serde::Deserialize;

use crate::view::{html, ViewModel};
use crate::weather::UnitSystem;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CityForm {
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct UnitForm {
    pub unit: UnitSystem,
}

fn back_to_page() -> Redirect {
    Redirect::to("/")
}

/// Render the widget page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.controller.snapshot().await;
    Html(html::render_page(&view))
}

/// POST /query
pub async fn submit_query(State(state): State<AppState>, Form(form): Form<CityForm>) -> Redirect {
    state.controller.submit_query(&form.city).await;
    back_to_page()
}

/// POST /unit
pub async fn change_unit(State(state): State<AppState>, Form(form): Form<UnitForm>) -> Redirect {
    state.controller.change_unit(form.unit).await;
    back_to_page()
}

/// POST /theme
pub async fn toggle_theme(State(state): State<AppState>) -> Redirect {
    state.controller.toggle_theme().await;
    back_to_page()
}

/// POST /favorites
pub async fn save_favorite(State(state): State<AppState>) -> Redirect {
    state.controller.save_favorite().await;
    back_to_page()
}

/// POST /favorites/select
pub async fn select_favorite(
    State(state): State<AppState>,
    Form(form): Form<CityForm>,
) -> Redirect {
    state.controller.select_favorite(&form.city).await;
    back_to_page()
}

/// Current view-model as JSON
#[utoipa::path(
    get,
    path = "/api/v1/view",
    tag = "widget",
    responses((status = 200, body = ViewModel))
)]
pub async fn view(State(state): State<AppState>) -> Json<ViewModel> {
    Json(state.controller.snapshot().await)
}
