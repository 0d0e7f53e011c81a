//! Theme routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::state::AppState;
use crate::theme::Theme;

#[derive(Deserialize)]
pub struct SetThemeBody {
    pub id: String,
}

/// `GET /api/themes` — the static registry.
pub async fn list_themes(State(_state): State<AppState>) -> Json<&'static [Theme]> {
    Json(crate::theme::registry())
}

/// `GET /api/theme` — the current selection.
pub async fn current_theme(State(state): State<AppState>) -> Json<&'static Theme> {
    Json(state.themes.current())
}

/// `PUT /api/theme` — select a theme; unknown ids are rejected.
pub async fn set_theme(
    State(state): State<AppState>,
    Json(body): Json<SetThemeBody>,
) -> Result<Json<&'static Theme>, StatusCode> {
    let theme = state.themes.set_theme(&body.id).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(Json(theme))
}
