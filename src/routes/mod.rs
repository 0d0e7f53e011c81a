//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! All endpoints live under `/api`; handlers stay thin and translate
//! service errors into status codes. CORS is wide open because the SPA
//! this service backs is served from a different origin in development.

pub mod chat;
pub mod reports;
pub mod themes;
pub mod users;

use axum::Router;
use axum::response::Json;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/chat/messages", get(chat::list_messages).post(chat::submit))
        .route("/api/chat/sessions", get(chat::list_sessions).post(chat::new_session))
        .route("/api/chat/sessions/{id}", patch(chat::rename_session))
        .route("/api/chat/sessions/{id}/select", post(chat::select_session))
        .route("/api/chat/sessions/{id}/messages", get(chat::session_messages))
        .route("/api/chat/sessions/{id}/export.csv", get(chat::export_session_csv))
        .route("/api/reports", get(reports::list_reports))
        .route("/api/templates", get(reports::list_templates))
        .route("/api/generate-report", post(reports::generate_report))
        .route("/api/themes", get(themes::list_themes))
        .route("/api/theme", get(themes::current_theme).put(themes::set_theme))
        .route("/api/users", get(users::get_user_by_username).post(users::create_user))
        .route("/api/users/{id}", get(users::get_user))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
