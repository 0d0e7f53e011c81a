mod chat;
mod routes;
mod services;
mod state;
mod theme;

use std::sync::Arc;

use chat::dispatcher::DispatchConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let state = state::AppState::new(DispatchConfig::from_env());

    // Spawn background history pruning.
    let _prune = chat::dispatcher::spawn_prune_task(Arc::clone(&state.dispatcher));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "aeroreport listening");
    axum::serve(listener, app).await.expect("server failed");
}
