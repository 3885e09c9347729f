pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    // Viewer page and OAuth handshake
    let viewer_routes = Router::new()
        .route("/", get(routes::viewer::index))
        .route("/login", get(routes::auth::login))
        .route("/callback", get(routes::auth::callback))
        .route("/logout", get(routes::auth::logout));

    // Tree data for the two panels
    let folder_routes = Router::new().route("/get-folder", post(routes::folder::get_folder));

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(viewer_routes)
        .merge(folder_routes)
        .merge(health)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
