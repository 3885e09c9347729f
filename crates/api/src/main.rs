use drivetree_api::{build_router, state::AppState};
use drivetree_config::Settings;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "drivetree_api=debug,drivetree_services=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load and validate config; missing OAuth or session secrets stop startup here
    let settings = Settings::load()?;
    info!("Starting drivetree on {}:{}", settings.app.host, settings.app.port);
    info!(
        session_store = ?settings.session.store,
        api_base = %settings.drive.api_base,
        max_depth = settings.drive.max_depth,
        request_timeout_secs = settings.drive.request_timeout_secs,
        "Viewer config"
    );

    let app_state = AppState::new(settings.clone()).await?;
    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
