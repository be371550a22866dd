use tradelens::api::router::create_router;
use tradelens::config::AppConfig;
use tradelens::services::spawn_sweeper;
use tradelens::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    if !config.has_api_token() {
        tracing::warn!("API_TOKEN is not set, /api routes are unauthenticated");
    }

    let state = AppState::new(config);

    // --- Session history eviction ---
    let sweeper = spawn_sweeper(
        state.sessions.clone(),
        state.config.session_sweep_interval_secs,
    );
    tracing::info!(
        ttl_hours = state.config.session_ttl_hours,
        interval_secs = state.config.session_sweep_interval_secs,
        "Session sweeper spawned"
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
