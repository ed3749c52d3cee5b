use std::path::Path;
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dhaka_desk::clock::SystemClock;
use dhaka_desk::config::Config;
use dhaka_desk::dashboard::Dashboard;
use dhaka_desk::db::Database;
use dhaka_desk::format::ImageResolver;
use dhaka_desk::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dhaka_desk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| "dashboard.toml".to_string());
    let mut config = if Path::new(&config_path).exists() {
        info!("Loading configuration from {}", config_path);
        Config::load(&config_path)?
    } else {
        info!("No {} found, using defaults and environment", config_path);
        Config::default()
    };
    config.apply_env()?;

    // Connections are opened on first use, so an unreachable store shows up
    // as an error page instead of preventing startup.
    let db = Database::new_lazy(&config.database)?;
    info!(
        "Article store configured (max {} connections, {}s query timeout)",
        config.database.max_connections, config.database.query_timeout_secs
    );

    let dashboard = Dashboard::new(
        Arc::new(db),
        Arc::new(SystemClock),
        ImageResolver::new(config.images.base_url.clone()),
    );
    let state = Arc::new(AppState { dashboard });

    // Build router
    let app = routes::router(state)
        .nest_service("/static", ServeDir::new("static"))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server starting on http://{}", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
