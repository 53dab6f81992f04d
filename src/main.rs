use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resume_builder::{
    api,
    config::Settings,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration before tracing so `debug` can pick the log level
    let (settings, config_error) = match Settings::new() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(e) = config_error {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
    }

    tracing::info!("Starting resume builder on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    tokio::fs::create_dir_all(settings.media.root_path()).await?;

    let service_context = Arc::new(ServiceContext::new(db_pool.clone(), &settings));

    match service_context.auth_service.cleanup_expired_sessions().await {
        Ok(0) => {}
        Ok(removed) => tracing::info!("Removed {} expired sessions", removed),
        Err(e) => tracing::warn!("Failed to clean up expired sessions: {}", e),
    }

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on {}", settings.server.base_url);

    axum::serve(listener, app).await?;

    Ok(())
}
