pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use tower_http::{
    compression::CompressionLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
    web,
};
use state::AppState;

/// Multipart overhead allowed on top of the largest accepted file.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, settings.clone());

    Router::new()
        .route("/health", get(handlers::root::health_check))
        .with_state(app_state.clone())

        // HTML pages
        .merge(web::create_web_routes(app_state))

        // Uploaded photos and template previews
        .nest_service("/media", ServeDir::new(settings.media.root_path()))

        // Middleware
        .layer(DefaultBodyLimit::max(settings.media.max_upload_bytes + FORM_OVERHEAD_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
