#![allow(dead_code)]

use std::sync::Arc;

use resume_builder::{
    config::Settings,
    domain::{CreateUserRequest, User, UserRole},
    service::ServiceContext,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const PASSWORD: &str = "correct-horse";

/// A fresh in-memory database. A single connection that never expires keeps
/// every query on the same database.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

pub fn test_settings(media_root: &std::path::Path) -> Settings {
    let mut settings = Settings::default();
    settings.media.root = media_root.to_string_lossy().into_owned();
    settings
}

pub async fn test_context() -> anyhow::Result<Arc<ServiceContext>> {
    let pool = test_pool().await?;
    Ok(Arc::new(ServiceContext::new(pool, &Settings::default())))
}

pub async fn create_user(context: &ServiceContext, username: &str, role: UserRole) -> anyhow::Result<User> {
    let user = context.account_service.create_user(CreateUserRequest {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        email: None,
        role,
    }).await?;

    Ok(user)
}
