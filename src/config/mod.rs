use std::path::PathBuf;

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    #[serde(default)]
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory uploaded files are written to and served from under `/media`.
    pub root: String,
    pub max_upload_bytes: usize,
}

impl MediaConfig {
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://resume_builder.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.cookie_secure", false)?
            .set_default("media.root", "media")?
            .set_default("media.max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("debug", false)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Environment variables, e.g. RESUME_BUILDER__SERVER__PORT=9000
            .add_source(Environment::with_prefix("RESUME_BUILDER").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Settings {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "resume_builder=debug,tower_http=debug"
        } else {
            "resume_builder=info,tower_http=info"
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://resume_builder.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                cookie_secure: false,
            },
            media: MediaConfig {
                root: "media".to_string(),
                max_upload_bytes: 10 * 1024 * 1024,
            },
            debug: false,
        }
    }
}
