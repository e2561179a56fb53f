use std::path::PathBuf;

use serde::Deserialize;

/// Settings for the sync server.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        Ok(Self {
            database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
        })
    }
}

/// Settings for a local planner session.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    pub secret: String,
    pub cache_dir: PathBuf,
}

impl PlannerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            secret: std::env::var("PLANNER_SECRET")?,
            cache_dir: std::env::var("PLANNER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".tripplanner")),
        })
    }
}
