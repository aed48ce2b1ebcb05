use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// `DATABASE_URL` is optional: when absent the engine runs in standalone
/// mode with in-memory stores and queue (used by local development and the
/// test suite). The external CV analysis service is enabled only when both
/// `ANALYSIS_SERVICE_URL` and `ANALYSIS_API_KEY` are set.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub analysis_service_url: Option<String>,
    pub analysis_api_key: Option<String>,
    pub port: u16,
    pub worker_count: usize,
    pub poll_interval_ms: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: env_opt("DATABASE_URL"),
            analysis_service_url: env_opt("ANALYSIS_SERVICE_URL"),
            analysis_api_key: env_opt("ANALYSIS_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            worker_count: std::env::var("WORKER_COUNT")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .context("WORKER_COUNT must be a positive integer")?,
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "250".to_string())
                .parse::<u64>()
                .context("POLL_INTERVAL_MS must be a number of milliseconds")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The analysis service is configured only when both the base URL and
    /// the API key are present.
    pub fn analysis_service(&self) -> Option<(&str, &str)> {
        match (&self.analysis_service_url, &self.analysis_api_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// Returns the variable's value, treating unset and empty as absent.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
