//! Configuration module for the RTI backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory for per-client draft state files
    pub state_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Quiet period before an autosave fires
    pub autosave_quiet_period: Duration,
    /// Time-to-live for department/template lookup cache entries
    pub lookup_cache_ttl: Duration,
    /// Maximum number of entries kept in a lookup cache
    pub lookup_cache_capacity: usize,
    /// Default language for new drafts
    pub default_language: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("RTI_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let state_dir = env::var("RTI_STATE_DIR")
            .unwrap_or_else(|_| "./data/state".to_string())
            .into();

        let bind_addr = env::var("RTI_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid RTI_BIND_ADDR format");

        let log_level = env::var("RTI_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let autosave_quiet_period = Duration::from_millis(
            env::var("RTI_AUTOSAVE_QUIET_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
        );

        let lookup_cache_ttl = Duration::from_secs(
            env::var("RTI_LOOKUP_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        );

        let lookup_cache_capacity = env::var("RTI_LOOKUP_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);

        let default_language = env::var("RTI_DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string());

        Self {
            db_path,
            state_dir,
            bind_addr,
            log_level,
            autosave_quiet_period,
            lookup_cache_ttl,
            lookup_cache_capacity,
            default_language,
        }
    }
}
