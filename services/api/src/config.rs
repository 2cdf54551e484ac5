//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup and handed to
//! the adapters and `AppState` explicitly. The `.env` file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use study_assistant_core::ReprocessPolicy;
use tracing::Level;

const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 120;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Base URL of the managed auth/database backend.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub backend_timeout: Duration,
    /// When set, generated content is written straight to Postgres instead of
    /// through the backend's REST interface.
    pub database_url: Option<String>,
    pub ai_gateway_url: String,
    pub ai_gateway_key: String,
    pub ai_model: String,
    pub ai_gateway_timeout: Duration,
    pub reprocess_policy: ReprocessPolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };

        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Managed Backend ---
        let supabase_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let backend_timeout_secs =
            seconds(&lookup, "SUPABASE_TIMEOUT_SECS", DEFAULT_BACKEND_TIMEOUT_SECS)?;

        // --- AI Gateway ---
        let ai_gateway_key = required("LOVABLE_API_KEY")?;
        let ai_gateway_url = lookup("AI_GATEWAY_URL")
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let ai_model = lookup("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let gateway_timeout_secs =
            seconds(&lookup, "AI_GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT_SECS)?;

        let reprocess_policy = match lookup("REPROCESS_POLICY") {
            Some(raw) => raw
                .parse::<ReprocessPolicy>()
                .map_err(|e| ConfigError::InvalidValue("REPROCESS_POLICY".to_string(), e))?,
            None => ReprocessPolicy::default(),
        };

        Ok(Self {
            bind_address,
            log_level,
            supabase_url,
            supabase_anon_key,
            backend_timeout: Duration::from_secs(backend_timeout_secs),
            database_url,
            ai_gateway_url,
            ai_gateway_key,
            ai_model,
            ai_gateway_timeout: Duration::from_secs(gateway_timeout_secs),
            reprocess_policy,
        })
    }
}

fn seconds<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
