//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for deployment.
//! Config precedence: env vars > .env file > continuum.toml > defaults
//!
//! The loaded [`AppConfig`] is an owned value handed to whoever builds the
//! client; nothing here is stored globally.

use std::time::Duration;

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError};
use serde::Deserialize;

use crate::permissions::PermissionPolicy;

/// Load configuration from defaults, `continuum.toml` and the environment.
pub fn load() -> Result<AppConfig, ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = with_defaults()?
        // Optional config file
        .add_source(config::File::with_name("continuum").required(false))
        // Environment variables (CONTINUUM__API__BASE_URL, CONTINUUM__POLICY__OFFICER_LEVEL, ...)
        .add_source(
            config::Environment::with_prefix("CONTINUUM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(cfg)
}

/// Load configuration from defaults overlaid with a TOML document.
pub fn from_toml(source: &str) -> Result<AppConfig, ConfigError> {
    let cfg = with_defaults()?
        .add_source(config::File::from_str(source, config::FileFormat::Toml))
        .build()?;
    finish(cfg)
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("api.base_url", "http://localhost:5000")?
        .set_default("api.timeout_secs", 10)?
        .set_default("policy.row_edit_level", 1)?
        .set_default("policy.officer_level", 2)?
        .set_default("policy.item_edit_level", 1)?
        .set_default("policy.loot_edit_level", 2)?
        .set_default("policy.show_inactive_level", 2)?
        .set_default("view.attendance_days", 12)?
        .set_default("view.recent_loot", 6)
}

fn finish(cfg: Config) -> Result<AppConfig, ConfigError> {
    let app_config: AppConfig = cfg.try_deserialize()?;
    app_config
        .policy
        .validate()
        .map_err(|e| ConfigError::Message(e.to_string()))?;
    Ok(app_config)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub policy: PermissionPolicy,
    pub view: ViewConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://loot.example.com`.
    pub base_url: String,
    /// Upper bound for any single request, in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    /// Raid days shown in the attendance sub-view.
    pub attendance_days: usize,
    /// Awards shown in the recent-loot sub-views.
    pub recent_loot: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            attendance_days: 12,
            recent_loot: 6,
        }
    }
}
