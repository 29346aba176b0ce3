//! Application settings.
//!
//! Read from an optional `settings.toml` (or the file given with `--config`)
//! and overridden by `FINBOARD__<SECTION>__<KEY>` environment variables.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use engine::{CacheSettings, TokenBucketConfig};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
}

/// Cache lifetimes in seconds.
#[derive(Debug, Deserialize)]
pub struct Cache {
    #[serde(default = "default_user_ttl")]
    pub user_ttl_secs: u64,
    #[serde(default = "default_dashboard_ttl")]
    pub dashboard_ttl_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            user_ttl_secs: default_user_ttl(),
            dashboard_ttl_secs: default_dashboard_ttl(),
        }
    }
}

fn default_user_ttl() -> u64 {
    300
}

fn default_dashboard_ttl() -> u64 {
    60
}

impl From<&Cache> for CacheSettings {
    fn from(cache: &Cache) -> Self {
        CacheSettings {
            user_ttl: Duration::from_secs(cache.user_ttl_secs),
            dashboard_ttl: Duration::from_secs(cache.dashboard_ttl_secs),
        }
    }
}

/// Token bucket for account creation. Missing keys keep the gate defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Admission {
    pub capacity: Option<u32>,
    pub refill_rate: Option<u32>,
    pub interval_secs: Option<u64>,
    pub blocked_user_agents: Option<Vec<String>>,
    pub block_missing_user_agent: Option<bool>,
}

impl From<&Admission> for TokenBucketConfig {
    fn from(admission: &Admission) -> Self {
        let defaults = TokenBucketConfig::default();
        TokenBucketConfig {
            capacity: admission.capacity.unwrap_or(defaults.capacity),
            refill_rate: admission.refill_rate.unwrap_or(defaults.refill_rate),
            interval: admission
                .interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            blocked_user_agents: admission
                .blocked_user_agents
                .clone()
                .unwrap_or(defaults.blocked_user_agents),
            block_missing_user_agent: admission
                .block_missing_user_agent
                .unwrap_or(defaults.block_missing_user_agent),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub auth: Auth,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub admission: Admission,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name(path).required(false))
                .add_source(Environment::with_prefix("FINBOARD").separator("__"))
                .build()?,
        )
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}
