use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::env;

use crate::config::rate_limit::RateLimitConfig;
use crate::config::security::SecurityConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_app_port")]
    pub app_port: u16,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

impl Settings {
    /// Production deployments never expose internal error detail to the
    /// caller.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            app_port: default_app_port(),
            rate_limit: RateLimitConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_app_port() -> u16 {
    8080
}

pub fn load() -> Result<Settings, ConfigError> {
    let env = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let env_file = match env.as_str() {
        "production" => ".env.production",
        _ => ".env.development",
    };

    dotenv::from_filename(env_file).ok();

    let config = Config::builder()
        .add_source(Environment::default().try_parsing(true).separator("__"))
        .build()?;

    config
        .try_deserialize::<Settings>()
        .map_err(|e| ConfigError::Message(format!("Failed to deserialize settings: {}", e)))
}
