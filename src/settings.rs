use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::constants::{DEFAULT_MAX_CONNECTIONS, ENV_PREFIX};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    /// HMAC secret shared with the service that issues session tokens.
    pub session_secret: String,
}

impl Settings {
    /// Reads `FOODGRAM_*` variables, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_source(Environment::with_prefix(ENV_PREFIX))
    }

    pub fn from_source(source: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("max_connections", DEFAULT_MAX_CONNECTIONS)?
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}
