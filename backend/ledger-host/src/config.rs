//! Application configuration loaded from environment variables.

use impact_ledger::{Principal, ReleasePolicy};

use crate::errors::{HostError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Principal allowed to release donations; anyone may when unset
    pub owner: Option<Principal>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./impact_ledger.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| HostError::Config("Invalid API_PORT".to_string()))?,
            owner: env_var("LEDGER_OWNER")
                .ok()
                .map(|raw| {
                    Principal::new(raw)
                        .map_err(|e| HostError::Config(format!("Invalid LEDGER_OWNER: {e}")))
                })
                .transpose()?,
        })
    }

    pub fn release_policy(&self) -> ReleasePolicy {
        match &self.owner {
            Some(owner) => ReleasePolicy::Owner(owner.clone()),
            None => ReleasePolicy::Open,
        }
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| HostError::Config(format!("Missing env var: {key}")))
}
