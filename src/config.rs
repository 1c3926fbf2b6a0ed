use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::persistence::DEFAULT_TASK_LIMIT;

pub const DEFAULT_PORT: u16 = 7540;
pub const DEFAULT_DB_FILE: &str = "scheduler.db";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Process configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `TODO_PORT`
    pub port: u16,
    /// `TODO_DBFILE`
    pub db_file: PathBuf,
    /// `TODO_TASK_LIMIT`
    pub task_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_file: PathBuf::from(DEFAULT_DB_FILE),
            task_limit: DEFAULT_TASK_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment. Variables
    /// already set in the environment win over `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("TODO_PORT") {
            config.port = value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "TODO_PORT",
                value,
                expected: "a port number",
            })?;
        }

        if let Some(value) = get("TODO_DBFILE") {
            config.db_file = PathBuf::from(value);
        }

        if let Some(value) = get("TODO_TASK_LIMIT") {
            config.task_limit = match value.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TODO_TASK_LIMIT",
                        value,
                        expected: "a positive integer",
                    });
                }
            };
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
