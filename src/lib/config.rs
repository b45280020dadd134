use std::{env, time::Duration};

use thiserror::Error;

pub const NAME_VAR: &str = "CUBE_WORKER_NAME";
pub const HOST_VAR: &str = "CUBE_WORKER_HOST";
pub const PORT_VAR: &str = "CUBE_WORKER_PORT";
pub const POLL_INTERVAL_VAR: &str = "CUBE_POLL_INTERVAL_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            name: "worker-1".to_string(),
            address: "0.0.0.0".to_string(),
            port: 5555,
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = WorkerConfig::default();

        let port = match lookup(PORT_VAR) {
            Some(value) => parse_number(PORT_VAR, value)?,
            None => defaults.port,
        };
        let poll_interval = match lookup(POLL_INTERVAL_VAR) {
            Some(value) => Duration::from_secs(parse_number(POLL_INTERVAL_VAR, value)?),
            None => defaults.poll_interval,
        };

        Ok(WorkerConfig {
            name: lookup(NAME_VAR).unwrap_or(defaults.name),
            address: lookup(HOST_VAR).unwrap_or(defaults.address),
            port,
            poll_interval,
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    let parsed = value.trim().parse();
    parsed.map_err(|_| ConfigError::InvalidNumber { var, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn unset_keys_use_defaults() {
        let config = WorkerConfig::from_lookup(lookup_in(&[])).unwrap();
        assert_eq!(config, WorkerConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = WorkerConfig::from_lookup(lookup_in(&[
            (NAME_VAR, "edge-7"),
            (HOST_VAR, "127.0.0.1"),
            (PORT_VAR, "8080"),
            (POLL_INTERVAL_VAR, "1"),
        ]))
        .unwrap();

        assert_eq!(config.name, "edge-7");
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn rejects_bad_port() {
        let err = WorkerConfig::from_lookup(lookup_in(&[(PORT_VAR, "http")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: PORT_VAR,
                value: "http".to_string()
            }
        );
    }
}
