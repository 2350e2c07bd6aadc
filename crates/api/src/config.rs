use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// MAAP server configuration, read from the environment at startup.
///
/// | Env Var                 | Default                 |
/// |-------------------------|-------------------------|
/// | `HOST`                  | `0.0.0.0`               |
/// | `PORT`                  | `3000`                  |
/// | `CORS_ORIGINS`          | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
/// | `EVENT_BUS_CAPACITY`    | `1024`                  |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins of the MAAP web clients, from the comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long unrecorded notifications may take to drain on shutdown.
    pub shutdown_timeout_secs: u64,
    /// Notifications buffered for the recorder before the oldest are dropped.
    pub event_bus_capacity: usize,
    pub jwt: JwtConfig,
}

/// Read `name`, falling back to `default` when unset.
///
/// # Panics
///
/// When the variable is set but does not parse as `T`.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} has an invalid value '{raw}'")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load configuration; misconfiguration fails startup.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let event_bus_capacity = env_or("EVENT_BUS_CAPACITY", 1024usize);
        assert!(event_bus_capacity > 0, "EVENT_BUS_CAPACITY must be positive");

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            event_bus_capacity,
            jwt: JwtConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_uses_default() {
        assert_eq!(env_or("MAAP_TEST_UNSET_VARIABLE", 42u64), 42);
    }
}
