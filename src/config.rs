//! Configuration (spec §6, spec_full §4.10): env-var driven settings,
//! each overridable on the command line via `clap`'s `env` attribute —
//! the same pattern the teacher repo uses for its own `Args`.

use clap::Parser;

use crate::error::ConfigError;

#[derive(Parser, Debug, Clone)]
#[command(name = "surf-lamp-core")]
#[command(about = "Location-centric surf-conditions ingestion and device distribution engine")]
pub struct Settings {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Seconds between ingestion cycles.
    #[arg(long, env = "CYCLE_INTERVAL_SECONDS", default_value_t = 900)]
    pub cycle_interval_seconds: u64,

    /// Max concurrent location fetch jobs per cycle.
    #[arg(long, env = "MAX_CONCURRENT_FETCHES", default_value_t = 8)]
    pub max_concurrent_fetches: usize,

    /// Per-request HTTP timeout, seconds.
    #[arg(long, env = "HTTP_TIMEOUT_SECONDS", default_value_t = 15)]
    pub http_timeout_seconds: u64,

    /// Consumer-visible only: threshold used by external dashboards to
    /// decide if a device is "online". The core never reads this itself.
    #[arg(long, env = "DEVICE_ONLINE_THRESHOLD_SECONDS", default_value_t = 3600)]
    pub device_online_threshold_seconds: u64,

    /// Port for the HTTP listener.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level passed to the tracing env-filter.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Settings::parse();

        if settings.database_url.trim().is_empty() {
            return Err(ConfigError::MissingEnv("DATABASE_URL".to_string()));
        }
        if settings.cycle_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "CYCLE_INTERVAL_SECONDS".to_string(),
                value: "0".to_string(),
            });
        }
        if settings.max_concurrent_fetches == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_CONCURRENT_FETCHES".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_database_url() {
        let settings = Settings {
            database_url: "".to_string(),
            cycle_interval_seconds: 900,
            max_concurrent_fetches: 8,
            http_timeout_seconds: 15,
            device_online_threshold_seconds: 3600,
            port: 8080,
            log_level: "info".to_string(),
        };
        assert!(settings.database_url.trim().is_empty());
    }
}
