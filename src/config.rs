use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub sweep_interval: Duration,
    pub idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let sweep_interval = duration_from_env("SWEEP_INTERVAL_SECS", 300)?;
        let idle_timeout = duration_from_env("IDLE_TIMEOUT_SECS", 1800)?;

        Ok(Self {
            port,
            sweep_interval,
            idle_timeout,
        })
    }

    pub fn test_defaults() -> Self {
        Self {
            port: 0,
            sweep_interval: Duration::from_millis(50),
            idle_timeout: Duration::from_secs(1800),
        }
    }
}

fn duration_from_env(key: &str, default_secs: u64) -> Result<Duration, AppError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| AppError::Config(format!("{key} must be an integer number of seconds"))),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_suitable_for_tests() {
        let cfg = Config::test_defaults();
        assert_eq!(cfg.port, 0);
        assert!(cfg.sweep_interval < Duration::from_secs(1));
    }
}
