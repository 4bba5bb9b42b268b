//! Configuration Module
//!
//! Runtime settings resolved from the environment.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Base URL used when `ACTIVITY_MONITOR_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Request timeout used when `ACTIVITY_MONITOR_TIMEOUT_SECS` is absent or invalid.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const API_URL_VAR: &str = "ACTIVITY_MONITOR_API_URL";
const DATA_DIR_VAR: &str = "ACTIVITY_MONITOR_DATA_DIR";
const TIMEOUT_VAR: &str = "ACTIVITY_MONITOR_TIMEOUT_SECS";

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Config {
    /// Build a configuration from explicit values.
    pub fn new(api_base_url: &str, data_dir: PathBuf) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            data_dir,
        }
    }

    /// Resolve configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let api_base_url =
            std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let data_dir = std::env::var_os(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let request_timeout = match std::env::var(TIMEOUT_VAR) {
            Ok(raw) => parse_timeout(&raw).unwrap_or_else(|| {
                warn!("Ignoring invalid {}={:?}", TIMEOUT_VAR, raw);
                DEFAULT_TIMEOUT
            }),
            Err(_) => DEFAULT_TIMEOUT,
        };

        Self {
            request_timeout,
            ..Self::new(&api_base_url, data_dir)
        }
    }

    /// Directory holding rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ActivityMonitor")
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = Config::new("https://api.example.com/v1/", PathBuf::from("/tmp/x"));
        assert_eq!(config.api_base_url, "https://api.example.com/v1");
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/x/logs"));
    }

    #[test]
    fn timeout_parsing_rejects_garbage_and_zero() {
        assert_eq!(parse_timeout("15"), Some(Duration::from_secs(15)));
        assert_eq!(parse_timeout(" 5 "), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("0"), None);
        assert_eq!(parse_timeout("soon"), None);
    }
}
