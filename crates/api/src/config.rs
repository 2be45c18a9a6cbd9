//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DEFAULT_CURRENCY`: currency for new orders and products (default: `"EUR"`)
/// - `NOTIFICATION_BUFFER`: events a live client may lag behind before it is
///   disconnected (default: `32`)
/// - `SSE_KEEP_ALIVE_SECS`: keep-alive interval on event streams (default: `15`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub default_currency: String,
    pub notification_buffer: usize,
    pub sse_keep_alive_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            default_currency: std::env::var("DEFAULT_CURRENCY")
                .unwrap_or(defaults.default_currency),
            notification_buffer: parse_var("NOTIFICATION_BUFFER")
                .unwrap_or(defaults.notification_buffer),
            sse_keep_alive_secs: parse_var("SSE_KEEP_ALIVE_SECS")
                .unwrap_or(defaults.sse_keep_alive_secs),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the keep-alive interval for event streams.
    pub fn sse_keep_alive(&self) -> Duration {
        Duration::from_secs(self.sse_keep_alive_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            default_currency: "EUR".to_string(),
            notification_buffer: domain::notification::DEFAULT_BUFFER,
            sse_keep_alive_secs: 15,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.default_currency, "EUR");
        assert_eq!(config.notification_buffer, 32);
        assert_eq!(config.sse_keep_alive(), Duration::from_secs(15));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_zero_keep_alive_is_clamped() {
        let config = Config {
            sse_keep_alive_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.sse_keep_alive(), Duration::from_secs(1));
    }
}
