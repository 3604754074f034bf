//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1000;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Interval between background expiry sweeps, None = no background sweep
    pub sweep_interval: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL_MS` - Expiry sweep frequency in milliseconds
    ///   (default: 1000, `0` disables the background sweep)
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);
        let sweep_interval_ms = env::var("SWEEP_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_MS);

        Self {
            server_port,
            sweep_interval: sweep_interval_from_ms(sweep_interval_ms),
        }
    }
}

fn sweep_interval_from_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            sweep_interval: sweep_interval_from_ms(DEFAULT_SWEEP_INTERVAL_MS),
        }
    }
}
