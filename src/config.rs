//! Supervisor configuration parameters.
//!
//! [`WatchdogConfig`] is what the supervisor itself consumes. [`McuConfig`]
//! is the daemon's file-level configuration that wires the bus and the
//! two MCU functions together.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shortest timeout the MCU accepts, in seconds.
pub const MIN_TIMEOUT_SECS: u16 = 1;
/// Longest timeout the MCU accepts, in seconds (65530 deciseconds).
pub const MAX_TIMEOUT_SECS: u16 = 6553;
/// Timeout used for autonomous feeding and as the initial user timeout.
pub const DEFAULT_TIMEOUT_SECS: u16 = 30;

/// Watchdog supervisor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Timeout for autonomous keep-alive feeds (seconds, 1..=6553).
    pub default_timeout_seconds: u16,
    /// Once set, closing the user session never resumes autonomous feeding.
    pub no_way_out: bool,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            no_way_out: false,
        }
    }
}

impl WatchdogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !timeout_in_range(u32::from(self.default_timeout_seconds)) {
            return Err(ConfigError::ValidationFailed(
                "default_timeout_seconds must be within 1..=6553",
            ));
        }
        Ok(())
    }
}

/// True when `secs` is a timeout the MCU can represent.
pub fn timeout_in_range(secs: u32) -> bool {
    (u32::from(MIN_TIMEOUT_SECS)..=u32::from(MAX_TIMEOUT_SECS)).contains(&secs)
}

/// Daemon configuration, loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McuConfig {
    /// i2c-dev character device the MCU hangs off.
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: String,
    /// 7-bit address of the MCU. Board specific, so there is no default.
    pub bus_address: u8,
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    /// Input voltage poll interval (seconds).
    #[serde(default = "default_voltage_poll_secs")]
    pub voltage_poll_secs: u32,
    /// Log filter directive, e.g. `"info"` or `"tsmcu=debug"`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_i2c_bus() -> String {
    "/dev/i2c-0".into()
}

fn default_voltage_poll_secs() -> u32 {
    60
}

fn default_log_filter() -> String {
    "info".into()
}

impl McuConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus_address > 0x7f {
            return Err(ConfigError::ValidationFailed(
                "bus_address must be a 7-bit address",
            ));
        }
        if self.voltage_poll_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "voltage_poll_secs must be non-zero",
            ));
        }
        self.watchdog.validate()
    }
}
