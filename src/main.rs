//! tsmcu daemon: companion MCU supervision on a Linux host.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  /dev/i2c-N ──▶ I2cdev ──▶ McuTransport ──▶ Supervisor    │
//! │  /dev/i2c-N ──▶ I2cdev ──▶ McuTransport ──▶ PowerInput    │
//! │                    (same MCU address)                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `tsmcu [run|halt|reboot] [config.json]`
//!
//! `run` keeps the watchdog fed and logs the input voltage. `halt` and
//! `reboot` are meant as the last step of the host's shutdown sequence:
//! they send the final command and never return.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use linux_embedded_hal::I2cdev;
use log::{info, warn};

use tsmcu::bus::{BusAddress, McuTransport};
use tsmcu::config::McuConfig;
use tsmcu::power::PowerInput;
use tsmcu::watchdog::Supervisor;

const DEFAULT_CONFIG_PATH: &str = "/etc/tsmcu.json";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "run".into());
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());

    // ── 1. Config + logging ───────────────────────────────────
    let config = load_config(&config_path)?;
    init_logging(&config.log_filter)?;
    info!("tsmcu v{} ({})", env!("CARGO_PKG_VERSION"), config_path);

    let address = BusAddress::new(config.bus_address).context("bus_address must be 7-bit")?;

    // ── 2. Watchdog supervisor ────────────────────────────────
    let supervisor = Supervisor::new(
        McuTransport::new(open_bus(&config.i2c_bus)?, address),
        config.watchdog,
    )
    .context("starting watchdog supervisor")?;

    match command.as_str() {
        "run" => {}
        "halt" => supervisor.shutdown_hooks().on_halt_request(),
        "reboot" => supervisor.shutdown_hooks().on_reboot_request(),
        other => bail!("unknown command '{other}' (expected run, halt or reboot)"),
    }

    // ── 3. Power input ────────────────────────────────────────
    let mut psu = PowerInput::new(McuTransport::new(open_bus(&config.i2c_bus)?, address));

    info!("MCU {} on {}: ready", address, config.i2c_bus);

    // ── 4. Poll loop ──────────────────────────────────────────
    let poll = Duration::from_secs(u64::from(config.voltage_poll_secs));
    let mut reported_failures = 0;
    loop {
        match psu.read_voltage_in() {
            Ok(uv) => info!(
                "PSU: input {}.{:03}V",
                uv / 1_000_000,
                (uv / 1_000) % 1_000
            ),
            Err(e) => warn!("PSU: voltage read failed: {e}"),
        }

        let status = supervisor.status();
        if status.feed_failures != reported_failures {
            warn!(
                "Watchdog: {} keep-alive feed(s) failed, last error: {:?}",
                status.feed_failures, status.last_error
            );
            reported_failures = status.feed_failures;
        }

        std::thread::sleep(poll);
    }
}

fn load_config(path: &str) -> Result<McuConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config: McuConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    config.validate().with_context(|| format!("validating {path}"))?;
    Ok(config)
}

fn open_bus(path: &str) -> Result<I2cdev> {
    I2cdev::new(path).with_context(|| format!("opening {path}"))
}

fn init_logging(filter: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .with_context(|| format!("invalid log_filter '{filter}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger init failed: {e}"))
}
