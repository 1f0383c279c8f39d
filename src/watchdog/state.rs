//! Watchdog bookkeeping shared by the supervisor and its keep-alive task.

use crate::error::TransportError;

/// Who is responsible for feeding the hardware timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The supervisor feeds the timer in the background (initial mode).
    AutonomousKeepAlive,
    /// A user-level consumer opened the watchdog and feeds it explicitly.
    UserControlled,
    /// Halt requested: disarm sent, caller blocked forever.
    Halted,
    /// Reboot requested: zero-length feed sent, caller blocked forever.
    Rebooting,
}

impl Mode {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Halted | Self::Rebooting)
    }
}

/// Live watchdog state. One instance exists per supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogState {
    /// User timeout in seconds; sent on the next `start()`.
    pub timeout_secs: u16,
    pub mode: Mode,
    pub armed: bool,
    /// A user session is open (between `open()` and `close()`).
    pub session_open: bool,
    /// Latched: closing a session never resumes autonomous feeding.
    pub no_way_out: bool,
    /// Commands delivered to the MCU.
    pub feeds_sent: u32,
    /// Autonomous feeds that failed on the bus.
    pub feed_failures: u32,
    pub last_error: Option<TransportError>,
}

impl WatchdogState {
    pub fn new(timeout_secs: u16, no_way_out: bool) -> Self {
        Self {
            timeout_secs,
            mode: Mode::AutonomousKeepAlive,
            armed: true,
            session_open: false,
            no_way_out,
            feeds_sent: 0,
            feed_failures: 0,
            last_error: None,
        }
    }

    /// Configured timeout as sent on the wire.
    pub fn configured_timeout_deciseconds(&self) -> u16 {
        self.timeout_secs * 10
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Capability flags, bit-compatible with the Linux `WDIOF_*` options.
pub mod options {
    pub const SETTIMEOUT: u32 = 0x0080;
    pub const MAGICCLOSE: u32 = 0x0100;
    pub const KEEPALIVEPING: u32 = 0x8000;
}

/// Static description of the watchdog, as reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogInfo {
    pub identity: &'static str,
    pub options: u32,
    pub min_timeout_secs: u16,
    pub max_timeout_secs: u16,
}

pub const WATCHDOG_INFO: WatchdogInfo = WatchdogInfo {
    identity: "Technologic Micro Watchdog",
    options: options::SETTIMEOUT | options::KEEPALIVEPING | options::MAGICCLOSE,
    min_timeout_secs: crate::config::MIN_TIMEOUT_SECS,
    max_timeout_secs: crate::config::MAX_TIMEOUT_SECS,
};
