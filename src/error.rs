//! Unified error types for the companion-MCU supervisor.
//!
//! Every subsystem owns a small `Copy` error enum; the top-level [`Error`]
//! wraps them so callers that drive several subsystems (the daemon) can
//! propagate a single type.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bus transaction with the MCU failed.
    Transport(TransportError),
    /// A watchdog operation was rejected or failed.
    Watchdog(WatchdogError),
    /// A power-input query failed.
    Power(PowerError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Watchdog(e) => write!(f, "watchdog: {e}"),
            Self::Power(e) => write!(f, "power: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failure of a single MCU bus transaction.
///
/// Neither variant poisons the transport; the next request is attempted
/// normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The bus acknowledged fewer bytes than were sent or requested.
    ShortTransfer,
    /// Lower-level bus failure (arbitration loss, bus error, adapter error).
    BusFault(ErrorKind),
    /// The request does not fit the fixed transfer buffer. Nothing was sent.
    Oversize { len: usize },
}

impl TransportError {
    /// Classify an embedded-hal bus error.
    pub fn from_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) | ErrorKind::Overrun => Self::ShortTransfer,
            other => Self::BusFault(other),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortTransfer => write!(f, "short transfer"),
            Self::BusFault(kind) => write!(f, "bus fault ({kind})"),
            Self::Oversize { len } => write!(f, "request of {len} bytes exceeds transfer buffer"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Watchdog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogError {
    /// Requested timeout (seconds) is outside `1..=6553`.
    InvalidTimeout(u32),
    /// A supervisor already owns the hardware timer in this process.
    AlreadyExists,
    /// A user session is already open.
    Busy,
    /// `close()` without a matching `open()`.
    NotOpen,
    /// The keep-alive thread could not be started.
    KeepAliveUnavailable,
    /// The command could not be delivered to the MCU.
    Transport(TransportError),
}

impl fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeout(secs) => write!(f, "invalid timeout {secs}s"),
            Self::AlreadyExists => write!(f, "only one watchdog supervisor supported"),
            Self::Busy => write!(f, "watchdog already open"),
            Self::NotOpen => write!(f, "watchdog not open"),
            Self::KeepAliveUnavailable => write!(f, "keep-alive thread unavailable"),
            Self::Transport(e) => write!(f, "write error: {e}"),
        }
    }
}

impl std::error::Error for WatchdogError {}

impl From<TransportError> for WatchdogError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<WatchdogError> for Error {
    fn from(e: WatchdogError) -> Self {
        Self::Watchdog(e)
    }
}

// ---------------------------------------------------------------------------
// Power-input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerError {
    /// The supply only reports `VoltageNow`.
    UnsupportedProperty,
    /// The voltage read failed on the bus.
    Transport(TransportError),
}

impl fmt::Display for PowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedProperty => write!(f, "unsupported property"),
            Self::Transport(e) => write!(f, "read error: {e}"),
        }
    }
}

impl std::error::Error for PowerError {}

impl From<TransportError> for PowerError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<PowerError> for Error {
    fn from(e: PowerError) -> Self {
        Self::Power(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Rejected configuration. Values are never silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation; the message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
