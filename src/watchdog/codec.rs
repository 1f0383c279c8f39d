//! Watchdog command codec.
//!
//! Wire format (write only):
//! ```text
//! ┌────────┬───────────┬───────────┐
//! │ 0x00   │ value MSB │ value LSB │
//! └────────┴───────────┴───────────┘
//! ```
//!
//! `value` is a feed length in deciseconds, except for five special values
//! that the MCU recognises only with a zero MSB:
//!
//! | value | meaning                               |
//! |-------|---------------------------------------|
//! | 0     | 200ms, used as "reboot now"           |
//! | 1     | 2s                                    |
//! | 2     | 4s                                    |
//! | 3     | 10s, used as disarm                   |
//! | 4     | disable watchdog                      |
//!
//! Disarm being value 3 is inherited from the MCU firmware contract. The
//! firmware may treat it as a plain 10s preset; the drivers have always
//! sent it to stop the timer, so it is kept as-is.

/// Size of every encoded watchdog command.
pub const FRAME_LEN: usize = 3;

/// Wire value sent by the halt path and by `stop()`.
pub const DISARM_VALUE: u16 = 3;

/// Wire value sent by the reboot path.
pub const REBOOT_VALUE: u16 = 0;

/// Special low-byte values understood by the MCU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PresetLevel {
    /// 200ms, effectively "reset now".
    Ms200 = 0,
    Secs2 = 1,
    Secs4 = 2,
    Secs10 = 3,
    /// Stop the hardware timer entirely.
    Disable = 4,
}

impl PresetLevel {
    /// Every preset, indexed by its wire value.
    pub const TABLE: [PresetLevel; 5] = [
        Self::Ms200,
        Self::Secs2,
        Self::Secs4,
        Self::Secs10,
        Self::Disable,
    ];

    pub const fn wire_value(self) -> u8 {
        self as u8
    }

    /// Nominal timeout in milliseconds; `None` for `Disable`.
    pub const fn timeout_ms(self) -> Option<u32> {
        match self {
            Self::Ms200 => Some(200),
            Self::Secs2 => Some(2_000),
            Self::Secs4 => Some(4_000),
            Self::Secs10 => Some(10_000),
            Self::Disable => None,
        }
    }

    /// A preset is only recognised when the whole 16-bit value is `0..=4`.
    pub fn from_value(value: u16) -> Option<Self> {
        Self::TABLE.get(usize::from(value)).copied()
    }
}

/// A typed watchdog command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogCommand {
    /// Stop the timer (wire value 3).
    Disarm,
    /// Feed for the given number of deciseconds.
    ArmDeciseconds(u16),
    ArmPreset(PresetLevel),
}

impl WatchdogCommand {
    /// The 16-bit value carried in bytes 1..=2.
    pub const fn wire_value(self) -> u16 {
        match self {
            Self::Disarm => DISARM_VALUE,
            Self::ArmDeciseconds(ds) => ds,
            Self::ArmPreset(level) => level.wire_value() as u16,
        }
    }
}

/// Encode a command into its 3-byte frame.
///
/// `ArmDeciseconds` values `0..=4` collide with the presets on the wire;
/// callers stay within `5..=65530` for plain feeds.
pub const fn encode(cmd: WatchdogCommand) -> [u8; FRAME_LEN] {
    let [msb, lsb] = cmd.wire_value().to_be_bytes();
    [0, msb, lsb]
}

/// How the MCU interprets a raw 16-bit wire value.
pub fn classify(value: u16) -> WatchdogCommand {
    match PresetLevel::from_value(value) {
        Some(level) => WatchdogCommand::ArmPreset(level),
        None => WatchdogCommand::ArmDeciseconds(value),
    }
}

/// Decode a frame observed on the wire.
///
/// Value 3 decodes as [`WatchdogCommand::Disarm`], the meaning every sender
/// in this crate gives it. Returns `None` unless `frame` is exactly three
/// bytes with a zero lead byte.
pub fn decode(frame: &[u8]) -> Option<WatchdogCommand> {
    let [lead, msb, lsb] = *<&[u8; FRAME_LEN]>::try_from(frame).ok()?;
    if lead != 0 {
        return None;
    }
    let value = u16::from_be_bytes([msb, lsb]);
    if value == DISARM_VALUE {
        return Some(WatchdogCommand::Disarm);
    }
    Some(classify(value))
}
