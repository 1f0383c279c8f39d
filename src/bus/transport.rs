//! MCU transport: one addressed request/response at a time.
//!
//! Every function of the companion MCU (watchdog, input voltage) talks to it
//! through this type. The transport stamps the configured [`BusAddress`] on
//! each message, performs exactly one bus transaction and reports the
//! outcome. It never retries, reorders or queues; recovery policy belongs
//! to the caller.
//!
//! ```text
//!  Supervisor ──┐                       ┌────────────┐
//!               ├─▶ McuTransport ──▶ I2c │ MCU @ addr │
//!  PowerInput ──┘   (addr stamped)      └────────────┘
//! ```
//!
//! The bus adapter is any `embedded_hal::i2c::I2c` implementation:
//! `linux_embedded_hal::I2cdev` on a host, a recording mock in tests.

use core::fmt;

use embedded_hal::i2c::{Error as _, I2c, Operation};
use heapless::Vec;
use log::debug;

use crate::error::TransportError;

/// Largest payload carried by a single MCU message.
pub const MAX_TRANSFER_LEN: usize = 8;

/// Bytes returned by a read request.
pub type Response = Vec<u8, MAX_TRANSFER_LEN>;

/// 7-bit bus address of the MCU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusAddress(u8);

impl BusAddress {
    /// Returns `None` for values that do not fit in 7 bits.
    pub const fn new(addr: u8) -> Option<Self> {
        if addr <= 0x7f { Some(Self(addr)) } else { None }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// A single request to the MCU. The address is applied by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    /// Write `payload` to the MCU.
    Write(&'a [u8]),
    /// Read exactly `len` bytes from the MCU.
    Read { len: usize },
}

/// Owns the bus adapter and the MCU address.
pub struct McuTransport<B> {
    bus: B,
    address: BusAddress,
}

impl<B: I2c> McuTransport<B> {
    pub fn new(bus: B, address: BusAddress) -> Self {
        debug!("Initialising MCU transport at {address}");
        Self { bus, address }
    }

    pub fn address(&self) -> BusAddress {
        self.address
    }

    /// Perform one transaction with the MCU.
    ///
    /// Writes return an empty response. Reads return exactly `len` bytes or
    /// fail; a partial read is never decoded by callers.
    pub fn send_receive(&mut self, request: Message<'_>) -> Result<Response, TransportError> {
        let mut response = Response::new();
        let result = match request {
            Message::Write(payload) => {
                if payload.len() > MAX_TRANSFER_LEN {
                    return Err(TransportError::Oversize { len: payload.len() });
                }
                self.bus
                    .transaction(self.address.get(), &mut [Operation::Write(payload)])
            }
            Message::Read { len } => {
                if response.resize_default(len).is_err() {
                    return Err(TransportError::Oversize { len });
                }
                self.bus
                    .transaction(self.address.get(), &mut [Operation::Read(&mut response)])
            }
        };

        match result {
            Ok(()) => Ok(response),
            Err(e) => {
                let err = TransportError::from_kind(e.kind());
                debug!("MCU {}: transfer error: {err}", self.address);
                Err(err)
            }
        }
    }

    /// Consume the transport and hand back the bus adapter.
    pub fn release(self) -> B {
        self.bus
    }
}
