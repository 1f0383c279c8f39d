//! Companion-MCU bus access.

pub mod transport;

pub use transport::{BusAddress, MAX_TRANSFER_LEN, McuTransport, Message, Response};
