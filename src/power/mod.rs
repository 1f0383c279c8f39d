//! Input-voltage sensing through the companion MCU.
//!
//! The MCU answers a 4-byte read. Bytes 0 and 1 are framing padding; bytes
//! 2 and 3 hold the 10-bit ADC count, little-endian. The input passes a
//! 5.82% divider into a 2.5V reference ADC, which gives 42033.36 µV per
//! count.

use embedded_hal::i2c::I2c;
use log::{debug, error};

use crate::bus::{McuTransport, Message};
use crate::error::{PowerError, TransportError};

/// Bytes in a voltage response.
pub const RESPONSE_LEN: usize = 4;

/// Scale numerator; the divisor is [`SCALE_DIV`].
const SCALE_MUL: u64 = 4_203_336;
const SCALE_DIV: u64 = 100;

/// Decode a raw voltage response into microvolts.
///
/// Carried in 64 bits: the full 16-bit count times the scale does not fit
/// in 32.
pub fn decode_voltage(raw: &[u8; RESPONSE_LEN]) -> u32 {
    let count = u64::from(u16::from_le_bytes([raw[2], raw[3]]));
    (count * SCALE_MUL / SCALE_DIV) as u32
}

/// Kind of supply, as reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyType {
    Mains,
}

/// Properties a consumer may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyProperty {
    VoltageNow,
    CurrentNow,
    Online,
    Temperature,
}

/// Voltage-sense power input on the MCU.
pub struct PowerInput<B> {
    transport: McuTransport<B>,
}

impl<B: I2c> PowerInput<B> {
    pub const NAME: &'static str = "ts-psu";
    pub const TYPE: SupplyType = SupplyType::Mains;
    pub const PROPERTIES: &'static [SupplyProperty] = &[SupplyProperty::VoltageNow];

    pub fn new(transport: McuTransport<B>) -> Self {
        Self { transport }
    }

    /// Read the input voltage in microvolts.
    pub fn read_voltage_in(&mut self) -> Result<u32, TransportError> {
        let raw = self
            .transport
            .send_receive(Message::Read { len: RESPONSE_LEN })
            .inspect_err(|e| error!("PSU: read error: {e}"))?;
        let raw: [u8; RESPONSE_LEN] = raw
            .as_slice()
            .try_into()
            .map_err(|_| TransportError::ShortTransfer)?;

        let microvolts = decode_voltage(&raw);
        debug!("PSU: raw={:02x?} -> {microvolts}uV", raw);
        Ok(microvolts)
    }

    /// Property query; only `VoltageNow` is supported.
    pub fn get_property(&mut self, prop: SupplyProperty) -> Result<i64, PowerError> {
        match prop {
            SupplyProperty::VoltageNow => Ok(i64::from(self.read_voltage_in()?)),
            _ => Err(PowerError::UnsupportedProperty),
        }
    }
}
