//! Input-voltage reads through the shared transport.

use embedded_hal::i2c::ErrorKind;
use tsmcu::config::WatchdogConfig;
use tsmcu::error::{PowerError, TransportError};
use tsmcu::power::{PowerInput, SupplyProperty, SupplyType};

use super::mock_bus::{BusCall, MCU_ADDR, MockBus, serial, supervisor, transport};

const SAMPLE: [u8; 4] = [0x00, 0x00, 0x34, 0x01];

#[test]
fn reads_four_bytes_and_scales_to_microvolts() {
    let bus = MockBus::with_read_response(&SAMPLE);
    let mut psu = PowerInput::new(transport(&bus));

    assert_eq!(psu.read_voltage_in(), Ok(12_946_274));
    assert_eq!(
        bus.calls(),
        vec![BusCall::Read {
            addr: MCU_ADDR,
            len: 4
        }]
    );
}

#[test]
fn short_read_is_reported() {
    let bus = MockBus::with_read_response(&SAMPLE[..2]);
    let mut psu = PowerInput::new(transport(&bus));
    assert_eq!(psu.read_voltage_in(), Err(TransportError::ShortTransfer));
}

#[test]
fn bus_fault_is_reported() {
    let bus = MockBus::with_read_response(&SAMPLE);
    bus.set_failure(Some(ErrorKind::Bus));
    let mut psu = PowerInput::new(transport(&bus));
    assert_eq!(
        psu.get_property(SupplyProperty::VoltageNow),
        Err(PowerError::Transport(TransportError::BusFault(ErrorKind::Bus)))
    );
}

#[test]
fn only_voltage_now_is_supported() {
    let bus = MockBus::with_read_response(&SAMPLE);
    let mut psu = PowerInput::<MockBus>::new(transport(&bus));

    assert_eq!(psu.get_property(SupplyProperty::VoltageNow), Ok(12_946_274));
    assert_eq!(
        psu.get_property(SupplyProperty::Online),
        Err(PowerError::UnsupportedProperty)
    );
    assert_eq!(PowerInput::<MockBus>::NAME, "ts-psu");
    assert_eq!(PowerInput::<MockBus>::TYPE, SupplyType::Mains);
    assert_eq!(
        PowerInput::<MockBus>::PROPERTIES,
        &[SupplyProperty::VoltageNow]
    );
}

#[test]
fn shares_the_mcu_address_with_the_watchdog() {
    let _serial = serial();
    let bus = MockBus::with_read_response(&SAMPLE);
    let _wdt = supervisor(&bus, WatchdogConfig::default());
    let mut psu = PowerInput::new(transport(&bus));
    psu.read_voltage_in().unwrap();

    let calls = bus.calls();
    assert!(calls.len() >= 2);
    assert!(calls.iter().all(|c| match c {
        BusCall::Write { addr, .. } | BusCall::Read { addr, .. } => *addr == MCU_ADDR,
    }));
}
