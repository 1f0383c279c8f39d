//! Autonomous keep-alive timing, with a 1s default timeout (500ms period).

use std::time::Duration;

use embedded_hal::i2c::ErrorKind;
use tsmcu::config::WatchdogConfig;
use tsmcu::error::TransportError;

use super::mock_bus::{MockBus, arm, fast_config, serial, supervisor};

#[test]
fn period_is_half_the_default_timeout() {
    let _serial = serial();
    let bus = MockBus::new();
    {
        let wdt = supervisor(&bus, fast_config());
        assert_eq!(wdt.keepalive_period(), Duration::from_millis(500));
    }
    let wdt = supervisor(&bus, WatchdogConfig::default());
    assert_eq!(wdt.keepalive_period(), Duration::from_secs(15));
}

#[test]
fn feeds_repeat_while_autonomous() {
    let _serial = serial();
    let bus = MockBus::new();
    let wdt = supervisor(&bus, fast_config());

    // Entry feed plus at least two wakes.
    assert!(bus.wait_for_writes(3, Duration::from_secs(3)));
    assert!(bus.writes().iter().all(|w| *w == arm(10)));
    assert!(wdt.status().feeds_sent >= 3);
}

#[test]
fn no_autonomous_feed_after_open() {
    let _serial = serial();
    let bus = MockBus::new();
    let wdt = supervisor(&bus, fast_config());
    wdt.open().unwrap();
    wdt.stop().unwrap();
    bus.clear();

    std::thread::sleep(Duration::from_millis(1200));

    assert!(bus.calls().is_empty());
    assert!(!wdt.is_armed());
}

#[test]
fn failed_feeds_are_counted_and_feeding_recovers() {
    let _serial = serial();
    let bus = MockBus::new();
    let wdt = supervisor(&bus, fast_config());
    bus.set_failure(Some(ErrorKind::ArbitrationLoss));

    let deadline = std::time::Instant::now() + Duration::from_secs(3);
    while bus.failed() == 0 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    let status = wdt.status();
    assert!(status.feed_failures >= 1);
    assert_eq!(
        status.last_error,
        Some(TransportError::BusFault(ErrorKind::ArbitrationLoss))
    );
    assert!(wdt.keepalive_active());

    bus.set_failure(None);
    bus.clear();
    assert!(bus.wait_for_writes(1, Duration::from_secs(3)));
    assert_eq!(bus.writes()[0], arm(10));
}

#[test]
fn close_resumes_periodic_feeding() {
    let _serial = serial();
    let bus = MockBus::new();
    let wdt = supervisor(&bus, fast_config());
    wdt.open().unwrap();
    bus.clear();

    wdt.close().unwrap();

    // Entry feed from close() plus at least one wake.
    assert!(bus.wait_for_writes(2, Duration::from_secs(3)));
    assert!(bus.writes().iter().all(|w| *w == arm(10)));
}

#[test]
fn drop_stops_feeding() {
    let _serial = serial();
    let bus = MockBus::new();
    drop(supervisor(&bus, fast_config()));
    bus.clear();

    std::thread::sleep(Duration::from_millis(1200));
    assert!(bus.calls().is_empty());
}
