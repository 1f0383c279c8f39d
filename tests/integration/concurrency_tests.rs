//! Interleaving of user operations with the keep-alive thread.

use std::time::Duration;

use tsmcu::config::WatchdogConfig;

use super::mock_bus::{DISARM, MockBus, arm, fast_config, serial, supervisor};

#[test]
fn user_session_is_never_interleaved_with_autonomous_feeds() {
    let _serial = serial();
    let bus = MockBus::new();
    let wdt = supervisor(&bus, fast_config());

    for cycle in 0..4u64 {
        // Let the keep-alive thread get close to or past a wake.
        std::thread::sleep(Duration::from_millis(300 + cycle * 70));
        wdt.open().unwrap();
        wdt.set_timeout(7).unwrap();
        wdt.start().unwrap();
        std::thread::sleep(Duration::from_millis(600));
        wdt.stop().unwrap();
        assert_eq!(bus.writes().last(), Some(&DISARM.to_vec()));
        wdt.close().unwrap();
    }

    let writes = bus.writes();
    let legal = [arm(10), arm(70), DISARM.to_vec()];
    assert!(writes.iter().all(|w| legal.contains(w)), "{writes:?}");
    for (i, w) in writes.iter().enumerate() {
        if *w == DISARM.to_vec() {
            assert_eq!(writes[i - 1], arm(70), "frame before disarm #{i}");
        }
    }
    assert_eq!(writes.iter().filter(|w| **w == DISARM.to_vec()).count(), 4);
}

#[test]
fn concurrent_start_stop_keeps_state_consistent() {
    let _serial = serial();
    let bus = MockBus::new();
    let wdt = supervisor(&bus, WatchdogConfig::default());
    wdt.open().unwrap();
    bus.clear();

    std::thread::scope(|s| {
        for t in 0..4 {
            let wdt = &wdt;
            s.spawn(move || {
                for i in 0..50 {
                    if (i + t) % 2 == 0 {
                        wdt.start().unwrap();
                    } else {
                        wdt.stop().unwrap();
                    }
                }
            });
        }
    });

    let writes = bus.writes();
    assert_eq!(writes.len(), 200);
    assert!(
        writes
            .iter()
            .all(|w| *w == arm(300) || *w == DISARM.to_vec())
    );
    let last_was_arm = writes.last() == Some(&arm(300));
    assert_eq!(wdt.is_armed(), last_was_arm);
}
