//! System halt/reboot hooks.
//!
//! The host's power-off and restart paths call these as their last act.
//! Each takes the supervisor lock, sends its final command and then blocks
//! forever with the lock held: after a shutdown request nothing else may
//! touch the MCU. The reboot command makes the MCU power-cycle the board;
//! the halt command leaves it powered with the timer stopped.
//!
//! A failed final command does not change this; the hardware timer resets
//! the board on its own once it expires.

use std::sync::{Arc, MutexGuard};

use embedded_hal::i2c::I2c;
use log::{error, info};

use super::codec::{REBOOT_VALUE, WatchdogCommand};
use super::state::Mode;
use super::supervisor::Shared;

/// Halt/reboot entry points bound to one supervisor.
pub struct ShutdownHooks<B> {
    shared: Arc<Shared<B>>,
}

impl<B> Clone for ShutdownHooks<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: I2c> ShutdownHooks<B> {
    pub(crate) fn new(shared: Arc<Shared<B>>) -> Self {
        Self { shared }
    }

    /// Restart request: feed zero ticks so the MCU resets the board now.
    ///
    /// Never returns.
    pub fn on_reboot_request(&self) -> ! {
        info!("Watchdog: reboot requested");
        self.terminate(
            Mode::Rebooting,
            WatchdogCommand::ArmDeciseconds(REBOOT_VALUE),
        )
    }

    /// Power-off request: disarm the timer and stay halted.
    ///
    /// Never returns.
    pub fn on_halt_request(&self) -> ! {
        info!("Watchdog: halt requested");
        self.terminate(Mode::Halted, WatchdogCommand::Disarm)
    }

    fn terminate(&self, mode: Mode, cmd: WatchdogCommand) -> ! {
        self.shared.mark_terminal();
        let mut inner = self.shared.lock();
        inner.state.mode = mode;
        if let Err(e) = inner.write(cmd) {
            error!("Watchdog: final {mode:?} command failed ({e}), waiting for hardware timer");
        }
        if cmd == WatchdogCommand::Disarm {
            inner.state.armed = false;
        }
        hold_forever(inner)
    }
}

/// Keep the guard until the hardware takes over.
fn hold_forever<T>(guard: MutexGuard<'_, T>) -> ! {
    let _guard = guard;
    loop {
        std::thread::park();
    }
}
