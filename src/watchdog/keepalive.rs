//! Background keep-alive task.
//!
//! While the supervisor is in [`Mode::AutonomousKeepAlive`] a dedicated
//! thread re-arms the hardware timer every `default_timeout / 2`.
//!
//! Cancellation drops the stop channel and joins the thread. Once
//! [`KeepAlive::cancel`] returns, no further autonomous feed can reach the
//! bus.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};

use super::state::Mode;
use super::supervisor::Shared;

/// Handle to a running keep-alive thread.
pub(crate) struct KeepAlive {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl KeepAlive {
    /// Spawn the feeding thread. The caller has already sent the entry feed.
    pub(crate) fn spawn<B>(
        shared: Arc<Shared<B>>,
        deciseconds: u16,
        period: Duration,
    ) -> std::io::Result<Self>
    where
        B: I2c + Send + 'static,
    {
        let (stop, stop_rx) = channel::bounded(0);
        let handle = std::thread::Builder::new()
            .name("wdt-keepalive".into())
            .spawn(move || run(&shared, &stop_rx, deciseconds, period))?;
        debug!("Watchdog: keep-alive every {}ms", period.as_millis());
        Ok(Self { stop, handle })
    }

    /// Stop the thread and wait for it to exit.
    ///
    /// Must not be called with the supervisor lock held: the thread may be
    /// waiting for it to finish a feed.
    pub(crate) fn cancel(self) {
        drop(self.stop);
        if self.handle.join().is_err() {
            warn!("Watchdog: keep-alive thread panicked");
        }
        debug!("Watchdog: keep-alive cancelled");
    }
}

fn run<B: I2c>(shared: &Shared<B>, stop: &Receiver<()>, deciseconds: u16, period: Duration) {
    loop {
        match stop.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        let mut inner = shared.lock();
        if inner.state.mode != Mode::AutonomousKeepAlive {
            // open() flips the mode before cancelling us.
            break;
        }
        debug!("Watchdog: keep-alive wake");
        inner.feed_autonomous(deciseconds);
    }
    info!("Watchdog: keep-alive stopped");
}
