//! Watchdog supervisor: owner of the MCU's hardware timer.
//!
//! ```text
//!              new()                   open()
//!   ──────▶ AutonomousKeepAlive ─────────────▶ UserControlled
//!              ▲   (background feed)  ◀────────   start/stop/set_timeout
//!              │                       close()
//!              │                      (unless no-way-out)
//!              │
//!   on_halt_request ──▶ Halted        on_reboot_request ──▶ Rebooting
//!   (from any mode, never returns)    (from any mode, never returns)
//! ```
//!
//! All state and every wire command go through one mutex, so a state
//! change and the command it implies are observed together. The keep-alive
//! thread takes the same lock for each feed and gives up as soon as it sees
//! a mode other than [`Mode::AutonomousKeepAlive`].
//!
//! Only one supervisor may exist per process; the MCU has a single timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use embedded_hal::i2c::I2c;
use log::{debug, error, info, warn};

use super::codec::{self, WatchdogCommand};
use super::hooks::ShutdownHooks;
use super::keepalive::KeepAlive;
use super::state::{Mode, WATCHDOG_INFO, WatchdogInfo, WatchdogState};
use crate::bus::{McuTransport, Message};
use crate::config::{WatchdogConfig, timeout_in_range};
use crate::error::{TransportError, WatchdogError};

/// Set while a supervisor owns the hardware timer.
static CLAIMED: AtomicBool = AtomicBool::new(false);

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub(crate) struct Inner<B> {
    transport: McuTransport<B>,
    pub(crate) state: WatchdogState,
}

impl<B: I2c> Inner<B> {
    /// Encode and send one command. Failures are logged and returned.
    pub(crate) fn write(&mut self, cmd: WatchdogCommand) -> Result<(), TransportError> {
        let frame = codec::encode(cmd);
        debug!("Writing 0x00, 0x{:02x}, 0x{:02x}", frame[1], frame[2]);

        match self.transport.send_receive(Message::Write(&frame)) {
            Ok(_) => {
                self.state.feeds_sent = self.state.feeds_sent.wrapping_add(1);
                Ok(())
            }
            Err(e) => {
                error!("Watchdog: write error: {e}");
                self.state.last_error = Some(e);
                Err(e)
            }
        }
    }

    /// Feed on behalf of the keep-alive path. Failure is recorded only; the
    /// next wake tries again.
    pub(crate) fn feed_autonomous(&mut self, deciseconds: u16) {
        if let Err(e) = self.write(WatchdogCommand::ArmDeciseconds(deciseconds)) {
            self.state.feed_failures = self.state.feed_failures.wrapping_add(1);
            warn!("Watchdog: keep-alive feed failed ({e}), retrying at next wake");
        }
    }
}

pub(crate) struct Shared<B> {
    inner: Mutex<Inner<B>>,
    /// Set by the halt/reboot hooks before they take the lock for good.
    terminal: AtomicBool,
}

impl<B> Shared<B> {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn mark_terminal(&self) {
        self.terminal.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.terminal.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// The watchdog supervisor.
///
/// All methods take `&self`; wrap in an `Arc` to share between the user
/// session and other callers.
pub struct Supervisor<B: I2c + Send + 'static> {
    shared: Arc<Shared<B>>,
    /// Present exactly while the mode is `AutonomousKeepAlive`.
    keepalive: Mutex<Option<KeepAlive>>,
    default_deciseconds: u16,
    period: Duration,
    hooks: ShutdownHooks<B>,
}

impl<B: I2c + Send + 'static> Supervisor<B> {
    /// Take ownership of the hardware timer and start feeding it.
    ///
    /// Sends the first keep-alive feed before returning. A failed first
    /// feed is recorded in [`status`](Self::status) but does not fail
    /// construction; the keep-alive thread retries.
    pub fn new(transport: McuTransport<B>, config: WatchdogConfig) -> Result<Self, WatchdogError> {
        if config.validate().is_err() {
            return Err(WatchdogError::InvalidTimeout(u32::from(
                config.default_timeout_seconds,
            )));
        }
        if CLAIMED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            error!("Watchdog: only one instance supported");
            return Err(WatchdogError::AlreadyExists);
        }

        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                transport,
                state: WatchdogState::new(config.default_timeout_seconds, config.no_way_out),
            }),
            terminal: AtomicBool::new(false),
        });
        let supervisor = Self {
            hooks: ShutdownHooks::new(Arc::clone(&shared)),
            shared,
            keepalive: Mutex::new(None),
            default_deciseconds: config.default_timeout_seconds * 10,
            period: Duration::from_millis(u64::from(config.default_timeout_seconds) * 500),
        };

        // On failure `supervisor` drops here and releases the claim.
        {
            let mut inner = supervisor.shared.lock();
            supervisor.enter_keepalive(&mut inner)?;
        }

        info!(
            "Watchdog: {} ready, default timeout {}s{}",
            WATCHDOG_INFO.identity,
            config.default_timeout_seconds,
            if config.no_way_out { ", nowayout" } else { "" }
        );
        Ok(supervisor)
    }

    // ── User session ───────────────────────────────────────────

    /// Hand the timer to a user-level consumer.
    ///
    /// The keep-alive thread is stopped and joined before the arm command
    /// is sent, so no autonomous feed can follow this call. If the arm
    /// command fails, autonomous feeding resumes and the error is returned.
    pub fn open(&self) -> Result<(), WatchdogError> {
        {
            let mut inner = self.shared.lock();
            if inner.state.session_open {
                return Err(WatchdogError::Busy);
            }
            inner.state.session_open = true;
            inner.state.mode = Mode::UserControlled;
        }

        self.cancel_keepalive();

        let mut inner = self.shared.lock();
        let deciseconds = inner.state.configured_timeout_deciseconds();
        info!("Watchdog: opened, feeding for {} seconds", inner.state.timeout_secs);
        match inner.write(WatchdogCommand::ArmDeciseconds(deciseconds)) {
            Ok(()) => {
                inner.state.armed = true;
                Ok(())
            }
            Err(e) => {
                inner.state.session_open = false;
                self.enter_keepalive(&mut inner)?;
                Err(e.into())
            }
        }
    }

    /// End the user session.
    ///
    /// Without no-way-out the supervisor resumes background feeding at the
    /// default timeout. With it, the timer is left as the user left it and
    /// software never feeds it again.
    pub fn close(&self) -> Result<(), WatchdogError> {
        let mut inner = self.shared.lock();
        if !inner.state.session_open {
            return Err(WatchdogError::NotOpen);
        }
        inner.state.session_open = false;

        if inner.state.no_way_out {
            warn!(
                "Watchdog: closed with nowayout, timer {} and no longer fed",
                if inner.state.armed { "left running" } else { "left stopped" }
            );
            return Ok(());
        }

        info!("Watchdog: closed, resuming keep-alive");
        self.enter_keepalive(&mut inner)
    }

    /// Arm the timer for the configured timeout. Idempotent.
    pub fn start(&self) -> Result<(), WatchdogError> {
        let mut inner = self.shared.lock();
        if !Self::user_controlled(&inner, "start") {
            return Ok(());
        }
        let deciseconds = inner.state.configured_timeout_deciseconds();
        debug!("Watchdog: feeding for {} seconds", inner.state.timeout_secs);
        inner.write(WatchdogCommand::ArmDeciseconds(deciseconds))?;
        inner.state.armed = true;
        Ok(())
    }

    /// Keep-alive ping from the user. The MCU has no separate ping
    /// command; re-arming is the ping.
    pub fn ping(&self) -> Result<(), WatchdogError> {
        self.start()
    }

    /// Stop the timer (sends the disarm value 3).
    pub fn stop(&self) -> Result<(), WatchdogError> {
        let mut inner = self.shared.lock();
        if !Self::user_controlled(&inner, "stop") {
            return Ok(());
        }
        inner.write(WatchdogCommand::Disarm)?;
        inner.state.armed = false;
        Ok(())
    }

    /// Store a new timeout (seconds, `1..=6553`). Takes effect on the next
    /// [`start`](Self::start); nothing is sent.
    pub fn set_timeout(&self, seconds: u32) -> Result<(), WatchdogError> {
        if !timeout_in_range(seconds) {
            return Err(WatchdogError::InvalidTimeout(seconds));
        }
        let mut inner = self.shared.lock();
        if !Self::user_controlled(&inner, "set_timeout") {
            return Ok(());
        }
        inner.state.timeout_secs = seconds as u16;
        debug!("Watchdog: timeout set to {seconds}s");
        Ok(())
    }

    /// Latch the no-way-out policy. It cannot be cleared again.
    pub fn enable_no_way_out(&self) {
        let mut inner = self.shared.lock();
        if !inner.state.no_way_out {
            info!("Watchdog: nowayout enabled");
        }
        inner.state.no_way_out = true;
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn info(&self) -> WatchdogInfo {
        WATCHDOG_INFO
    }

    /// Copy of the live state.
    pub fn status(&self) -> WatchdogState {
        self.shared.lock().state
    }

    pub fn mode(&self) -> Mode {
        self.shared.lock().state.mode
    }

    pub fn is_armed(&self) -> bool {
        self.shared.lock().state.armed
    }

    /// Configured user timeout in seconds.
    pub fn timeout(&self) -> u16 {
        self.shared.lock().state.timeout_secs
    }

    pub fn min_timeout(&self) -> u16 {
        WATCHDOG_INFO.min_timeout_secs
    }

    pub fn max_timeout(&self) -> u16 {
        WATCHDOG_INFO.max_timeout_secs
    }

    /// Interval between autonomous feeds.
    pub fn keepalive_period(&self) -> Duration {
        self.period
    }

    /// True while the background feeding thread exists.
    pub fn keepalive_active(&self) -> bool {
        self.keepalive
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// True once a halt or reboot hook has run. Does not take the lock.
    pub fn shutdown_requested(&self) -> bool {
        self.shared.is_terminal()
    }

    /// The halt/reboot hooks, installed at construction.
    ///
    /// They stay usable after the supervisor is dropped.
    pub fn shutdown_hooks(&self) -> ShutdownHooks<B> {
        self.hooks.clone()
    }

    // ── Internal ───────────────────────────────────────────────

    fn user_controlled(inner: &Inner<B>, op: &str) -> bool {
        if inner.state.mode == Mode::UserControlled {
            true
        } else {
            debug!("Watchdog: {op} ignored in {:?}", inner.state.mode);
            false
        }
    }

    /// Switch to autonomous mode: entry feed, then start the thread.
    ///
    /// Runs under the state lock so no `open()` can interleave between the
    /// mode change and the thread being registered.
    fn enter_keepalive(&self, inner: &mut Inner<B>) -> Result<(), WatchdogError> {
        inner.state.mode = Mode::AutonomousKeepAlive;
        inner.state.armed = true;
        inner.feed_autonomous(self.default_deciseconds);

        let keepalive = KeepAlive::spawn(
            Arc::clone(&self.shared),
            self.default_deciseconds,
            self.period,
        )
        .map_err(|e| {
            error!("Watchdog: cannot spawn keep-alive thread: {e}");
            WatchdogError::KeepAliveUnavailable
        })?;

        // A worker is only ever registered in autonomous mode and open()
        // removes it; a stale one would exit on its closed channel.
        let mut slot = self.keepalive.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(keepalive);
        Ok(())
    }

    fn cancel_keepalive(&self) {
        let keepalive = self
            .keepalive
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(keepalive) = keepalive {
            keepalive.cancel();
        }
    }
}

impl<B: I2c + Send + 'static> Drop for Supervisor<B> {
    fn drop(&mut self) {
        if self.shared.is_terminal() {
            // A hook holds the lock forever; the keep-alive thread may be
            // parked on it, so neither join it nor hand the timer on.
            return;
        }
        self.cancel_keepalive();
        CLAIMED.store(false, Ordering::SeqCst);
        debug!("Watchdog: supervisor released");
    }
}
