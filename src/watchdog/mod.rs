//! MCU hardware watchdog.
//!
//! | Module       | Role                                             |
//! |--------------|--------------------------------------------------|
//! | `codec`      | 3-byte command format                            |
//! | `state`      | mode, armed flag, identity                       |
//! | `keepalive`  | background feeding before a user opens the timer |
//! | `supervisor` | state machine and user operations                |
//! | `hooks`      | halt/reboot paths that never return              |

pub mod codec;
pub mod hooks;
mod keepalive;
pub mod state;
pub mod supervisor;

pub use codec::{PresetLevel, WatchdogCommand};
pub use hooks::ShutdownHooks;
pub use state::{Mode, WatchdogInfo, WatchdogState};
pub use supervisor::Supervisor;
