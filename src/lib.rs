//! Companion-MCU supervisor for Technologic Systems single-board computers.
//!
//! The MCU sits on I2C and provides a hardware watchdog and an
//! input-voltage sense. This crate exposes:
//!
//! - [`bus`]: the addressed transport every MCU function shares;
//! - [`watchdog`]: the supervisor that keeps the hardware timer fed until
//!   a user takes over, and the halt/reboot hooks;
//! - [`power`]: the input-voltage reader.
//!
//! All bus access goes through `embedded_hal::i2c::I2c`, so the logic runs
//! unchanged against a mock bus on the host.

#![deny(unused_must_use)]

pub mod bus;
pub mod config;
pub mod error;
pub mod power;
pub mod watchdog;

pub use error::{Error, Result};
