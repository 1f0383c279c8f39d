//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one subsystem against
//! the recording mock bus. All tests run on the host with no real
//! hardware required.

mod concurrency_tests;
mod keepalive_tests;
mod power_tests;
