#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod actuator;
pub mod config;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod storage;
pub mod sync;
pub mod system;
pub mod time;
pub mod transport;
pub mod ui;

pub use system::{Board, Controller, FatalError, Peripherals};
