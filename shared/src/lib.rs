#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod enrollment;
#[cfg(feature = "std")]
pub mod error;
pub mod time_sync;
pub mod timezone;
pub mod totp;
