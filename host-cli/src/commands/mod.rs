use std::time::{SystemTime, UNIX_EPOCH};

use shared::enrollment::decode_secret;
use shared::error::SharedError;
use shared::totp::SharedSecret;

pub use crate::transport::DeviceTransport;

pub trait TransportProvider {
    type Transport: DeviceTransport + ?Sized;

    fn connect(&self, port_path: &str) -> Result<Box<Self::Transport>, SharedError>;
}

pub mod code;
pub mod set_time;
pub mod uri;
pub mod verify;

pub(crate) fn load_secret(base32: &str) -> Result<SharedSecret, SharedError> {
    Ok(decode_secret(base32)?)
}

/// Use the explicit timestamp if given, the host clock otherwise.
pub(crate) fn resolve_time(explicit: Option<u32>) -> Result<u32, SharedError> {
    match explicit {
        Some(unix_time) => Ok(unix_time),
        None => system_unix_time(),
    }
}

pub(crate) fn system_unix_time() -> Result<u32, SharedError> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| SharedError::Transport(format!("system time is before epoch: {err}")))?
        .as_secs();
    u32::try_from(seconds).map_err(|_| {
        SharedError::Transport(format!("system time {seconds} does not fit the device clock"))
    })
}
