use crate::enrollment::EnrollmentError;
use crate::time_sync::TimeSyncError;
use crate::totp::TotpError;
use alloc::string::String;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SharedError {
    #[error("secret error: {0}")]
    Secret(#[from] EnrollmentError),
    #[error("totp error: {0}")]
    Totp(#[from] TotpError),
    #[error("time sync error: {0}")]
    TimeSync(#[from] TimeSyncError),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("device rejected the request: {0}")]
    DeviceRejected(String),
    #[error("code does not match")]
    CodeMismatch,
}

impl From<io::Error> for SharedError {
    fn from(value: io::Error) -> Self {
        SharedError::Transport(value.to_string())
    }
}
