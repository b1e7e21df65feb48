//! Clock provisioning over the serial console.
//!
//! Each line received is either a unix timestamp, which is written to the RTC, or
//! garbage, which is answered with a usage hint. Outside provisioning the controller
//! only serves requests while the keypad is in timezone setup and refuses the rest.
use embedded_hal::delay::DelayNs;
use heapless::String;
use shared::time_sync::{
    MAX_LINE_LEN, MIN_VALID_UNIX_TIME, TimeSyncError, TimeSyncReply, parse_set_time,
};

use crate::time::{ClockAdapter, ClockError, Rtc};
use crate::transport::SerialLink;

/// Line assembler for set-time requests.
#[derive(Debug, Default)]
pub struct TimeSyncSession {
    line: String<MAX_LINE_LEN>,
    overflowed: bool,
}

impl TimeSyncSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one received byte; yields an outcome once a line is terminated.
    ///
    /// Blank lines produce nothing so CRLF terminators are harmless.
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<u32, TimeSyncError>> {
        if byte == b'\n' || byte == b'\r' {
            if self.overflowed {
                self.overflowed = false;
                self.line.clear();
                return Some(Err(TimeSyncError::LineTooLong));
            }
            if self.line.is_empty() {
                return None;
            }
            let outcome = parse_set_time(&self.line);
            self.line.clear();
            return Some(outcome);
        }

        if !self.overflowed && self.line.push(char::from(byte)).is_err() {
            self.overflowed = true;
            self.line.clear();
        }
        None
    }

    /// Drain the serial receive buffer, applying accepted timestamps to the RTC.
    ///
    /// Returns the last timestamp applied. Only an RTC failure is an error.
    pub fn service<L, R>(
        &mut self,
        link: &mut L,
        clock: &mut ClockAdapter<R>,
    ) -> Result<Option<u32>, ClockError>
    where
        L: SerialLink,
        R: Rtc,
    {
        let mut applied = None;
        while let Some(byte) = link.read_byte() {
            let Some(outcome) = self.push_byte(byte) else {
                continue;
            };

            let reply = match outcome {
                Ok(unix_time) => {
                    clock.set(unix_time)?;
                    applied = Some(unix_time);
                    TimeSyncReply::Set { unix_time }
                }
                Err(error) => {
                    log::warn!("rejected set-time line: {error}");
                    TimeSyncReply::Rejected
                }
            };

            if let Err(error) = link.write_line(&reply.encode()) {
                log::warn!("serial reply failed: {error:?}");
            }
        }
        Ok(applied)
    }

    /// Drain the serial receive buffer without touching the RTC.
    ///
    /// Every complete line is answered with [`TimeSyncReply::Locked`].
    pub fn refuse<L: SerialLink>(&mut self, link: &mut L) {
        while let Some(byte) = link.read_byte() {
            if self.push_byte(byte).is_none() {
                continue;
            }
            log::warn!("set-time refused outside timezone setup");
            if let Err(error) = link.write_line(&TimeSyncReply::Locked.encode()) {
                log::warn!("serial reply failed: {error:?}");
            }
        }
    }
}

/// Block until the RTC holds a plausible time, serving set-time requests meanwhile.
///
/// Boards call this before booting the controller. A clock that is already set
/// returns at once.
pub fn await_valid_time<R, L, D>(
    rtc: R,
    link: &mut L,
    delay: &mut D,
    poll_interval_ms: u32,
) -> Result<R, ClockError>
where
    R: Rtc,
    L: SerialLink,
    D: DelayNs,
{
    let mut clock = ClockAdapter::attach(rtc)?;
    let mut session = TimeSyncSession::new();
    let mut announced = false;

    loop {
        if clock.now()? > MIN_VALID_UNIX_TIME {
            return Ok(clock.into_inner());
        }
        if !announced {
            log::warn!("RTC is not set; waiting for a unix timestamp on the serial console");
            announced = true;
        }
        session.service(link, &mut clock)?;
        delay.delay_ms(poll_interval_ms);
    }
}
