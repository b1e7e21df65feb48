use core::fmt;

use shared::time_sync::MIN_VALID_UNIX_TIME;

/// Battery-backed real-time clock holding UTC unix time.
pub trait Rtc {
    type Error: fmt::Debug;

    /// Probe the device on its bus.
    fn begin(&mut self) -> Result<(), Self::Error>;

    fn read_unix(&mut self) -> Result<u32, Self::Error>;

    fn write_unix(&mut self, unix_time: u32) -> Result<(), Self::Error>;
}

/// Free-running millisecond counter used for entry and unlock deadlines.
pub trait Monotonic {
    fn now_ms(&mut self) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The RTC did not answer.
    Unavailable,
    /// The RTC answered with a time nobody could have set deliberately.
    Unset { unix_time: u32 },
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::Unavailable => write!(f, "real-time clock unavailable"),
            ClockError::Unset { unix_time } => {
                write!(f, "real-time clock is not set (reads {unix_time})")
            }
        }
    }
}

impl core::error::Error for ClockError {}

/// UTC time source wrapping the hardware RTC.
#[derive(Debug)]
pub struct ClockAdapter<R> {
    rtc: R,
}

impl<R: Rtc> ClockAdapter<R> {
    /// Attach to the RTC and require that it holds a plausible time.
    pub fn begin(rtc: R) -> Result<Self, ClockError> {
        let mut clock = Self::attach(rtc)?;
        let unix_time = clock.now()?;
        if unix_time <= MIN_VALID_UNIX_TIME {
            log::error!("RTC reports {unix_time}; refusing to make access decisions");
            return Err(ClockError::Unset { unix_time });
        }
        Ok(clock)
    }

    /// Attach to the RTC only checking that it answers.
    ///
    /// Used by the provisioning console, which exists to fix an unset clock.
    pub fn attach(mut rtc: R) -> Result<Self, ClockError> {
        rtc.begin().map_err(|error| {
            log::error!("couldn't find RTC: {error:?}");
            ClockError::Unavailable
        })?;
        Ok(Self { rtc })
    }

    pub fn now(&mut self) -> Result<u32, ClockError> {
        self.rtc.read_unix().map_err(|error| {
            log::error!("RTC read failed: {error:?}");
            ClockError::Unavailable
        })
    }

    /// Apply an authoritative UTC time.
    pub fn set(&mut self, unix_time: u32) -> Result<(), ClockError> {
        self.rtc.write_unix(unix_time).map_err(|error| {
            log::error!("RTC write failed: {error:?}");
            ClockError::Unavailable
        })?;
        log::info!("RTC time set to {unix_time}");
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.rtc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeRtc {
        unix_time: u32,
        missing: bool,
        writes: usize,
    }

    impl Rtc for FakeRtc {
        type Error = ();

        fn begin(&mut self) -> Result<(), ()> {
            if self.missing { Err(()) } else { Ok(()) }
        }

        fn read_unix(&mut self) -> Result<u32, ()> {
            if self.missing {
                Err(())
            } else {
                Ok(self.unix_time)
            }
        }

        fn write_unix(&mut self, unix_time: u32) -> Result<(), ()> {
            if self.missing {
                return Err(());
            }
            self.unix_time = unix_time;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn missing_rtc_is_unavailable() {
        let rtc = FakeRtc {
            missing: true,
            ..FakeRtc::default()
        };
        assert_eq!(ClockAdapter::begin(rtc).err(), Some(ClockError::Unavailable));
    }

    #[test]
    fn unset_rtc_is_refused_at_boot_but_can_be_attached() {
        let rtc = FakeRtc {
            unix_time: 0,
            ..FakeRtc::default()
        };
        assert_eq!(
            ClockAdapter::begin(rtc).err(),
            Some(ClockError::Unset { unix_time: 0 })
        );

        let mut clock = ClockAdapter::attach(FakeRtc::default()).expect("attach");
        clock.set(1_747_540_800).expect("set");
        assert_eq!(clock.now(), Ok(1_747_540_800));
        assert_eq!(clock.into_inner().writes, 1);
    }

    #[test]
    fn plausible_rtc_time_is_trusted() {
        let rtc = FakeRtc {
            unix_time: 1_747_540_800,
            ..FakeRtc::default()
        };
        let mut clock = ClockAdapter::begin(rtc).expect("clock");
        assert_eq!(clock.now(), Ok(1_747_540_800));
    }
}
