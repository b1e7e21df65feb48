//! The door controller: one cooperative loop owning every peripheral.
use alloc::string::{String, ToString};
use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_storage::Storage;
use shared::enrollment;
use shared::timezone::TimezoneOffset;
use shared::totp::TotpVerifier;

use crate::actuator::{Actuator, ActuatorError};
use crate::config::Timings;
use crate::storage::{StorageError, TimezoneStore};
use crate::sync::TimeSyncSession;
use crate::time::{ClockAdapter, ClockError, Monotonic, Rtc};
use crate::transport::SerialLink;
use crate::ui::{
    DisplayPanel, DoorEffect, DoorRuntime, DoorScreen, Frame, Keypad, enrollment_frame,
};

/// Concrete peripheral types of a board.
pub trait Board {
    type Rtc: Rtc;
    type Storage: Storage<Error: fmt::Debug>;
    type Keypad: Keypad;
    type Actuator: Actuator;
    type Display: DisplayPanel;
    type Monotonic: Monotonic;
    type Serial: SerialLink;
    type Delay: DelayNs;
}

/// Everything the controller takes ownership of at boot.
pub struct Peripherals<B: Board> {
    pub rtc: B::Rtc,
    pub storage: B::Storage,
    pub keypad: B::Keypad,
    pub actuator: B::Actuator,
    pub display: B::Display,
    pub monotonic: B::Monotonic,
    pub serial: B::Serial,
    pub delay: B::Delay,
}

/// Conditions under which the door stops making access decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    Clock(ClockError),
    Storage(String),
    Actuator(ActuatorError),
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::Clock(error) => write!(f, "clock failure: {error}"),
            FatalError::Storage(error) => write!(f, "storage failure: {error}"),
            FatalError::Actuator(error) => write!(f, "actuator failure: {error}"),
        }
    }
}

impl core::error::Error for FatalError {}

impl From<ClockError> for FatalError {
    fn from(error: ClockError) -> Self {
        FatalError::Clock(error)
    }
}

impl From<ActuatorError> for FatalError {
    fn from(error: ActuatorError) -> Self {
        FatalError::Actuator(error)
    }
}

impl<E: fmt::Debug> From<StorageError<E>> for FatalError {
    fn from(error: StorageError<E>) -> Self {
        FatalError::Storage(error.to_string())
    }
}

pub struct Controller<B: Board> {
    clock: ClockAdapter<B::Rtc>,
    store: TimezoneStore<B::Storage>,
    keypad: B::Keypad,
    actuator: B::Actuator,
    display: B::Display,
    monotonic: B::Monotonic,
    serial: B::Serial,
    delay: B::Delay,
    verifier: TotpVerifier,
    runtime: DoorRuntime,
    time_sync: TimeSyncSession,
    timings: Timings,
    engaged: bool,
    last_frame: Option<Frame>,
}

impl<B: Board> Controller<B> {
    /// Bring the door up: lock, check the clock, load the timezone and show the
    /// enrollment screen.
    ///
    /// A clock that is missing or unset is fatal; the door never grants on a guess.
    pub fn boot(
        peripherals: Peripherals<B>,
        verifier: TotpVerifier,
        timings: Timings,
    ) -> Result<Self, FatalError> {
        let Peripherals {
            rtc,
            storage,
            keypad,
            mut actuator,
            mut display,
            monotonic,
            serial,
            mut delay,
        } = peripherals;

        actuator.disengage()?;
        let clock = ClockAdapter::begin(rtc)?;

        let mut store = TimezoneStore::new(storage)?;
        let timezone = store.load()?;

        let uri = enrollment::default_uri(verifier.secret());
        present(&mut display, &enrollment_frame(uri));
        delay.delay_ms(timings.enrollment_splash_ms);

        log::info!("door controller ready, timezone {timezone}");
        Ok(Self {
            clock,
            store,
            keypad,
            actuator,
            display,
            monotonic,
            serial,
            delay,
            verifier,
            runtime: DoorRuntime::new(timezone, timings),
            time_sync: TimeSyncSession::new(),
            timings,
            engaged: false,
            last_frame: None,
        })
    }

    pub fn runtime(&self) -> &DoorRuntime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut DoorRuntime {
        &mut self.runtime
    }

    pub fn timezone(&self) -> TimezoneOffset {
        self.runtime.timezone()
    }

    /// One pass of the control loop.
    ///
    /// The serial console may only set the clock while the keypad is in timezone setup.
    pub fn poll(&mut self) -> Result<(), FatalError> {
        if self.runtime.screen() == DoorScreen::TimezoneSetup {
            self.time_sync.service(&mut self.serial, &mut self.clock)?;
        } else {
            self.time_sync.refuse(&mut self.serial);
        }

        let now_ms = self.monotonic.now_ms();
        self.runtime.tick(now_ms);

        if self.runtime.accepts_input() {
            if let Some(key) = self.keypad.read_key(self.timings.keypad_timeout_ms) {
                let now_ms = self.monotonic.now_ms();
                let effect = self.runtime.handle_key(key, now_ms);
                self.dispatch(effect)?;
            }
        }

        self.sync_actuator()?;
        let unix_time = self.clock.now()?;
        self.refresh_display(unix_time);
        Ok(())
    }

    /// Poll forever; only returns once a fatal error has stopped the door, which is
    /// left locked.
    pub fn run(&mut self) -> FatalError {
        loop {
            if let Err(error) = self.poll() {
                log::error!("halting door controller: {error}");
                if let Err(actuator_error) = self.actuator.disengage() {
                    log::error!("failed to re-lock after fatal error: {actuator_error}");
                }
                self.engaged = false;
                return error;
            }
            self.delay.delay_ms(self.timings.poll_interval_ms);
        }
    }

    /// Hand the peripherals back, e.g. to simulate a power cycle.
    pub fn into_peripherals(self) -> Peripherals<B> {
        Peripherals {
            rtc: self.clock.into_inner(),
            storage: self.store.into_inner(),
            keypad: self.keypad,
            actuator: self.actuator,
            display: self.display,
            monotonic: self.monotonic,
            serial: self.serial,
            delay: self.delay,
        }
    }

    fn dispatch(&mut self, effect: DoorEffect) -> Result<(), FatalError> {
        match effect {
            DoorEffect::None => {}
            DoorEffect::VerifyRequested { code } => {
                let unix_time = self.clock.now()?;
                let granted = self.verifier.verify(unix_time, &code);
                if granted {
                    log::info!("access granted");
                } else {
                    log::warn!("access denied");
                }
                let now_ms = self.monotonic.now_ms();
                self.runtime.record_verification(granted, now_ms);
            }
            DoorEffect::SaveTimezone(offset) => {
                self.store.save(offset)?;
            }
        }
        Ok(())
    }

    fn sync_actuator(&mut self) -> Result<(), FatalError> {
        let wanted = self.runtime.actuator_engaged();
        if wanted == self.engaged {
            return Ok(());
        }

        if wanted {
            self.actuator.engage()?;
            log::info!("lock released");
        } else {
            self.actuator.disengage()?;
            log::info!("lock engaged");
        }
        self.engaged = wanted;
        Ok(())
    }

    fn refresh_display(&mut self, unix_time: u32) {
        let frame = self.runtime.render(unix_time);
        if self.last_frame.as_ref() == Some(&frame) {
            return;
        }
        present(&mut self.display, &frame);
        self.last_frame = Some(frame);
    }
}

fn present<D: DisplayPanel>(display: &mut D, frame: &Frame) {
    if let Err(error) = display.present(frame) {
        log::warn!("display refused frame: {error:?}");
    }
}
