use alloc::string::String;

use shared::timezone::{TimezoneOffset, WallClock};
use shared::totp::CODE_DIGITS;
use zeroize::Zeroizing;

use super::{
    input::{DoorCommand, Keymap, PhysicalKey},
    render::{self, Frame, HintBar, HomeView, ResultView, ViewContent},
};
use crate::config::Timings;

use entry::EntrySession;
use setup::TimezoneSetup;

mod entry;
mod setup;

/// Screens the door cycles through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorScreen {
    Idle,
    Entering,
    Verifying,
    Result(AccessOutcome),
    TimezoneSetup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted,
    Denied,
}

impl AccessOutcome {
    pub fn from_verified(granted: bool) -> Self {
        if granted {
            AccessOutcome::Granted
        } else {
            AccessOutcome::Denied
        }
    }

    pub fn is_granted(self) -> bool {
        matches!(self, AccessOutcome::Granted)
    }
}

/// Side effect the controller must carry out after a transition.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum DoorEffect {
    #[default]
    None,
    /// A full code was entered; check it against the current UTC time.
    VerifyRequested { code: Zeroizing<String> },
    /// The user confirmed a new display timezone.
    SaveTimezone(TimezoneOffset),
}

#[derive(Debug)]
enum DoorState {
    Idle,
    Entering(EntrySession),
    Verifying,
    Result { outcome: AccessOutcome, since_ms: u64 },
    TimezoneSetup(TimezoneSetup),
}

/// Keypad entry and timezone setup state machine.
///
/// Pure with respect to hardware: time is passed in and effects are returned.
pub struct DoorRuntime {
    state: DoorState,
    keymap: Keymap,
    timezone: TimezoneOffset,
    timings: Timings,
}

impl DoorRuntime {
    pub fn new(timezone: TimezoneOffset, timings: Timings) -> Self {
        Self {
            state: DoorState::Idle,
            keymap: Keymap::default(),
            timezone,
            timings,
        }
    }

    pub fn screen(&self) -> DoorScreen {
        match &self.state {
            DoorState::Idle => DoorScreen::Idle,
            DoorState::Entering(_) => DoorScreen::Entering,
            DoorState::Verifying => DoorScreen::Verifying,
            DoorState::Result { outcome, .. } => DoorScreen::Result(*outcome),
            DoorState::TimezoneSetup(_) => DoorScreen::TimezoneSetup,
        }
    }

    /// Offset currently applied to the displayed time.
    pub fn timezone(&self) -> TimezoneOffset {
        self.timezone
    }

    /// Access the mutable keymap for custom bindings.
    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// Key presses are dropped while a verdict is pending or displayed.
    pub fn accepts_input(&self) -> bool {
        !matches!(
            self.state,
            DoorState::Verifying | DoorState::Result { .. }
        )
    }

    /// The lock is open exactly while a granted result is shown.
    pub fn actuator_engaged(&self) -> bool {
        matches!(
            self.state,
            DoorState::Result {
                outcome: AccessOutcome::Granted,
                ..
            }
        )
    }

    /// Handle a raw key press.
    pub fn handle_key(&mut self, key: PhysicalKey, now_ms: u64) -> DoorEffect {
        if let Some(command) = self.keymap.resolve(key) {
            self.apply_command(command, now_ms)
        } else {
            log::debug!("unbound key {key:?} ignored");
            DoorEffect::None
        }
    }

    /// Apply a door command to the state machine.
    pub fn apply_command(&mut self, command: DoorCommand, now_ms: u64) -> DoorEffect {
        match self.state {
            DoorState::Verifying | DoorState::Result { .. } => {
                log::debug!("input ignored while a result is pending");
                DoorEffect::None
            }
            DoorState::TimezoneSetup(_) => self.handle_setup(command),
            DoorState::Idle | DoorState::Entering(_) => self.handle_entry(command, now_ms),
        }
    }

    /// Record the verdict for the code handed out with [`DoorEffect::VerifyRequested`].
    pub fn record_verification(&mut self, granted: bool, now_ms: u64) {
        if !matches!(self.state, DoorState::Verifying) {
            log::warn!("verification result arrived with no code pending");
            return;
        }
        self.state = DoorState::Result {
            outcome: AccessOutcome::from_verified(granted),
            since_ms: now_ms,
        };
    }

    /// Evaluate deadlines. Returns `true` when the state changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match &self.state {
            DoorState::Entering(session)
                if session.expired(now_ms, self.timings.entry_timeout_ms) =>
            {
                log::info!("code entry timed out");
                self.state = DoorState::Idle;
                true
            }
            DoorState::Result { since_ms, .. }
                if now_ms.saturating_sub(*since_ms) > self.timings.unlock_ms =>
            {
                log::info!("resetting verification status");
                self.state = DoorState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Build the frame for the current state at the given UTC time.
    pub fn render(&self, unix_time: u32) -> Frame {
        match &self.state {
            DoorState::Idle => self.home_frame(unix_time, 0),
            DoorState::Entering(session) => self.home_frame(unix_time, session.len()),
            DoorState::Verifying => self.home_frame(unix_time, CODE_DIGITS),
            DoorState::Result { outcome, .. } => result_frame(*outcome),
            DoorState::TimezoneSetup(setup) => setup.to_frame(),
        }
    }

    fn home_frame(&self, unix_time: u32, entered_digits: usize) -> Frame {
        Frame {
            content: ViewContent::Home(HomeView {
                time: WallClock::from_utc(unix_time, self.timezone),
                timezone: self.timezone,
                prompt: String::from("Enter Code:"),
                entered_digits,
                max_digits: CODE_DIGITS,
            }),
            hint_bar: render::home_hints(),
        }
    }
}

fn result_frame(outcome: AccessOutcome) -> Frame {
    let message = if outcome.is_granted() {
        "ACCESS GRANTED"
    } else {
        "ACCESS DENIED"
    };
    Frame {
        content: ViewContent::Result(ResultView {
            granted: outcome.is_granted(),
            message: String::from(message),
        }),
        hint_bar: HintBar::empty(),
    }
}
