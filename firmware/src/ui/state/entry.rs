use alloc::string::String;
use core::mem;

use shared::totp::CODE_DIGITS;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{DoorEffect, DoorRuntime, DoorState, TimezoneSetup};
use crate::ui::input::DoorCommand;

/// Digits typed so far and when typing began.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(super) struct EntrySession {
    digits: String,
    started_ms: u64,
}

impl EntrySession {
    fn start(now_ms: u64) -> Self {
        Self {
            digits: String::with_capacity(CODE_DIGITS),
            started_ms: now_ms,
        }
    }

    fn push(&mut self, digit: char) {
        if self.digits.len() < CODE_DIGITS {
            self.digits.push(digit);
        } else {
            log::debug!("extra digit ignored");
        }
    }

    fn is_complete(&self) -> bool {
        self.digits.len() == CODE_DIGITS
    }

    fn take_code(&mut self) -> Zeroizing<String> {
        Zeroizing::new(mem::take(&mut self.digits))
    }

    pub(super) fn len(&self) -> usize {
        self.digits.len()
    }

    pub(super) fn expired(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) > timeout_ms
    }
}

impl core::fmt::Debug for EntrySession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntrySession")
            .field("entered", &self.digits.len())
            .field("started_ms", &self.started_ms)
            .finish()
    }
}

impl DoorRuntime {
    pub(super) fn handle_entry(&mut self, command: DoorCommand, now_ms: u64) -> DoorEffect {
        match command {
            DoorCommand::InsertDigit(digit) if digit.is_ascii_digit() => {
                self.insert_digit(digit, now_ms)
            }
            DoorCommand::Clear => {
                self.state = DoorState::Idle;
                DoorEffect::None
            }
            DoorCommand::OpenTimezoneSetup => {
                log::info!("entering timezone setup");
                self.state = DoorState::TimezoneSetup(TimezoneSetup::new(self.timezone));
                DoorEffect::None
            }
            _ => DoorEffect::None,
        }
    }

    fn insert_digit(&mut self, digit: char, now_ms: u64) -> DoorEffect {
        if matches!(self.state, DoorState::Idle) {
            self.state = DoorState::Entering(EntrySession::start(now_ms));
        }

        let DoorState::Entering(session) = &mut self.state else {
            return DoorEffect::None;
        };
        session.push(digit);
        if !session.is_complete() {
            return DoorEffect::None;
        }

        let code = session.take_code();
        self.state = DoorState::Verifying;
        DoorEffect::VerifyRequested { code }
    }
}
