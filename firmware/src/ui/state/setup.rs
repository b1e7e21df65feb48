use alloc::string::ToString;

use shared::timezone::TimezoneOffset;

use super::{DoorEffect, DoorRuntime, DoorState};
use crate::ui::{
    input::DoorCommand,
    render::{self, Frame, TimezoneView, ViewContent},
};

/// Offset being edited; committed only on save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct TimezoneSetup {
    pending: TimezoneOffset,
}

impl TimezoneSetup {
    pub(super) fn new(current: TimezoneOffset) -> Self {
        Self { pending: current }
    }

    pub(super) fn to_frame(self) -> Frame {
        Frame {
            content: ViewContent::TimezoneSetup(TimezoneView {
                offset: self.pending,
                label: self.pending.to_string(),
            }),
            hint_bar: render::timezone_hints(),
        }
    }
}

impl DoorRuntime {
    pub(super) fn handle_setup(&mut self, command: DoorCommand) -> DoorEffect {
        let DoorState::TimezoneSetup(setup) = &mut self.state else {
            return DoorEffect::None;
        };

        match command {
            DoorCommand::IncreaseOffset => {
                setup.pending = setup.pending.increment();
                log::debug!("timezone offset now {}", setup.pending);
                DoorEffect::None
            }
            DoorCommand::DecreaseOffset => {
                setup.pending = setup.pending.decrement();
                log::debug!("timezone offset now {}", setup.pending);
                DoorEffect::None
            }
            DoorCommand::SaveTimezone => {
                let offset = setup.pending;
                self.timezone = offset;
                self.state = DoorState::Idle;
                DoorEffect::SaveTimezone(offset)
            }
            _ => DoorEffect::None,
        }
    }
}
