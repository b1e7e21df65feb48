//! Door user interface runtime.
//!
//! The UI module owns the keypad state machine, translates key presses into
//! door commands and produces frames for the display. Hardware stays behind
//! the [`Keypad`] and [`DisplayPanel`] traits so the flow runs in host tests.

mod input;
mod render;
mod state;

pub use input::{DoorCommand, Keymap, Keypad, PhysicalKey};
pub use render::{
    DisplayPanel, EnrollmentView, Frame, HintBar, HintItem, HomeView, ResultView, TimezoneView,
    ViewContent, enrollment_frame,
};
pub use state::{AccessOutcome, DoorEffect, DoorRuntime, DoorScreen};
