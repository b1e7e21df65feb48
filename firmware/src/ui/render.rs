use alloc::{string::String, vec, vec::Vec};
use core::fmt;

use shared::timezone::{TimezoneOffset, WallClock};

/// Aggregated render output for the active screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub content: ViewContent,
    pub hint_bar: HintBar,
}

/// Footer with per-screen keypad hints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintBar {
    pub hints: Vec<HintItem>,
}

impl HintBar {
    pub fn new(hints: Vec<HintItem>) -> Self {
        Self { hints }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Key-action pairing presented in the hint bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintItem {
    pub key: String,
    pub action: String,
}

impl HintItem {
    pub fn new<K: Into<String>, A: Into<String>>(key: K, action: A) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

/// Content rendered for each screen variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewContent {
    Enrollment(EnrollmentView),
    Home(HomeView),
    Result(ResultView),
    TimezoneSetup(TimezoneView),
}

/// QR provisioning screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrollmentView {
    pub title: String,
    pub uri: String,
}

/// Idle clock with code entry progress. Entered digits are shown masked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeView {
    pub time: WallClock,
    pub timezone: TimezoneOffset,
    pub prompt: String,
    pub entered_digits: usize,
    pub max_digits: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultView {
    pub granted: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimezoneView {
    pub offset: TimezoneOffset,
    pub label: String,
}

/// Screen that shows frames.
pub trait DisplayPanel {
    type Error: fmt::Debug;

    fn present(&mut self, frame: &Frame) -> Result<(), Self::Error>;
}

/// Boot screen carrying the provisioning URI.
pub fn enrollment_frame(uri: String) -> Frame {
    Frame {
        content: ViewContent::Enrollment(EnrollmentView {
            title: String::from("Scan with Auth App"),
            uri,
        }),
        hint_bar: HintBar::empty(),
    }
}

pub(crate) fn home_hints() -> HintBar {
    HintBar::new(vec![
        HintItem::new("*", "Clear"),
        HintItem::new("A", "Set Timezone"),
    ])
}

pub(crate) fn timezone_hints() -> HintBar {
    HintBar::new(vec![
        HintItem::new("B", "+30min"),
        HintItem::new("C", "-30min"),
        HintItem::new("D", "Save & Exit"),
    ])
}
