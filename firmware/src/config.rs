//! Loop timing.

/// Code entry is abandoned this long after the first digit.
pub const ENTRY_TIMEOUT_MS: u64 = 10_000;
/// How long a result stays on screen (and the bolt stays open on success).
pub const UNLOCK_MS: u64 = 3_000;
/// Enrollment QR screen duration at boot.
pub const ENROLLMENT_SPLASH_MS: u32 = 5_000;
pub const POLL_INTERVAL_MS: u32 = 10;
/// Upper bound for a single keypad scan.
pub const KEYPAD_TIMEOUT_MS: u32 = 50;

/// Deadlines and cadences used by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub entry_timeout_ms: u64,
    pub unlock_ms: u64,
    pub enrollment_splash_ms: u32,
    pub poll_interval_ms: u32,
    pub keypad_timeout_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            entry_timeout_ms: ENTRY_TIMEOUT_MS,
            unlock_ms: UNLOCK_MS,
            enrollment_splash_ms: ENROLLMENT_SPLASH_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
            keypad_timeout_ms: KEYPAD_TIMEOUT_MS,
        }
    }
}
