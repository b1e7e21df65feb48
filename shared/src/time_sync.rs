//! Line protocol used to set the door's RTC from a host over the serial console.
//!
//! The host writes the unix time in decimal followed by a newline. The device replies
//! with a single line: the new time, a rejection of the input, or a refusal while the
//! keypad is not in timezone setup.
use alloc::{format, string::String};

/// Timestamps at or below this value are rejected as implausible (2023-11-14).
pub const MIN_VALID_UNIX_TIME: u32 = 1_700_000_000;
/// Longest line the device buffers before discarding input.
pub const MAX_LINE_LEN: usize = 16;

const SET_REPLY_PREFIX: &str = "RTC time set to: ";
const REJECT_REPLY: &str = "Invalid timestamp. Please enter Unix time (seconds since 1970-01-01)";
const LOCKED_REPLY: &str = "Clock locked. Press A on the keypad to allow setting the time";

/// Reasons a set-time line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeSyncError {
    #[error("empty time line")]
    Empty,
    #[error("time line is not an unsigned decimal number")]
    NotANumber,
    #[error("timestamp {value} is not after 1700000000")]
    TooEarly { value: u32 },
    #[error("time line exceeds 16 characters")]
    LineTooLong,
}

/// Parse one received line into an accepted unix timestamp.
pub fn parse_set_time(line: &str) -> Result<u32, TimeSyncError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(TimeSyncError::Empty);
    }
    if !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(TimeSyncError::NotANumber);
    }
    let value: u32 = trimmed.parse().map_err(|_| TimeSyncError::NotANumber)?;
    if value <= MIN_VALID_UNIX_TIME {
        return Err(TimeSyncError::TooEarly { value });
    }
    Ok(value)
}

/// Line the host sends to request a clock update.
pub fn encode_set_time(unix_time: u32) -> String {
    format!("{unix_time}\n")
}

/// Single-line device answer to a set-time request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSyncReply {
    Set { unix_time: u32 },
    Rejected,
    /// The device only accepts a new time while its keypad is in timezone setup.
    Locked,
}

impl TimeSyncReply {
    pub fn encode(&self) -> String {
        match self {
            TimeSyncReply::Set { unix_time } => format!("{SET_REPLY_PREFIX}{unix_time}"),
            TimeSyncReply::Rejected => String::from(REJECT_REPLY),
            TimeSyncReply::Locked => String::from(LOCKED_REPLY),
        }
    }

    /// Recognise a reply among other console output; unrelated lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(SET_REPLY_PREFIX) {
            return rest
                .trim()
                .parse()
                .ok()
                .map(|unix_time| TimeSyncReply::Set { unix_time });
        }
        if line.starts_with("Invalid timestamp") {
            return Some(TimeSyncReply::Rejected);
        }
        if line.starts_with("Clock locked") {
            return Some(TimeSyncReply::Locked);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_timestamps_after_the_floor() {
        assert_eq!(parse_set_time("1700000001"), Ok(1_700_000_001));
        assert_eq!(parse_set_time(" 1747540800\r"), Ok(1_747_540_800));
    }

    #[test]
    fn rejects_floor_and_garbage() {
        assert_eq!(
            parse_set_time("1700000000"),
            Err(TimeSyncError::TooEarly {
                value: 1_700_000_000
            })
        );
        assert_eq!(parse_set_time(""), Err(TimeSyncError::Empty));
        assert_eq!(parse_set_time("-5"), Err(TimeSyncError::NotANumber));
        assert_eq!(parse_set_time("17e8"), Err(TimeSyncError::NotANumber));
        assert_eq!(parse_set_time("99999999999"), Err(TimeSyncError::NotANumber));
    }

    #[test]
    fn request_line_is_newline_terminated() {
        assert_eq!(encode_set_time(1_747_540_800), "1747540800\n");
    }

    #[test]
    fn replies_survive_the_console() {
        let set = TimeSyncReply::Set {
            unix_time: 1_747_540_800,
        };
        assert_eq!(set.encode(), "RTC time set to: 1747540800");
        assert_eq!(TimeSyncReply::parse(&set.encode()), Some(set));
        assert_eq!(
            TimeSyncReply::parse(&TimeSyncReply::Rejected.encode()),
            Some(TimeSyncReply::Rejected)
        );
        assert_eq!(
            TimeSyncReply::parse(&TimeSyncReply::Locked.encode()),
            Some(TimeSyncReply::Locked)
        );
        assert_eq!(TimeSyncReply::parse("Unix timestamp: 1747540800"), None);
    }
}
