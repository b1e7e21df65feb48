use std::collections::VecDeque;

use shared::error::SharedError;

use super::DeviceTransport;

/// In-memory console that records sent text and replays queued lines.
#[derive(Default)]
pub struct MemoryDeviceTransport {
    queued_lines: VecDeque<String>,
    pub sent: Vec<String>,
}

impl MemoryDeviceTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queued_lines: lines.into_iter().map(Into::into).collect(),
            sent: Vec::new(),
        }
    }

    /// Queue a console line returned on a later read.
    pub fn queue_line(&mut self, line: impl Into<String>) {
        self.queued_lines.push_back(line.into());
    }
}

impl DeviceTransport for MemoryDeviceTransport {
    fn write_text(&mut self, text: &str) -> Result<(), SharedError> {
        self.sent.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, SharedError> {
        self.queued_lines
            .pop_front()
            .ok_or_else(|| SharedError::Transport("memory transport has no queued lines".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_sent_text() {
        let mut transport = MemoryDeviceTransport::new();
        transport.write_text("1747540800\n").expect("write");
        assert_eq!(transport.sent, ["1747540800\n"]);
    }

    #[test]
    fn replays_queued_lines_then_fails() {
        let mut transport = MemoryDeviceTransport::new();
        transport.queue_line("RTC time set to: 1747540800");
        assert_eq!(
            transport.read_line().expect("line"),
            "RTC time set to: 1747540800"
        );
        assert!(matches!(
            transport.read_line(),
            Err(SharedError::Transport(_))
        ));
    }
}
