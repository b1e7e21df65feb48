//! Serial console seam used for clock provisioning.
use core::fmt;

/// Byte-oriented serial console.
pub trait SerialLink {
    type Error: fmt::Debug;

    /// Next received byte, if one is already buffered. Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    /// Send one line; the implementation appends the line terminator.
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
}
