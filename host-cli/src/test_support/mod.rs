use std::cell::RefCell;
use std::io::{self, Cursor, Read, Write};

use serialport::SerialPortType;
use shared::error::SharedError;

use crate::commands::{DeviceTransport, TransportProvider};
use crate::transport::memory::MemoryDeviceTransport;

pub(crate) const DOOR_SECRET_B32: &str = "ONUFIR2QPBUWERDP";
pub(crate) const GOLDEN_TIME: u32 = 1_700_000_000;

pub(crate) fn usb_port(name: &str, vid: u16, pid: u16) -> serialport::SerialPortInfo {
    serialport::SerialPortInfo {
        port_name: name.to_string(),
        port_type: SerialPortType::UsbPort(serialport::UsbPortInfo {
            vid,
            pid,
            serial_number: None,
            manufacturer: None,
            product: None,
            interface: None,
        }),
    }
}

pub(crate) fn non_usb_port(name: &str) -> serialport::SerialPortInfo {
    serialport::SerialPortInfo {
        port_name: name.to_string(),
        port_type: SerialPortType::PciPort,
    }
}

/// Hands out memory transports preloaded with console lines.
/// Records every port that was asked for.
#[derive(Default)]
pub(crate) struct RecordingTransportProvider {
    pub(crate) requested_ports: RefCell<Vec<String>>,
    pub(crate) console_lines: Vec<String>,
}

impl RecordingTransportProvider {
    pub(crate) fn replying(lines: &[&str]) -> Self {
        Self {
            requested_ports: RefCell::default(),
            console_lines: lines.iter().map(|line| line.to_string()).collect(),
        }
    }
}

impl TransportProvider for RecordingTransportProvider {
    type Transport = dyn DeviceTransport;

    fn connect(&self, port_path: &str) -> Result<Box<Self::Transport>, SharedError> {
        self.requested_ports
            .borrow_mut()
            .push(port_path.to_string());
        Ok(
            Box::new(MemoryDeviceTransport::with_lines(self.console_lines.clone()))
                as Box<Self::Transport>,
        )
    }
}

/// Byte-level stand-in for a serial port.
pub(crate) struct MockPort {
    pub(crate) read_cursor: Cursor<Vec<u8>>,
    pub(crate) writes: Vec<u8>,
}

impl MockPort {
    pub(crate) fn new(read_data: &[u8]) -> Self {
        Self {
            read_cursor: Cursor::new(read_data.to_vec()),
            writes: Vec::new(),
        }
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_cursor.read(buf)
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
