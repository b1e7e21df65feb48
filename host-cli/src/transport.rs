use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use shared::error::SharedError;

use crate::{ARDUINO_USB_VIDS, BRIDGE_USB_VIDS, DEFAULT_TIMEOUT_SECS, SERIAL_BAUD_RATE};

#[cfg(test)]
pub mod memory;

/// Line-oriented access to the door's serial console.
pub trait DeviceTransport {
    /// Send text exactly as given.
    fn write_text(&mut self, text: &str) -> Result<(), SharedError>;

    /// Read the next console line without its terminator.
    fn read_line(&mut self) -> Result<String, SharedError>;
}

impl<T> DeviceTransport for T
where
    T: Read + Write + ?Sized,
{
    fn write_text(&mut self, text: &str) -> Result<(), SharedError> {
        self.write_all(text.as_bytes())
            .map_err(map_io_error("write request"))?;
        self.flush().map_err(map_io_error("flush request"))
    }

    fn read_line(&mut self) -> Result<String, SharedError> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let read = self.read(&mut byte).map_err(map_io_error("read reply"))?;
            if read == 0 {
                if line.is_empty() {
                    return Err(SharedError::Transport(
                        "device closed the connection".into(),
                    ));
                }
                break;
            }
            match byte[0] {
                b'\n' => break,
                b'\r' => {}
                other => line.push(other),
            }
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

pub fn open_serial_port(path: &str) -> Result<Box<dyn SerialPort>, SharedError> {
    serialport::new(path, SERIAL_BAUD_RATE)
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .open()
        .map_err(|err| SharedError::Transport(format!("cannot open {path}: {err}")))
}

pub fn detect_first_serial_port(allow_any_port: bool) -> Result<String, SharedError> {
    let ports = serialport::available_ports().map_err(|err| {
        SharedError::Transport(format!("failed to enumerate serial ports: {err}"))
    })?;

    select_serial_port(&ports, allow_any_port)
        .map(|info| info.port_name.clone())
        .ok_or_else(|| missing_door_error(allow_any_port))
}

/// Pick the door's port: a genuine Arduino first, then a CH340/FTDI clone.
pub fn select_serial_port(
    ports: &[serialport::SerialPortInfo],
    allow_any_port: bool,
) -> Option<&serialport::SerialPortInfo> {
    if allow_any_port {
        return ports.iter().find(|info| usb_vid(info).is_some());
    }

    [ARDUINO_USB_VIDS, BRIDGE_USB_VIDS].iter().find_map(|vids| {
        ports
            .iter()
            .find(|info| usb_vid(info).is_some_and(|vid| vids.contains(&vid)))
    })
}

fn usb_vid(info: &serialport::SerialPortInfo) -> Option<u16> {
    match &info.port_type {
        SerialPortType::UsbPort(usb) => Some(usb.vid),
        _ => None,
    }
}

pub fn missing_door_error(allow_any_port: bool) -> SharedError {
    let hint = if allow_any_port {
        ""
    } else {
        "; pass --port or --any-port to choose one"
    };
    SharedError::Transport(format!(
        "no Arduino, CH340 or FTDI serial device found{hint}"
    ))
}

fn map_io_error(action: &'static str) -> impl Fn(io::Error) -> SharedError {
    move |err| match err.kind() {
        io::ErrorKind::TimedOut => {
            SharedError::Transport(format!("timed out waiting to {action}"))
        }
        _ => SharedError::Transport(format!("failed to {action}: {err}")),
    }
}
