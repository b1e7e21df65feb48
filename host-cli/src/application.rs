use std::io::Write;

use serialport::SerialPort;
use shared::error::SharedError;

use crate::commands::{self, TransportProvider};
use crate::transport::detect_first_serial_port;
use crate::{Cli, Command};

pub struct SerialTransportProvider;

impl TransportProvider for SerialTransportProvider {
    type Transport = dyn SerialPort;

    fn connect(&self, port_path: &str) -> Result<Box<Self::Transport>, SharedError> {
        crate::transport::open_serial_port(port_path)
    }
}

pub fn select_port(cli: &Cli) -> Result<String, SharedError> {
    match &cli.port {
        Some(port) => Ok(port.clone()),
        None => detect_first_serial_port(cli.any_port),
    }
}

pub fn connect_transport<P>(
    cli: &Cli,
    transport_provider: &P,
) -> Result<Box<P::Transport>, SharedError>
where
    P: TransportProvider,
{
    let port_path = select_port(cli)?;
    log::info!("connecting to door controller on {port_path}");
    transport_provider.connect(&port_path)
}

/// Run a parsed command. Only `set-time` touches the serial port.
pub fn execute<P, W>(cli: Cli, transport_provider: &P, out: &mut W) -> Result<(), SharedError>
where
    P: TransportProvider,
    W: Write,
{
    match &cli.command {
        Command::SetTime(args) => {
            let mut transport = connect_transport(&cli, transport_provider)?;
            commands::set_time::run(&mut *transport, args, out)?;
            Ok(())
        }
        Command::Code(args) => commands::code::run(args, out),
        Command::Verify(args) => {
            if commands::verify::run(args, out)? {
                Ok(())
            } else {
                Err(SharedError::CodeMismatch)
            }
        }
        Command::Uri(args) => commands::uri::run(args, out),
    }
}
