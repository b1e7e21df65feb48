use std::io;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;
use shared::enrollment::{DEFAULT_ISSUER, DEFAULT_LABEL};
use shared::error::SharedError;

mod application;
mod commands;
#[cfg(test)]
mod test_support;
mod transport;

const SERIAL_BAUD_RATE: u32 = 115_200;
const DEFAULT_TIMEOUT_SECS: u64 = 2;
/// Console lines skipped while waiting for the set-time reply (boot chatter).
const MAX_REPLY_LINES: usize = 32;
/// Vendor IDs of genuine Arduino boards, preferred when several ports match.
const ARDUINO_USB_VIDS: &[u16] = &[0x2341, 0x2A03];
/// Vendor IDs of the CH340 and FTDI bridges found on clone boards.
const BRIDGE_USB_VIDS: &[u16] = &[0x1A86, 0x0403];

#[derive(Parser, Debug)]
#[command(author, version, about = "TOTP door lock host command line interface")]
pub struct Cli {
    /// Optional path to the serial device. Falls back to auto-detection when omitted.
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Skip USB vendor filtering and accept the first USB serial device.
    #[arg(long, global = true)]
    any_port: bool,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set the door's real-time clock over the serial console.
    SetTime(SetTimeArgs),
    /// Print the code an authenticator shows right now.
    Code(CodeArgs),
    /// Check a code the way the door would.
    Verify(VerifyArgs),
    /// Print the otpauth:// enrollment URI.
    Uri(UriArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SetTimeArgs {
    /// Unix seconds to send to the device.
    #[arg(
        long,
        value_name = "SECS",
        conflicts_with = "system",
        required_unless_present = "system"
    )]
    epoch: Option<u32>,
    /// Use the host system time instead of an explicit value.
    #[arg(long)]
    system: bool,
    /// Pause after opening the port; boards that reset on connect need a few seconds.
    #[arg(long, value_name = "MILLIS", default_value_t = 0)]
    settle_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct CodeArgs {
    /// Shared secret in base32.
    #[arg(long, value_name = "BASE32")]
    secret: String,
    /// Unix seconds to evaluate at instead of now.
    #[arg(long, value_name = "SECS")]
    time: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Shared secret in base32.
    #[arg(long, value_name = "BASE32")]
    secret: String,
    /// Six-digit code to check.
    #[arg(long)]
    code: String,
    /// Unix seconds to evaluate at instead of now.
    #[arg(long, value_name = "SECS")]
    time: Option<u32>,
    /// Neighbouring 30 s steps to accept on each side.
    #[arg(long, default_value_t = 0)]
    skew: u8,
}

#[derive(Args, Debug, Clone)]
pub struct UriArgs {
    /// Shared secret in base32.
    #[arg(long, value_name = "BASE32")]
    secret: String,
    #[arg(long, default_value = DEFAULT_LABEL)]
    label: String,
    #[arg(long, default_value = DEFAULT_ISSUER)]
    issuer: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = io::stdout().lock();
    if let Err(err) = application::execute(cli, &application::SerialTransportProvider, &mut stdout)
    {
        if let SharedError::Transport(_) = &err {
            eprintln!("Transport failure: {err}");
        }
        return Err(anyhow::Error::from(err));
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
