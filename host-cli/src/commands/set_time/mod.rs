use std::io::Write;
use std::thread;
use std::time::Duration;

use shared::error::SharedError;
use shared::time_sync::{MIN_VALID_UNIX_TIME, TimeSyncError, TimeSyncReply, encode_set_time};

use crate::commands::{DeviceTransport, system_unix_time};
use crate::{MAX_REPLY_LINES, SetTimeArgs};

/// Push a unix time to the door and wait for its confirmation.
pub fn run<P, W>(port: &mut P, args: &SetTimeArgs, out: &mut W) -> Result<u32, SharedError>
where
    P: DeviceTransport + ?Sized,
    W: Write,
{
    let unix_time = if args.system {
        system_unix_time()?
    } else if let Some(value) = args.epoch {
        value
    } else {
        return Err(SharedError::Transport(
            "either --epoch or --system must be provided".into(),
        ));
    };

    if unix_time <= MIN_VALID_UNIX_TIME {
        return Err(TimeSyncError::TooEarly { value: unix_time }.into());
    }

    if args.settle_ms > 0 {
        log::info!("waiting {}ms for the device to boot", args.settle_ms);
        thread::sleep(Duration::from_millis(args.settle_ms));
    }

    port.write_text(&encode_set_time(unix_time))?;
    log::info!("sent set-time request for {unix_time}");

    for _ in 0..MAX_REPLY_LINES {
        let line = port.read_line()?;
        match TimeSyncReply::parse(&line) {
            Some(TimeSyncReply::Set { unix_time: applied }) => {
                writeln!(out, "Device clock set to {applied}")?;
                return Ok(applied);
            }
            Some(TimeSyncReply::Rejected | TimeSyncReply::Locked) => {
                return Err(SharedError::DeviceRejected(line));
            }
            None => log::debug!("console: {line}"),
        }
    }

    Err(SharedError::Transport(format!(
        "no set-time reply within {MAX_REPLY_LINES} console lines"
    )))
}
