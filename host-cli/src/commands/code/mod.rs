use std::io::Write;

use shared::error::SharedError;
use shared::totp::{current_code, remaining_seconds};

use crate::CodeArgs;
use crate::commands::{load_secret, resolve_time};

pub fn run<W: Write>(args: &CodeArgs, out: &mut W) -> Result<(), SharedError> {
    let secret = load_secret(&args.secret)?;
    let unix_time = resolve_time(args.time)?;
    let code = current_code(&secret, unix_time)?;
    writeln!(
        out,
        "{code} (valid for {}s)",
        remaining_seconds(unix_time)
    )?;
    Ok(())
}
