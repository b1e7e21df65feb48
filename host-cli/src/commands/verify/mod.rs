use std::io::Write;

use shared::error::SharedError;
use shared::totp::TotpVerifier;

use crate::VerifyArgs;
use crate::commands::{load_secret, resolve_time};

/// Check a code the way the door would. Returns whether it matched.
pub fn run<W: Write>(args: &VerifyArgs, out: &mut W) -> Result<bool, SharedError> {
    let verifier = TotpVerifier::new(load_secret(&args.secret)?).with_skew(args.skew);
    let unix_time = resolve_time(args.time)?;
    let matched = verifier.verify(unix_time, args.code.trim());
    if matched {
        writeln!(out, "Code accepted")?;
    } else {
        writeln!(out, "Code rejected")?;
    }
    Ok(matched)
}
