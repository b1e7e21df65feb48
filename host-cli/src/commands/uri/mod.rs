use std::io::Write;

use shared::enrollment::build_uri;
use shared::error::SharedError;

use crate::UriArgs;
use crate::commands::load_secret;

pub fn run<W: Write>(args: &UriArgs, out: &mut W) -> Result<(), SharedError> {
    let secret = load_secret(&args.secret)?;
    writeln!(out, "{}", build_uri(&secret, &args.label, &args.issuer))?;
    Ok(())
}
