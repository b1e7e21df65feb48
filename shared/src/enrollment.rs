//! Provisioning URIs consumed by authenticator apps.
use alloc::{format, string::String};

use data_encoding::BASE32_NOPAD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use zeroize::Zeroizing;

use crate::totp::{SharedSecret, TotpError};

/// Account label shown by authenticator apps.
pub const DEFAULT_LABEL: &str = "Door:Lock";
/// Issuer shown by authenticator apps.
pub const DEFAULT_ISSUER: &str = "TOTPLock";

const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
// `issuer:account` is the conventional label layout, so the colon stays literal.
const LABEL: &AsciiSet = &UNRESERVED.remove(b':');

/// Errors returned while decoding a textual secret.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentError {
    #[error("secret is not valid base32")]
    InvalidBase32,
    #[error(transparent)]
    Secret(#[from] TotpError),
}

/// RFC 4648 base32 without padding.
pub fn encode_secret(bytes: &[u8]) -> String {
    BASE32_NOPAD.encode(bytes)
}

/// Decode a base32 secret as typed by a user: whitespace and case are ignored.
pub fn decode_secret(text: &str) -> Result<SharedSecret, EnrollmentError> {
    let normalized: String = text
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    let bytes = Zeroizing::new(
        BASE32_NOPAD
            .decode(normalized.trim_end_matches('=').as_bytes())
            .map_err(|_| EnrollmentError::InvalidBase32)?,
    );
    Ok(SharedSecret::new(bytes.as_slice())?)
}

/// Build the `otpauth://totp/` URI handed to the QR renderer.
pub fn build_uri(secret: &SharedSecret, label: &str, issuer: &str) -> String {
    format!(
        "otpauth://totp/{label}?secret={secret}&issuer={issuer}",
        label = utf8_percent_encode(label, LABEL),
        secret = encode_secret(secret.as_bytes()),
        issuer = utf8_percent_encode(issuer, UNRESERVED),
    )
}

/// URI using the stock door label and issuer.
pub fn default_uri(secret: &SharedSecret) -> String {
    build_uri(secret, DEFAULT_LABEL, DEFAULT_ISSUER)
}
