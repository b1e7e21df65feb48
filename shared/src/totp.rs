use alloc::vec::Vec;
use core::fmt;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha1 = Hmac<Sha1>;

/// Duration of a single TOTP window in seconds.
pub const STEP_SECONDS: u32 = 30;
/// Number of decimal digits in every generated code.
pub const CODE_DIGITS: usize = 6;
/// Shortest secret accepted at provisioning time.
pub const MIN_SECRET_LEN: usize = 10;
/// Longest secret accepted at provisioning time.
pub const MAX_SECRET_LEN: usize = 64;

const CODE_MODULUS: u32 = 1_000_000;

/// Errors returned while preparing TOTP material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TotpError {
    #[error("secret must be between 10 and 64 bytes, got {len}")]
    InvalidSecretLength { len: usize },
}

/// Raw HMAC key shared with the authenticator app.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: Vec<u8>,
}

impl SharedSecret {
    /// Copy `bytes` into a new secret, checking the provisioning length bounds.
    pub fn new(bytes: &[u8]) -> Result<Self, TotpError> {
        if !(MIN_SECRET_LEN..=MAX_SECRET_LEN).contains(&bytes.len()) {
            return Err(TotpError::InvalidSecretLength { len: bytes.len() });
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret([redacted; {}])", self.bytes.len())
    }
}

/// Six zero-padded ASCII digits derived from a single time step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TotpCode([u8; CODE_DIGITS]);

impl TotpCode {
    fn from_value(value: u32) -> Self {
        let mut digits = [b'0'; CODE_DIGITS];
        let mut remaining = value % CODE_MODULUS;
        for slot in digits.iter_mut().rev() {
            *slot = b'0' + (remaining % 10) as u8;
            remaining /= 10;
        }
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Compare against user input without branching on the first mismatching digit.
    ///
    /// Inputs of a different length never match; the length itself is not secret.
    pub fn ct_matches(&self, candidate: &str) -> Choice {
        self.0.as_slice().ct_eq(candidate.as_bytes())
    }
}

impl fmt::Display for TotpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counter value for the window containing `unix_time`.
pub const fn time_step(unix_time: u32) -> u64 {
    (unix_time / STEP_SECONDS) as u64
}

/// Seconds until the window containing `unix_time` rolls over.
pub const fn remaining_seconds(unix_time: u32) -> u32 {
    STEP_SECONDS - unix_time % STEP_SECONDS
}

/// Derive the code for an explicit time step (RFC 4226 dynamic truncation over HMAC-SHA1).
pub fn code_for_step(secret: &SharedSecret, step: u64) -> Result<TotpCode, TotpError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|_| TotpError::InvalidSecretLength { len: secret.len() })?;
    mac.update(&step.to_be_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(TotpCode::from_value(truncate(digest.as_slice())))
}

/// Code that an authenticator app shows at `unix_time`.
pub fn current_code(secret: &SharedSecret, unix_time: u32) -> Result<TotpCode, TotpError> {
    code_for_step(secret, time_step(unix_time))
}

/// Check `candidate` against the single window containing `unix_time`.
pub fn verify(secret: &SharedSecret, unix_time: u32, candidate: &str) -> bool {
    verify_window(secret, unix_time, candidate, 0)
}

fn verify_window(secret: &SharedSecret, unix_time: u32, candidate: &str, skew_steps: u8) -> bool {
    let step = time_step(unix_time);
    let first = step.saturating_sub(u64::from(skew_steps));
    let last = step.saturating_add(u64::from(skew_steps));

    // Every window in range is evaluated so timing does not reveal which one matched.
    let mut matched = Choice::from(0);
    for window in first..=last {
        match code_for_step(secret, window) {
            Ok(code) => matched |= code.ct_matches(candidate),
            Err(_) => return false,
        }
    }
    matched.into()
}

fn truncate(digest: &[u8]) -> u32 {
    let offset = usize::from(digest[digest.len() - 1] & 0x0f);
    let window = [
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ];
    u32::from_be_bytes(window) & 0x7fff_ffff
}

/// Verifier owning the door secret together with its clock-drift policy.
///
/// The default policy accepts only the current window. `with_skew` widens the
/// accepted range to `skew_steps` windows on either side.
#[derive(Clone, Debug)]
pub struct TotpVerifier {
    secret: SharedSecret,
    skew_steps: u8,
}

impl TotpVerifier {
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret,
            skew_steps: 0,
        }
    }

    pub fn with_skew(mut self, skew_steps: u8) -> Self {
        self.skew_steps = skew_steps;
        self
    }

    pub fn skew_steps(&self) -> u8 {
        self.skew_steps
    }

    pub fn secret(&self) -> &SharedSecret {
        &self.secret
    }

    pub fn current_code(&self, unix_time: u32) -> Result<TotpCode, TotpError> {
        current_code(&self.secret, unix_time)
    }

    pub fn verify(&self, unix_time: u32, candidate: &str) -> bool {
        verify_window(&self.secret, unix_time, candidate, self.skew_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DOOR_SECRET: [u8; 10] = [0x73, 0x68, 0x54, 0x47, 0x50, 0x78, 0x69, 0x62, 0x44, 0x6f];

    fn door_secret() -> SharedSecret {
        SharedSecret::new(&DOOR_SECRET).expect("secret")
    }

    #[test]
    fn golden_code_for_door_secret() {
        let code = current_code(&door_secret(), 1_700_000_000).expect("code");
        assert_eq!(code.as_str(), "188439");
    }

    #[test]
    fn rfc6238_sha1_vector_truncated_to_six_digits() {
        let secret = SharedSecret::new(b"12345678901234567890").expect("secret");
        assert_eq!(current_code(&secret, 59).expect("code").as_str(), "287082");
        assert_eq!(
            current_code(&secret, 1_111_111_109).expect("code").as_str(),
            "081804"
        );
        assert_eq!(
            current_code(&secret, 1_234_567_890).expect("code").as_str(),
            "005924"
        );
    }

    #[test]
    fn codes_within_a_window_are_identical() {
        let secret = door_secret();
        let start = current_code(&secret, 1_699_999_980).expect("code");
        let end = current_code(&secret, 1_700_000_009).expect("code");
        assert_eq!(start, end);
        assert_eq!(start.as_str(), "188439");
    }

    #[test]
    fn next_window_code_is_rejected() {
        let secret = door_secret();
        for t in [0, 59, 1_111_111_109, 1_700_000_000, 2_000_000_000, u32::MAX - 30] {
            let next = current_code(&secret, t + STEP_SECONDS).expect("code");
            assert!(!verify(&secret, t, next.as_str()), "t = {t}");
        }
    }

    #[test]
    fn rejects_wrong_length_and_garbage() {
        let secret = door_secret();
        assert!(!verify(&secret, 1_700_000_000, "18843"));
        assert!(!verify(&secret, 1_700_000_000, "1884390"));
        assert!(!verify(&secret, 1_700_000_000, ""));
        assert!(!verify(&secret, 1_700_000_000, "18843a"));
    }

    #[test]
    fn skew_policy_widens_the_accepted_windows() {
        let exact = TotpVerifier::new(door_secret());
        let tolerant = TotpVerifier::new(door_secret()).with_skew(1);

        // 1700000000 sits 20 s into its window; neighbours are 915651 and 010743.
        assert!(!exact.verify(1_700_000_000, "010743"));
        assert!(!exact.verify(1_700_000_000, "915651"));
        assert!(tolerant.verify(1_700_000_000, "010743"));
        assert!(tolerant.verify(1_700_000_000, "915651"));
        assert!(tolerant.verify(1_700_000_000, "188439"));
    }

    #[test]
    fn skew_at_epoch_does_not_underflow() {
        let verifier = TotpVerifier::new(door_secret()).with_skew(2);
        assert!(verifier.verify(0, "649320"));
    }

    #[test]
    fn rejects_secret_lengths_outside_bounds() {
        assert_eq!(
            SharedSecret::new(&[0u8; 9]),
            Err(TotpError::InvalidSecretLength { len: 9 })
        );
        assert!(SharedSecret::new(&[0u8; 65]).is_err());
        assert!(SharedSecret::new(&[0u8; 64]).is_ok());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", door_secret());
        assert_eq!(rendered, "SharedSecret([redacted; 10])");
    }

    #[test]
    fn remaining_seconds_counts_down_to_rollover() {
        assert_eq!(remaining_seconds(1_700_000_000), 10);
        assert_eq!(remaining_seconds(1_699_999_980), 30);
        assert_eq!(remaining_seconds(1_700_000_009), 1);
    }

    proptest! {
        #[test]
        fn codes_are_six_ascii_digits(
            bytes in proptest::collection::vec(any::<u8>(), 10..=16),
            t in any::<u32>(),
        ) {
            let secret = SharedSecret::new(&bytes).expect("secret");
            let code = current_code(&secret, t).expect("code");
            prop_assert_eq!(code.as_str().len(), CODE_DIGITS);
            prop_assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }

        #[test]
        fn own_code_always_verifies(
            bytes in proptest::collection::vec(any::<u8>(), 10..=16),
            t in any::<u32>(),
        ) {
            let secret = SharedSecret::new(&bytes).expect("secret");
            let code = current_code(&secret, t).expect("code");
            prop_assert!(verify(&secret, t, code.as_str()));
        }
    }
}
