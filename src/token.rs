//! Rotating attendance codes.
//!
//! Codes are what the classroom QR surrogate displays and what students type
//! in manual mode, so they are short lowercase base-36 strings rather than
//! long hex secrets. Generation draws from the caller's RNG so sessions can be
//! replayed from a seed.

use rand::{Rng, RngCore};

/// Length of a generated code.
pub const TOKEN_LEN: usize = 13;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Attempts made to draw a code different from the previous one.
const MAX_DISTINCT_ATTEMPTS: usize = 8;

/// Generate a random base-36 code of `TOKEN_LEN` characters.
#[must_use]
pub fn generate_token<R: RngCore + ?Sized>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Generate a code that differs from `previous`.
///
/// A collision needs 13 identical base-36 draws, so the retry loop only
/// matters for degenerate RNGs; after `MAX_DISTINCT_ATTEMPTS` the last draw is
/// returned as is.
#[must_use]
pub fn next_token<R: RngCore + ?Sized>(rng: &mut R, previous: Option<&str>) -> String {
    let mut token = generate_token(rng);
    for _ in 1..MAX_DISTINCT_ATTEMPTS {
        if previous != Some(token.as_str()) {
            break;
        }
        token = generate_token(rng);
    }
    token
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
