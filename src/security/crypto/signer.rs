//! Keyed signatures over pipe-joined fields.
//!
//! Implements HMAC-SHA1 signing with a constant-time verification helper.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Separator between signed fields, and between the fields of a token.
pub const FIELD_SEPARATOR: char = '|';

#[derive(Clone)]
pub struct Signer {
    secret_key: Vec<u8>,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

impl Signer {
    /// Creates a new `Signer` using the provided secret.
    #[must_use]
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
        }
    }

    /// Signs `parts` joined by `|` and returns the lowercase hex digest.
    ///
    /// # Panics
    ///
    /// Panics if HMAC initialization fails, which cannot happen since HMAC
    /// accepts keys of any length.
    #[must_use]
    pub fn sign(&self, parts: &[&str]) -> String {
        let mut mac = <HmacSha1 as Mac>::new_from_slice(&self.secret_key)
            .expect("HMAC accepts any key size");
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                mac.update(b"|");
            }
            mac.update(part.as_bytes());
        }
        hex::encode(mac.finalize().into_bytes())
    }

    /// Compares two signatures in constant time.
    ///
    /// Unequal lengths return `false` immediately; equal-length inputs are
    /// compared over every byte.
    #[must_use]
    pub fn verify(candidate: &str, expected: &str) -> bool {
        if candidate.len() != expected.len() {
            return false;
        }
        candidate.as_bytes().ct_eq(expected.as_bytes()).into()
    }
}
