//! Signed cookie values.
//!
//! Encodes JSON values into timestamped, HMAC-signed tokens of the form
//! `base64(json)|timestamp|signature` and validates them on the way back.

use super::signer::{FIELD_SEPARATOR, Signer};
use crate::config::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Current Unix time in whole seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Debug, Clone)]
pub struct SecureCookieCodec {
    signer: Signer,
}

impl SecureCookieCodec {
    /// Creates a new codec signing with `secret_key`.
    #[must_use]
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            signer: Signer::new(secret_key),
        }
    }

    /// Signs and timestamps `value` so it cannot be forged.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized to JSON.
    pub fn encode<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<String> {
        self.encode_at(name, value, unix_now())
    }

    /// Same as [`encode`](Self::encode) with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized to JSON.
    pub fn encode_at<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
        timestamp: u64,
    ) -> Result<String> {
        let payload = STANDARD.encode(serde_json::to_vec(value)?);
        let timestamp = timestamp.to_string();
        let signature = self.signer.sign(&[name, &payload, &timestamp]);
        Ok(format!(
            "{payload}{FIELD_SEPARATOR}{timestamp}{FIELD_SEPARATOR}{signature}"
        ))
    }

    /// Returns the value in `token` if it validates, or `None`.
    ///
    /// Malformed, forged and expired tokens all yield `None`.
    #[must_use]
    pub fn decode(&self, name: &str, token: &str, max_age: Option<u64>) -> Option<Value> {
        self.decode_at(name, token, max_age, unix_now())
    }

    /// Same as [`decode`](Self::decode) evaluated at time `now`.
    #[must_use]
    pub fn decode_at(
        &self,
        name: &str,
        token: &str,
        max_age: Option<u64>,
        now: u64,
    ) -> Option<Value> {
        let parts: Vec<&str> = token.split(FIELD_SEPARATOR).collect();
        let [payload, timestamp, signature] = parts[..] else {
            warn!(cookie = name, fields = parts.len(), "Malformed signed cookie");
            return None;
        };

        let expected = self.signer.sign(&[name, payload, timestamp]);
        if !Signer::verify(signature, &expected) {
            warn!(cookie = name, "Invalid cookie signature");
            return None;
        }

        let Ok(issued_at) = timestamp.parse::<u64>() else {
            warn!(cookie = name, "Invalid cookie timestamp");
            return None;
        };

        if let Some(max_age) = max_age {
            if issued_at < now.saturating_sub(max_age) {
                warn!(cookie = name, issued_at, max_age, "Expired cookie");
                return None;
            }
        }

        let Ok(raw) = STANDARD.decode(payload) else {
            warn!(cookie = name, "Cookie value failed to be decoded");
            return None;
        };

        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(cookie = name, error = %e, "Cookie value failed to be decoded");
                None
            }
        }
    }
}
