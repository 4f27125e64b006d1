//! Error types and result aliases.
//!
//! Defines the core `SessionError` enumeration and common `Result` type.
//! Untrusted cookie input never produces one of these; it is absorbed at the
//! codec boundary and surfaces as an absent value.

use thiserror::Error;

/// Session-layer errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The secret key used to sign cookies is not configured.
    #[error("secret key is required to sign session cookies")]
    MissingSecret,

    /// No backend is registered under the requested name.
    #[error("unknown session backend: {0}")]
    UnknownBackend(String),

    /// A cookie name contains separators, whitespace or control characters.
    #[error("invalid cookie name: {0:?}")]
    InvalidCookieName(String),

    /// A cookie could not be written as a response header.
    #[error("invalid cookie header: {0}")]
    InvalidHeader(String),

    /// A value could not be serialized into a cookie payload.
    #[error("failed to encode cookie value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type alias for `SessionError`.
pub type Result<T> = std::result::Result<T, SessionError>;
