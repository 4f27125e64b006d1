//! Configuration management.
//!
//! Loads session configuration from environment variables using dotenvy, or
//! builds it programmatically. A missing secret fails at construction time.

mod error;
mod settings;

pub use error::{Result, SessionError};
pub use settings::{
    Config, CookieOptions, CookieOverrides, DEFAULT_BACKEND, DEFAULT_COOKIE_NAME,
};
