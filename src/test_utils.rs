//! Test utilities and shared configuration.
//!
//! This module provides common helpers for unit tests, reducing duplication
//! across the codebase.

#[cfg(any(test, feature = "testing"))]
use crate::config::{Config, CookieOptions};
#[cfg(any(test, feature = "testing"))]
use std::sync::Arc;

/// Secret used by [`create_test_config`].
#[cfg(any(test, feature = "testing"))]
pub const TEST_SECRET: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Creates a standard configuration for testing purposes.
///
/// This configuration has:
/// - The `securecookie` default backend
/// - Cookie name `session`
/// - No session expiry
/// - Default cookie options (path `/`)
#[cfg(any(test, feature = "testing"))]
#[must_use]
pub fn create_test_config() -> Arc<Config> {
    Arc::new(Config {
        secret_key: TEST_SECRET.to_string(),
        default_backend: "securecookie".to_string(),
        cookie_name: "session".to_string(),
        session_max_age: None,
        cookie_args: CookieOptions::default(),
        log_format: "pretty".to_string(),
    })
}
