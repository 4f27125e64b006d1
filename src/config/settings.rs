//! Configuration settings.
//!
//! Defines the main `Config` struct, default cookie options, and environment
//! variable loading logic.

use super::error::{Result, SessionError};
use std::env;
use std::fmt;
use std::sync::Arc;

/// Backend used when a caller does not name one.
pub const DEFAULT_BACKEND: &str = "securecookie";
/// Cookie name used when a caller does not name one.
pub const DEFAULT_COOKIE_NAME: &str = "session";

fn get_env(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SessionError::Config(format!("{key} must be set in environment")))
}

fn get_env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn get_env_bool(key: &str) -> bool {
    env::var(key)
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(false)
}

fn get_env_opt_bool(key: &str) -> Option<bool> {
    get_env_opt(key).map(|v| v.to_lowercase() == "true" || v == "1")
}

fn get_env_opt_u64(key: &str) -> Result<Option<u64>> {
    get_env_opt(key)
        .map(|s| {
            s.parse()
                .map_err(|_| SessionError::Config(format!("{key} must be a valid u64")))
        })
        .transpose()
}

/// Options applied when a cookie is written to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie lifetime in seconds. `None` makes it a browser-session cookie.
    pub max_age: Option<u64>,
    /// Domain the cookie is scoped to. `None` keeps it on the current host.
    pub domain: Option<String>,
    /// Path the cookie is valid for.
    pub path: String,
    /// Restrict the cookie to HTTPS when `Some(true)`.
    pub secure: Option<bool>,
    /// Hide the cookie from client-side scripts.
    pub httponly: bool,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            max_age: None,
            domain: None,
            path: "/".to_string(),
            secure: None,
            httponly: false,
        }
    }
}

impl CookieOptions {
    /// Returns a copy of these options with every field set in `overrides`
    /// replaced.
    #[must_use]
    pub fn merged(&self, overrides: &CookieOverrides) -> Self {
        Self {
            max_age: overrides.max_age.unwrap_or(self.max_age),
            domain: overrides
                .domain
                .clone()
                .unwrap_or_else(|| self.domain.clone()),
            path: overrides.path.clone().unwrap_or_else(|| self.path.clone()),
            secure: overrides.secure.unwrap_or(self.secure),
            httponly: overrides.httponly.unwrap_or(self.httponly),
        }
    }
}

/// Per-call cookie option overrides. Unset fields keep the configured value.
///
/// Optional fields use a nested `Option` so an override can clear a
/// configured value, e.g. `max_age: Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOverrides {
    pub max_age: Option<Option<u64>>,
    pub domain: Option<Option<String>>,
    pub path: Option<String>,
    pub secure: Option<Option<bool>>,
    pub httponly: Option<bool>,
}

impl From<&CookieOptions> for CookieOverrides {
    fn from(options: &CookieOptions) -> Self {
        Self {
            max_age: Some(options.max_age),
            domain: Some(options.domain.clone()),
            path: Some(options.path.clone()),
            secure: Some(options.secure),
            httponly: Some(options.httponly),
        }
    }
}

impl CookieOverrides {
    #[must_use]
    pub fn max_age(mut self, max_age: u64) -> Self {
        self.max_age = Some(Some(max_age));
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(Some(domain.into()));
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(Some(secure));
        self
    }

    #[must_use]
    pub fn httponly(mut self, httponly: bool) -> Self {
        self.httponly = Some(httponly);
        self
    }
}

/// Session configuration.
#[derive(Clone)]
pub struct Config {
    /// Secret key for session cookie signing.
    pub secret_key: String,
    /// Backend used when none is requested.
    pub default_backend: String,
    /// Name of the cookie holding the default session.
    pub cookie_name: String,
    /// Maximum age in seconds of signed cookie contents. `None` disables expiry.
    pub session_max_age: Option<u64>,
    /// Default options for every cookie written by a session store.
    pub cookie_args: CookieOptions,
    /// Logging format: "json" or "pretty".
    pub log_format: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &"<redacted>")
            .field("default_backend", &self.default_backend)
            .field("cookie_name", &self.cookie_name)
            .field("session_max_age", &self.session_max_age)
            .field("cookie_args", &self.cookie_args)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Creates a configuration with default settings and the given secret.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingSecret` if `secret_key` is empty.
    pub fn new(secret_key: impl Into<String>) -> Result<Self> {
        let secret_key = secret_key.into();
        if secret_key.is_empty() {
            return Err(SessionError::MissingSecret);
        }

        Ok(Self {
            secret_key,
            default_backend: DEFAULT_BACKEND.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            session_max_age: None,
            cookie_args: CookieOptions::default(),
            log_format: "json".to_string(),
        })
    }

    #[must_use]
    pub fn with_default_backend(mut self, backend: impl Into<String>) -> Self {
        self.default_backend = backend.into();
        self
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_max_age(mut self, max_age: Option<u64>) -> Self {
        self.session_max_age = max_age;
        self
    }

    #[must_use]
    pub fn with_cookie_args(mut self, cookie_args: CookieOptions) -> Self {
        self.cookie_args = cookie_args;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SESSION_SECRET` is missing or if any of
    /// `SESSION_MAX_AGE` or `SESSION_COOKIE_MAX_AGE` is not a valid u64.
    pub fn from_env() -> Result<Arc<Self>> {
        let secret_key = get_env("SESSION_SECRET").map_err(|_| SessionError::MissingSecret)?;
        let session_max_age = get_env_opt_u64("SESSION_MAX_AGE")?;
        let cookie_args = CookieOptions {
            max_age: get_env_opt_u64("SESSION_COOKIE_MAX_AGE")?,
            domain: get_env_opt("SESSION_COOKIE_DOMAIN"),
            path: get_env_or("SESSION_COOKIE_PATH", "/"),
            secure: get_env_opt_bool("SESSION_COOKIE_SECURE"),
            httponly: get_env_bool("SESSION_COOKIE_HTTPONLY"),
        };

        Ok(Arc::new(Self {
            secret_key,
            default_backend: get_env_or("SESSION_DEFAULT_BACKEND", DEFAULT_BACKEND),
            cookie_name: get_env_or("SESSION_COOKIE_NAME", DEFAULT_COOKIE_NAME),
            session_max_age,
            cookie_args,
            log_format: get_env_or("LOG_FORMAT", "json"),
        }))
    }

    /// Returns a copy of the default cookie options updated with `overrides`.
    #[must_use]
    pub fn cookie_args(&self, overrides: &CookieOverrides) -> CookieOptions {
        self.cookie_args.merged(overrides)
    }
}
