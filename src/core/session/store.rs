//! Per-request session store.
//!
//! Tracks every session and plain cookie touched while a request is handled
//! and writes them all to the response in a single `save` call.

use super::backend::{BackendRegistry, SessionBackend};
use super::data::Session;
use crate::config::{Config, CookieOptions, CookieOverrides, Result, SessionError};
use crate::core::http::{CookieSink, CookieSource, validate_cookie_name};
use crate::security::crypto::SecureCookieCodec;
use serde_json::{Map, Value};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Maximum age applied when reading a secure cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxAge {
    /// Use the configured `session_max_age`.
    #[default]
    Configured,
    /// Accept cookies of any age.
    Unlimited,
    /// Reject cookies older than this many seconds.
    Seconds(u64),
}

#[derive(Debug, Clone, Default)]
struct TrackedSession {
    session: Session,
    options: CookieOptions,
}

#[derive(Debug, Clone)]
enum PendingCookie {
    Set(String),
    Delete,
}

pub struct SessionStore {
    config: Arc<Config>,
    request: Box<dyn CookieSource>,
    backends: Arc<BackendRegistry>,
    default_backend: String,
    sessions: BTreeMap<String, BTreeMap<String, TrackedSession>>,
    cookies: BTreeMap<String, (PendingCookie, CookieOptions)>,
    codec: OnceCell<SecureCookieCodec>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("default_backend", &self.default_backend)
            .field("sessions", &self.sessions)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a store for one request using the built-in backends.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is empty or the configured default
    /// backend is not registered.
    pub fn new(config: Arc<Config>, request: impl CookieSource + 'static) -> Result<Self> {
        Self::with_backends(config, request, Arc::new(BackendRegistry::default()))
    }

    /// Creates a store for one request with a custom backend registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is empty or the configured default
    /// backend is not in `backends`.
    pub fn with_backends(
        config: Arc<Config>,
        request: impl CookieSource + 'static,
        backends: Arc<BackendRegistry>,
    ) -> Result<Self> {
        if config.secret_key.is_empty() {
            return Err(SessionError::MissingSecret);
        }
        if !backends.contains(&config.default_backend) {
            return Err(SessionError::UnknownBackend(config.default_backend.clone()));
        }

        Ok(Self {
            default_backend: config.default_backend.clone(),
            config,
            request: Box::new(request),
            backends,
            sessions: BTreeMap::new(),
            cookies: BTreeMap::new(),
            codec: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn default_backend(&self) -> &str {
        &self.default_backend
    }

    /// Signed cookie codec, built on first use.
    fn codec(&self) -> &SecureCookieCodec {
        self.codec
            .get_or_init(|| SecureCookieCodec::new(&self.config.secret_key))
    }

    fn backend(&self, name: &str) -> Result<Arc<dyn SessionBackend>> {
        self.backends
            .get(name)
            .ok_or_else(|| SessionError::UnknownBackend(name.to_string()))
    }

    fn is_tracked(&self, backend: &str, key: &str) -> bool {
        self.sessions
            .get(backend)
            .is_some_and(|sessions| sessions.contains_key(key))
    }

    /// Returns the session for `key` from `backend`, loading it on first use.
    ///
    /// `None` selects the configured cookie name and default backend. Later
    /// calls with the same key and backend return the same session and
    /// ignore `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if `backend` is not registered.
    pub fn get_session(
        &mut self,
        key: Option<&str>,
        backend: Option<&str>,
        overrides: &CookieOverrides,
    ) -> Result<&mut Session> {
        let key = key.unwrap_or(&self.config.cookie_name).to_string();
        let backend_name = backend.unwrap_or(&self.default_backend).to_string();
        let handler = self.backend(&backend_name)?;

        if !self.is_tracked(&backend_name, &key) {
            let options = self.config.cookie_args(overrides);
            let session = handler.load(self, &key, &options);
            debug!(backend = %backend_name, key = %key, "Session loaded");
            self.sessions
                .entry(backend_name.clone())
                .or_default()
                .insert(key.clone(), TrackedSession { session, options });
        }

        Ok(&mut self
            .sessions
            .entry(backend_name)
            .or_default()
            .entry(key)
            .or_default()
            .session)
    }

    /// Returns the default session.
    ///
    /// # Errors
    ///
    /// Returns an error if the default backend is not registered.
    pub fn session(&mut self) -> Result<&mut Session> {
        self.get_session(None, None, &CookieOverrides::default())
    }

    /// Replaces the tracked session for `key`, bypassing the backend's load.
    ///
    /// # Errors
    ///
    /// Returns an error if `backend` is not registered.
    pub fn set_session(
        &mut self,
        key: &str,
        session: Session,
        backend: Option<&str>,
        overrides: &CookieOverrides,
    ) -> Result<()> {
        let backend_name = backend.unwrap_or(&self.default_backend).to_string();
        self.backend(&backend_name)?;
        let options = self.config.cookie_args(overrides);
        self.sessions
            .entry(backend_name)
            .or_default()
            .insert(key.to_string(), TrackedSession { session, options });
        Ok(())
    }

    /// Returns the value of a signed cookie from the request, or `None` if it
    /// is missing, malformed, forged or expired.
    #[must_use]
    pub fn get_secure_cookie(&self, name: &str, max_age: MaxAge) -> Option<Value> {
        let max_age = match max_age {
            MaxAge::Configured => self.config.session_max_age,
            MaxAge::Unlimited => None,
            MaxAge::Seconds(secs) => Some(secs),
        };

        let value = self.request.cookie(name).filter(|v| !v.is_empty())?;
        self.codec().decode(name, value, max_age)
    }

    /// Signs `value` and sets it as cookie `name` on `response`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or the cookie
    /// cannot be written.
    pub fn set_secure_cookie(
        &self,
        response: &mut dyn CookieSink,
        name: &str,
        value: &Map<String, Value>,
        overrides: &CookieOverrides,
    ) -> Result<()> {
        let options = self.config.cookie_args(overrides);
        let token = self.codec().encode(name, value)?;
        response.set_cookie(name, &token, &options)
    }

    /// Stages a plain cookie to be set on save. Values are quoted on the wire
    /// as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not a valid cookie name.
    pub fn set_cookie(
        &mut self,
        key: &str,
        value: impl Into<String>,
        overrides: &CookieOverrides,
    ) -> Result<()> {
        validate_cookie_name(key)?;
        let options = self.config.cookie_args(overrides);
        self.cookies
            .insert(key.to_string(), (PendingCookie::Set(value.into()), options));
        Ok(())
    }

    /// Stages a cookie to be deleted on save.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not a valid cookie name.
    pub fn delete_cookie(&mut self, key: &str, overrides: &CookieOverrides) -> Result<()> {
        validate_cookie_name(key)?;
        let options = self.config.cookie_args(overrides);
        self.cookies
            .insert(key.to_string(), (PendingCookie::Delete, options));
        Ok(())
    }

    /// Cancels a staged set or delete for `key`. Cookies already sent to the
    /// client are not affected.
    pub fn unset_cookie(&mut self, key: &str) {
        self.cookies.remove(key);
    }

    /// Writes all staged cookies and sessions to `response`.
    ///
    /// Tracked state is consumed once every write succeeds, so a second call
    /// writes nothing. On error the state is kept and the whole commit can be
    /// retried against a fresh response.
    ///
    /// # Errors
    ///
    /// Returns an error if a cookie cannot be written or a session fails to
    /// persist.
    pub fn save(&mut self, response: &mut dyn CookieSink) -> Result<()> {
        debug!(
            cookies = self.cookies.len(),
            sessions = self.sessions.values().map(BTreeMap::len).sum::<usize>(),
            "Saving session store"
        );

        for (key, (pending, options)) in &self.cookies {
            match pending {
                PendingCookie::Delete => {
                    response.delete_cookie(key, &options.path, options.domain.as_deref())?;
                }
                PendingCookie::Set(value) => response.set_cookie(key, value, options)?,
            }
        }

        for (backend_name, tracked) in &self.sessions {
            let handler = self.backend(backend_name)?;
            for (key, entry) in tracked {
                handler.save(&entry.session, response, self, key, &entry.options)?;
            }
        }

        self.cookies.clear();
        self.sessions.clear();
        Ok(())
    }
}
