//! Session backends.
//!
//! A backend decides where a session's data lives between requests. The
//! built-in `securecookie` backend keeps it in a signed cookie; backends
//! that store data server-side and keep only an identifier in the cookie
//! implement the same trait and are added to a [`BackendRegistry`].

use super::data::Session;
use super::store::{MaxAge, SessionStore};
use crate::config::{CookieOptions, Result};
use crate::core::http::CookieSink;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the signed-cookie backend.
pub const SECURE_COOKIE_BACKEND: &str = "securecookie";

pub trait SessionBackend: Send + Sync {
    /// Materializes the session stored under `key` for the current request.
    fn load(&self, store: &SessionStore, key: &str, options: &CookieOptions) -> Session;

    /// Persists `session` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written to the response.
    fn save(
        &self,
        session: &Session,
        response: &mut dyn CookieSink,
        store: &SessionStore,
        key: &str,
        options: &CookieOptions,
    ) -> Result<()>;
}

/// Keeps the whole session in a signed cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureCookieBackend;

impl SessionBackend for SecureCookieBackend {
    fn load(&self, store: &SessionStore, key: &str, _options: &CookieOptions) -> Session {
        match store.get_secure_cookie(key, MaxAge::Configured) {
            Some(Value::Object(data)) => Session::from_map(data),
            _ => Session::new(),
        }
    }

    fn save(
        &self,
        session: &Session,
        response: &mut dyn CookieSink,
        store: &SessionStore,
        key: &str,
        options: &CookieOptions,
    ) -> Result<()> {
        if !session.is_modified() {
            return Ok(());
        }

        store.set_secure_cookie(response, key, session.as_map(), &options.into())
    }
}

/// Backends available to a session store, by name.
#[derive(Clone)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn SessionBackend>>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("BackendRegistry")
            .field("backends", &names)
            .finish()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::empty().with(SECURE_COOKIE_BACKEND, SecureCookieBackend)
    }
}

impl BackendRegistry {
    /// Creates a registry with no backends.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Registers `backend` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, backend: impl SessionBackend + 'static) {
        self.backends.insert(name.into(), Arc::new(backend));
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, backend: impl SessionBackend + 'static) -> Self {
        self.register(name, backend);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn SessionBackend>> {
        self.backends.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }
}
