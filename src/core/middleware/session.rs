//! Session middleware.
//!
//! Creates one session store per request and commits it to the response
//! after the handler has run.

use super::context::SessionContext;
use crate::config::{Config, Result};
use crate::core::http::{CookieSink, CookieSource};
use crate::core::session::{BackendRegistry, SessionStore};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SessionMiddleware {
    config: Arc<Config>,
    backends: Arc<BackendRegistry>,
}

impl SessionMiddleware {
    /// Creates a middleware using the built-in backends.
    #[must_use]
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_backends(config, BackendRegistry::default())
    }

    #[must_use]
    pub fn with_backends(config: Arc<Config>, backends: BackendRegistry) -> Self {
        Self {
            config,
            backends: Arc::new(backends),
        }
    }

    /// Creates the session store for an incoming request.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot sign cookies or names an
    /// unregistered default backend.
    pub fn before_dispatch(&self, request: impl CookieSource + 'static) -> Result<SessionStore> {
        SessionStore::with_backends(Arc::clone(&self.config), request, Arc::clone(&self.backends))
    }

    /// Saves every tracked session and cookie to `response`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to write to the response.
    pub fn after_dispatch(&self, store: &mut SessionStore, response: &mut dyn CookieSink) -> Result<()> {
        store.save(response)?;
        debug!("Sessions committed");
        Ok(())
    }

    /// Runs `handler` with a fresh session context, then commits it.
    ///
    /// Nothing is written to `response` if the handler fails.
    ///
    /// # Errors
    ///
    /// Returns the handler's error, or an error from creating or saving the
    /// store.
    pub fn dispatch<T, F>(
        &self,
        request: impl CookieSource + 'static,
        response: &mut dyn CookieSink,
        handler: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut SessionContext) -> Result<T>,
    {
        let mut ctx = SessionContext::new(self.before_dispatch(request)?);
        let output = handler(&mut ctx)?;
        self.after_dispatch(ctx.store_mut(), response)?;
        Ok(output)
    }
}
