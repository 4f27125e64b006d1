//! Handler-facing session helpers.
//!
//! Wraps the request's session store with the conveniences request handlers
//! use most: the default session, plain cookies, flashes and status messages.

use super::messages::{MESSAGES_KEY, Message};
use crate::config::{CookieOverrides, Result};
use crate::core::session::{SECURE_COOKIE_BACKEND, Session, SessionStore};
use serde_json::Value;
use tracing::warn;

#[derive(Debug)]
pub struct SessionContext {
    store: SessionStore,
    messages: Option<Vec<Message>>,
}

impl SessionContext {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            messages: None,
        }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> SessionStore {
        self.store
    }

    /// The default session, persisted at the end of the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the default backend is not registered.
    pub fn session(&mut self) -> Result<&mut Session> {
        self.store.session()
    }

    /// See [`SessionStore::get_session`].
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
        self.store.get_session(key, backend, overrides)
    }

    /// See [`SessionStore::set_session`].
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
        self.store.set_session(key, session, backend, overrides)
    }

    /// Returns the tracked secure cookie `key` as a session, so changes are
    /// signed and written back on save.
    ///
    /// # Errors
    ///
    /// Returns an error if the secure cookie backend is not registered.
    pub fn get_secure_cookie(&mut self, key: &str, overrides: &CookieOverrides) -> Result<&mut Session> {
        self.store
            .get_session(Some(key), Some(SECURE_COOKIE_BACKEND), overrides)
    }

    /// # Errors
    ///
    /// Returns an error if `key` is not a valid cookie name.
    pub fn set_cookie(
        &mut self,
        key: &str,
        value: impl Into<String>,
        overrides: &CookieOverrides,
    ) -> Result<()> {
        self.store.set_cookie(key, value, overrides)
    }

    /// # Errors
    ///
    /// Returns an error if `key` is not a valid cookie name.
    pub fn delete_cookie(&mut self, key: &str, overrides: &CookieOverrides) -> Result<()> {
        self.store.delete_cookie(key, overrides)
    }

    /// Returns and clears the default session's flash messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the default backend is not registered.
    pub fn get_flashes(&mut self) -> Result<Vec<Value>> {
        Ok(self.session()?.get_flashes())
    }

    /// # Errors
    ///
    /// Returns an error if the default backend is not registered.
    pub fn get_flashes_with_key(&mut self, key: &str) -> Result<Vec<Value>> {
        Ok(self.session()?.get_flashes_with_key(key))
    }

    /// Flashes `value` in the default session.
    ///
    /// # Errors
    ///
    /// Returns an error if the default backend is not registered.
    pub fn add_flash(&mut self, value: impl Into<Value>) -> Result<()> {
        self.session()?.add_flash(value);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the default backend is not registered.
    pub fn add_flash_with_key(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.session()?.add_flash_with_key(key, value);
        Ok(())
    }

    /// Status messages to display in this response.
    ///
    /// Seeded once per request with the messages flashed by earlier requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the default backend is not registered.
    pub fn messages(&mut self) -> Result<&mut Vec<Message>> {
        if self.messages.is_none() {
            let flashed: Vec<Message> = self
                .session()?
                .get_flashes_with_key(MESSAGES_KEY)
                .into_iter()
                .filter_map(|value| match serde_json::from_value(value) {
                    Ok(message) => Some(message),
                    Err(e) => {
                        warn!(error = %e, "Dropping malformed flashed message");
                        None
                    }
                })
                .collect();
            self.messages = Some(flashed);
        }
        Ok(self.messages.get_or_insert_with(Vec::new))
    }

    /// Adds a status message to this response, or flashes it for the next
    /// one when `flash` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the default backend is not registered or the
    /// message cannot be serialized.
    pub fn set_message(&mut self, message: Message, flash: bool) -> Result<()> {
        if flash {
            let value = serde_json::to_value(&message)?;
            self.add_flash_with_key(MESSAGES_KEY, value)
        } else {
            self.messages()?.push(message);
            Ok(())
        }
    }
}
