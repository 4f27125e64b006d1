//! Library definitions.
//!
//! Exports the signed-cookie codec, the per-request session store, and the
//! middleware that commits sessions at the end of a request.

pub mod config;
pub mod core;
pub mod security;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
pub use crate::config::{Config, CookieOptions, CookieOverrides, Result, SessionError};
pub use crate::core::http::{CookieSink, CookieSource, Request, Response, format_set_cookie};
pub use crate::core::middleware::{Message, SessionContext, SessionMiddleware};
pub use crate::core::session::{
    BackendRegistry, FLASH_KEY, MaxAge, SECURE_COOKIE_BACKEND, SecureCookieBackend, Session,
    SessionBackend, SessionStore,
};
pub use crate::security::crypto::{SecureCookieCodec, Signer};
