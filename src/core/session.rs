//! Session management.
//!
//! Sessions are loaded lazily per request through pluggable backends and
//! written back in one pass when the request finishes.

mod backend;
mod data;
mod store;

pub use backend::{BackendRegistry, SECURE_COOKIE_BACKEND, SecureCookieBackend, SessionBackend};
pub use data::{FLASH_KEY, Session};
pub use store::{MaxAge, SessionStore};
