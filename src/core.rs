//! Core session components.
//!
//! Contains the session store, cookie plumbing, and request middleware.

pub mod http;
pub mod middleware;
pub mod session;
