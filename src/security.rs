//! Security modules.
//!
//! Provides the signing primitives behind secure cookies.

pub mod crypto;
