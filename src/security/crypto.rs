//! Cryptographic utilities.
//!
//! Provides cookie signing and signed-token encoding.

pub mod cookie;
pub mod signer;

pub use cookie::{SecureCookieCodec, unix_now};
pub use signer::Signer;
