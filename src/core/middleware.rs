//! Middleware components.
//!
//! Includes the per-request session middleware, handler helpers, and status
//! messages.

mod context;
mod messages;
mod session;

pub use context::SessionContext;
pub use messages::{MESSAGES_KEY, Message};
pub use session::SessionMiddleware;
