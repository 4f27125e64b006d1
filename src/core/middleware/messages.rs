//! Status messages shown to the user.

use serde::{Deserialize, Serialize};

/// Session key holding flashed status messages.
pub const MESSAGES_KEY: &str = "_messages";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Common values are "success", "error", "info" or "alert".
    pub level: String,
    pub title: Option<String>,
    pub body: String,
    /// Seconds the message stays visible. `None` keeps it until dismissed.
    pub life: Option<u64>,
}

impl Message {
    #[must_use]
    pub fn new(level: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            title: None,
            body: body.into(),
            life: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_life(mut self, life: u64) -> Self {
        self.life = Some(life);
        self
    }
}
