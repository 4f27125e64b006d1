//! Session data.
//!
//! A string-keyed JSON map that records whether it has been changed since it
//! was loaded, with flash messages layered on top.

use serde_json::{Map, Value};

/// Key under which flash messages are stored by default.
pub const FLASH_KEY: &str = "_flash";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    data: Map<String, Value>,
    modified: bool,
}

impl Session {
    /// Creates an empty, unmodified session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps previously persisted data. The result is unmodified.
    #[must_use]
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self {
            data,
            modified: false,
        }
    }

    /// Whether any mutation happened since the session was loaded.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Forces the session to be persisted on save.
    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns a mutable reference to the value under `key`.
    ///
    /// The session is marked modified when the key exists, since changes
    /// through the reference cannot be observed.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let value = self.data.get_mut(key);
        if value.is_some() {
            self.modified = true;
        }
        value
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.modified = true;
        self.data.insert(key.into(), value.into())
    }

    /// Removes `key`, returning its value. Removing an absent key is not a
    /// modification.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let value = self.data.remove(key);
        if value.is_some() {
            self.modified = true;
        }
        value
    }

    /// Returns the value under `key`, inserting `default` first if absent.
    pub fn get_or_insert(&mut self, key: impl Into<String>, default: impl Into<Value>) -> &mut Value {
        self.modified = true;
        self.data.entry(key.into()).or_insert_with(|| default.into())
    }

    pub fn clear(&mut self) {
        self.modified = true;
        self.data.clear();
    }

    /// Borrows the plain mapping, as persisted by backends.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.data
    }

    /// Appends a flash message under the default flash key.
    pub fn add_flash(&mut self, value: impl Into<Value>) {
        self.add_flash_with_key(FLASH_KEY, value);
    }

    /// Appends a flash message under `key`.
    ///
    /// A non-list value already stored under `key` becomes the first element
    /// of the list.
    pub fn add_flash_with_key(&mut self, key: &str, value: impl Into<Value>) {
        let slot = self.get_or_insert(key, Value::Array(Vec::new()));
        match slot {
            Value::Array(flashes) => flashes.push(value.into()),
            other => {
                let previous = other.take();
                *other = Value::Array(vec![previous, value.into()]);
            }
        }
    }

    /// Returns and clears the flash messages under the default flash key.
    pub fn get_flashes(&mut self) -> Vec<Value> {
        self.get_flashes_with_key(FLASH_KEY)
    }

    /// Returns and clears the flash messages under `key`.
    ///
    /// Returns an empty list without modifying the session if nothing was
    /// flashed.
    pub fn get_flashes_with_key(&mut self, key: &str) -> Vec<Value> {
        match self.remove(key) {
            Some(Value::Array(flashes)) => flashes,
            Some(value) => vec![value],
            None => Vec::new(),
        }
    }
}

impl From<Map<String, Value>> for Session {
    fn from(data: Map<String, Value>) -> Self {
        Self::from_map(data)
    }
}
