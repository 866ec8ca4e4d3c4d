use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved metadata keys.
pub mod keys {
    /// Key under which the default codec stores the whole payload
    pub const MODEL_KEY: &str = "ModelKey";
}

/// Name of a notification channel.
///
/// Names are opaque: two channels are the same channel exactly when their
/// names compare equal. The name says nothing about the payload type; that
/// pairing lives in a [`NotificationDescriptor`](crate::NotificationDescriptor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationName(String);

impl NotificationName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for NotificationName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Untyped message actually broadcast by a [`BroadcastCenter`](crate::BroadcastCenter).
///
/// An envelope is produced either by a descriptor's `encode` or by an
/// external producer, and consumed by a descriptor's `decode`. The metadata
/// map is deliberately schemaless: each descriptor decides which keys it
/// reads and what shape it expects under them.
///
/// # Fields
///
/// * `name` - Channel the envelope is posted on
/// * `sender` - Optional identity of whoever posted it
/// * `metadata` - String keys to untyped JSON values
/// * `timestamp_ms` - Creation timestamp in milliseconds since epoch
///
/// # Examples
///
/// ```
/// use herald_core::Envelope;
/// use serde_json::json;
///
/// let env = Envelope::new("KeyboardDidShow")
///     .with_sender("window.main")
///     .with_value("begin", json!({"x": 0.0, "y": 0.0}));
///
/// assert_eq!(env.name.as_str(), "KeyboardDidShow");
/// assert_eq!(env.sender.as_deref(), Some("window.main"));
/// assert!(env.value("begin").is_some());
/// assert!(env.value("end").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Channel this envelope belongs to
    pub name: NotificationName,
    /// Logical identity of the poster, if any
    pub sender: Option<String>,
    /// Payload metadata keyed by string
    pub metadata: HashMap<String, Value>,
    /// Creation timestamp in milliseconds since epoch
    pub timestamp_ms: i64,
}

impl Envelope {
    /// Creates an empty envelope on `name`, stamped with the current time.
    pub fn new(name: impl Into<NotificationName>) -> Self {
        Self {
            name: name.into(),
            sender: None,
            metadata: HashMap::new(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Inserts (or overwrites) a metadata value and returns self for chaining.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Sets the sender and returns self for chaining.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Reads a metadata value.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}
