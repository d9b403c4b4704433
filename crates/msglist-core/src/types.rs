//! Core envelope types for msglist

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Reserved id of the typing placeholder entry.
pub const TYPING_ID: &str = "_TYPING_";

/// Epoch milliseconds.
pub type Timestamp = i64;

/// Unique identifier for a message
///
/// Opaque string supplied by the transport layer or produced by an
/// [`IdGenerator`](crate::ids::IdGenerator). Stable for the lifetime of the message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a MessageId from any string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The reserved id used by the typing placeholder
    pub fn typing() -> Self {
        Self(TYPING_ID.to_string())
    }

    /// Whether this is the reserved typing id
    pub fn is_typing(&self) -> bool {
        self.0 == TYPING_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for MessageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for MessageId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MessageId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Conversation side a message renders on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Counterpart side (default)
    #[default]
    Left,
    /// Our side
    Right,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Left => f.write_str("left"),
            Position::Right => f.write_str("right"),
        }
    }
}
