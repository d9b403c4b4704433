//! Message envelope types
//!
//! A [`MessageDraft`] is what callers hand to the store: every envelope field
//! is optional. Normalization turns it into a [`Message`], where every
//! envelope field is filled in. The payload rides along untouched.

use serde::{Deserialize, Serialize};

use crate::payload::MessagePayload;
use crate::types::{MessageId, Position, Timestamp};

/// A fully-formed message, ready for display.
///
/// # Example
///
/// ```ignore
/// let message = Message {
///     id: MessageId::new("m-1"),
///     created_at: 1705123456789,
///     position: Position::Right,
///     has_time: true,
///     payload: ChatPayload::text("Hello!"),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message<P> {
    /// Unique identifier, stable for the message's lifetime
    pub id: MessageId,
    /// Unix timestamp in milliseconds
    pub created_at: Timestamp,
    /// Conversation side
    #[serde(default)]
    pub position: Position,
    /// Whether a time divider renders above this message
    #[serde(default)]
    pub has_time: bool,
    /// Opaque payload
    #[serde(flatten)]
    pub payload: P,
}

impl<P: MessagePayload> Message<P> {
    /// Whether this entry is the typing placeholder.
    pub fn is_typing(&self) -> bool {
        self.id.is_typing()
    }

    /// Turn this message back into a draft carrying all of its envelope
    /// fields, e.g. to feed an edited copy to `update_msg`.
    pub fn to_draft(&self) -> MessageDraft<P> {
        MessageDraft {
            id: Some(self.id.clone()),
            created_at: Some(self.created_at),
            position: Some(self.position),
            has_time: self.has_time,
            payload: self.payload.clone(),
        }
    }
}

/// A partial message as supplied by the transport layer or the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Force a time divider regardless of the gap
    #[serde(default)]
    pub has_time: bool,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> MessageDraft<P> {
    pub fn new(payload: P) -> Self {
        Self {
            id: None,
            created_at: None,
            position: None,
            has_time: false,
            payload,
        }
    }

    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Always render a time divider above this message.
    pub fn force_time(mut self) -> Self {
        self.has_time = true;
        self
    }
}
