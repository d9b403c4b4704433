//! Fallback id generation
//!
//! Drafts without an id get one from an [`IdGenerator`]. The store only
//! relies on ids being effectively unique among live messages; uniqueness
//! within a list is enforced separately by dedup.

use ulid::Ulid;

use crate::types::MessageId;

/// Source of fresh message ids.
pub trait IdGenerator {
    fn generate(&mut self) -> MessageId;
}

/// Random, time-ordered ids (ULID strings). The default generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidIdGenerator;

impl IdGenerator for UlidIdGenerator {
    fn generate(&mut self) -> MessageId {
        MessageId::new(Ulid::new().to_string())
    }
}

/// Deterministic `<prefix>-<n>` ids, for replays and tests.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("msg")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&mut self) -> MessageId {
        let id = MessageId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> MessageId,
{
    fn generate(&mut self) -> MessageId {
        self()
    }
}
