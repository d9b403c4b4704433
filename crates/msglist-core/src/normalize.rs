//! Message normalization
//!
//! Fills in the envelope fields a draft left out and decides whether the
//! message gets a time divider. The divider decision reads and advances the
//! grouping clock, so drafts must be normalized in display order.

use tracing::trace;

use crate::clock::{GroupingClock, TimeSource};
use crate::ids::IdGenerator;
use crate::message::{Message, MessageDraft};
use crate::types::{MessageId, Timestamp};

/// Turns drafts into messages.
///
/// Owns the grouping clock and the two external collaborators normalization
/// needs: an id generator and a time source.
pub struct Normalizer {
    clock: GroupingClock,
    time_gap_ms: i64,
    ids: Box<dyn IdGenerator>,
    time: Box<dyn TimeSource>,
}

impl Normalizer {
    pub fn new(
        clock: GroupingClock,
        time_gap_ms: i64,
        ids: Box<dyn IdGenerator>,
        time: Box<dyn TimeSource>,
    ) -> Self {
        Self {
            clock,
            time_gap_ms,
            ids,
            time,
        }
    }

    /// Build a message from `draft`.
    ///
    /// Id priority: `id_override`, then the draft's own id, then a generated one.
    pub fn make_msg<P>(&mut self, draft: MessageDraft<P>, id_override: Option<MessageId>) -> Message<P> {
        let created_at = draft.created_at.unwrap_or_else(|| self.time.now_millis());
        let has_time = self.clock.observe(created_at, draft.has_time, self.time_gap_ms);
        let id = match id_override.or(draft.id) {
            Some(id) => id,
            None => self.ids.generate(),
        };

        trace!(%id, created_at, has_time, "Normalized message");

        Message {
            id,
            created_at,
            position: draft.position.unwrap_or_default(),
            has_time,
            payload: draft.payload,
        }
    }

    /// A fresh id from the generator.
    pub fn generate_id(&mut self) -> MessageId {
        self.ids.generate()
    }

    pub fn now_millis(&self) -> Timestamp {
        self.time.now_millis()
    }

    pub fn clock(&self) -> &GroupingClock {
        &self.clock
    }

    pub fn time_gap_ms(&self) -> i64 {
        self.time_gap_ms
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("clock", &self.clock)
            .field("time_gap_ms", &self.time_gap_ms)
            .finish_non_exhaustive()
    }
}
