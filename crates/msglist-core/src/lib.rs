//! msglist core library
//!
//! In-memory state of a chronological chat message list: insertion,
//! deduplication, ordered re-insertion on update, deletion, bulk reset and
//! a transient typing indicator.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  MessageListStore (store)                                       │
//! │  - ordered, id-unique list published as immutable snapshots     │
//! │  - typing placeholder state machine                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Normalizer (normalize)                                         │
//! │  - fills id / createdAt / position, decides hasTime             │
//! │  - GroupingClock, IdGenerator, TimeSource                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  uniq_by_id (dedup): first occurrence wins, order kept          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use msglist_core::{ChatPayload, MessageDraft, MessageListStore, Position};
//!
//! let mut store = MessageListStore::new();
//! store.append_msg(MessageDraft::new(ChatPayload::text("Hi")).position(Position::Right));
//! store.set_typing(true);
//! let snapshot = store.append_msg(MessageDraft::new(ChatPayload::text("Hello!")));
//!
//! for msg in snapshot.iter() {
//!     println!("{} {}", msg.id, if msg.has_time { "(divider)" } else { "" });
//! }
//! ```

pub mod clock;
pub mod config;
pub mod dedup;
pub mod error;
pub mod ids;
pub mod message;
pub mod normalize;
pub mod payload;
pub mod replay;
pub mod store;
pub mod types;

// Re-exports
pub use clock::{GroupingClock, ManualTimeSource, SystemTimeSource, TimeSource, DEFAULT_TIME_GAP_MS};
pub use config::StoreConfig;
pub use dedup::{has_unique_ids, uniq_by_id};
pub use error::{MsgListError, MsgListResult};
pub use ids::{IdGenerator, SequentialIdGenerator, UlidIdGenerator};
pub use message::{Message, MessageDraft};
pub use normalize::Normalizer;
pub use payload::{ChatPayload, MessageContent, MessagePayload, Sender};
pub use replay::{ReplayReport, ReplayStep, Script, ScriptOp};
pub use store::{ListSnapshot, MessageListStore, StoreBuilder, TypingState};
pub use types::{MessageId, Position, Timestamp, TYPING_ID};
