//! The message-list state machine
//!
//! A [`MessageListStore`] owns an ordered, id-unique list of messages and
//! the typing indicator state. Every mutating operation builds a new list
//! and publishes it as an immutable [`ListSnapshot`]; snapshots handed out
//! earlier are never touched again.
//!
//! # Usage
//!
//! ```ignore
//! let mut store = MessageListStore::new();
//!
//! store.append_msg(MessageDraft::new(ChatPayload::text("Hi")).position(Position::Right));
//! store.set_typing(true);
//!
//! // The reply takes the typing placeholder's place
//! let snapshot = store.append_msg(MessageDraft::new(ChatPayload::text("Hello!")));
//! assert!(!store.is_typing());
//! ```

use std::iter;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::{GroupingClock, SystemTimeSource, TimeSource};
use crate::config::StoreConfig;
use crate::dedup::uniq_by_id;
use crate::ids::{IdGenerator, UlidIdGenerator};
use crate::message::{Message, MessageDraft};
use crate::normalize::Normalizer;
use crate::payload::{ChatPayload, MessagePayload};
use crate::types::{MessageId, Timestamp, TYPING_ID};

/// Immutable view of the list, published after every mutation.
pub type ListSnapshot<P> = Arc<[Message<P>]>;

type ChangeListener<P> = Box<dyn FnMut(&ListSnapshot<P>)>;

/// Whether the typing placeholder is in the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypingState {
    #[default]
    Inactive,
    Active,
}

/// Single-owner state container for one chat surface's message list.
pub struct MessageListStore<P = ChatPayload> {
    messages: ListSnapshot<P>,
    typing: TypingState,
    normalizer: Normalizer,
    config: StoreConfig,
    listeners: Vec<ChangeListener<P>>,
}

impl<P: MessagePayload> MessageListStore<P> {
    /// Empty store with default config, ULID ids and wall-clock time.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Store whose list starts with `drafts`, normalized in order.
    pub fn with_initial(drafts: impl IntoIterator<Item = MessageDraft<P>>) -> Self {
        Self::builder().initial(drafts).build()
    }

    pub fn builder() -> StoreBuilder<P> {
        StoreBuilder::new()
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Put already-normalized `msgs` in front of the list.
    ///
    /// On id conflicts the prepended copy wins. Reserved typing ids are
    /// handled as in [`reset_list`](Self::reset_list).
    pub fn prepend_msgs(&mut self, msgs: impl IntoIterator<Item = Message<P>>) -> ListSnapshot<P> {
        let msgs = self.release_reserved_ids(msgs);
        let next = uniq_by_id(msgs.into_iter().chain(self.messages.iter().cloned()));
        debug!(before = self.messages.len(), after = next.len(), "Prepended messages");
        self.publish(next)
    }

    /// Normalize `draft` and add it to the end of the list.
    ///
    /// While the typing indicator is active the new message takes the
    /// placeholder's place instead, the list is re-sorted as in
    /// [`update_msg`](Self::update_msg), and typing becomes inactive. The
    /// message keeps its own id; it does not inherit [`TYPING_ID`].
    pub fn append_msg(&mut self, draft: MessageDraft<P>) -> ListSnapshot<P> {
        let draft = self.release_reserved_id(draft);
        let msg = self.normalizer.make_msg(draft, None);
        self.push_normalized(msg)
    }

    /// Replace the message with `id` by a freshly normalized `draft` that
    /// keeps the same id, then re-sort the whole list by `created_at`.
    ///
    /// An unknown `id` changes nothing but the sort and dedup pass.
    pub fn update_msg(&mut self, id: &str, draft: MessageDraft<P>) -> ListSnapshot<P> {
        let mut next = self.messages.to_vec();
        match next.iter().position(|m| m.id.as_str() == id) {
            Some(idx) => {
                next[idx] = self.normalizer.make_msg(draft, Some(MessageId::new(id)));
                debug!(%id, "Updated message");
            }
            None => debug!(%id, "Update target not in list"),
        }
        self.publish(sort_and_dedup(next))
    }

    /// Remove the message with `id`, if present.
    pub fn delete_msg(&mut self, id: &str) -> ListSnapshot<P> {
        let next = uniq_by_id(self.messages.iter().filter(|m| m.id.as_str() != id).cloned());
        debug!(%id, removed = self.messages.len() - next.len(), "Deleted message");
        self.publish(next)
    }

    /// Replace the whole list with already-normalized `list`.
    ///
    /// An entry carrying [`TYPING_ID`] with a non-typing payload gets a
    /// generated id. A typing placeholder is kept only while typing is
    /// active, otherwise it is dropped.
    pub fn reset_list(&mut self, list: impl IntoIterator<Item = Message<P>>) -> ListSnapshot<P> {
        let list = self.release_reserved_ids(list);
        let next = uniq_by_id(list);
        debug!(len = next.len(), "Reset list");
        self.publish(next)
    }

    /// Show or hide the typing placeholder.
    ///
    /// Asking for the state the store is already in does nothing.
    pub fn set_typing(&mut self, active: bool) -> ListSnapshot<P> {
        match (self.typing, active) {
            (TypingState::Inactive, true) => {
                let draft = MessageDraft::new(P::typing()).with_id(MessageId::typing());
                let placeholder = self.normalizer.make_msg(draft, None);
                let snapshot = self.push_normalized(placeholder);
                self.typing = TypingState::Active;
                debug!("Typing indicator on");
                snapshot
            }
            (TypingState::Active, false) => {
                let snapshot = self.delete_msg(TYPING_ID);
                self.typing = TypingState::Inactive;
                debug!("Typing indicator off");
                snapshot
            }
            _ => self.snapshot(),
        }
    }

    /// Normalize a draft with this store's clock and collaborators without
    /// inserting it, e.g. to build a batch for [`prepend_msgs`](Self::prepend_msgs)
    /// or [`reset_list`](Self::reset_list).
    pub fn normalize(&mut self, draft: MessageDraft<P>) -> Message<P> {
        let draft = self.release_reserved_id(draft);
        self.normalizer.make_msg(draft, None)
    }

    /// Call `listener` with the new snapshot after every mutation.
    pub fn on_change(&mut self, listener: impl FnMut(&ListSnapshot<P>) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn messages(&self) -> &[Message<P>] {
        &self.messages
    }

    /// The current snapshot (shared, not copied).
    pub fn snapshot(&self) -> ListSnapshot<P> {
        Arc::clone(&self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Message<P>> {
        self.messages.iter().find(|m| m.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn typing_state(&self) -> TypingState {
        self.typing
    }

    pub fn is_typing(&self) -> bool {
        self.typing == TypingState::Active
    }

    /// Timestamp of the last message that received a time divider.
    pub fn last_grouped_at(&self) -> Timestamp {
        self.normalizer.clock().last_grouped()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn push_normalized(&mut self, msg: Message<P>) -> ListSnapshot<P> {
        if self.typing == TypingState::Active {
            self.typing = TypingState::Inactive;
            if let Some(idx) = self.messages.iter().position(|m| m.is_typing()) {
                let mut next = self.messages.to_vec();
                debug!(id = %msg.id, "Message replaces typing placeholder");
                next[idx] = msg;
                return self.publish(sort_and_dedup(next));
            }
            debug!("Typing placeholder already gone, appending");
        }

        let next = uniq_by_id(self.messages.iter().cloned().chain(iter::once(msg)));
        self.publish(next)
    }

    /// The reserved typing id belongs to the store; a caller-supplied
    /// draft carrying it gets a generated id instead.
    fn release_reserved_id(&mut self, mut draft: MessageDraft<P>) -> MessageDraft<P> {
        if draft.id.as_ref().is_some_and(MessageId::is_typing) {
            let replacement = self.normalizer.generate_id();
            warn!(%replacement, "Draft used the reserved typing id, assigning a new one");
            draft.id = Some(replacement);
        }
        draft
    }

    fn release_reserved_ids(&mut self, msgs: impl IntoIterator<Item = Message<P>>) -> Vec<Message<P>> {
        let typing = self.typing;
        msgs.into_iter()
            .filter_map(|mut msg| {
                if !msg.is_typing() {
                    return Some(msg);
                }
                if msg.payload.is_typing() {
                    if typing == TypingState::Active {
                        return Some(msg);
                    }
                    warn!("Dropping typing placeholder while typing is inactive");
                    return None;
                }
                let replacement = self.normalizer.generate_id();
                warn!(%replacement, "Message used the reserved typing id, assigning a new one");
                msg.id = replacement;
                Some(msg)
            })
            .collect()
    }

    fn publish(&mut self, next: Vec<Message<P>>) -> ListSnapshot<P> {
        self.messages = Arc::from(next);
        for listener in &mut self.listeners {
            listener(&self.messages);
        }
        self.snapshot()
    }
}

impl<P: MessagePayload> Default for MessageListStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for MessageListStore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageListStore")
            .field("len", &self.messages.len())
            .field("typing", &self.typing)
            .field("normalizer", &self.normalizer)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Stable sort by `created_at`, then dedup.
fn sort_and_dedup<P>(mut messages: Vec<Message<P>>) -> Vec<Message<P>> {
    messages.sort_by_key(|m| m.created_at);
    uniq_by_id(messages)
}

/// Configures and builds a [`MessageListStore`].
pub struct StoreBuilder<P = ChatPayload> {
    config: StoreConfig,
    clock: Option<GroupingClock>,
    ids: Option<Box<dyn IdGenerator>>,
    time: Option<Box<dyn TimeSource>>,
    initial: Vec<MessageDraft<P>>,
}

impl<P: MessagePayload> StoreBuilder<P> {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            clock: None,
            ids: None,
            time: None,
            initial: Vec::new(),
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `clock` instead of a store-owned one starting at
    /// `config.clock_start`. Pass clones of a [`GroupingClock::shared`]
    /// handle to make several stores group against one clock.
    pub fn grouping_clock(mut self, clock: GroupingClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Some(Box::new(time));
        self
    }

    /// Drafts the list starts with, normalized in order at build time.
    pub fn initial(mut self, drafts: impl IntoIterator<Item = MessageDraft<P>>) -> Self {
        self.initial.extend(drafts);
        self
    }

    /// A config that fails validation is clamped (negative gap becomes 0).
    pub fn build(mut self) -> MessageListStore<P> {
        if let Err(err) = self.config.validate() {
            warn!(%err, "Invalid store config, clamping time gap to 0");
            self.config.time_gap_ms = self.config.time_gap_ms.max(0);
        }

        let clock = self
            .clock
            .unwrap_or_else(|| GroupingClock::local(self.config.clock_start));
        let ids = self.ids.unwrap_or_else(|| Box::new(UlidIdGenerator));
        let time = self.time.unwrap_or_else(|| Box::new(SystemTimeSource));

        let mut store = MessageListStore {
            messages: Arc::from(Vec::new()),
            typing: TypingState::Inactive,
            normalizer: Normalizer::new(clock, self.config.time_gap_ms, ids, time),
            config: self.config,
            listeners: Vec::new(),
        };

        if !self.initial.is_empty() {
            let initial: Vec<_> = self
                .initial
                .into_iter()
                .map(|draft| store.normalize(draft))
                .collect();
            store.messages = Arc::from(uniq_by_id(initial));
        }
        store
    }
}

impl<P: MessagePayload> Default for StoreBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
