//! Deduplication by message id

use std::collections::HashSet;

use crate::message::Message;

/// Keep the first occurrence of every id, preserving relative order.
pub fn uniq_by_id<P>(messages: impl IntoIterator<Item = Message<P>>) -> Vec<Message<P>> {
    let messages = messages.into_iter();
    let mut seen = HashSet::with_capacity(messages.size_hint().0);
    messages.filter(|m| seen.insert(m.id.clone())).collect()
}

/// Whether every id in `messages` is distinct.
pub fn has_unique_ids<P>(messages: &[Message<P>]) -> bool {
    let mut seen = HashSet::with_capacity(messages.len());
    messages.iter().all(|m| seen.insert(&m.id))
}
