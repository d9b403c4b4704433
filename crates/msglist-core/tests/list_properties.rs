//! Behavioural guarantees of MessageListStore
//!
//! One test per documented property of the list: uniqueness, append order,
//! re-sort on update, typing replacement, time-gap grouping, reset and
//! delete of non-members.

use msglist_core::{
    has_unique_ids, ChatPayload, ManualTimeSource, Message, MessageDraft, MessageId,
    MessageListStore, Position, SequentialIdGenerator, TYPING_ID,
};

const T0: i64 = 1_700_000_000_000;
const MINUTE: i64 = 60 * 1000;

// ============================================================================
// Test Utilities
// ============================================================================

fn test_store() -> (MessageListStore, ManualTimeSource) {
    let time = ManualTimeSource::new(T0);
    let store = MessageListStore::builder()
        .id_generator(SequentialIdGenerator::new("gen"))
        .time_source(time.clone())
        .build();
    (store, time)
}

fn draft(id: &str) -> MessageDraft<ChatPayload> {
    MessageDraft::new(ChatPayload::text(format!("text of {}", id))).with_id(id)
}

fn stored(id: &str, created_at: i64) -> Message<ChatPayload> {
    Message {
        id: MessageId::new(id),
        created_at,
        position: Position::Left,
        has_time: false,
        payload: ChatPayload::text(format!("text of {}", id)),
    }
}

fn ids(messages: &[Message<ChatPayload>]) -> Vec<String> {
    messages.iter().map(|m| m.id.to_string()).collect()
}

// ============================================================================
// Properties
// ============================================================================

/// Whatever happens, no two entries share an id
#[test]
fn test_uniqueness_across_operations() {
    let (mut store, time) = test_store();

    store.append_msg(draft("a"));
    store.append_msg(draft("a"));
    store.prepend_msgs(vec![stored("b", T0 - 1), stored("a", T0 - 2), stored("b", T0 - 3)]);
    store.set_typing(true);
    store.set_typing(true);
    time.advance(MINUTE);
    store.update_msg("b", draft("b"));
    store.append_msg(draft("c"));
    store.set_typing(true);
    store.append_msg(draft("c"));

    assert!(has_unique_ids(store.messages()));
    assert_eq!(
        store.messages().iter().filter(|m| m.id.as_str() == TYPING_ID).count(),
        0
    );
}

/// Appends without typing show up as a suffix in append order
#[test]
fn test_append_order_preserved() {
    let (mut store, time) = test_store();
    store.reset_list(vec![stored("x", 1), stored("y", 2)]);

    for id in ["m1", "m2", "m3", "m4"] {
        time.advance(1_000);
        store.append_msg(draft(id));
    }

    assert_eq!(ids(store.messages()), vec!["x", "y", "m1", "m2", "m3", "m4"]);
}

/// Appends keep call order even when timestamps go backwards
#[test]
fn test_append_does_not_sort() {
    let (mut store, _) = test_store();
    store.append_msg(draft("late").created_at(T0 + MINUTE));
    store.append_msg(draft("early").created_at(T0));

    assert_eq!(ids(store.messages()), vec!["late", "early"]);
}

/// [a@10, b@20], update a to t=30 => [b@20, a@30]
#[test]
fn test_update_resorts() {
    let (mut store, _) = test_store();
    store.reset_list(vec![stored("a", 10), stored("b", 20)]);

    let snapshot = store.update_msg("a", MessageDraft::new(ChatPayload::text("a")).created_at(30));

    assert_eq!(ids(&snapshot), vec!["b", "a"]);
    assert_eq!(snapshot[0].created_at, 20);
    assert_eq!(snapshot[1].created_at, 30);
}

/// typing on, then append: the message takes the placeholder's slot
#[test]
fn test_typing_replace_semantics() {
    let (mut store, time) = test_store();
    store.append_msg(draft("before"));
    time.advance(MINUTE);

    let typing = store.set_typing(true);
    let slot = typing.iter().position(|m| m.id.as_str() == TYPING_ID).unwrap();
    time.advance(MINUTE);

    let after = store.append_msg(draft("reply"));

    assert_eq!(after.len(), typing.len());
    assert_eq!(after[slot].id.as_str(), "reply");
    assert!(!store.is_typing());

    let unchanged = store.set_typing(false);
    assert_eq!(ids(&unchanged), ids(&after));
}

/// 10 minutes apart: both grouped; 1 minute apart: second not grouped unless forced
#[test]
fn test_time_gap_grouping() {
    let (mut store, _) = test_store();
    store.append_msg(draft("a").created_at(T0));
    store.append_msg(draft("b").created_at(T0 + 10 * MINUTE));
    store.append_msg(draft("c").created_at(T0 + 11 * MINUTE));
    store.append_msg(draft("d").created_at(T0 + 12 * MINUTE).force_time());

    let flags: Vec<bool> = store.messages().iter().map(|m| m.has_time).collect();
    assert_eq!(flags, vec![true, true, false, true]);
}

/// Resetting twice with the same input gives equal lists
#[test]
fn test_idempotent_reset() {
    let (mut store, _) = test_store();
    let input = vec![stored("a", 1), stored("b", 2), stored("a", 3)];

    let first = store.reset_list(input.clone());
    let second = store.reset_list(input);

    assert_eq!(first, second);
    assert_eq!(ids(&second), vec!["a", "b"]);
}

/// Deleting an unknown id leaves the list structurally equal
#[test]
fn test_delete_non_member() {
    let (mut store, _) = test_store();
    store.reset_list(vec![stored("a", 1), stored("b", 2)]);
    let before = store.snapshot();

    let after = store.delete_msg("ghost");

    assert_eq!(before, after);
}
