//! Time sources and the grouping clock
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  TimeSource: "now" in epoch millis                              │
//! │  ├── SystemTimeSource: wall clock (chrono)                      │
//! │  └── ManualTimeSource: set/advanced by hand (replays, tests)    │
//! │                                                                 │
//! │  GroupingClock: last timestamp that received a time divider     │
//! │  ├── Local: owned by one store                                  │
//! │  └── Shared: one value behind a lock, handed to several stores  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::Timestamp;

/// Gap after which the next message gets a time divider (5 minutes).
pub const DEFAULT_TIME_GAP_MS: i64 = 5 * 60 * 1000;

/// Source of the current time, in epoch milliseconds.
pub trait TimeSource {
    fn now_millis(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A time source that only moves when told to.
///
/// Clones share the same underlying instant, so a host can keep one handle
/// and give another to the store.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicI64>,
}

impl ManualTimeSource {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        self.now.store(ts, Ordering::SeqCst);
    }

    /// Move forward by `millis` and return the new instant. Saturates at
    /// the ends of the `i64` range.
    pub fn advance(&self, millis: i64) -> Timestamp {
        let step = |now: Timestamp| Some(now.saturating_add(millis));
        match self.now.fetch_update(Ordering::SeqCst, Ordering::SeqCst, step) {
            Ok(prev) | Err(prev) => prev.saturating_add(millis),
        }
    }
}

impl TimeSource for ManualTimeSource {
    fn now_millis(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// The "last grouped timestamp" used to decide `has_time`.
///
/// A `Local` clock belongs to a single store. A `Shared` clock couples every
/// store holding a clone of it: a divider granted in one store moves the
/// clock for all of them.
#[derive(Debug, Clone)]
pub enum GroupingClock {
    Local(Timestamp),
    Shared(Arc<Mutex<Timestamp>>),
}

impl GroupingClock {
    /// A store-owned clock starting at `start`.
    pub fn local(start: Timestamp) -> Self {
        GroupingClock::Local(start)
    }

    /// A clock meant to be cloned into several stores.
    pub fn shared(start: Timestamp) -> Self {
        GroupingClock::Shared(Arc::new(Mutex::new(start)))
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, GroupingClock::Shared(_))
    }

    /// Timestamp of the last message that received a divider.
    pub fn last_grouped(&self) -> Timestamp {
        match self {
            GroupingClock::Local(ts) => *ts,
            GroupingClock::Shared(ts) => *ts.lock(),
        }
    }

    /// Decide whether a message created at `created_at` gets a divider, and
    /// advance the clock when it does.
    ///
    /// The read and the advance happen under one lock for shared clocks.
    pub fn observe(&mut self, created_at: Timestamp, forced: bool, gap: i64) -> bool {
        match self {
            GroupingClock::Local(last) => decide(last, created_at, forced, gap),
            GroupingClock::Shared(last) => decide(&mut last.lock(), created_at, forced, gap),
        }
    }
}

impl Default for GroupingClock {
    fn default() -> Self {
        GroupingClock::local(0)
    }
}

fn decide(last: &mut Timestamp, created_at: Timestamp, forced: bool, gap: i64) -> bool {
    let has_time = forced || created_at.saturating_sub(*last) > gap;
    if has_time {
        *last = created_at;
    }
    has_time
}
