//! Store configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_TIME_GAP_MS;
use crate::error::{MsgListError, MsgListResult};
use crate::types::Timestamp;

/// Tunables for a [`MessageListStore`](crate::store::MessageListStore).
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// A message more than this many milliseconds after the last divider
    /// gets a divider of its own
    pub time_gap_ms: i64,
    /// Initial value of the grouping clock
    pub clock_start: Timestamp,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            time_gap_ms: DEFAULT_TIME_GAP_MS,
            clock_start: 0,
        }
    }
}

impl StoreConfig {
    pub fn with_time_gap_ms(mut self, time_gap_ms: i64) -> Self {
        self.time_gap_ms = time_gap_ms;
        self
    }

    pub fn with_clock_start(mut self, clock_start: Timestamp) -> Self {
        self.clock_start = clock_start;
        self
    }

    pub fn validate(&self) -> MsgListResult<()> {
        if self.time_gap_ms < 0 {
            return Err(MsgListError::InvalidConfig(format!(
                "timeGapMs must be >= 0 (got {})",
                self.time_gap_ms
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(raw: &str) -> MsgListResult<Self> {
        let config: StoreConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> MsgListResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }
}
