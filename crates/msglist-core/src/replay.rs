//! Scripted replay of store operations
//!
//! A [`Script`] is a JSON document listing store operations in order. It runs
//! against a fresh store driven by a [`ManualTimeSource`] and deterministic
//! ids, so the same script always produces the same timeline.
//!
//! ```json
//! {
//!   "config": { "timeGapMs": 300000 },
//!   "startTime": 1700000000000,
//!   "ops": [
//!     { "op": "append", "message": { "type": "text", "content": { "text": "hi" } } },
//!     { "op": "advance", "millis": 60000 },
//!     { "op": "typing", "active": true },
//!     { "op": "append", "message": { "id": "r1", "type": "text", "content": { "text": "yo" } } }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{ManualTimeSource, TimeSource};
use crate::config::StoreConfig;
use crate::error::{MsgListError, MsgListResult};
use crate::ids::SequentialIdGenerator;
use crate::message::{Message, MessageDraft};
use crate::payload::{ChatPayload, MessagePayload};
use crate::store::MessageListStore;
use crate::types::Timestamp;

/// One store operation in a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    rename_all = "camelCase",
    bound(deserialize = "P: Deserialize<'de>")
)]
pub enum ScriptOp<P> {
    Append { message: MessageDraft<P> },
    Prepend { messages: Vec<Message<P>> },
    Update { id: String, message: MessageDraft<P> },
    Delete { id: String },
    Reset {
        #[serde(default)]
        messages: Vec<Message<P>>,
    },
    Typing { active: bool },
    /// Move the script's clock forward
    Advance { millis: i64 },
}

impl<P> ScriptOp<P> {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptOp::Append { .. } => "append",
            ScriptOp::Prepend { .. } => "prepend",
            ScriptOp::Update { .. } => "update",
            ScriptOp::Delete { .. } => "delete",
            ScriptOp::Reset { .. } => "reset",
            ScriptOp::Typing { .. } => "typing",
            ScriptOp::Advance { .. } => "advance",
        }
    }
}

/// A replayable sequence of operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script<P = ChatPayload> {
    /// Overrides whatever config the runner was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<StoreConfig>,
    /// Initial value of the script's clock
    #[serde(default)]
    pub start_time: Timestamp,
    /// Prefix for generated ids (`<prefix>-1`, `<prefix>-2`, ...)
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    pub ops: Vec<ScriptOp<P>>,
}

fn default_id_prefix() -> String {
    "msg".to_string()
}

/// State after one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStep<P> {
    pub index: usize,
    pub op: &'static str,
    pub now: Timestamp,
    pub typing: bool,
    pub messages: Vec<Message<P>>,
}

/// Outcome of a replay
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport<P> {
    pub steps: Vec<ReplayStep<P>>,
    pub messages: Vec<Message<P>>,
    pub typing: bool,
    pub last_grouped_at: Timestamp,
}

impl<P> Script<P>
where
    P: MessagePayload + DeserializeOwned,
{
    pub fn from_json_str(raw: &str) -> MsgListResult<Self> {
        let script: Script<P> = serde_json::from_str(raw)?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> MsgListResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }
}

impl<P: MessagePayload> Script<P> {
    pub fn new(ops: Vec<ScriptOp<P>>) -> Self {
        Self {
            config: None,
            start_time: 0,
            id_prefix: default_id_prefix(),
            ops,
        }
    }

    pub fn validate(&self) -> MsgListResult<()> {
        if let Some(config) = &self.config {
            config.validate()?;
        }
        if self.id_prefix.is_empty() {
            return Err(MsgListError::InvalidScript("idPrefix must not be empty".to_string()));
        }
        let mut now = self.start_time;
        for (index, op) in self.ops.iter().enumerate() {
            if let ScriptOp::Advance { millis } = op {
                if *millis < 0 {
                    return Err(MsgListError::InvalidScript(format!(
                        "op {} (advance): millis must be >= 0 (got {})",
                        index, millis
                    )));
                }
                now = now.checked_add(*millis).ok_or_else(|| {
                    MsgListError::InvalidScript(format!(
                        "op {} (advance): clock overflows past {} + {}",
                        index, now, millis
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Run with default config.
    pub fn run(&self) -> MsgListResult<ReplayReport<P>> {
        self.run_with_config(&StoreConfig::default())
    }

    /// Run with `fallback` unless the script carries its own config.
    pub fn run_with_config(&self, fallback: &StoreConfig) -> MsgListResult<ReplayReport<P>> {
        self.validate()?;
        let config = self.config.clone().unwrap_or_else(|| fallback.clone());
        config.validate()?;

        let time = ManualTimeSource::new(self.start_time);
        let mut store: MessageListStore<P> = MessageListStore::builder()
            .config(config)
            .id_generator(SequentialIdGenerator::new(self.id_prefix.clone()))
            .time_source(time.clone())
            .build();

        info!(ops = self.ops.len(), start_time = self.start_time, "Replaying script");

        let mut steps = Vec::with_capacity(self.ops.len());
        for (index, op) in self.ops.iter().enumerate() {
            let snapshot = match op.clone() {
                ScriptOp::Append { message } => store.append_msg(message),
                ScriptOp::Prepend { messages } => store.prepend_msgs(messages),
                ScriptOp::Update { id, message } => store.update_msg(&id, message),
                ScriptOp::Delete { id } => store.delete_msg(&id),
                ScriptOp::Reset { messages } => store.reset_list(messages),
                ScriptOp::Typing { active } => store.set_typing(active),
                ScriptOp::Advance { millis } => {
                    time.advance(millis);
                    store.snapshot()
                }
            };
            debug!(index, op = op.name(), len = snapshot.len(), "Replayed op");

            steps.push(ReplayStep {
                index,
                op: op.name(),
                now: time.now_millis(),
                typing: store.is_typing(),
                messages: snapshot.to_vec(),
            });
        }

        Ok(ReplayReport {
            steps,
            messages: store.messages().to_vec(),
            typing: store.is_typing(),
            last_grouped_at: store.last_grouped_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TYPING_ID;

    const SCRIPT: &str = r#"{
        "startTime": 1700000000000,
        "ops": [
            { "op": "append", "message": { "type": "text", "content": { "text": "hi" } } },
            { "op": "advance", "millis": 60000 },
            { "op": "typing", "active": true },
            { "op": "advance", "millis": 1000 },
            { "op": "append", "message": { "id": "r1", "type": "text", "content": { "text": "yo" } } }
        ]
    }"#;

    #[test]
    fn test_parse_and_run() {
        let script: Script = Script::from_json_str(SCRIPT).unwrap();
        assert_eq!(script.ops.len(), 5);
        assert_eq!(script.ops[2].name(), "typing");

        let report = script.run().unwrap();
        assert_eq!(report.steps.len(), 5);

        let ids: Vec<_> = report.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["msg-1", "r1"]);
        assert!(!report.typing);

        assert_eq!(report.steps[2].messages[1].id.as_str(), TYPING_ID);
        assert!(report.steps[2].typing);
        assert_eq!(report.steps[4].now, 1_700_000_061_000);
        assert_eq!(report.messages[1].created_at, 1_700_000_061_000);
    }

    #[test]
    fn test_script_config_overrides_fallback() {
        let script: Script = Script::from_json_str(
            r#"{
                "config": { "timeGapMs": 1000 },
                "startTime": 1700000000000,
                "ops": [
                    { "op": "append", "message": { "type": "text", "content": { "text": "a" } } },
                    { "op": "advance", "millis": 2000 },
                    { "op": "append", "message": { "type": "text", "content": { "text": "b" } } }
                ]
            }"#,
        )
        .unwrap();

        let report = script
            .run_with_config(&StoreConfig::default().with_time_gap_ms(1_000_000))
            .unwrap();
        assert!(report.messages[1].has_time);
    }

    #[test]
    fn test_negative_advance_rejected() {
        let err = Script::<ChatPayload>::from_json_str(
            r#"{ "ops": [ { "op": "advance", "millis": -5 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MsgListError::InvalidScript(_)));
    }

    #[test]
    fn test_advance_past_max_timestamp_rejected() {
        let err = Script::<ChatPayload>::from_json_str(
            r#"{ "startTime": 9223372036854775000, "ops": [ { "op": "advance", "millis": 1000 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MsgListError::InvalidScript(_)));

        // overflow only shows up in the running total
        let err = Script::<ChatPayload>::from_json_str(
            r#"{
                "startTime": 9223372036854775000,
                "ops": [
                    { "op": "advance", "millis": 500 },
                    { "op": "advance", "millis": 500 }
                ]
            }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("op 1 (advance)"));
    }

    #[test]
    fn test_advance_up_to_max_timestamp_runs() {
        let script: Script = Script::from_json_str(
            r#"{
                "startTime": 9223372036854775000,
                "ops": [
                    { "op": "advance", "millis": 807 },
                    { "op": "append", "message": { "type": "text", "content": { "text": "end of time" } } }
                ]
            }"#,
        )
        .unwrap();

        let report = script.run().unwrap();
        assert_eq!(report.steps[0].now, i64::MAX);
        assert_eq!(report.messages[0].created_at, i64::MAX);
        assert!(report.messages[0].has_time);
    }

    #[test]
    fn test_negative_start_time_replays() {
        let script: Script = Script::from_json_str(
            r#"{
                "startTime": -1000,
                "ops": [
                    { "op": "append", "message": { "type": "text", "content": { "text": "a" } } },
                    { "op": "advance", "millis": 1000 }
                ]
            }"#,
        )
        .unwrap();

        let report = script.run().unwrap();
        assert_eq!(report.messages[0].created_at, -1000);
        assert_eq!(report.steps[1].now, 0);
    }

    #[test]
    fn test_reset_without_messages_defaults_to_empty() {
        let script: Script = Script::from_json_str(
            r#"{ "ops": [
                { "op": "append", "message": { "type": "text", "content": { "text": "a" } } },
                { "op": "reset" }
            ] }"#,
        )
        .unwrap();

        let report = script.run().unwrap();
        assert!(report.messages.is_empty());
    }

    #[test]
    fn test_unknown_op_is_json_error() {
        let err = Script::<ChatPayload>::from_json_str(r#"{ "ops": [ { "op": "explode" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, MsgListError::Json(_)));
    }

    #[test]
    fn test_update_and_delete_ops() {
        let script: Script = Script::new(vec![
            ScriptOp::Append {
                message: MessageDraft::new(ChatPayload::text("a")).with_id("a").created_at(10),
            },
            ScriptOp::Append {
                message: MessageDraft::new(ChatPayload::text("b")).with_id("b").created_at(20),
            },
            ScriptOp::Update {
                id: "a".to_string(),
                message: MessageDraft::new(ChatPayload::text("a2")).created_at(30),
            },
            ScriptOp::Delete { id: "b".to_string() },
        ]);

        let report = script.run().unwrap();
        assert_eq!(report.steps[2].messages[1].id.as_str(), "a");
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].payload, ChatPayload::text("a2"));
    }
}
