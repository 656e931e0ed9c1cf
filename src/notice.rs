//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `skipped_element_notice`.
//! Role: Shared contract helper for CLI diagnostics (non-error events).
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use crate::api::DecodeIssue;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub feed: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("feed".to_string(), json!(notice.feed));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Notice for an element dropped under the skip error policy.
pub fn skipped_element_notice(cmd: &str, feed: &str, time: &str, issue: &DecodeIssue) -> Notice {
    let mut details = Map::new();
    details.insert("index".to_string(), json!(issue.index));
    details.insert("key".to_string(), json!(issue.key));
    Notice {
        kind: "skip".to_string(),
        time: time.to_string(),
        cmd: cmd.to_string(),
        feed: feed.to_string(),
        message: format!("skipped element {}: {}", issue.index, issue.message),
        details,
    }
}
