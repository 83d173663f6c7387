use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::normalize::ModelKey;

/// Discriminates the `type` field of a log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Message,
    Error,
    Other,
}

impl RecordKind {
    pub fn from_type(t: Option<&str>) -> Self {
        match t {
            Some("message") => RecordKind::Message,
            Some("error") => RecordKind::Error,
            _ => RecordKind::Other,
        }
    }
}

/// Token and cost counters of a single call, clamped to be non-negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UsageCounts {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    /// Reported as-is; the token summary skips negative totals.
    pub total_tokens: i64,
    pub cost: f64,
}

#[derive(Clone, Debug)]
pub struct MessageInfo {
    pub key: ModelKey,
    pub stop_reason: Option<String>,
    pub usage: Option<UsageCounts>,
}

/// One decoded log line with a valid timestamp.
#[derive(Clone, Debug)]
pub struct UsageRecord {
    pub kind: RecordKind,
    pub ts: DateTime<Utc>,
    pub message: Option<MessageInfo>,
    raw: Value,
}

impl UsageRecord {
    pub fn new(
        kind: RecordKind,
        ts: DateTime<Utc>,
        message: Option<MessageInfo>,
        raw: Value,
    ) -> Self {
        Self {
            kind,
            ts,
            message,
            raw,
        }
    }

    /// Usage payload of a `message` record, if any.
    pub fn message_usage(&self) -> Option<(&ModelKey, &UsageCounts)> {
        if self.kind != RecordKind::Message {
            return None;
        }
        let msg = self.message.as_ref()?;
        msg.usage.as_ref().map(|u| (&msg.key, u))
    }

    pub fn stop_reason(&self) -> Option<&str> {
        self.message.as_ref()?.stop_reason.as_deref()
    }

    /// Compact JSON of the whole decoded line, untyped fields included, so
    /// throttling text outside the known schema still reaches the matcher.
    pub fn to_json(&self) -> String {
        self.raw.to_string()
    }
}
