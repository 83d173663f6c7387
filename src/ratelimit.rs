//! Rate-limit detection.
//!
//! Deliberately loose: a record qualifies on a structural hint (error type or
//! a `rate_limit` stop reason) plus any of a few throttling words anywhere in
//! its JSON. False positives are fine, the list is read by a person.

use chrono::{DateTime, TimeDelta, Utc};
use std::cmp::Reverse;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::models::{RateLimitEvent, RecordKind, UsageRecord};

static THROTTLE_HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"rate|overloaded|429|limit").unwrap());

fn has_structural_hint(record: &UsageRecord) -> bool {
    match record.kind {
        RecordKind::Error => true,
        RecordKind::Message => record
            .stop_reason()
            .is_some_and(|r| r.eq_ignore_ascii_case("rate_limit")),
        RecordKind::Other => false,
    }
}

/// Returns the record's serialized form when it qualifies.
pub fn match_rate_limit(
    record: &UsageRecord,
    now: DateTime<Utc>,
    lookback: TimeDelta,
) -> Option<String> {
    if now - record.ts > lookback || !has_structural_hint(record) {
        return None;
    }
    let blob = record.to_json();
    if THROTTLE_HINT_RE.is_match(&blob.to_lowercase()) {
        Some(blob)
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct RateLimitDetector {
    now: DateTime<Utc>,
    lookback: TimeDelta,
    detail_chars: usize,
    events: Vec<RateLimitEvent>,
}

impl RateLimitDetector {
    pub fn new(now: DateTime<Utc>, cfg: &EngineConfig) -> Self {
        Self {
            now,
            lookback: cfg.rate_limit_lookback,
            detail_chars: cfg.detail_chars,
            events: Vec::new(),
        }
    }

    pub fn fold(&mut self, record: &UsageRecord) {
        let Some(blob) = match_rate_limit(record, self.now, self.lookback) else {
            return;
        };
        let (provider, model) = record
            .message
            .as_ref()
            .map(|m| (m.key.provider.clone(), m.key.model.clone()))
            .unwrap_or_default();
        self.events.push(RateLimitEvent {
            timestamp: record.ts,
            detail: blob.chars().take(self.detail_chars).collect(),
            provider,
            model,
        });
    }

    pub fn merge(mut self, other: RateLimitDetector) -> Self {
        self.events.extend(other.events);
        self
    }

    /// Newest first, capped.
    pub fn finish(mut self, max_events: usize) -> Vec<RateLimitEvent> {
        self.events.sort_by_key(|e| Reverse(e.timestamp));
        self.events.truncate(max_events);
        self.events
    }
}
