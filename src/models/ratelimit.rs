use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::ts_secs;

/// A log record that looks like upstream throttling.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RateLimitEvent {
    #[serde(with = "ts_secs")]
    pub timestamp: DateTime<Utc>,
    pub detail: String,
    /// Empty when the record had no message payload.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub provider: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct RateLimitReport {
    pub window: String,
    pub events: Vec<RateLimitEvent>,
}
