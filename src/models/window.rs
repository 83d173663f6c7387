use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::entry::UsageCounts;
use crate::utils::{round_to, ts_secs};

/// Per-model totals inside one window.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelAggregate {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub cost: f64,
    pub calls: u64,
}

impl ModelAggregate {
    pub fn add(&mut self, u: &UsageCounts) {
        self.input = self.input.saturating_add(u.input);
        self.output = self.output.saturating_add(u.output);
        self.cache_read = self.cache_read.saturating_add(u.cache_read);
        self.cache_write = self.cache_write.saturating_add(u.cache_write);
        self.cost += u.cost;
        self.calls = self.calls.saturating_add(1);
    }

    pub fn merge(&mut self, other: &ModelAggregate) {
        self.input = self.input.saturating_add(other.input);
        self.output = self.output.saturating_add(other.output);
        self.cache_read = self.cache_read.saturating_add(other.cache_read);
        self.cache_write = self.cache_write.saturating_add(other.cache_write);
        self.cost += other.cost;
        self.calls = self.calls.saturating_add(other.calls);
    }

    pub(crate) fn rounded(mut self) -> Self {
        self.cost = round_to(self.cost, 6);
        self
    }
}

/// One call kept in the active-window recency buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct CallSample {
    pub ts: DateTime<Utc>,
    pub model_key: String,
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub cost: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentCall {
    #[serde(with = "ts_secs")]
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub cost: f64,
    pub ago: String,
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BurnRate {
    pub tokens_per_minute: f64,
    pub cost_per_minute: f64,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWindow {
    pub per_model: BTreeMap<String, ModelAggregate>,
    #[serde(serialize_with = "ts_secs::option::serialize")]
    pub window_start: Option<DateTime<Utc>>,
    /// Milliseconds until `window_start + short window`.
    pub window_reset_in: Option<i64>,
    pub recent_calls: Vec<RecentCall>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalWindow {
    pub per_model: BTreeMap<String, ModelAggregate>,
}

/// Result of one usage-windows scan. `Default` is the zeroed result.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageWindows {
    #[serde(rename = "fiveHour")]
    pub active: ActiveWindow,
    #[serde(rename = "weekly")]
    pub historical: HistoricalWindow,
    pub burn_rate: BurnRate,
}
