//! # Window Module
//!
//! Folds usage records into the active (short) and historical (long)
//! windows, keyed by `provider/model`.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::burn::estimate_burn_rate;
use crate::config::EngineConfig;
use crate::models::{
    ActiveWindow, CallSample, HistoricalWindow, ModelAggregate, RecentCall, UsageCounts,
    UsageRecord, UsageWindows,
};
use crate::utils::{format_ago, round_to};

/// Closed on the recent edge: a record exactly `span` old is inside.
pub fn in_window(now: DateTime<Utc>, ts: DateTime<Utc>, span: TimeDelta) -> bool {
    now - ts <= span
}

/// Sums for one window span.
#[derive(Clone, Debug)]
struct WindowReducer {
    span: TimeDelta,
    per_model: HashMap<String, ModelAggregate>,
}

impl WindowReducer {
    fn new(span: TimeDelta) -> Self {
        Self {
            span,
            per_model: HashMap::new(),
        }
    }

    fn offer(&mut self, now: DateTime<Utc>, ts: DateTime<Utc>, key: &str, u: &UsageCounts) -> bool {
        if !in_window(now, ts, self.span) {
            return false;
        }
        self.per_model.entry(key.to_string()).or_default().add(u);
        true
    }

    fn merge(&mut self, other: WindowReducer) {
        for (key, agg) in other.per_model {
            self.per_model.entry(key).or_default().merge(&agg);
        }
    }

    fn into_output(self) -> BTreeMap<String, ModelAggregate> {
        self.per_model
            .into_iter()
            .map(|(k, v)| (k, v.rounded()))
            .collect()
    }
}

/// Two independent reducers plus the active-window recency buffer.
#[derive(Clone, Debug)]
pub struct WindowAggregator {
    now: DateTime<Utc>,
    short: WindowReducer,
    long: WindowReducer,
    recent: Vec<CallSample>,
}

impl WindowAggregator {
    pub fn new(now: DateTime<Utc>, cfg: &EngineConfig) -> Self {
        Self {
            now,
            short: WindowReducer::new(cfg.short_window),
            long: WindowReducer::new(cfg.effective_long_window()),
            recent: Vec::new(),
        }
    }

    pub fn fold(&mut self, record: &UsageRecord) {
        let Some((key, usage)) = record.message_usage() else {
            return;
        };
        let key = key.to_string();
        if self.short.offer(self.now, record.ts, &key, usage) {
            self.recent.push(CallSample {
                ts: record.ts,
                model_key: key.clone(),
                input: usage.input,
                output: usage.output,
                cache_read: usage.cache_read,
                cache_write: usage.cache_write,
                cost: usage.cost,
            });
        }
        self.long.offer(self.now, record.ts, &key, usage);
    }

    /// Sums are order-independent; the recency buffer is sorted in `finish`.
    pub fn merge(mut self, other: WindowAggregator) -> Self {
        self.short.merge(other.short);
        self.long.merge(other.long);
        self.recent.extend(other.recent);
        self
    }

    pub fn finish(mut self, cfg: &EngineConfig) -> UsageWindows {
        let now = self.now;
        self.recent.sort_by(|a, b| b.ts.cmp(&a.ts));

        let window_start = self.recent.last().map(|c| c.ts);
        let window_reset_in = window_start.map(|start| {
            let reset = start + self.short.span;
            (reset - now).num_milliseconds().max(0)
        });
        let burn_rate = estimate_burn_rate(&self.recent, now, cfg.burn_window);
        let recent_calls = self
            .recent
            .iter()
            .take(cfg.recent_calls)
            .map(|c| RecentCall {
                timestamp: c.ts,
                model: c.model_key.clone(),
                input: c.input,
                output: c.output,
                cache_read: c.cache_read,
                cache_write: c.cache_write,
                cost: round_to(c.cost, 6),
                ago: format_ago(now, c.ts),
            })
            .collect();

        UsageWindows {
            active: ActiveWindow {
                per_model: self.short.into_output(),
                window_start,
                window_reset_in,
                recent_calls,
            },
            historical: HistoricalWindow {
                per_model: self.long.into_output(),
            },
            burn_rate,
        }
    }
}
