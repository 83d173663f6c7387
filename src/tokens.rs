//! Trailing token totals with a provider/model breakdown.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;

use crate::config::MAX_TOKEN_HOURS;
use crate::models::{ProviderModelUsage, TokenUsage, UsageRecord};
use crate::normalize::ModelKey;

/// Lookback in hours, capped at one week.
pub fn clamp_hours(hours: u32) -> u32 {
    hours.clamp(1, MAX_TOKEN_HOURS)
}

#[derive(Clone, Debug, Default)]
pub struct TokenTally {
    since: DateTime<Utc>,
    used_tokens: u64,
    file_count: usize,
    counted_in_file: bool,
    breakdown: HashMap<ModelKey, u64>,
}

impl TokenTally {
    pub fn new(now: DateTime<Utc>, hours: u32) -> Self {
        Self {
            since: now - TimeDelta::hours(i64::from(clamp_hours(hours))),
            ..Self::default()
        }
    }

    pub fn fold(&mut self, record: &UsageRecord) {
        let Some((key, usage)) = record.message_usage() else {
            return;
        };
        if record.ts < self.since || usage.total_tokens < 0 {
            return;
        }
        let tokens = usage.total_tokens as u64;
        self.used_tokens = self.used_tokens.saturating_add(tokens);
        let slot = self.breakdown.entry(key.clone()).or_default();
        *slot = slot.saturating_add(tokens);
        self.counted_in_file = true;
    }

    pub fn end_file(&mut self) {
        if self.counted_in_file {
            self.file_count += 1;
        }
        self.counted_in_file = false;
    }

    pub fn merge(mut self, other: TokenTally) -> Self {
        self.used_tokens = self.used_tokens.saturating_add(other.used_tokens);
        self.file_count += other.file_count;
        for (key, tokens) in other.breakdown {
            let slot = self.breakdown.entry(key).or_default();
            *slot = slot.saturating_add(tokens);
        }
        self
    }

    pub fn finish(self) -> TokenUsage {
        let mut breakdown: Vec<ProviderModelUsage> = self
            .breakdown
            .into_iter()
            .map(|(k, used_tokens)| ProviderModelUsage {
                provider: k.provider,
                model: k.model,
                used_tokens,
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.used_tokens
                .cmp(&a.used_tokens)
                .then_with(|| a.provider.cmp(&b.provider))
                .then_with(|| a.model.cmp(&b.model))
        });
        TokenUsage {
            used_tokens: self.used_tokens,
            file_count: self.file_count,
            breakdown,
        }
    }
}
