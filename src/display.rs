//! JSON reports handed to the read layer.
//!
//! Every report carries `source` and `updatedAt`. A failed scan still yields
//! a structurally complete, zeroed body plus an `error` field, so a
//! dashboard never has to tell "no data" apart from "scan failed".

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::io::Write;
use tracing::warn;

use crate::config::SOURCE;
use crate::error::ScanError;
use crate::models::{RateLimitEvent, RateLimitReport, TokenUsage, TokenUsageSummary, UsageWindows};
use crate::tokens::clamp_hours;
use crate::utils::{format_timestamp, format_window_label};

const SCAN_FAILED: &str = "scan failed";
const TOKEN_SOURCE_DETAIL: &str = "openclaw-sessions-jsonl";

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report<T> {
    pub source: &'static str,
    pub updated_at: String,
    #[serde(flatten)]
    pub body: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Report<T> {
    fn new(now: DateTime<Utc>, body: T, error: Option<String>) -> Self {
        Self {
            source: SOURCE,
            updated_at: format_timestamp(&now),
            body,
            error,
        }
    }
}

pub fn usage_windows_report(
    result: Result<UsageWindows, ScanError>,
    now: DateTime<Utc>,
) -> Report<UsageWindows> {
    match result {
        Ok(body) => Report::new(now, body, None),
        Err(err) => {
            warn!(error = %err, "usage windows scan failed");
            Report::new(now, UsageWindows::default(), Some(SCAN_FAILED.to_string()))
        }
    }
}

pub fn rate_limit_report(
    result: Result<Vec<RateLimitEvent>, ScanError>,
    now: DateTime<Utc>,
    lookback: TimeDelta,
) -> Report<RateLimitReport> {
    let window = format_window_label(lookback);
    match result {
        Ok(events) => Report::new(now, RateLimitReport { window, events }, None),
        Err(err) => {
            warn!(error = %err, "rate limit scan failed");
            Report::new(
                now,
                RateLimitReport {
                    window,
                    events: Vec::new(),
                },
                Some(SCAN_FAILED.to_string()),
            )
        }
    }
}

pub fn token_usage_report(
    result: Result<TokenUsage, ScanError>,
    now: DateTime<Utc>,
    hours: u32,
    limit_tokens: u64,
) -> Report<TokenUsageSummary> {
    let period = format!("{}h", clamp_hours(hours));
    let (usage, source_detail, error) = match result {
        Ok(usage) => (usage, TOKEN_SOURCE_DETAIL.to_string(), None),
        Err(err) => {
            warn!(error = %err, "token usage scan failed");
            (
                TokenUsage::default(),
                format!("{TOKEN_SOURCE_DETAIL}:error"),
                Some(SCAN_FAILED.to_string()),
            )
        }
    };
    Report::new(
        now,
        TokenUsageSummary {
            used_tokens: usage.used_tokens,
            limit_tokens,
            period,
            source_detail,
            file_count: usage.file_count,
            breakdown: usage.breakdown,
        },
        error,
    )
}

pub fn write_json_output<T: Serialize, W: Write>(out: &mut W, report: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, report).context("serialize report")?;
    } else {
        serde_json::to_writer(&mut *out, report).context("serialize report")?;
    }
    writeln!(out).context("write report")?;
    Ok(())
}

pub fn print_json_output<T: Serialize>(report: &T, pretty: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    write_json_output(&mut lock, report, pretty)
}
