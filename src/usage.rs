//! # Usage Module
//!
//! Scan drivers. Each public function discovers the session logs under an
//! agents root, decodes them in parallel (one accumulator per file) and
//! merges the per-file results.
//!
//! ## Key Functions
//!
//! - `scan_usage_windows`: active/historical per-model totals and burn rate
//! - `scan_rate_limit_events`: recent records that look like throttling
//! - `scan_token_usage`: trailing `totalTokens` sum with a model breakdown

use chrono::{DateTime, TimeDelta, Utc};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::control::ScanControl;
use crate::discovery::list_session_logs;
use crate::error::ScanError;
use crate::models::{RateLimitEvent, TokenUsage, UsageRecord, UsageWindows};
use crate::parser::scan_log;
use crate::ratelimit::RateLimitDetector;
use crate::tokens::TokenTally;
use crate::window::WindowAggregator;

/// A per-file accumulator that can be merged with its siblings.
///
/// `merge` must be associative so that files can be folded in any grouping.
pub trait RecordSink: Send + Sized {
    fn accept(&mut self, record: &UsageRecord);
    fn merge(self, other: Self) -> Self;
    fn end_file(&mut self) {}
}

impl RecordSink for WindowAggregator {
    fn accept(&mut self, record: &UsageRecord) {
        self.fold(record);
    }
    fn merge(self, other: Self) -> Self {
        WindowAggregator::merge(self, other)
    }
}

impl RecordSink for RateLimitDetector {
    fn accept(&mut self, record: &UsageRecord) {
        self.fold(record);
    }
    fn merge(self, other: Self) -> Self {
        RateLimitDetector::merge(self, other)
    }
}

impl RecordSink for TokenTally {
    fn accept(&mut self, record: &UsageRecord) {
        self.fold(record);
    }
    fn merge(self, other: Self) -> Self {
        TokenTally::merge(self, other)
    }
    fn end_file(&mut self) {
        TokenTally::end_file(self);
    }
}

/// Fold every file into its own sink and merge the results.
///
/// Unreadable files are logged and whatever they yielded before failing is
/// kept. Cancellation discards everything.
pub fn fold_logs<S, F>(
    paths: &[PathBuf],
    ctl: &ScanControl,
    max_line_bytes: usize,
    make: F,
) -> Result<S, ScanError>
where
    S: RecordSink,
    F: Fn() -> S + Sync + Send,
{
    paths
        .par_iter()
        .map(|path| {
            ctl.check()?;
            let mut sink = make();
            match scan_log(path, ctl, max_line_bytes, |rec| sink.accept(rec)) {
                Ok(stats) => debug!(
                    path = %path.display(),
                    lines = stats.lines,
                    records = stats.records,
                    skipped = stats.skipped,
                    "scanned log"
                ),
                Err(ScanError::Cancelled) => return Err(ScanError::Cancelled),
                Err(err) => warn!(error = %err, "skipping unreadable log"),
            }
            sink.end_file();
            Ok(sink)
        })
        .try_reduce(&make, |a, b| Ok(a.merge(b)))
}

/// Active and historical per-model totals, recent calls and burn rate.
pub fn scan_usage_windows(
    root: &Path,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
    ctl: &ScanControl,
) -> Result<UsageWindows, ScanError> {
    let paths = list_session_logs(root, now - cfg.effective_long_window())?;
    debug!(root = %root.display(), files = paths.len(), "usage windows scan");
    let agg = fold_logs(&paths, ctl, cfg.max_line_bytes, || {
        WindowAggregator::new(now, cfg)
    })?;
    ctl.check()?;
    Ok(agg.finish(cfg))
}

/// Throttling candidates within `cfg.rate_limit_lookback`, newest first.
pub fn scan_rate_limit_events(
    root: &Path,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
    ctl: &ScanControl,
) -> Result<Vec<RateLimitEvent>, ScanError> {
    let paths = list_session_logs(root, now - cfg.rate_limit_lookback)?;
    debug!(root = %root.display(), files = paths.len(), "rate limit scan");
    let detector = fold_logs(&paths, ctl, cfg.max_line_bytes, || {
        RateLimitDetector::new(now, cfg)
    })?;
    ctl.check()?;
    Ok(detector.finish(cfg.max_rate_limit_events))
}

/// `totalTokens` over the trailing `hours` (capped at a week). Every log
/// file is read regardless of its modification time.
pub fn scan_token_usage(
    root: &Path,
    now: DateTime<Utc>,
    hours: u32,
    cfg: &EngineConfig,
    ctl: &ScanControl,
) -> Result<TokenUsage, ScanError> {
    let paths = list_session_logs(root, DateTime::<Utc>::MIN_UTC)?;
    debug!(root = %root.display(), files = paths.len(), hours, "token usage scan");
    let tally = fold_logs(&paths, ctl, cfg.max_line_bytes, || TokenTally::new(now, hours))?;
    ctl.check()?;
    Ok(tally.finish())
}

/// Lookback used for the rate-limit scan, in whole hours.
pub fn lookback_hours(hours: u32) -> TimeDelta {
    TimeDelta::hours(i64::from(hours.max(1)))
}
