//! Engine tunables.

use chrono::TimeDelta;

pub const SESSIONS_DIR: &str = "sessions";
pub const LOG_EXTENSION: &str = "jsonl";
pub const DEFAULT_AGENTS_DIR: &str = "/root/.openclaw/agents";
pub const SOURCE: &str = "openclaw";

pub const SHORT_WINDOW_HOURS: i64 = 5;
pub const LONG_WINDOW_DAYS: i64 = 7;
pub const BURN_WINDOW_MINUTES: i64 = 30;
pub const RECENT_CALLS: usize = 20;
pub const MAX_RATE_LIMIT_EVENTS: usize = 50;
pub const DETAIL_CHARS: usize = 240;
pub const MAX_LINE_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_TOKEN_HOURS: u32 = 24 * 7;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Active window, also the reset-countdown horizon.
    pub short_window: TimeDelta,
    /// Historical window. Never shorter than `short_window`.
    pub long_window: TimeDelta,
    /// Trailing slice of the active window used for burn rate.
    pub burn_window: TimeDelta,
    pub rate_limit_lookback: TimeDelta,
    pub recent_calls: usize,
    pub max_rate_limit_events: usize,
    pub detail_chars: usize,
    pub max_line_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            short_window: TimeDelta::hours(SHORT_WINDOW_HOURS),
            long_window: TimeDelta::days(LONG_WINDOW_DAYS),
            burn_window: TimeDelta::minutes(BURN_WINDOW_MINUTES),
            rate_limit_lookback: TimeDelta::hours(SHORT_WINDOW_HOURS),
            recent_calls: RECENT_CALLS,
            max_rate_limit_events: MAX_RATE_LIMIT_EVENTS,
            detail_chars: DETAIL_CHARS,
            max_line_bytes: MAX_LINE_BYTES,
        }
    }
}

impl EngineConfig {
    /// Long window as used by the aggregator, widened to the short window
    /// when misconfigured.
    pub fn effective_long_window(&self) -> TimeDelta {
        self.long_window.max(self.short_window)
    }

    pub fn with_rate_limit_lookback(mut self, lookback: TimeDelta) -> Self {
        self.rate_limit_lookback = lookback;
        self
    }
}
