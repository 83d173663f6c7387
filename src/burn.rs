//! Burn rate over the trailing slice of the active window.

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{BurnRate, CallSample};
use crate::utils::round_to;

/// `calls` must be sorted newest first. Only the leading run no older than
/// `now - sub_window` is used, and the span is floored at one minute.
pub fn estimate_burn_rate(
    calls: &[CallSample],
    now: DateTime<Utc>,
    sub_window: TimeDelta,
) -> BurnRate {
    let cutoff = now - sub_window;
    let run = calls.iter().take_while(|c| c.ts >= cutoff);

    let mut oldest: Option<DateTime<Utc>> = None;
    let mut total_out: u64 = 0;
    let mut total_cost: f64 = 0.0;
    for c in run {
        total_out = total_out.saturating_add(c.output);
        total_cost += c.cost;
        oldest = Some(c.ts);
    }
    let Some(oldest) = oldest else {
        return BurnRate::default();
    };

    let span = (now - oldest).max(TimeDelta::minutes(1));
    let minutes = span.num_milliseconds() as f64 / 60_000.0;
    BurnRate {
        tokens_per_minute: round_to(total_out as f64 / minutes, 2),
        cost_per_minute: round_to(total_cost / minutes, 6),
    }
}
