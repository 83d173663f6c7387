use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_AGENTS_DIR;

/// Resolve the agents root: explicit override, then `~/.openclaw/agents`
/// when it exists, then the fixed server location.
pub fn agents_root(override_dir: Option<&Path>) -> PathBuf {
    if let Some(p) = override_dir {
        if !p.as_os_str().is_empty() {
            return p.to_path_buf();
        }
    }
    if let Some(b) = directories::BaseDirs::new() {
        let candidate = b.home_dir().join(".openclaw").join("agents");
        if candidate.is_dir() {
            return candidate;
        }
    }
    PathBuf::from(DEFAULT_AGENTS_DIR)
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn round_to(v: f64, digits: i32) -> f64 {
    let pow = 10f64.powi(digits);
    (v * pow).round() / pow
}

/// "Nm ago", rounded to the nearest minute and never negative.
pub fn format_ago(now: DateTime<Utc>, ts: DateTime<Utc>) -> String {
    let mins = ((now - ts).num_milliseconds() as f64 / 60_000.0).round() as i64;
    format!("{}m ago", mins.max(0))
}

/// Label for a lookback span: whole hours as "5h", otherwise minutes.
pub fn format_window_label(span: TimeDelta) -> String {
    if span.num_minutes() % 60 == 0 {
        format!("{}h", span.num_hours())
    } else {
        format!("{}m", span.num_minutes())
    }
}

/// Serde adapter: RFC 3339 with whole seconds and a `Z` suffix.
pub mod ts_secs {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(dt))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_str(&super::super::format_timestamp(dt)),
                None => s.serialize_none(),
            }
        }
    }
}
