use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::json;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use agent_usage::config::EngineConfig;
use agent_usage::control::ScanControl;
use agent_usage::discovery::list_session_logs;
use agent_usage::error::ScanError;
use agent_usage::usage::{scan_rate_limit_events, scan_token_usage, scan_usage_windows};

fn now() -> DateTime<Utc> {
    let n = Utc::now();
    n - TimeDelta::nanoseconds(i64::from(n.timestamp_subsec_nanos()))
}

fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn usage_line(t: DateTime<Utc>, model: &str, output: i64, total: i64) -> String {
    json!({
        "type": "message",
        "timestamp": ts(t),
        "message": {
            "provider": "anthropic",
            "model": model,
            "usage": {"input": 10, "output": output, "totalTokens": total, "cost": {"total": 0.01}}
        }
    })
    .to_string()
}

fn write_log(root: &Path, agent: &str, name: &str, lines: &[String]) -> PathBuf {
    let dir = root.join(agent).join("sessions");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn set_mtime(path: &Path, age: Duration) {
    let f = File::options().write(true).open(path).unwrap();
    f.set_modified(SystemTime::now() - age).unwrap();
}

#[test]
fn invalid_line_between_valid_lines_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    write_log(
        tmp.path(),
        "arga",
        "s1.jsonl",
        &[
            usage_line(n - TimeDelta::minutes(3), "claude", 7, 17),
            r#"{"type":"message","timestamp":"2026-"#.to_string(),
            "   ".to_string(),
            usage_line(n - TimeDelta::minutes(1), "claude", 9, 19),
        ],
    );
    let cfg = EngineConfig::default();
    let out = scan_usage_windows(tmp.path(), n, &cfg, &ScanControl::unbounded()).unwrap();
    let agg = &out.active.per_model["anthropic/claude"];
    assert_eq!(agg.calls, 2);
    assert_eq!(agg.output, 16);
}

#[test]
fn missing_root_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");
    let cfg = EngineConfig::default();
    let err = scan_usage_windows(&missing, now(), &cfg, &ScanControl::unbounded()).unwrap_err();
    assert!(matches!(err, ScanError::RootUnreadable { .. }));
    let err =
        scan_rate_limit_events(&missing, now(), &cfg, &ScanControl::unbounded()).unwrap_err();
    assert!(matches!(err, ScanError::RootUnreadable { .. }));
}

#[test]
fn discovery_follows_layout_and_mtime() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let keep = write_log(root, "a1", "keep.jsonl", &["{}".to_string()]);
    let other_agent = write_log(root, "a2", "x.jsonl", &["{}".to_string()]);
    let stale = write_log(root, "a1", "stale.jsonl", &["{}".to_string()]);
    set_mtime(&stale, Duration::from_secs(8 * 24 * 3600));
    write_log(root, "a1", "notes.txt", &["{}".to_string()]);
    fs::create_dir_all(root.join("a1").join("archive")).unwrap();
    fs::write(root.join("a1").join("archive").join("old.jsonl"), "{}\n").unwrap();
    fs::write(root.join("a1").join("top.jsonl"), "{}\n").unwrap();
    fs::write(root.join("stray.jsonl"), "{}\n").unwrap();
    fs::create_dir_all(root.join("a1").join("sessions").join("nested")).unwrap();
    fs::write(
        root.join("a1").join("sessions").join("nested").join("deep.jsonl"),
        "{}\n",
    )
    .unwrap();

    let cutoff = now() - TimeDelta::days(7);
    let found = list_session_logs(root, cutoff).unwrap();
    assert_eq!(found, vec![keep.clone(), other_agent.clone()]);

    let all = list_session_logs(root, DateTime::<Utc>::MIN_UTC).unwrap();
    assert_eq!(all, vec![keep, stale, other_agent]);
}

#[test]
fn stale_files_do_not_reach_the_aggregator() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    let path = write_log(
        tmp.path(),
        "arga",
        "old.jsonl",
        &[usage_line(n - TimeDelta::minutes(5), "claude", 7, 17)],
    );
    set_mtime(&path, Duration::from_secs(8 * 24 * 3600));
    let cfg = EngineConfig::default();
    let out = scan_usage_windows(tmp.path(), n, &cfg, &ScanControl::unbounded()).unwrap();
    assert!(out.historical.per_model.is_empty());
}

#[test]
fn burn_rate_scenario_across_files() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    write_log(
        tmp.path(),
        "a",
        "1.jsonl",
        &[usage_line(n - TimeDelta::minutes(29), "claude", 100, 100)],
    );
    write_log(
        tmp.path(),
        "b",
        "2.jsonl",
        &[
            usage_line(n - TimeDelta::minutes(10), "claude", 20, 20),
            usage_line(n - TimeDelta::minutes(2), "claude", 5, 5),
        ],
    );
    let cfg = EngineConfig::default();
    let out = scan_usage_windows(tmp.path(), n, &cfg, &ScanControl::unbounded()).unwrap();
    assert_eq!(out.burn_rate.tokens_per_minute, 4.31);
    assert_eq!(out.burn_rate.cost_per_minute, 0.001034);
    assert_eq!(out.active.recent_calls.len(), 3);
    assert_eq!(out.active.recent_calls[0].output, 5);
}

#[test]
fn rescanning_gives_identical_results() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    for agent in ["a", "b", "c"] {
        let lines: Vec<String> = (0..50)
            .map(|i| usage_line(n - TimeDelta::minutes(i * 11), agent, i, i))
            .collect();
        write_log(tmp.path(), agent, "s.jsonl", &lines);
    }
    let cfg = EngineConfig::default();
    let first = scan_usage_windows(tmp.path(), n, &cfg, &ScanControl::unbounded()).unwrap();
    let second = scan_usage_windows(tmp.path(), n, &cfg, &ScanControl::unbounded()).unwrap();
    assert_eq!(first.active.per_model, second.active.per_model);
    assert_eq!(first.historical.per_model, second.historical.per_model);
    assert_eq!(first.burn_rate, second.burn_rate);
    assert_eq!(first.active.window_start, second.active.window_start);
}

#[test]
fn over_long_line_is_skipped_and_scan_continues() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    let padding = "y".repeat(4096);
    let long = json!({"type": "message", "timestamp": ts(n), "pad": padding}).to_string();
    write_log(
        tmp.path(),
        "a",
        "s.jsonl",
        &[long, usage_line(n - TimeDelta::minutes(1), "claude", 3, 3)],
    );
    let cfg = EngineConfig {
        max_line_bytes: 1024,
        ..EngineConfig::default()
    };
    let out = scan_usage_windows(tmp.path(), n, &cfg, &ScanControl::unbounded()).unwrap();
    assert_eq!(out.active.per_model["anthropic/claude"].calls, 1);
}

#[test]
fn cancelled_scan_returns_no_partial_result() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    write_log(
        tmp.path(),
        "a",
        "s.jsonl",
        &[usage_line(n - TimeDelta::minutes(1), "claude", 3, 3)],
    );
    let ctl = ScanControl::unbounded();
    ctl.cancel();
    let cfg = EngineConfig::default();
    let err = scan_usage_windows(tmp.path(), n, &cfg, &ctl).unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));
    let err = scan_token_usage(tmp.path(), n, 24, &cfg, &ctl).unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));
}

#[test]
fn rate_limit_events_from_logs() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    let lines = vec![
        json!({"type": "error", "timestamp": ts(n - TimeDelta::minutes(30)),
               "error": {"status": 429, "message": "Too Many Requests"}})
        .to_string(),
        json!({"type": "message", "timestamp": ts(n - TimeDelta::minutes(20)),
               "message": {"provider": "Anthropic", "model": "anthropic/claude", "stopReason": "stop"}})
        .to_string(),
        json!({"type": "message", "timestamp": ts(n - TimeDelta::minutes(10)),
               "message": {"provider": "Anthropic", "model": "anthropic/claude", "stopReason": "rate_limit"}})
        .to_string(),
        json!({"type": "error", "timestamp": ts(n - TimeDelta::hours(6)), "error": "overloaded"})
        .to_string(),
    ];
    write_log(tmp.path(), "a", "s.jsonl", &lines);

    let cfg = EngineConfig::default();
    let events = scan_rate_limit_events(tmp.path(), n, &cfg, &ScanControl::unbounded()).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].timestamp, n - TimeDelta::minutes(10));
    assert_eq!(events[0].provider, "anthropic");
    assert_eq!(events[0].model, "claude");
    assert_eq!(events[1].timestamp, n - TimeDelta::minutes(30));
    assert!(events[1].provider.is_empty());
    assert!(events[1].detail.contains("429"));
}

#[test]
fn rate_limit_events_are_capped_and_sorted() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    for agent in ["a", "b", "c"] {
        let lines: Vec<String> = (0..25)
            .map(|i| {
                json!({"type": "error",
                       "timestamp": ts(n - TimeDelta::seconds(i * 97 + agent.len() as i64)),
                       "error": "rate limited"})
                .to_string()
            })
            .collect();
        write_log(tmp.path(), agent, "s.jsonl", &lines);
    }
    let cfg = EngineConfig::default();
    let events = scan_rate_limit_events(tmp.path(), n, &cfg, &ScanControl::unbounded()).unwrap();
    assert_eq!(events.len(), 50);
    assert!(events.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[test]
fn token_usage_sums_recent_totals() {
    let tmp = TempDir::new().unwrap();
    let n = now();
    write_log(
        tmp.path(),
        "arga",
        "session.jsonl",
        &[
            usage_line(n - TimeDelta::minutes(30), "claude", 1, 123),
            usage_line(n - TimeDelta::minutes(30), "claude", 1, 7),
            usage_line(n - TimeDelta::hours(3), "claude", 1, 999),
        ],
    );
    write_log(
        tmp.path(),
        "other",
        "quiet.jsonl",
        &[usage_line(n - TimeDelta::hours(3), "gpt", 1, 50)],
    );
    write_log(
        tmp.path(),
        "neg",
        "neg.jsonl",
        &[usage_line(n - TimeDelta::minutes(5), "gpt", 1, -40)],
    );
    let cfg = EngineConfig::default();
    let usage = scan_token_usage(tmp.path(), n, 1, &cfg, &ScanControl::unbounded()).unwrap();
    assert_eq!(usage.used_tokens, 130);
    assert_eq!(usage.file_count, 1);
    assert_eq!(usage.breakdown.len(), 1);
    assert_eq!(usage.breakdown[0].provider, "anthropic");
    assert_eq!(usage.breakdown[0].model, "claude");
    assert_eq!(usage.breakdown[0].used_tokens, 130);

    let usage = scan_token_usage(tmp.path(), n, 24, &cfg, &ScanControl::unbounded()).unwrap();
    assert_eq!(usage.used_tokens, 1179);
    assert_eq!(usage.file_count, 2);
    assert_eq!(usage.breakdown[0].model, "claude");
    assert_eq!(usage.breakdown[1].model, "gpt");
}
