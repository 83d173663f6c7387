use anyhow::Result;
use chrono::Utc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use agent_usage::cli::{Args, Command};
use agent_usage::config::EngineConfig;
use agent_usage::control::ScanControl;
use agent_usage::display::{
    print_json_output, rate_limit_report, token_usage_report, usage_windows_report,
};
use agent_usage::usage::{
    lookback_hours, scan_rate_limit_events, scan_token_usage, scan_usage_windows,
};
use agent_usage::utils::agents_root;

fn init_tracing(debug: bool) {
    let fallback = if debug { "agent_usage=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let root = agents_root(args.agents_dir.as_deref());
    let ctl = match args.timeout_ms {
        Some(ms) => ScanControl::with_timeout(Duration::from_millis(ms)),
        None => ScanControl::unbounded(),
    };
    let now = Utc::now();
    debug!(root = %root.display(), command = ?args.command, "starting scan");

    match args.command {
        Command::Windows => {
            let cfg = EngineConfig::default();
            let report = usage_windows_report(scan_usage_windows(&root, now, &cfg, &ctl), now);
            print_json_output(&report, args.pretty)
        }
        Command::RateLimits {
            lookback_hours: hours,
        } => {
            let cfg = EngineConfig::default().with_rate_limit_lookback(lookback_hours(hours));
            let result = scan_rate_limit_events(&root, now, &cfg, &ctl);
            let report = rate_limit_report(result, now, cfg.rate_limit_lookback);
            print_json_output(&report, args.pretty)
        }
        Command::Tokens {
            hours,
            limit_tokens,
        } => {
            let cfg = EngineConfig::default();
            let result = scan_token_usage(&root, now, hours, &cfg, &ctl);
            let report = token_usage_report(result, now, hours, limit_tokens);
            print_json_output(&report, args.pretty)
        }
    }
}
