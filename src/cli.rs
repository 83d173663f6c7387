use std::path::PathBuf;

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Per-model totals for the 5h and 7d windows, recent calls and burn rate
    Windows,
    /// Records that look like upstream throttling, newest first
    RateLimits {
        /// Lookback in hours
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
        lookback_hours: u32,
    },
    /// totalTokens over the trailing hours with a provider/model breakdown
    Tokens {
        /// Trailing hours to sum (capped at 168)
        #[arg(long, env = "TOKEN_USAGE_HOURS_DEFAULT", default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..))]
        hours: u32,

        /// Token budget echoed back as limitTokens
        #[arg(long, env = "TOKEN_USAGE_LIMIT", default_value_t = 0)]
        limit_tokens: u64,
    },
}

#[derive(clap::Parser, Debug)]
#[command(name = "agent-usage", version, about = "Usage windows and rate-limit signals from agent session logs")]
pub struct Args {
    /// Agents root holding <agent>/sessions/*.jsonl. Defaults to ~/.openclaw/agents,
    /// then /root/.openclaw/agents
    #[arg(long, env = "OPENCLAW_AGENTS_DIR")]
    pub agents_dir: Option<PathBuf>,

    /// Abandon the scan after this many milliseconds
    #[arg(long, env = "AGENT_USAGE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(long, env = "AGENT_USAGE_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}
