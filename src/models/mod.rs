pub mod entry;
pub mod message;
pub mod ratelimit;
pub mod tokens;
pub mod window;

pub use entry::{MessageInfo, RecordKind, UsageCounts, UsageRecord};
pub use message::{CostObj, MessageObj, MessageUsage, SessionLine};
pub use ratelimit::{RateLimitEvent, RateLimitReport};
pub use tokens::{ProviderModelUsage, TokenUsage, TokenUsageSummary};
pub use window::{
    ActiveWindow, BurnRate, CallSample, HistoricalWindow, ModelAggregate, RecentCall, UsageWindows,
};
