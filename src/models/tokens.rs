use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderModelUsage {
    pub provider: String,
    pub model: String,
    pub used_tokens: u64,
}

/// Raw totals from a token-usage scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub used_tokens: u64,
    /// Files that contributed at least one counted record.
    pub file_count: usize,
    /// Sorted by `used_tokens`, largest first.
    pub breakdown: Vec<ProviderModelUsage>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsageSummary {
    pub used_tokens: u64,
    pub limit_tokens: u64,
    pub period: String,
    pub source_detail: String,
    pub file_count: usize,
    pub breakdown: Vec<ProviderModelUsage>,
}
