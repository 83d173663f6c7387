//! Provider/model normalization.
//!
//! Pure string helpers that turn whatever the agent wrote into the grouping
//! key used by every aggregate. Neither component is ever empty.

use std::fmt;

pub const UNKNOWN: &str = "unknown";

pub fn normalize_provider(provider: &str) -> String {
    let p = provider.trim().to_lowercase();
    if p.is_empty() { UNKNOWN.to_string() } else { p }
}

/// Trims the model and strips a redundant `<provider>/` prefix, compared
/// case-insensitively. The remainder keeps its original case.
pub fn normalize_model(provider: &str, model: &str) -> String {
    let m = model.trim();
    if m.is_empty() {
        return UNKNOWN.to_string();
    }
    let prefix = format!("{}/", normalize_provider(provider));
    let stripped = match m.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(&prefix) => &m[prefix.len()..],
        _ => m,
    };
    if stripped.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        stripped.to_string()
    }
}

/// `provider/model` grouping identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey {
    pub provider: String,
    pub model: String,
}

impl ModelKey {
    pub fn new(provider: Option<&str>, model: Option<&str>) -> Self {
        let provider_raw = provider.unwrap_or_default();
        Self {
            provider: normalize_provider(provider_raw),
            model: normalize_model(provider_raw, model.unwrap_or_default()),
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
