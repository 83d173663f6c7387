//! Wire shapes for one line of an agent session log.
//!
//! These structs only describe what the JSONL files look like on disk. Every
//! field is optional and decoded leniently: a field of the wrong JSON type is
//! treated as absent instead of failing the whole line.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize, Debug, Default)]
pub struct CostObj {
    #[serde(default, deserialize_with = "lenient_float")]
    pub total: f64,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageUsage {
    #[serde(default, deserialize_with = "lenient_count")]
    pub input: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub output: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_tokens: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub cache_read: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub cache_write: i64,
    #[serde(default, deserialize_with = "object_or_none")]
    pub cost: Option<CostObj>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageObj {
    #[serde(default, deserialize_with = "string_or_none")]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub stop_reason: Option<String>,
    #[serde(default, deserialize_with = "object_or_none")]
    pub usage: Option<MessageUsage>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SessionLine {
    #[serde(rename = "type", default, deserialize_with = "string_or_none")]
    pub r#type: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "object_or_none")]
    pub message: Option<MessageObj>,
}

fn object_or_none<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(d)?;
    Ok(value
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

fn string_or_none<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

// Fractional counts truncate toward zero; anything non-numeric reads as 0.
fn lenient_count<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    };
    Ok(n)
}

fn lenient_float<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(0.0)),
        _ => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_line() {
        let line: SessionLine = serde_json::from_str(
            r#"{"type":"message","timestamp":"2026-01-01T00:00:00Z","message":{"provider":"anthropic","model":"claude","stopReason":"stop","usage":{"input":3,"output":4,"totalTokens":7,"cacheRead":1,"cacheWrite":2,"cost":{"total":0.5}}}}"#,
        )
        .unwrap();
        assert_eq!(line.r#type.as_deref(), Some("message"));
        let msg = line.message.unwrap();
        assert_eq!(msg.stop_reason.as_deref(), Some("stop"));
        let usage = msg.usage.unwrap();
        assert_eq!(usage.total_tokens, 7);
        assert_eq!(usage.cache_write, 2);
        assert_eq!(usage.cost.unwrap().total, 0.5);
    }

    #[test]
    fn string_message_is_treated_as_absent() {
        let line: SessionLine = serde_json::from_str(
            r#"{"type":"error","timestamp":"2026-01-01T00:00:00Z","message":"429 Too Many Requests"}"#,
        )
        .unwrap();
        assert!(line.message.is_none());
    }

    #[test]
    fn fractional_and_missing_counts() {
        let usage: MessageUsage =
            serde_json::from_str(r#"{"input":12.9,"output":null,"cacheRead":"7"}"#).unwrap();
        assert_eq!(usage.input, 12);
        assert_eq!(usage.output, 0);
        assert_eq!(usage.cache_read, 0);
        assert!(usage.cost.is_none());
    }
}
