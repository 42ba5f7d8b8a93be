//! Waves node REST client
//!
//! Thin wrapper over the node HTTP API used for pool state reads. Two kinds
//! of reads exist: account data entries (raw key/value state) and read-only
//! script evaluation for figures the pool contract computes itself. Absent
//! keys are a normal outcome here, never an error.

use crate::errors::{ BotError, BotResult };
use crate::logger::{ self, LogTag };
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DataEntry {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
}

impl NodeClient {
    pub fn new(base_url: &str, timeout: Duration) -> BotResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a batch of data entries from an account's key-value state.
    /// Keys missing on-chain are simply absent from the returned map.
    pub async fn data_entries(
        &self,
        address: &str,
        keys: &[String]
    ) -> BotResult<HashMap<String, Value>> {
        let url = format!("{}/addresses/data/{}", self.base_url, address);
        let body = serde_json::json!({ "keys": keys });

        let entries: Vec<DataEntry> = self.http
            .post(&url)
            .json(&body)
            .send().await?
            .error_for_status()?
            .json().await?;

        logger::debug(
            LogTag::Node,
            &format!("{}: {} of {} keys present", address, entries.len(), keys.len())
        );

        Ok(
            entries
                .into_iter()
                .map(|e| (e.key, e.value))
                .collect()
        )
    }

    /// Fetch a single data entry; HTTP 404 means the key is unset.
    pub async fn data_entry(&self, address: &str, key: &str) -> BotResult<Option<Value>> {
        let url = format!("{}/addresses/data/{}/{}", self.base_url, address, key);
        let response = self.http.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let entry: DataEntry = response.error_for_status()?.json().await?;
        Ok(Some(entry.value))
    }

    /// Evaluate a read-only expression against an account's script.
    pub async fn evaluate(&self, address: &str, expr: &str) -> BotResult<Value> {
        let url = format!("{}/utils/script/evaluate/{}", self.base_url, address);
        let body = serde_json::json!({ "expr": expr });

        let result: Value = self.http
            .post(&url)
            .json(&body)
            .send().await?
            .error_for_status()?
            .json().await?;

        if let Some(message) = result.get("message").and_then(|m| m.as_str()) {
            return Err(BotError::Node(format!("evaluate {} failed: {}", expr, message)));
        }

        Ok(result)
    }

    /// Evaluate an expression and drill into the tuple payload the Puzzle
    /// contracts return (`result.value._2.value`).
    pub async fn evaluate_string(&self, address: &str, expr: &str) -> BotResult<Option<String>> {
        let result = self.evaluate(address, expr).await?;
        Ok(value_to_string(&result["result"]["value"]["_2"]["value"]))
    }
}

/// Read a state value as a string, whatever its JSON representation
pub fn state_string(state: &HashMap<String, Value>, key: &str) -> Option<String> {
    state.get(key).and_then(value_to_string)
}

/// JS-style truthiness for state flags: missing, false, 0 and "" are all falsy
pub fn state_flag(state: &HashMap<String, Value>, key: &str) -> bool {
    match state.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty() && s != "false",
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(true),
        _ => false,
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(key: &str, value: Value) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        map.insert(key.to_string(), value);
        map
    }

    #[test]
    fn test_state_string_accepts_numbers() {
        let state = state_with("total_supplied_X", Value::from(123456u64));
        assert_eq!(state_string(&state, "total_supplied_X"), Some("123456".to_string()));
        assert_eq!(state_string(&state, "missing"), None);
    }

    #[test]
    fn test_state_flag_truthiness() {
        assert!(state_flag(&state_with("f", Value::from(true)), "f"));
        assert!(state_flag(&state_with("f", Value::from(1)), "f"));
        assert!(state_flag(&state_with("f", Value::from("enabled")), "f"));
        assert!(!state_flag(&state_with("f", Value::from(false)), "f"));
        assert!(!state_flag(&state_with("f", Value::from(0)), "f"));
        assert!(!state_flag(&state_with("f", Value::from("")), "f"));
        assert!(!state_flag(&HashMap::new(), "f"));
    }
}
