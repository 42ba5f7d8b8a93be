//! Invoke-script transaction dispatch
//!
//! Builds the `rebalance(pool)` invoke transaction, has the node wallet sign
//! it, broadcasts it and blocks until confirmation. Key management stays in
//! the node wallet; the bot only holds the node API key.

use crate::constants::{
    DEFAULT_INVOKE_FEE,
    INVOKE_SCRIPT_TX_TYPE,
    TX_POLL_INTERVAL_SECS,
    TX_POLL_MAX_ATTEMPTS,
};
use crate::errors::{ BotError, BotResult };
use crate::logger::{ self, LogTag };
use serde::Serialize;
use serde_json::{ json, Value };
use std::time::Duration;

/// Invoke-script call argument
#[derive(Debug, Clone, Serialize)]
pub struct InvokeArg {
    #[serde(rename = "type")]
    pub arg_type: String,
    pub value: Value,
}

impl InvokeArg {
    pub fn string(value: &str) -> Self {
        Self {
            arg_type: "string".to_string(),
            value: Value::from(value),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            arg_type: "integer".to_string(),
            value: Value::from(value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub dapp: String,
    pub function_name: String,
    pub args: Vec<InvokeArg>,
    pub fee: u64,
}

impl InvokeRequest {
    pub fn new(dapp: &str, function_name: &str, args: Vec<InvokeArg>) -> Self {
        Self {
            dapp: dapp.to_string(),
            function_name: function_name.to_string(),
            args,
            fee: DEFAULT_INVOKE_FEE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvokeResult {
    pub id: String,
}

/// Node-backed transaction signer and broadcaster
pub struct BlockchainService {
    http: reqwest::Client,
    node_url: String,
    sender: String,
    api_key: String,
}

impl BlockchainService {
    pub fn new(
        node_url: &str,
        sender: &str,
        api_key: &str,
        timeout: Duration
    ) -> BotResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            node_url: node_url.trim_end_matches('/').to_string(),
            sender: sender.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Sign, broadcast and await confirmation of an invoke-script call.
    /// Blocks until the transaction lands in a block or the poll budget runs
    /// out; either way the next cycle starts from fresh on-chain state.
    pub async fn invoke(&self, request: &InvokeRequest) -> BotResult<InvokeResult> {
        let tx = json!({
            "type": INVOKE_SCRIPT_TX_TYPE,
            "version": 2,
            "sender": self.sender,
            "dApp": request.dapp,
            "call": {
                "function": request.function_name,
                "args": request.args,
            },
            "payment": [],
            "fee": request.fee,
        });

        let signed = self.post_tx("/transactions/sign", &tx, true).await?;
        let broadcast = self.post_tx("/transactions/broadcast", &signed, false).await?;

        let id = broadcast["id"]
            .as_str()
            .ok_or_else(|| {
                BotError::TransactionFailed {
                    reason: "broadcast response carried no transaction id".to_string(),
                }
            })?
            .to_string();

        logger::info(LogTag::Tx, &format!("Broadcast {} ({})", id, request.function_name));
        self.wait_for_tx(&id).await?;
        Ok(InvokeResult { id })
    }

    async fn post_tx(&self, path: &str, body: &Value, with_api_key: bool) -> BotResult<Value> {
        let url = format!("{}{}", self.node_url, path);
        let mut builder = self.http.post(&url).json(body);
        if with_api_key {
            builder = builder.header("X-API-Key", &self.api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BotError::TransactionFailed {
                reason: format!("{} returned {}: {}", path, status, text),
            });
        }
        Ok(response.json().await?)
    }

    /// Poll the node until the transaction is included in a block
    async fn wait_for_tx(&self, id: &str) -> BotResult<()> {
        let url = format!("{}/transactions/info/{}", self.node_url, id);

        for _ in 0..TX_POLL_MAX_ATTEMPTS {
            let response = self.http.get(&url).send().await?;
            if response.status().is_success() {
                let info: Value = response.json().await?;
                if info.get("height").is_some() {
                    logger::debug(LogTag::Tx, &format!("{} confirmed", id));
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_secs(TX_POLL_INTERVAL_SECS)).await;
        }

        Err(BotError::TransactionFailed {
            reason: format!("{} not confirmed after {} polls", id, TX_POLL_MAX_ATTEMPTS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_arg_serialization() {
        let arg = InvokeArg::string("3P4DK5VzDwL3vfc5ahUEhtoe5ByZNyacJ3X");
        let json = serde_json::to_value(&arg).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["value"], "3P4DK5VzDwL3vfc5ahUEhtoe5ByZNyacJ3X");

        let arg = InvokeArg::integer(42);
        let json = serde_json::to_value(&arg).unwrap();
        assert_eq!(json["type"], "integer");
        assert_eq!(json["value"], 42);
    }

    #[test]
    fn test_invoke_request_defaults() {
        let request = InvokeRequest::new("3PDapp", "rebalance", vec![InvokeArg::string("pool")]);
        assert_eq!(request.fee, DEFAULT_INVOKE_FEE);
        assert_eq!(request.function_name, "rebalance");
    }
}
