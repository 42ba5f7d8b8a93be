use anyhow::{ Context, Result };
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::pool::types::Token;

/// Main bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    // Node settings
    pub node_url: String,
    pub explorer_url: String,

    // Rebalancer dApp settings
    pub dapp: String,
    pub sender: String,
    #[serde(default)]
    pub node_api_key: String,

    // Candidate pools, in priority order (first wins on equal yields)
    pub pools: Vec<String>,

    // Asset whose supply yield drives the rebalance decision
    pub target_asset_id: String,

    // Token reference data for every asset the pools can list
    pub tokens: Vec<TokenConfig>,

    // Optional caller address for per-account supplied/borrowed stats
    #[serde(default)]
    pub address: Option<String>,

    // Cycle settings
    #[serde(default = "default_loop_delay_secs")]
    pub loop_delay_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // Notification settings
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
    #[serde(default)]
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub asset_id: String,
    pub symbol: String,
    pub decimals: u32,
}

fn default_loop_delay_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            node_url: "https://nodes.wavesnodes.com".to_string(),
            explorer_url: "https://wavesexplorer.com".to_string(),
            dapp: String::new(),
            sender: String::new(),
            node_api_key: String::new(),
            pools: vec![
                "3P4DK5VzDwL3vfc5ahUEhtoe5ByZNyacJ3X".to_string(),
                "3P4uA5etnZi4AmBabKinq2bMiWU8KcnHZdH".to_string()
            ],
            target_asset_id: "DG2xFkPdDwKUoBkzGAhQtLpSGzfXLiCYPEzeKH2Ad24p".to_string(),
            tokens: vec![],
            address: None,
            loop_delay_secs: default_loop_delay_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            telegram_chat_id: None,
            bot_token: None,
        }
    }
}

impl BotConfig {
    /// Load configuration from a JSON file, writing a default template if absent
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            anyhow::bail!(
                "No config found at {}; a template was written there. Fill in dapp, sender and tokens before starting.",
                path
            );
        }

        let content = fs
            ::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config: BotConfig = serde_json
            ::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config file {}", path))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.dapp.is_empty() {
            anyhow::bail!("dapp address is not configured");
        }
        if self.sender.is_empty() {
            anyhow::bail!("sender address is not configured");
        }
        if self.pools.is_empty() {
            anyhow::bail!("no candidate pools configured");
        }
        if self.tokens.is_empty() {
            anyhow::bail!("no tokens configured");
        }
        if !self.tokens.iter().any(|t| t.asset_id == self.target_asset_id) {
            anyhow::bail!("target asset {} is missing from the token list", self.target_asset_id);
        }
        Ok(())
    }

    pub fn telegram_enabled(&self) -> bool {
        self.bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

/// Immutable token reference data, built once from config
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    by_asset_id: HashMap<String, Token>,
}

impl TokenRegistry {
    pub fn from_config(config: &BotConfig) -> Self {
        let by_asset_id = config.tokens
            .iter()
            .map(|t| {
                (
                    t.asset_id.clone(),
                    Token {
                        asset_id: t.asset_id.clone(),
                        symbol: t.symbol.clone(),
                        decimals: t.decimals,
                    },
                )
            })
            .collect();
        Self { by_asset_id }
    }

    pub fn get(&self, asset_id: &str) -> Option<&Token> {
        self.by_asset_id.get(asset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> BotConfig {
        BotConfig {
            dapp: "3PRebalancerDapp".to_string(),
            sender: "3PBotSender".to_string(),
            tokens: vec![TokenConfig {
                asset_id: "DG2xFkPdDwKUoBkzGAhQtLpSGzfXLiCYPEzeKH2Ad24p".to_string(),
                symbol: "USDN".to_string(),
                decimals: 6,
            }],
            ..BotConfig::default()
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_target_asset() {
        let mut config = sample_config();
        config.target_asset_id = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_pools() {
        let mut config = sample_config();
        config.pools.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let config = sample_config();
        let registry = TokenRegistry::from_config(&config);
        assert_eq!(
            registry.get("DG2xFkPdDwKUoBkzGAhQtLpSGzfXLiCYPEzeKH2Ad24p").map(|t| t.decimals),
            Some(6)
        );
        assert!(registry.get("missing").is_none());
    }
}
