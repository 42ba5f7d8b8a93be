//! Pool comparison policy and the per-cycle rebalance driver
//!
//! Each cycle is independent and idempotent: read the on-chain `currentPool`
//! pointer, fetch every candidate pool's stats concurrently, pick the pool
//! with the strictly greatest supply APY for the target asset, and move the
//! funds when that pool is not already the current one. At most one
//! transaction is dispatched per cycle.

use crate::config::{ BotConfig, TokenRegistry };
use crate::errors::BotResult;
use crate::logger::{ self, LogTag };
use crate::node::NodeClient;
use crate::notifications::{ Notification, TelegramNotifier };
use crate::pool::types::PoolTokenStats;
use crate::pool::PoolStateFetcher;
use crate::transactions::{ BlockchainService, InvokeArg, InvokeRequest };
use futures::future::join_all;
use rust_decimal::{ Decimal, RoundingStrategy };
use std::time::Duration;

/// Stats for one candidate pool in one cycle
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub pool: String,
    pub tokens: Vec<PoolTokenStats>,
}

/// The pool holding the greatest supply APY for the target asset
#[derive(Debug, Clone, PartialEq)]
pub struct BestPool {
    pub pool: String,
    pub supply_apy: Decimal,
}

/// Ephemeral per-cycle decision, consumed immediately by the dispatcher
#[derive(Debug, Clone)]
pub struct RebalanceDecision {
    pub target_pool: String,
    /// Supply APY in the pool funds currently sit in, when its stats are known
    pub previous_apy: Option<Decimal>,
    pub new_apy: Decimal,
}

/// Find the target asset's stats within one pool's token list
pub fn find_target_stat<'a>(
    tokens: &'a [PoolTokenStats],
    asset_id: &str
) -> Option<&'a PoolTokenStats> {
    tokens.iter().find(|s| s.token.asset_id == asset_id)
}

/// Select the pool with the maximum supply APY for the target asset.
///
/// Pools that do not list the asset are excluded, not treated as zero. A
/// later pool must strictly exceed the running best, so the first pool in
/// configured order wins exact ties. Pools yielding nothing produce no
/// candidate at all.
pub fn select_best_pool(pools: &[PoolStats], target_asset_id: &str) -> Option<BestPool> {
    let mut best: Option<BestPool> = None;
    for pool in pools {
        let Some(stat) = find_target_stat(&pool.tokens, target_asset_id) else {
            continue;
        };
        if stat.supply_apy <= Decimal::ZERO {
            continue;
        }
        let is_better = match &best {
            None => true,
            Some(b) => stat.supply_apy > b.supply_apy,
        };
        if is_better {
            best = Some(BestPool {
                pool: pool.pool.clone(),
                supply_apy: stat.supply_apy,
            });
        }
    }
    best
}

/// Decide whether to rebalance, and to where.
///
/// Acts only when a candidate exists, it is not the current pool, and its
/// yield strictly exceeds the current pool's (exact ties never move funds).
pub fn decide(
    current_pool: Option<&str>,
    pools: &[PoolStats],
    target_asset_id: &str
) -> Option<RebalanceDecision> {
    let best = select_best_pool(pools, target_asset_id)?;

    if current_pool == Some(best.pool.as_str()) {
        return None;
    }

    let previous_apy = current_pool
        .and_then(|cp| pools.iter().find(|p| p.pool == cp))
        .and_then(|p| find_target_stat(&p.tokens, target_asset_id))
        .map(|s| s.supply_apy);

    if let Some(previous) = previous_apy {
        if best.supply_apy <= previous {
            return None;
        }
    }

    Some(RebalanceDecision {
        target_pool: best.pool,
        previous_apy,
        new_apy: best.supply_apy,
    })
}

fn format_apy(apy: Decimal) -> String {
    apy.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero).to_string()
}

/// The cycle driver: owns the node client, fetcher, dispatcher and notifier
pub struct Rebalancer {
    config: BotConfig,
    node: NodeClient,
    chain: BlockchainService,
    fetcher: PoolStateFetcher,
    notifier: Option<TelegramNotifier>,
}

impl Rebalancer {
    pub fn new(config: BotConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let node = NodeClient::new(&config.node_url, timeout)?;
        let registry = TokenRegistry::from_config(&config);
        let fetcher = PoolStateFetcher::new(node.clone(), registry, config.address.clone());
        let chain = BlockchainService::new(
            &config.node_url,
            &config.sender,
            &config.node_api_key,
            timeout
        )?;

        let notifier = match (&config.bot_token, config.telegram_chat_id) {
            (Some(token), Some(chat_id)) =>
                match TelegramNotifier::new(token, chat_id) {
                    Ok(notifier) => Some(notifier),
                    Err(e) => {
                        logger::warn(
                            LogTag::Telegram,
                            &format!("Telegram disabled: {}", e)
                        );
                        None
                    }
                }
            _ => None,
        };

        Ok(Self { config, node, chain, fetcher, notifier })
    }

    pub fn notifier(&self) -> Option<&TelegramNotifier> {
        self.notifier.as_ref()
    }

    pub fn pool_count(&self) -> usize {
        self.config.pools.len()
    }

    /// Read the shared on-chain pointer naming the pool funds sit in
    pub async fn current_pool(&self) -> BotResult<Option<String>> {
        let value = self.node.data_entry(&self.config.dapp, "currentPool").await?;
        Ok(value.and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    /// One full decision cycle: read, compare, at most one dispatch, notify.
    pub async fn run_cycle(&self) -> BotResult<()> {
        let current = self.current_pool().await?;
        logger::debug(
            LogTag::Rebalance,
            &format!("currentPool = {}", current.as_deref().unwrap_or("<unset>"))
        );

        // Candidate pools are independent; read them all concurrently. A pool
        // whose stats fail (inactive or unreachable) is excluded from the
        // comparison instead of sinking the cycle.
        let fetches = self.config.pools.iter().map(|pool| self.fetcher.fetch_pool_stats(pool));
        let results = join_all(fetches).await;

        let mut pools = Vec::with_capacity(self.config.pools.len());
        for (pool, result) in self.config.pools.iter().zip(results) {
            match result {
                Ok(tokens) => pools.push(PoolStats { pool: pool.clone(), tokens }),
                Err(e) => {
                    logger::warn(
                        LogTag::Pool,
                        &format!("{} excluded this cycle: {}", pool, e)
                    );
                }
            }
        }

        let Some(decision) = decide(current.as_deref(), &pools, &self.config.target_asset_id) else {
            logger::debug(LogTag::Rebalance, "No better pool found; holding position");
            return Ok(());
        };

        logger::info(
            LogTag::Rebalance,
            &format!(
                "Moving funds to {} (APY {}% -> {}%)",
                decision.target_pool,
                decision.previous_apy.map(format_apy).unwrap_or_else(|| "?".to_string()),
                format_apy(decision.new_apy)
            )
        );

        let request = InvokeRequest::new(
            &self.config.dapp,
            "rebalance",
            vec![InvokeArg::string(&decision.target_pool)]
        );
        // A dispatch failure propagates: the cycle ends with no notification
        // and the next cycle re-decides from fresh state
        let tx = self.chain.invoke(&request).await?;

        let tx_url = format!("{}/tx/{}", self.config.explorer_url.trim_end_matches('/'), tx.id);
        logger::info(LogTag::Rebalance, &format!("Rebalance confirmed: {}", tx_url));

        if let Some(notifier) = &self.notifier {
            let notification = Notification::rebalance_executed(
                &decision.target_pool,
                &tx_url,
                &decision.previous_apy.map(format_apy).unwrap_or_else(|| "?".to_string()),
                &format_apy(decision.new_apy)
            );
            if let Err(e) = notifier.send(&notification).await {
                logger::warn(LogTag::Telegram, &format!("Notification failed: {}", e));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::types::{ PriceRange, Token };
    use std::str::FromStr;

    const TARGET: &str = "DG2xFkPdDwKUoBkzGAhQtLpSGzfXLiCYPEzeKH2Ad24p";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn stat(asset_id: &str, supply_apy: Decimal) -> PoolTokenStats {
        PoolTokenStats {
            token: Token {
                asset_id: asset_id.to_string(),
                symbol: "TKN".to_string(),
                decimals: 6,
            },
            cf: Decimal::ZERO,
            lt: Decimal::ZERO,
            penalty: Decimal::ZERO,
            interest: Decimal::ZERO,
            prices: PriceRange::default(),
            supply_limit: Decimal::ZERO,
            daily_income: Decimal::ZERO,
            daily_loan: Decimal::ZERO,
            total_supply: Decimal::ZERO,
            self_supply: Decimal::ZERO,
            total_borrow: Decimal::ZERO,
            self_borrow: Decimal::ZERO,
            utilization: Decimal::ZERO,
            supply_apy,
            borrow_apy: Decimal::ZERO,
            is_autostake_avl: false,
        }
    }

    fn pool(name: &str, stats: Vec<PoolTokenStats>) -> PoolStats {
        PoolStats {
            pool: name.to_string(),
            tokens: stats,
        }
    }

    #[test]
    fn test_selects_strictly_better_pool() {
        let pools = vec![
            pool("P1", vec![stat(TARGET, dec("5.00"))]),
            pool("P2", vec![stat(TARGET, dec("7.25"))])
        ];
        let decision = decide(Some("P1"), &pools, TARGET).unwrap();
        assert_eq!(decision.target_pool, "P2");
        assert_eq!(decision.previous_apy, Some(dec("5.00")));
        assert_eq!(decision.new_apy, dec("7.25"));
    }

    #[test]
    fn test_no_action_when_current_pool_is_best() {
        let pools = vec![
            pool("P1", vec![stat(TARGET, dec("7.25"))]),
            pool("P2", vec![stat(TARGET, dec("5.00"))])
        ];
        assert!(decide(Some("P1"), &pools, TARGET).is_none());
    }

    #[test]
    fn test_no_action_on_exact_tie_with_incumbent() {
        let pools = vec![
            pool("P1", vec![stat(TARGET, dec("5.00"))]),
            pool("P2", vec![stat(TARGET, dec("5.00"))])
        ];
        assert!(decide(Some("P2"), &pools, TARGET).is_none());
        assert!(decide(Some("P1"), &pools, TARGET).is_none());
    }

    #[test]
    fn test_first_pool_wins_exact_tie() {
        let pools = vec![
            pool("P1", vec![stat(TARGET, dec("5.00"))]),
            pool("P2", vec![stat(TARGET, dec("5.00"))])
        ];
        let best = select_best_pool(&pools, TARGET).unwrap();
        assert_eq!(best.pool, "P1");
    }

    #[test]
    fn test_pools_without_target_asset_are_excluded() {
        let pools = vec![
            pool("P1", vec![stat("otherAsset", dec("99.0"))]),
            pool("P2", vec![stat(TARGET, dec("3.00"))])
        ];
        let decision = decide(Some("P1"), &pools, TARGET).unwrap();
        assert_eq!(decision.target_pool, "P2");
        // P1 lacks the target asset, so no previous APY is known
        assert_eq!(decision.previous_apy, None);
    }

    #[test]
    fn test_single_pool_with_asset() {
        let pools = vec![pool("P1", vec![stat(TARGET, dec("4.10"))])];
        let decision = decide(Some("P2"), &pools, TARGET).unwrap();
        assert_eq!(decision.target_pool, "P1");

        assert!(decide(Some("P1"), &pools, TARGET).is_none());
    }

    #[test]
    fn test_no_stats_for_target_anywhere() {
        let pools = vec![
            pool("P1", vec![stat("a", dec("5.0"))]),
            pool("P2", vec![stat("b", dec("6.0"))])
        ];
        assert!(decide(Some("P1"), &pools, TARGET).is_none());
    }

    #[test]
    fn test_zero_yield_pools_produce_no_candidate() {
        let pools = vec![
            pool("P1", vec![stat(TARGET, Decimal::ZERO)]),
            pool("P2", vec![stat(TARGET, Decimal::ZERO)])
        ];
        assert!(select_best_pool(&pools, TARGET).is_none());
        assert!(decide(Some("P1"), &pools, TARGET).is_none());
    }

    #[test]
    fn test_empty_pool_list() {
        assert!(decide(Some("P1"), &[], TARGET).is_none());
    }

    #[test]
    fn test_unset_current_pointer_still_moves() {
        let pools = vec![pool("P1", vec![stat(TARGET, dec("2.00"))])];
        let decision = decide(None, &pools, TARGET).unwrap();
        assert_eq!(decision.target_pool, "P1");
        assert_eq!(decision.previous_apy, None);
    }
}
