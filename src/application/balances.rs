//! # Balance Aggregation
//!
//! Concurrent resolution of a wallet's holdings across many tokens.
//!
//! One fetch is spawned per token; each fetch independently times out
//! or fails without aborting the others. Partial failure is normal,
//! not exceptional: the report always holds one entry per requested
//! token, in request order.

use crate::domain::amount::TokenAmount;
use crate::domain::balance::Balance;
use crate::domain::chain::ChainId;
use crate::domain::token::Token;
use crate::error::{CoreError, CoreResult};
use crate::infrastructure::abi;
use crate::infrastructure::node::ChainNode;
use crate::infrastructure::oracle::PriceOracle;
use crate::infrastructure::registry::ChainRegistry;
use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Configuration for balance aggregation.
#[derive(Debug, Clone)]
pub struct BalanceConfig {
    /// Timeout per token fetch in milliseconds.
    pub fetch_timeout_ms: u64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 5000,
        }
    }
}

impl BalanceConfig {
    /// Creates a configuration with the specified per-fetch timeout.
    #[must_use]
    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            fetch_timeout_ms: timeout_ms,
        }
    }
}

/// Ordered per-token result set for one balance query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    /// One entry per requested token, in request order.
    pub balances: Vec<Balance>,
}

impl BalanceReport {
    /// Returns the number of successfully fetched balances.
    #[must_use]
    pub fn fresh_count(&self) -> usize {
        self.balances.iter().filter(|b| b.is_fresh()).count()
    }

    /// Returns the number of failed fetches.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.balances.len() - self.fresh_count()
    }

    /// Returns true if any fetch failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Sums the USD value across fresh balances, saturating on
    /// overflow.
    #[must_use]
    pub fn total_usd(&self) -> Decimal {
        self.balances
            .iter()
            .filter(|b| b.is_fresh())
            .fold(Decimal::ZERO, |acc, b| {
                acc.checked_add(b.usd_value).unwrap_or(Decimal::MAX)
            })
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Returns true if the report is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// Resolves wallet holdings across a token list concurrently.
#[derive(Debug)]
pub struct BalanceAggregator {
    chains: Arc<ChainRegistry>,
    node: Arc<dyn ChainNode>,
    oracle: Arc<dyn PriceOracle>,
    config: BalanceConfig,
}

impl BalanceAggregator {
    /// Creates a new aggregator with all dependencies.
    #[must_use]
    pub fn new(
        chains: Arc<ChainRegistry>,
        node: Arc<dyn ChainNode>,
        oracle: Arc<dyn PriceOracle>,
        config: BalanceConfig,
    ) -> Self {
        Self {
            chains,
            node,
            oracle,
            config,
        }
    }

    /// Creates a new aggregator with default configuration.
    #[must_use]
    pub fn with_defaults(
        chains: Arc<ChainRegistry>,
        node: Arc<dyn ChainNode>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Self {
        Self::new(chains, node, oracle, BalanceConfig::default())
    }

    /// Fetches the owner's balance for every token, concurrently.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The chain all tokens live on
    /// * `owner` - The wallet address to query
    /// * `tokens` - Tokens to resolve, in the order the report keeps
    /// * `cancel` - Token to abandon the whole batch early
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the chain is not registered (`NotFound`)
    /// - the owner address is malformed (`InvalidInput`)
    /// - any token belongs to another chain (`InvalidInput`)
    /// - the batch is abandoned (`Cancelled`)
    ///
    /// Per-token fetch failures never fail the batch; they surface as
    /// failed entries in the report.
    pub async fn balances(
        &self,
        chain_id: ChainId,
        owner: &str,
        tokens: &[Token],
        cancel: &CancellationToken,
    ) -> CoreResult<BalanceReport> {
        // 1. Static validation before any remote call
        self.chains.chain_by_id(chain_id)?;

        let owner: Address = owner.parse().map_err(|_| {
            CoreError::invalid_input(format!("malformed wallet address: {}", owner))
        })?;

        for token in tokens {
            if token.chain_id != chain_id {
                return Err(CoreError::invalid_input(format!(
                    "token '{}' belongs to chain {}, not {}",
                    token.symbol, token.chain_id, chain_id
                )));
            }
        }

        if tokens.is_empty() {
            return Ok(BalanceReport {
                balances: Vec::new(),
            });
        }

        // 2. Fan out one fetch per token
        let mut handles = Vec::with_capacity(tokens.len());
        for token in tokens {
            let node = Arc::clone(&self.node);
            let oracle = Arc::clone(&self.oracle);
            let token = token.clone();
            let fetch_timeout = Duration::from_millis(self.config.fetch_timeout_ms);
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                fetch_balance(node, oracle, chain_id, owner, token, fetch_timeout, cancel).await
            }));
        }

        // 3. Join in request order; the fetches share the cancellation
        //    token, so abandoning the batch also winds them down
        let results = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(CoreError::cancelled("balance query superseded"));
            }
            results = futures::future::join_all(handles) => results,
        };

        let mut balances = Vec::with_capacity(results.len());
        for (token, result) in tokens.iter().zip(results) {
            match result {
                Ok(balance) => balances.push(balance),
                Err(e) => {
                    tracing::error!("Balance task for {} panicked: {}", token.symbol, e);
                    balances.push(Balance::failed(token.clone(), "balance task failed"));
                }
            }
        }

        Ok(BalanceReport { balances })
    }
}

/// Fetches one token balance, decimal-adjusts it and attaches the USD
/// value. Failures are folded into the returned entry.
async fn fetch_balance(
    node: Arc<dyn ChainNode>,
    oracle: Arc<dyn PriceOracle>,
    chain_id: ChainId,
    owner: Address,
    token: Token,
    fetch_timeout: Duration,
    cancel: CancellationToken,
) -> Balance {
    let fetched = tokio::select! {
        _ = cancel.cancelled() => {
            return Balance::failed(token, "balance query cancelled");
        }
        fetched = timeout(
            fetch_timeout,
            query_raw_balance(node.as_ref(), chain_id, owner, &token),
        ) => fetched,
    };

    let raw = match fetched {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            tracing::warn!("Balance fetch for {} failed: {}", token.symbol, e);
            let message = e.to_string();
            return Balance::failed(token, message);
        }
        Err(_) => {
            return Balance::failed(token, "balance query timed out");
        }
    };

    let amount = match TokenAmount::from_raw(raw, token.decimals).to_decimal() {
        Ok(amount) => amount,
        Err(e) => {
            let message = e.to_string();
            return Balance::failed(token, message);
        }
    };

    // A missing price degrades the USD figure, never the balance
    let usd_value = tokio::select! {
        _ = cancel.cancelled() => Decimal::ZERO,
        price = oracle.usd_price(&token) => match price {
            Ok(price) => amount.checked_mul(price).unwrap_or(Decimal::ZERO),
            Err(_) => Decimal::ZERO,
        },
    };

    Balance::fresh(token, raw, amount, usd_value)
}

/// Issues the raw balance query: native-asset lookup for the sentinel
/// address, ERC-20 `balanceOf` otherwise.
async fn query_raw_balance(
    node: &dyn ChainNode,
    chain_id: ChainId,
    owner: Address,
    token: &Token,
) -> CoreResult<U256> {
    if token.is_native() {
        return node.native_balance(chain_id, owner).await;
    }

    let contract: Address = token.address.parse().map_err(|_| {
        CoreError::invalid_input(format!(
            "token '{}' has a malformed address: {}",
            token.symbol, token.address
        ))
    })?;

    let data = node
        .call(chain_id, contract, abi::encode_balance_of(owner))
        .await?;

    if data.is_empty() {
        return Err(CoreError::remote_unavailable(format!(
            "no contract code at {} on chain {}",
            token.address, chain_id
        )));
    }

    abi::decode_uint(&data)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::chain::{Chain, NativeAsset};
    use async_trait::async_trait;
    use ethers::types::Bytes;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const OWNER: &str = "0x90F79bf6EB2c4f870365E785982E1f101E93b906";
    const USDC: &str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";
    const USDT: &str = "0x7169D38820dfd117C3FA1f22a697dBA58d90BA06";

    fn chain_id() -> ChainId {
        ChainId::new(11155111)
    }

    fn registry() -> Arc<ChainRegistry> {
        let chain = Chain::new(
            11155111u64,
            "Sepolia",
            NativeAsset::new("ETH", "Sepolia Ether", 18),
            "https://sepolia.example.com",
            "https://sepolia.etherscan.io",
        )
        .with_testnet(true);
        Arc::new(ChainRegistry::new(vec![chain]).unwrap())
    }

    fn eth() -> Token {
        Token::native(11155111u64, "ETH", "Ethereum", 18)
    }

    fn usdc() -> Token {
        Token::new(11155111u64, USDC, "USDC", "USD Coin", 6)
    }

    fn usdt() -> Token {
        Token::new(11155111u64, USDT, "USDT", "Tether USD", 6)
    }

    #[derive(Debug, Default)]
    struct MockNode {
        native: U256,
        balances: HashMap<String, U256>,
        failing: HashSet<String>,
        empty_response: HashSet<String>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl MockNode {
        fn new() -> Self {
            Self::default()
        }

        fn with_native(mut self, wei: U256) -> Self {
            self.native = wei;
            self
        }

        fn with_balance(mut self, address: &str, raw: U256) -> Self {
            self.balances.insert(address.to_lowercase(), raw);
            self
        }

        fn with_failing(mut self, address: &str) -> Self {
            self.failing.insert(address.to_lowercase());
            self
        }

        fn with_empty_response(mut self, address: &str) -> Self {
            self.empty_response.insert(address.to_lowercase());
            self
        }

        fn with_delay(mut self, delay_ms: u64) -> Self {
            self.delay = Duration::from_millis(delay_ms);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChainNode for MockNode {
        async fn gas_price(&self, _chain_id: ChainId) -> CoreResult<U256> {
            unimplemented!()
        }

        async fn estimate_gas(
            &self,
            _chain_id: ChainId,
            _call: &crate::infrastructure::node::PendingCall,
        ) -> CoreResult<U256> {
            unimplemented!()
        }

        async fn call(
            &self,
            _chain_id: ChainId,
            to: Address,
            _calldata: Bytes,
        ) -> CoreResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let key = format!("{:?}", to);
            if self.failing.contains(&key) {
                return Err(CoreError::remote_unavailable("node exploded"));
            }
            if self.empty_response.contains(&key) {
                return Ok(Bytes::new());
            }

            let raw = self.balances.get(&key).copied().unwrap_or_default();
            let mut word = [0u8; 32];
            raw.to_big_endian(&mut word);
            Ok(Bytes::from(word.to_vec()))
        }

        async fn native_balance(&self, _chain_id: ChainId, _address: Address) -> CoreResult<U256> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.native)
        }
    }

    #[derive(Debug, Default)]
    struct MockOracle {
        prices: HashMap<String, Decimal>,
    }

    impl MockOracle {
        fn with_price(mut self, address: &str, price: Decimal) -> Self {
            self.prices.insert(address.to_lowercase(), price);
            self
        }
    }

    #[async_trait]
    impl PriceOracle for MockOracle {
        async fn usd_price(&self, token: &Token) -> CoreResult<Decimal> {
            self.prices
                .get(&token.address.to_lowercase())
                .copied()
                .ok_or_else(|| CoreError::price_unknown(token.symbol.clone()))
        }
    }

    fn aggregator(node: Arc<MockNode>, oracle: MockOracle) -> BalanceAggregator {
        BalanceAggregator::new(
            registry(),
            node,
            Arc::new(oracle),
            BalanceConfig::with_timeout(200),
        )
    }

    #[tokio::test]
    async fn resolves_native_and_contract_balances_in_order() {
        let node = Arc::new(
            MockNode::new()
                .with_native(U256::from(2_000_000_000_000_000_000u64))
                .with_balance(USDC, U256::from(25_000_000u64))
                .with_balance(USDT, U256::from(7_500_000u64)),
        );
        let oracle = MockOracle::default()
            .with_price(crate::domain::token::NATIVE_ADDRESS, Decimal::new(2500, 0))
            .with_price(USDC, Decimal::ONE)
            .with_price(USDT, Decimal::ONE);

        let report = aggregator(Arc::clone(&node), oracle)
            .balances(
                chain_id(),
                OWNER,
                &[eth(), usdc(), usdt()],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.len(), 3);
        assert_eq!(report.fresh_count(), 3);

        assert_eq!(report.balances[0].token.symbol, "ETH");
        assert_eq!(report.balances[0].amount, Decimal::new(2, 0));
        assert_eq!(report.balances[0].usd_value, Decimal::new(5000, 0));

        assert_eq!(report.balances[1].token.symbol, "USDC");
        assert_eq!(report.balances[1].amount, Decimal::new(25, 0));

        assert_eq!(report.balances[2].token.symbol, "USDT");
        assert_eq!(report.balances[2].amount, Decimal::new(75, 1));

        // One query per token
        assert_eq!(node.call_count(), 3);
    }

    #[tokio::test]
    async fn one_failing_token_flags_exactly_that_entry() {
        let node = Arc::new(
            MockNode::new()
                .with_native(U256::from(1_000_000_000_000_000_000u64))
                .with_failing(USDC)
                .with_balance(USDT, U256::from(5_000_000u64)),
        );
        let oracle = MockOracle::default();

        let report = aggregator(node, oracle)
            .balances(
                chain_id(),
                OWNER,
                &[eth(), usdc(), usdt()],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.len(), 3);
        assert_eq!(report.failed_count(), 1);
        assert!(report.balances[0].is_fresh());
        assert!(!report.balances[1].is_fresh());
        assert!(report.balances[2].is_fresh());
        assert!(report.balances[1]
            .error_message()
            .unwrap()
            .contains("node exploded"));
    }

    #[tokio::test]
    async fn unknown_price_yields_zero_usd_not_error() {
        let node = Arc::new(MockNode::new().with_balance(USDC, U256::from(9_000_000u64)));
        let oracle = MockOracle::default();

        let report = aggregator(node, oracle)
            .balances(chain_id(), OWNER, &[usdc()], &CancellationToken::new())
            .await
            .unwrap();

        let balance = &report.balances[0];
        assert!(balance.is_fresh());
        assert_eq!(balance.amount, Decimal::new(9, 0));
        assert_eq!(balance.usd_value, Decimal::ZERO);
    }

    #[tokio::test]
    async fn malformed_owner_rejected_without_remote_calls() {
        let node = Arc::new(MockNode::new());
        let err = aggregator(Arc::clone(&node), MockOracle::default())
            .balances(
                chain_id(),
                "not-an-address",
                &[usdc()],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidInput { .. }));
        assert_eq!(node.call_count(), 0);
    }

    #[tokio::test]
    async fn mixed_chain_tokens_rejected_without_remote_calls() {
        let node = Arc::new(MockNode::new());
        let stray = Token::new(80002u64, USDC, "USDC", "USD Coin", 6);

        let err = aggregator(Arc::clone(&node), MockOracle::default())
            .balances(
                chain_id(),
                OWNER,
                &[usdc(), stray],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidInput { .. }));
        assert_eq!(node.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_chain_is_not_found() {
        let node = Arc::new(MockNode::new());
        let err = aggregator(node, MockOracle::default())
            .balances(
                ChainId::new(999),
                OWNER,
                &[usdc()],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn empty_token_list_yields_empty_report() {
        let node = Arc::new(MockNode::new());
        let report = aggregator(node, MockOracle::default())
            .balances(chain_id(), OWNER, &[], &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.total_usd(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn slow_fetch_times_out_into_failed_entry() {
        let node = Arc::new(
            MockNode::new()
                .with_balance(USDC, U256::from(1_000_000u64))
                .with_delay(500),
        );
        let oracle = MockOracle::default();

        let aggregator = BalanceAggregator::new(
            registry(),
            node,
            Arc::new(oracle),
            BalanceConfig::with_timeout(50),
        );

        let report = aggregator
            .balances(chain_id(), OWNER, &[usdc()], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.failed_count(), 1);
        assert!(report.balances[0]
            .error_message()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn cancelled_batch_returns_cancelled() {
        let node = Arc::new(MockNode::new().with_delay(500).with_balance(
            USDC,
            U256::from(1_000_000u64),
        ));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = aggregator(node, MockOracle::default())
            .balances(chain_id(), OWNER, &[usdc()], &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn empty_contract_response_fails_that_entry() {
        let node = Arc::new(MockNode::new().with_empty_response(USDC));

        let report = aggregator(node, MockOracle::default())
            .balances(chain_id(), OWNER, &[usdc()], &CancellationToken::new())
            .await
            .unwrap();

        assert!(!report.balances[0].is_fresh());
        assert!(report.balances[0]
            .error_message()
            .unwrap()
            .contains("no contract code"));
    }

    #[tokio::test]
    async fn report_totals() {
        let node = Arc::new(
            MockNode::new()
                .with_balance(USDC, U256::from(10_000_000u64))
                .with_failing(USDT),
        );
        let oracle = MockOracle::default().with_price(USDC, Decimal::ONE);

        let report = aggregator(node, oracle)
            .balances(
                chain_id(),
                OWNER,
                &[usdc(), usdt()],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.fresh_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(report.has_failures());
        assert_eq!(report.total_usd(), Decimal::new(10, 0));
    }
}
