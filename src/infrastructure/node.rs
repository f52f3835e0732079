//! # Chain Node Access
//!
//! Read-only JSON-RPC access behind the [`ChainNode`] trait.
//!
//! The engines never talk to a transport directly; they depend on this
//! trait so tests can substitute deterministic nodes. The production
//! implementation wraps one ethers HTTP provider per configured chain
//! with a per-request timeout.

use crate::domain::chain::{Chain, ChainId};
use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use ethers::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// HTTP provider type alias.
pub type HttpProvider = Provider<Http>;

/// Descriptor of a prospective call, used for gas estimation and
/// read-only execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    /// Destination address.
    pub to: Address,
    /// Encoded calldata.
    pub data: Bytes,
    /// Native value attached to the call.
    pub value: U256,
    /// Sender address, when known.
    pub from: Option<Address>,
}

impl PendingCall {
    /// Creates a plain call to an address with no data or value.
    #[must_use]
    pub fn new(to: Address) -> Self {
        Self {
            to,
            data: Bytes::default(),
            value: U256::zero(),
            from: None,
        }
    }

    /// Sets the calldata.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Sets the attached native value.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the sender address.
    #[must_use]
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    fn to_request(&self) -> TransactionRequest {
        let mut tx = TransactionRequest::new()
            .to(self.to)
            .data(self.data.clone())
            .value(self.value);

        if let Some(from) = self.from {
            tx = tx.from(from);
        }

        tx
    }
}

/// Read-only node capability required by the engines.
#[async_trait]
pub trait ChainNode: Send + Sync + fmt::Debug {
    /// Returns the chain's current base gas price in wei.
    async fn gas_price(&self, chain_id: ChainId) -> CoreResult<U256>;

    /// Estimates the gas units the call would consume.
    async fn estimate_gas(&self, chain_id: ChainId, call: &PendingCall) -> CoreResult<U256>;

    /// Executes a read-only contract call and returns the raw result.
    async fn call(&self, chain_id: ChainId, to: Address, calldata: Bytes) -> CoreResult<Bytes>;

    /// Returns the native-asset balance of an address in wei.
    async fn native_balance(&self, chain_id: ChainId, address: Address) -> CoreResult<U256>;
}

/// JSON-RPC node access backed by one ethers provider per chain.
#[derive(Clone)]
pub struct EthersNode {
    providers: HashMap<ChainId, Arc<HttpProvider>>,
    timeout: Duration,
}

impl EthersNode {
    /// Default per-request timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    /// Creates a node with no providers.
    #[must_use]
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            providers: HashMap::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Adds a provider for a chain.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the RPC URL cannot be parsed into a
    /// provider.
    pub fn with_chain(mut self, chain_id: ChainId, rpc_url: &str) -> CoreResult<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| {
                CoreError::invalid_input(format!(
                    "chain {} has an invalid RPC URL: {}",
                    chain_id, e
                ))
            })?
            .interval(Duration::from_millis(100));

        self.providers.insert(chain_id, Arc::new(provider));
        Ok(self)
    }

    /// Creates a node with one provider per configured chain.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any chain's RPC URL is invalid.
    pub fn from_chains<'a>(
        chains: impl IntoIterator<Item = &'a Chain>,
        timeout_ms: u64,
    ) -> CoreResult<Self> {
        let mut node = Self::new(timeout_ms);
        for chain in chains {
            node = node.with_chain(chain.id, &chain.rpc_url)?;
        }
        Ok(node)
    }

    /// Returns the configured per-request timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the chain ids this node can reach.
    #[must_use]
    pub fn chains(&self) -> Vec<ChainId> {
        self.providers.keys().copied().collect()
    }

    fn provider(&self, chain_id: ChainId) -> CoreResult<&Arc<HttpProvider>> {
        self.providers.get(&chain_id).ok_or_else(|| {
            CoreError::not_found(format!("no RPC provider for chain {}", chain_id))
        })
    }

    async fn bounded<T, F>(&self, what: &str, chain_id: ChainId, fut: F) -> CoreResult<T>
    where
        F: std::future::Future<Output = Result<T, ProviderError>> + Send,
    {
        tracing::debug!("Issuing {} on chain {}", what, chain_id);
        match timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CoreError::remote_unavailable(format!(
                "{} failed on chain {}: {}",
                what, chain_id, e
            ))),
            Err(_) => Err(CoreError::remote_unavailable(format!(
                "{} timed out on chain {}",
                what, chain_id
            ))),
        }
    }
}

#[async_trait]
impl ChainNode for EthersNode {
    async fn gas_price(&self, chain_id: ChainId) -> CoreResult<U256> {
        let provider = self.provider(chain_id)?;
        self.bounded("gas price query", chain_id, provider.get_gas_price())
            .await
    }

    async fn estimate_gas(&self, chain_id: ChainId, call: &PendingCall) -> CoreResult<U256> {
        let provider = self.provider(chain_id)?;
        let tx = call.to_request();
        self.bounded(
            "gas estimation",
            chain_id,
            provider.estimate_gas(&tx.into(), None),
        )
        .await
    }

    async fn call(&self, chain_id: ChainId, to: Address, calldata: Bytes) -> CoreResult<Bytes> {
        let provider = self.provider(chain_id)?;
        let tx = TransactionRequest::new().to(to).data(calldata);
        self.bounded("contract call", chain_id, provider.call(&tx.into(), None))
            .await
    }

    async fn native_balance(&self, chain_id: ChainId, address: Address) -> CoreResult<U256> {
        let provider = self.provider(chain_id)?;
        self.bounded(
            "balance query",
            chain_id,
            provider.get_balance(address, None),
        )
        .await
    }
}

impl fmt::Debug for EthersNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chains = self.chains();
        chains.sort_unstable();
        f.debug_struct("EthersNode")
            .field("chains", &chains)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pending_call_builder() {
        let to: Address = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"
            .parse()
            .unwrap();
        let from: Address = "0x90F79bf6EB2c4f870365E785982E1f101E93b906"
            .parse()
            .unwrap();

        let call = PendingCall::new(to)
            .with_data(vec![0x70, 0xa0, 0x82, 0x31])
            .with_value(U256::from(7u64))
            .with_from(from);

        assert_eq!(call.to, to);
        assert_eq!(call.data.len(), 4);
        assert_eq!(call.value, U256::from(7u64));
        assert_eq!(call.from, Some(from));
    }

    #[test]
    fn with_chain_rejects_bad_url() {
        let node = EthersNode::new(1000).with_chain(ChainId::new(1), "not a url");
        assert!(node.is_err());
    }

    #[test]
    fn with_chain_registers_provider() {
        let node = EthersNode::new(1000)
            .with_chain(ChainId::new(11155111), "http://127.0.0.1:8545")
            .unwrap();
        assert_eq!(node.chains(), vec![ChainId::new(11155111)]);
    }

    #[tokio::test]
    async fn unknown_chain_is_not_found() {
        let node = EthersNode::new(1000);
        let err = node.gas_price(ChainId::new(999)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn debug_format_lists_chains() {
        let node = EthersNode::new(1000)
            .with_chain(ChainId::new(1), "http://127.0.0.1:8545")
            .unwrap();
        let debug = format!("{:?}", node);
        assert!(debug.contains("EthersNode"));
        assert!(debug.contains('1'));
    }
}
