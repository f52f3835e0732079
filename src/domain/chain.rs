//! # Chain Descriptors
//!
//! Static identity and connection metadata for a supported chain.
//!
//! Chains are loaded once at startup and looked up by numeric id; they
//! never change for the lifetime of the process.

use crate::domain::amount::MAX_DECIMALS;
use crate::domain::token::is_valid_address;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Numeric chain identifier (EIP-155 style).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Creates a new chain id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric id.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native-asset descriptor for a chain (e.g. ETH on Sepolia).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeAsset {
    /// Asset symbol (e.g. "ETH", "MATIC").
    pub symbol: String,
    /// Display name (e.g. "Sepolia Ether").
    pub name: String,
    /// Decimal precision of the smallest unit (18 for wei).
    pub decimals: u8,
}

impl NativeAsset {
    /// Creates a new native-asset descriptor.
    #[must_use]
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            decimals,
        }
    }
}

/// A supported chain and its connection metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Numeric chain id.
    pub id: ChainId,
    /// Display name (e.g. "Sepolia").
    pub name: String,
    /// Native asset of the chain.
    pub native: NativeAsset,
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Block-explorer base URL.
    pub explorer_url: String,
    /// True for test networks.
    #[serde(default)]
    pub testnet: bool,
    /// Address of the swap-quoting contract, when the chain has one.
    #[serde(default)]
    pub quoter: Option<String>,
}

impl Chain {
    /// Creates a new chain descriptor without a quoter.
    #[must_use]
    pub fn new(
        id: impl Into<ChainId>,
        name: impl Into<String>,
        native: NativeAsset,
        rpc_url: impl Into<String>,
        explorer_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            native,
            rpc_url: rpc_url.into(),
            explorer_url: explorer_url.into(),
            testnet: false,
            quoter: None,
        }
    }

    /// Marks the chain as a test network.
    #[must_use]
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Sets the quoting-contract address.
    #[must_use]
    pub fn with_quoter(mut self, quoter: impl Into<String>) -> Self {
        self.quoter = Some(quoter.into());
        self
    }

    /// Returns true if the chain has a quoting facility configured.
    #[inline]
    #[must_use]
    pub fn has_quoter(&self) -> bool {
        self.quoter.is_some()
    }

    /// Validates the descriptor fields.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the name or RPC URL is empty, the
    /// native decimals exceed the supported precision, or the quoter
    /// address is malformed.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid_input(format!(
                "chain {} has an empty name",
                self.id
            )));
        }

        if self.rpc_url.trim().is_empty() {
            return Err(CoreError::invalid_input(format!(
                "chain {} has an empty rpc_url",
                self.id
            )));
        }

        if self.native.decimals > MAX_DECIMALS {
            return Err(CoreError::invalid_input(format!(
                "chain {} native decimals {} exceed the maximum of {}",
                self.id, self.native.decimals, MAX_DECIMALS
            )));
        }

        if let Some(quoter) = &self.quoter {
            if !is_valid_address(quoter) {
                return Err(CoreError::invalid_input(format!(
                    "chain {} has a malformed quoter address: {}",
                    self.id, quoter
                )));
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
