//! # Application Layer
//!
//! Orchestration of the quoting, balance and fee engines.
//!
//! This layer wires the registries, the chain node and the price
//! oracle together to answer user-facing questions: what do I hold,
//! what would this swap return, what will it cost to execute.
//!
//! ## Engines
//!
//! - [`BalanceAggregator`]: Resolve wallet holdings across a token
//!   list, concurrently
//! - [`GasEstimator`]: Price a pending call across the three fee tiers
//! - [`QuoteEngine`]: Query the chain's quoting contract for an
//!   expected swap output
//! - [`BridgeEstimator`]: Preview cross-chain transfer fees

pub mod balances;
pub mod bridge;
pub mod gas;
pub mod quote;

pub use balances::{BalanceAggregator, BalanceConfig, BalanceReport};
pub use bridge::{
    BridgeEstimator, BridgePreview, BridgeRequest, BRIDGE_FEE_PRESETS_BPS, DEFAULT_BRIDGE_FEE_BPS,
};
pub use gas::GasEstimator;
pub use quote::{
    FeeTier, QuoteEngine, QuoteRequest, DEFAULT_SLIPPAGE_BPS, DEFAULT_SWAP_GAS_UNITS,
};
