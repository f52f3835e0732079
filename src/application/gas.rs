//! # Gas Estimation
//!
//! Three-tier fee quoting for a pending call.
//!
//! The estimator probes the node for the current gas price and the
//! call's gas units, then prices the slow, standard and fast tiers
//! from those two figures. Both probes must succeed; a gas estimate is
//! never assembled from partial data.

use crate::domain::amount::TokenAmount;
use crate::domain::chain::ChainId;
use crate::domain::gas::{GasEstimate, GasFee, GasTier};
use crate::error::{CoreError, CoreResult};
use crate::infrastructure::node::{ChainNode, PendingCall};
use crate::infrastructure::registry::ChainRegistry;
use ethers::types::U256;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Gwei carries nine decimal places of wei.
const GWEI_DECIMALS: u8 = 9;

/// Prices pending calls across the three fee tiers.
#[derive(Debug)]
pub struct GasEstimator {
    chains: Arc<ChainRegistry>,
    node: Arc<dyn ChainNode>,
}

impl GasEstimator {
    /// Creates a new estimator.
    #[must_use]
    pub fn new(chains: Arc<ChainRegistry>, node: Arc<dyn ChainNode>) -> Self {
        Self { chains, node }
    }

    /// Estimates the fee tiers for a pending call.
    ///
    /// The gas price and gas units are probed concurrently. The USD
    /// figures use the caller-supplied native asset price.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the chain is not registered (`NotFound`)
    /// - either node probe fails (`RemoteUnavailable`)
    /// - the estimate is abandoned (`Cancelled`)
    pub async fn estimate(
        &self,
        chain_id: ChainId,
        call: &PendingCall,
        native_usd_price: Decimal,
        cancel: &CancellationToken,
    ) -> CoreResult<GasEstimate> {
        // 1. Resolve the chain before touching the node
        let native_decimals = self.chains.chain_by_id(chain_id)?.native.decimals;

        // 2. Probe price and units together; either failure aborts
        let probes = async {
            tokio::try_join!(
                self.node.gas_price(chain_id),
                self.node.estimate_gas(chain_id, call),
            )
        };
        let (base_gas_price, gas_units) = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(CoreError::cancelled("gas estimate cancelled"));
            }
            probes = probes => probes?,
        };

        // 3. Price the tiers
        build_estimate(gas_units, base_gas_price, native_decimals, native_usd_price)
    }

    /// Estimates the fee tiers when the gas units are already known,
    /// skipping the gas probe against the node.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is not registered (`NotFound`),
    /// the gas price probe fails (`RemoteUnavailable`) or the estimate
    /// is abandoned (`Cancelled`).
    pub async fn estimate_for_units(
        &self,
        chain_id: ChainId,
        gas_units: U256,
        native_usd_price: Decimal,
        cancel: &CancellationToken,
    ) -> CoreResult<GasEstimate> {
        let native_decimals = self.chains.chain_by_id(chain_id)?.native.decimals;

        let base_gas_price = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(CoreError::cancelled("gas estimate cancelled"));
            }
            price = self.node.gas_price(chain_id) => price?,
        };

        build_estimate(gas_units, base_gas_price, native_decimals, native_usd_price)
    }
}

/// Derives the three fee tiers from the probed figures.
fn build_estimate(
    gas_units: U256,
    base_gas_price: U256,
    native_decimals: u8,
    native_usd_price: Decimal,
) -> CoreResult<GasEstimate> {
    let base_cost_wei = gas_units.checked_mul(base_gas_price).ok_or_else(|| {
        CoreError::invalid_input("gas cost exceeds the representable range")
    })?;
    let base_native = TokenAmount::from_raw(base_cost_wei, native_decimals).to_decimal()?;
    let base_gwei = TokenAmount::from_raw(base_gas_price, GWEI_DECIMALS).to_decimal()?;

    Ok(GasEstimate {
        gas_units,
        base_gas_price,
        slow: price_tier(GasTier::Slow, base_native, base_gwei, native_usd_price)?,
        standard: price_tier(GasTier::Standard, base_native, base_gwei, native_usd_price)?,
        fast: price_tier(GasTier::Fast, base_native, base_gwei, native_usd_price)?,
    })
}

/// Prices one tier by scaling the base figures with its multiplier.
fn price_tier(
    tier: GasTier,
    base_native: Decimal,
    base_gwei: Decimal,
    native_usd_price: Decimal,
) -> CoreResult<GasFee> {
    let overflow = || CoreError::invalid_input("gas fee exceeds the representable range");
    let multiplier = tier.multiplier();

    let total_native = base_native.checked_mul(multiplier).ok_or_else(overflow)?;
    let total_usd = total_native
        .checked_mul(native_usd_price)
        .ok_or_else(overflow)?;
    let gas_price_gwei = base_gwei.checked_mul(multiplier).ok_or_else(overflow)?;

    Ok(GasFee {
        gas_price_gwei,
        total_native,
        total_usd,
        confirmation_time: tier.confirmation_time(),
    })
}
