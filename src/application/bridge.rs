//! # Bridge Previews
//!
//! Fee previews for moving a token between two chains.
//!
//! The preview is pure arithmetic over the configured fee schedule. It
//! makes no remote calls and carries no routing information; it only
//! tells the user what a bridge of this size would cost and leave them
//! with on the destination chain.

use crate::domain::amount::TokenAmount;
use crate::domain::chain::ChainId;
use crate::domain::token::Token;
use crate::error::{CoreError, CoreResult};
use crate::infrastructure::registry::{ChainRegistry, TokenRegistry};
use ethers::types::{Address, U256};
use serde::Serialize;
use std::sync::Arc;

/// Selectable bridge fee presets in basis points (0.1%, 0.5%, 1%).
pub const BRIDGE_FEE_PRESETS_BPS: [u32; 3] = [10, 50, 100];

/// Default bridge fee in basis points (0.5%).
pub const DEFAULT_BRIDGE_FEE_BPS: u32 = 50;

const BPS_DENOMINATOR: u32 = 10_000;

/// Parameters for one bridge preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRequest {
    /// Chain the funds leave.
    pub from_chain: ChainId,
    /// Chain the funds arrive on.
    pub to_chain: ChainId,
    /// Address of the token being bridged, on the source chain.
    pub token: String,
    /// Human-readable amount to bridge, e.g. `"250"`.
    pub amount: String,
    /// Wallet sending the funds.
    pub sender: String,
    /// Destination wallet; the sender receives when unset.
    pub recipient: Option<String>,
    /// Fee override in basis points; the default preset applies when
    /// unset.
    pub fee_bps: Option<u32>,
}

impl BridgeRequest {
    /// Creates a request delivering to the sender at the default fee.
    pub fn new(
        from_chain: impl Into<ChainId>,
        to_chain: impl Into<ChainId>,
        token: impl Into<String>,
        amount: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            from_chain: from_chain.into(),
            to_chain: to_chain.into(),
            token: token.into(),
            amount: amount.into(),
            sender: sender.into(),
            recipient: None,
            fee_bps: None,
        }
    }

    /// Delivers to a different wallet than the sender.
    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Overrides the fee in basis points.
    #[must_use]
    pub fn with_fee_bps(mut self, fee_bps: u32) -> Self {
        self.fee_bps = Some(fee_bps);
        self
    }
}

/// Cost breakdown for a prospective bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgePreview {
    /// Token being bridged.
    pub token: Token,
    /// Chain the funds leave.
    pub from_chain: ChainId,
    /// Chain the funds arrive on.
    pub to_chain: ChainId,
    /// Amount entering the bridge.
    pub amount_in: TokenAmount,
    /// Fee withheld by the bridge.
    pub fee: TokenAmount,
    /// Amount delivered on the destination chain.
    pub amount_out: TokenAmount,
    /// Fee rate applied, in basis points.
    pub fee_bps: u32,
    /// Wallet receiving the funds.
    pub recipient: Address,
}

/// Previews bridge transfers against the configured fee schedule.
#[derive(Debug)]
pub struct BridgeEstimator {
    chains: Arc<ChainRegistry>,
    tokens: Arc<TokenRegistry>,
}

impl BridgeEstimator {
    /// Creates a new estimator.
    #[must_use]
    pub fn new(chains: Arc<ChainRegistry>, tokens: Arc<TokenRegistry>) -> Self {
        Self { chains, tokens }
    }

    /// Previews the fee and delivered amount for a bridge transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - either chain is unregistered, or the token is not registered
    ///   on the source chain (`NotFound`)
    /// - the chains are the same, the amount is not positive, an
    ///   address is malformed, or the fee swallows the whole amount
    ///   (`InvalidInput`)
    pub fn preview(&self, request: &BridgeRequest) -> CoreResult<BridgePreview> {
        // 1. Both endpoints must be registered and distinct
        self.chains.chain_by_id(request.from_chain)?;
        self.chains.chain_by_id(request.to_chain)?;
        if request.from_chain == request.to_chain {
            return Err(CoreError::invalid_input(
                "bridging requires two different chains",
            ));
        }

        // 2. The token is looked up on the source chain
        let token = self
            .tokens
            .require_token(request.from_chain, &request.token)?
            .clone();

        // 3. Amount, wallets and fee rate
        let amount_in = TokenAmount::parse(&request.amount, token.decimals)?;

        let sender: Address = request.sender.parse().map_err(|_| {
            CoreError::invalid_input(format!("malformed sender address: {}", request.sender))
        })?;
        let recipient = match &request.recipient {
            Some(recipient) => recipient.parse().map_err(|_| {
                CoreError::invalid_input(format!("malformed recipient address: {}", recipient))
            })?,
            None => sender,
        };

        let fee_bps = request.fee_bps.unwrap_or(DEFAULT_BRIDGE_FEE_BPS);
        if fee_bps >= BPS_DENOMINATOR {
            return Err(CoreError::invalid_input(format!(
                "bridge fee of {} basis points swallows the whole amount",
                fee_bps
            )));
        }

        // 4. Fee math on raw units; the fee is strictly smaller than
        //    the amount, so the subtraction cannot underflow
        let fee_raw = fee_portion(amount_in.raw(), fee_bps);
        let out_raw = amount_in.raw() - fee_raw;
        let decimals = token.decimals;

        Ok(BridgePreview {
            token,
            from_chain: request.from_chain,
            to_chain: request.to_chain,
            amount_in,
            fee: TokenAmount::from_raw(fee_raw, decimals),
            amount_out: TokenAmount::from_raw(out_raw, decimals),
            fee_bps,
            recipient,
        })
    }
}

/// Computes `raw * fee_bps / 10_000`, dividing first when the scaled
/// product would overflow.
fn fee_portion(raw: U256, fee_bps: u32) -> U256 {
    let fee = U256::from(fee_bps);
    let denominator = U256::from(BPS_DENOMINATOR);

    match raw.checked_mul(fee) {
        Some(scaled) => scaled / denominator,
        None => (raw / denominator) * fee,
    }
}
