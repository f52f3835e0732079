//! # Swap Quoting
//!
//! Live expected-output quotes for prospective swaps.
//!
//! A quote is only ever produced by querying the chain's configured
//! quoting contract. Chains without one get an `Unsupported` error
//! rather than a synthetic rate: showing a user an invented price is
//! worse than showing none.
//!
//! # Examples
//!
//! ```ignore
//! let request = QuoteRequest::new(1u64, WETH, USDC, "1.5")
//!     .with_fee_tier(FeeTier::Low);
//! let quote = engine.quote(&request, &cancel).await?;
//! println!("expected out: {}", quote.amount_out);
//! ```

use crate::domain::amount::TokenAmount;
use crate::domain::chain::ChainId;
use crate::domain::quote::SwapQuote;
use crate::domain::token::Token;
use crate::error::{CoreError, CoreResult};
use crate::infrastructure::abi;
use crate::infrastructure::node::ChainNode;
use crate::infrastructure::oracle::PriceOracle;
use crate::infrastructure::registry::{ChainRegistry, TokenRegistry};
use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Gas units assumed for a swap when the quoter response carries no
/// gas figure.
pub const DEFAULT_SWAP_GAS_UNITS: u64 = 150_000;

/// Default slippage tolerance in basis points (0.5%).
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

const BPS_DENOMINATOR: u32 = 10_000;

/// Uniswap V3 pool fee tier, in hundredths of a basis point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FeeTier {
    /// 0.01%, for very tightly correlated pairs.
    Lowest,
    /// 0.05%, for stable pairs.
    Low,
    /// 0.3%, the common tier for most pairs.
    #[default]
    Medium,
    /// 1%, for exotic pairs.
    High,
}

impl FeeTier {
    /// Returns the fee in the quoter's units (hundredths of a basis
    /// point).
    #[must_use]
    pub fn raw(&self) -> u32 {
        match self {
            Self::Lowest => 100,
            Self::Low => 500,
            Self::Medium => 3000,
            Self::High => 10_000,
        }
    }

    /// Returns the fee as a percentage.
    #[must_use]
    pub fn as_percent(&self) -> Decimal {
        Decimal::new(i64::from(self.raw()), 4)
    }

    /// Returns all tiers in ascending fee order.
    #[must_use]
    pub fn all() -> [FeeTier; 4] {
        [Self::Lowest, Self::Low, Self::Medium, Self::High]
    }
}

impl std::fmt::Display for FeeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.as_percent().normalize())
    }
}

/// Parameters for one swap quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    /// Chain both tokens live on.
    pub chain_id: ChainId,
    /// Address of the token being sold.
    pub token_in: String,
    /// Address of the token being bought.
    pub token_out: String,
    /// Human-readable input amount, e.g. `"1.5"`.
    pub amount_in: String,
    /// Pool fee tier to quote against.
    pub fee_tier: FeeTier,
    /// Slippage override in basis points; the engine default applies
    /// when unset.
    pub slippage_bps: Option<u32>,
}

impl QuoteRequest {
    /// Creates a request with the default fee tier and slippage.
    pub fn new(
        chain_id: impl Into<ChainId>,
        token_in: impl Into<String>,
        token_out: impl Into<String>,
        amount_in: impl Into<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            token_in: token_in.into(),
            token_out: token_out.into(),
            amount_in: amount_in.into(),
            fee_tier: FeeTier::default(),
            slippage_bps: None,
        }
    }

    /// Sets the pool fee tier.
    #[must_use]
    pub fn with_fee_tier(mut self, fee_tier: FeeTier) -> Self {
        self.fee_tier = fee_tier;
        self
    }

    /// Overrides the slippage tolerance in basis points.
    #[must_use]
    pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
        self.slippage_bps = Some(slippage_bps);
        self
    }
}

/// Produces live swap quotes from each chain's quoting contract.
#[derive(Debug)]
pub struct QuoteEngine {
    chains: Arc<ChainRegistry>,
    tokens: Arc<TokenRegistry>,
    node: Arc<dyn ChainNode>,
    oracle: Arc<dyn PriceOracle>,
    slippage_bps: u32,
}

impl QuoteEngine {
    /// Creates a new engine with the default slippage tolerance.
    #[must_use]
    pub fn new(
        chains: Arc<ChainRegistry>,
        tokens: Arc<TokenRegistry>,
        node: Arc<dyn ChainNode>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Self {
        Self {
            chains,
            tokens,
            node,
            oracle,
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
        }
    }

    /// Overrides the engine-wide default slippage tolerance.
    #[must_use]
    pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }

    /// Quotes the expected output for a prospective swap.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the chain or either token is not registered (`NotFound`)
    /// - the tokens are the same asset, the amount is not a positive
    ///   number expressible at the input token's decimals, or the
    ///   slippage leaves nothing to receive (`InvalidInput`)
    /// - the chain has no quoting contract (`Unsupported`)
    /// - the quoter call fails or returns zero output
    ///   (`RemoteUnavailable`)
    /// - the quote is abandoned (`Cancelled`)
    pub async fn quote(
        &self,
        request: &QuoteRequest,
        cancel: &CancellationToken,
    ) -> CoreResult<SwapQuote> {
        // 1. Resolve and validate everything local before any remote
        //    call
        let chain = self.chains.chain_by_id(request.chain_id)?;
        let token_in = self
            .tokens
            .require_token(request.chain_id, &request.token_in)?
            .clone();
        let token_out = self
            .tokens
            .require_token(request.chain_id, &request.token_out)?
            .clone();

        if token_in.same_asset(&token_out) {
            return Err(CoreError::invalid_input(format!(
                "cannot swap {} for itself",
                token_in.symbol
            )));
        }

        let amount_in = TokenAmount::parse(&request.amount_in, token_in.decimals)?;

        let slippage_bps = request.slippage_bps.unwrap_or(self.slippage_bps);
        if slippage_bps >= BPS_DENOMINATOR {
            return Err(CoreError::invalid_input(format!(
                "slippage of {} basis points swallows the whole output",
                slippage_bps
            )));
        }

        // 2. A chain without a quoting contract cannot produce a live
        //    quote; a synthetic rate is never substituted
        let quoter: Address = match chain.quoter.as_deref() {
            Some(quoter) => quoter.parse().map_err(|_| {
                CoreError::invalid_input(format!("malformed quoter address: {}", quoter))
            })?,
            None => {
                return Err(CoreError::unsupported(format!(
                    "no on-chain quoter configured for {}",
                    chain.name
                )));
            }
        };

        let sell: Address = parse_token_address(&token_in)?;
        let buy: Address = parse_token_address(&token_out)?;

        // 3. Ask the quoter for the expected output
        let calldata =
            abi::encode_quote_exact_input_single(sell, buy, amount_in.raw(), request.fee_tier.raw());
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(CoreError::cancelled("swap quote cancelled"));
            }
            response = self.node.call(request.chain_id, quoter, calldata) => response?,
        };

        let (amount_out_raw, quoted_gas) = abi::decode_quote_response(&response)?;
        if amount_out_raw.is_zero() {
            return Err(CoreError::remote_unavailable(format!(
                "quoter returned zero output for {}/{}",
                token_in.symbol, token_out.symbol
            )));
        }

        let amount_out = TokenAmount::from_raw(amount_out_raw, token_out.decimals);
        let gas_units = quoted_gas.unwrap_or_else(|| U256::from(DEFAULT_SWAP_GAS_UNITS));

        // 4. Derive the advisory figures
        let price_impact_pct = self
            .price_impact(
                &token_in,
                &token_out,
                amount_in.to_decimal()?,
                amount_out.to_decimal()?,
                cancel,
            )
            .await?;
        let min_received =
            TokenAmount::from_raw(apply_slippage(amount_out_raw, slippage_bps), token_out.decimals);

        Ok(SwapQuote {
            token_in,
            token_out,
            amount_in,
            amount_out,
            gas_units,
            price_impact_pct,
            min_received,
        })
    }

    /// Compares the input and output USD values to gauge how much the
    /// swap moves the price.
    ///
    /// Missing or degenerate prices degrade the figure to zero rather
    /// than failing the quote.
    async fn price_impact(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: Decimal,
        amount_out: Decimal,
        cancel: &CancellationToken,
    ) -> CoreResult<Decimal> {
        let prices = async {
            tokio::join!(
                self.oracle.usd_price(token_in),
                self.oracle.usd_price(token_out),
            )
        };
        let (price_in, price_out) = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(CoreError::cancelled("swap quote cancelled"));
            }
            prices = prices => prices,
        };

        let (Ok(price_in), Ok(price_out)) = (price_in, price_out) else {
            return Ok(Decimal::ZERO);
        };
        if price_in <= Decimal::ZERO || price_out <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let value_in = match amount_in.checked_mul(price_in) {
            Some(value) if value > Decimal::ZERO => value,
            _ => return Ok(Decimal::ZERO),
        };
        let value_out = match amount_out.checked_mul(price_out) {
            Some(value) if value > Decimal::ZERO => value,
            _ => return Ok(Decimal::ZERO),
        };

        let ratio = value_out.checked_div(value_in).unwrap_or(Decimal::ONE);
        let impact = (Decimal::ONE - ratio) * Decimal::ONE_HUNDRED;

        // Price improvement reads as zero impact, keeping the figure
        // within [0, 100)
        Ok(impact.max(Decimal::ZERO))
    }
}

fn parse_token_address(token: &Token) -> CoreResult<Address> {
    token.address.parse().map_err(|_| {
        CoreError::invalid_input(format!(
            "token '{}' has a malformed address: {}",
            token.symbol, token.address
        ))
    })
}

/// Shaves the slippage tolerance off a raw output amount. Divides
/// first when the scaled product would overflow.
fn apply_slippage(raw: U256, slippage_bps: u32) -> U256 {
    let keep = U256::from(BPS_DENOMINATOR - slippage_bps);
    let denominator = U256::from(BPS_DENOMINATOR);

    match raw.checked_mul(keep) {
        Some(scaled) => scaled / denominator,
        None => (raw / denominator) * keep,
    }
}
