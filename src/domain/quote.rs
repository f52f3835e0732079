//! # Swap Quotes
//!
//! Expected-output estimate for a prospective swap.
//!
//! A quote is ephemeral: it reflects one on-chain query and is
//! invalidated whenever any input changes. It is never a binding
//! commitment to execute at the quoted rate.

use crate::domain::amount::TokenAmount;
use crate::domain::token::Token;
use crate::error::CoreResult;
use ethers::types::U256;
use rust_decimal::Decimal;
use serde::Serialize;

/// Result of one swap-quoting query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapQuote {
    /// Token being sold.
    pub token_in: Token,
    /// Token being bought.
    pub token_out: Token,
    /// Input amount in the input token's smallest units.
    pub amount_in: TokenAmount,
    /// Quoted output amount in the output token's smallest units.
    pub amount_out: TokenAmount,
    /// Gas-unit estimate for executing the swap, suitable for feeding
    /// into the gas estimator.
    pub gas_units: U256,
    /// Price impact as a percentage in [0, 100).
    pub price_impact_pct: Decimal,
    /// Slippage-bounded minimum output the caller should accept.
    pub min_received: TokenAmount,
}

impl SwapQuote {
    /// Returns the execution rate (output per unit of input).
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if either amount exceeds representable
    /// precision.
    pub fn rate(&self) -> CoreResult<Decimal> {
        let amount_in = self.amount_in.to_decimal()?;
        let amount_out = self.amount_out.to_decimal()?;

        // amount_in is validated positive before a quote is produced.
        Ok(amount_out
            .checked_div(amount_in)
            .unwrap_or(Decimal::ZERO))
    }
}
