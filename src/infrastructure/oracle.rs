//! # Price Oracle
//!
//! Narrow seam to an external USD price source.
//!
//! The engines only ever ask "what is one unit of this token worth in
//! USD". Real feed integration lives outside this crate; the bundled
//! implementation is a fixed in-memory table for tests and offline
//! use.

use crate::domain::chain::ChainId;
use crate::domain::token::Token;
use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

/// USD price source for tokens and native assets.
#[async_trait]
pub trait PriceOracle: Send + Sync + fmt::Debug {
    /// Returns the USD price of one whole unit of the token.
    ///
    /// # Errors
    ///
    /// Returns `PriceUnknown` when no price is available. Callers that
    /// only decorate output with USD figures treat that as price 0.
    async fn usd_price(&self, token: &Token) -> CoreResult<Decimal>;
}

/// Fixed price table keyed by (chain, address).
#[derive(Debug, Clone, Default)]
pub struct StaticPriceOracle {
    prices: HashMap<(ChainId, String), Decimal>,
}

impl StaticPriceOracle {
    /// Creates an empty table; every lookup fails with `PriceUnknown`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a price for a token.
    #[must_use]
    pub fn with_price(mut self, token: &Token, price: Decimal) -> Self {
        self.prices
            .insert((token.chain_id, token.address.to_lowercase()), price);
        self
    }

    /// Returns the number of priced tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Returns true if no prices are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn usd_price(&self, token: &Token) -> CoreResult<Decimal> {
        self.prices
            .get(&(token.chain_id, token.address.to_lowercase()))
            .copied()
            .ok_or_else(|| {
                CoreError::price_unknown(format!(
                    "no USD price for {} on chain {}",
                    token.symbol, token.chain_id
                ))
            })
    }
}
