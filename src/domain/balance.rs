//! # Balances
//!
//! Per-token holdings produced by a balance query.
//!
//! Balances are ephemeral query results. A failed fetch still yields a
//! `Balance` record, flagged with the failure message and zeroed
//! amounts, so a batch always returns one entry per requested token.

use crate::domain::token::Token;
use ethers::types::U256;
use rust_decimal::Decimal;
use serde::Serialize;

/// Freshness state of a balance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BalanceStatus {
    /// The balance was fetched successfully.
    Fresh,
    /// The fetch failed; amounts are zeroed.
    Failed {
        /// Human-readable failure cause.
        message: String,
    },
}

/// A wallet's holding of one token, with USD valuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    /// The token this balance belongs to.
    pub token: Token,
    /// Raw smallest-unit amount.
    pub raw: U256,
    /// Decimal-adjusted amount.
    pub amount: Decimal,
    /// USD value (`amount × price`, 0 when the price is unknown).
    pub usd_value: Decimal,
    /// Freshness or failure state.
    pub status: BalanceStatus,
}

impl Balance {
    /// Creates a successfully fetched balance.
    #[must_use]
    pub fn fresh(token: Token, raw: U256, amount: Decimal, usd_value: Decimal) -> Self {
        Self {
            token,
            raw,
            amount,
            usd_value,
            status: BalanceStatus::Fresh,
        }
    }

    /// Creates a failed balance entry with zeroed amounts.
    #[must_use]
    pub fn failed(token: Token, message: impl Into<String>) -> Self {
        Self {
            token,
            raw: U256::zero(),
            amount: Decimal::ZERO,
            usd_value: Decimal::ZERO,
            status: BalanceStatus::Failed {
                message: message.into(),
            },
        }
    }

    /// Returns true if the balance was fetched successfully.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        matches!(self.status, BalanceStatus::Fresh)
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            BalanceStatus::Fresh => None,
            BalanceStatus::Failed { message } => Some(message),
        }
    }
}
