//! # Token Amounts
//!
//! Raw on-chain integer quantities paired with their decimal precision.
//!
//! User input is parsed from decimal strings into smallest-unit
//! integers; on-chain results are scaled back for display. Raw values
//! stay `U256`, human-facing values are `Decimal`.

use crate::error::{CoreError, CoreResult};
use ethers::types::U256;
use rust_decimal::Decimal;
use serde::Serialize;

/// Maximum decimal precision representable by [`Decimal`].
pub const MAX_DECIMALS: u8 = 28;

/// An asset quantity in smallest units, tagged with its precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    /// Wraps a raw smallest-unit value.
    #[must_use]
    pub fn from_raw(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Returns the zero amount at the given precision.
    #[must_use]
    pub fn zero(decimals: u8) -> Self {
        Self::from_raw(U256::zero(), decimals)
    }

    /// Parses a positive decimal string into smallest units.
    ///
    /// Accepts plain decimal notation ("1", "1.5", ".5"). The
    /// fractional part must be expressible at the target precision.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the text is not a decimal number, has
    /// more fractional digits than `decimals`, overflows 256 bits, or
    /// is zero or negative.
    pub fn parse(text: &str, decimals: u8) -> CoreResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid_input("amount is empty"));
        }

        if trimmed.starts_with('-') {
            return Err(CoreError::invalid_input(format!(
                "amount must be positive: {}",
                text
            )));
        }

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (trimmed, ""),
        };

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(CoreError::invalid_input(format!(
                "amount is not a decimal number: {}",
                text
            )));
        }
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(CoreError::invalid_input(format!(
                "amount is not a decimal number: {}",
                text
            )));
        }

        if frac_part.len() > usize::from(decimals) {
            return Err(CoreError::invalid_input(format!(
                "amount {} has more than {} decimal places",
                text, decimals
            )));
        }

        let mut digits = String::with_capacity(int_part.len() + usize::from(decimals));
        digits.push_str(int_part);
        digits.push_str(frac_part);
        for _ in frac_part.len()..usize::from(decimals) {
            digits.push('0');
        }

        let raw = U256::from_dec_str(&digits).map_err(|_| {
            CoreError::invalid_input(format!("amount is out of range: {}", text))
        })?;

        if raw.is_zero() {
            return Err(CoreError::invalid_input(format!(
                "amount must be positive: {}",
                text
            )));
        }

        Ok(Self { raw, decimals })
    }

    /// Returns the raw smallest-unit value.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> U256 {
        self.raw
    }

    /// Returns the decimal precision.
    #[inline]
    #[must_use]
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Converts to a decimal-adjusted value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the raw value exceeds the precision
    /// representable by [`Decimal`] (about 7.9e28 smallest units).
    pub fn to_decimal(&self) -> CoreResult<Decimal> {
        let mut value: Decimal = self.raw.to_string().parse().map_err(|_| {
            CoreError::invalid_input(format!(
                "raw amount {} exceeds representable precision",
                self.raw
            ))
        })?;

        value.set_scale(u32::from(self.decimals)).map_err(|_| {
            CoreError::invalid_input(format!(
                "decimals {} exceed the maximum of {}",
                self.decimals, MAX_DECIMALS
            ))
        })?;

        Ok(value)
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_decimal() {
            Ok(value) => write!(f, "{}", value.normalize()),
            Err(_) => write!(f, "{}", self.raw),
        }
    }
}
