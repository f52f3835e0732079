//! # Token Descriptors
//!
//! Tradeable-asset metadata, one record per (chain, address) pair.
//!
//! A chain's native asset is represented as a token whose address is
//! the zero-address sentinel, so balance and quote flows can treat
//! native and contract assets uniformly.

use crate::domain::amount::MAX_DECIMALS;
use crate::domain::chain::ChainId;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Sentinel address marking a chain's native asset.
pub const NATIVE_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A fungible asset registered on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Owning chain id.
    pub chain_id: ChainId,
    /// Contract address, or [`NATIVE_ADDRESS`] for the native asset.
    pub address: String,
    /// Token symbol (e.g. "USDC").
    pub symbol: String,
    /// Display name (e.g. "USD Coin").
    pub name: String,
    /// Decimal precision.
    pub decimals: u8,
}

impl Token {
    /// Creates a new token descriptor.
    #[must_use]
    pub fn new(
        chain_id: impl Into<ChainId>,
        address: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            address: address.into(),
            symbol: symbol.into(),
            name: name.into(),
            decimals,
        }
    }

    /// Creates the native-asset token for a chain.
    #[must_use]
    pub fn native(
        chain_id: impl Into<ChainId>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self::new(chain_id, NATIVE_ADDRESS, symbol, name, decimals)
    }

    /// Returns true if this token is the chain's native asset.
    #[must_use]
    pub fn is_native(&self) -> bool {
        same_address(&self.address, NATIVE_ADDRESS)
    }

    /// Returns true if both tokens identify the same asset.
    ///
    /// Identity is (chain id, address) with case-insensitive address
    /// comparison.
    #[must_use]
    pub fn same_asset(&self, other: &Token) -> bool {
        self.chain_id == other.chain_id && same_address(&self.address, &other.address)
    }

    /// Validates the descriptor fields.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the address is malformed, the symbol
    /// is empty, or the decimals exceed the supported precision.
    pub fn validate(&self) -> CoreResult<()> {
        if !is_valid_address(&self.address) {
            return Err(CoreError::invalid_input(format!(
                "token '{}' has a malformed address: {}",
                self.symbol, self.address
            )));
        }

        if self.symbol.trim().is_empty() {
            return Err(CoreError::invalid_input(format!(
                "token at {} on chain {} has an empty symbol",
                self.address, self.chain_id
            )));
        }

        if self.decimals > MAX_DECIMALS {
            return Err(CoreError::invalid_input(format!(
                "token '{}' decimals {} exceed the maximum of {}",
                self.symbol, self.decimals, MAX_DECIMALS
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on chain {}", self.symbol, self.chain_id)
    }
}

/// Validates an EVM address format (0x followed by 40 hex characters).
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    if !address.starts_with("0x") {
        return false;
    }

    let hex_part = &address[2..];
    hex_part.len() == 40 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalizes an EVM address to lowercase with 0x prefix.
///
/// # Errors
///
/// Returns `InvalidInput` if the address format is invalid.
pub fn normalize_address(address: &str) -> CoreResult<String> {
    if !is_valid_address(address) {
        return Err(CoreError::invalid_input(format!(
            "malformed address: {}",
            address
        )));
    }

    Ok(address.to_lowercase())
}

/// Compares two addresses case-insensitively.
#[must_use]
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const USDC_SEPOLIA: &str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";

    fn usdc() -> Token {
        Token::new(11155111u64, USDC_SEPOLIA, "USDC", "USD Coin", 6)
    }

    #[test]
    fn token_new() {
        let token = usdc();
        assert_eq!(token.symbol, "USDC");
        assert_eq!(token.decimals, 6);
        assert_eq!(token.chain_id.as_u64(), 11155111);
        assert!(!token.is_native());
    }

    #[test]
    fn native_uses_sentinel_address() {
        let eth = Token::native(11155111u64, "ETH", "Ethereum", 18);
        assert_eq!(eth.address, NATIVE_ADDRESS);
        assert!(eth.is_native());
    }

    #[test]
    fn same_asset_is_case_insensitive() {
        let a = usdc();
        let mut b = usdc();
        b.address = b.address.to_lowercase();
        assert!(a.same_asset(&b));
    }

    #[test]
    fn same_asset_requires_same_chain() {
        let a = usdc();
        let mut b = usdc();
        b.chain_id = ChainId::new(80002);
        assert!(!a.same_asset(&b));
    }

    #[test]
    fn validate_accepts_well_formed_token() {
        assert!(usdc().validate().is_ok());
        assert!(Token::native(80002u64, "MATIC", "Polygon", 18)
            .validate()
            .is_ok());
    }

    #[test]
    fn validate_rejects_malformed_address() {
        let mut token = usdc();
        token.address = "1c7D4B196Cb0C7B01d743Fbc6116a902379C7238".to_string();
        assert!(token.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_symbol() {
        let mut token = usdc();
        token.symbol = String::new();
        assert!(token.validate().is_err());
    }

    #[test]
    fn validate_rejects_excessive_decimals() {
        let mut token = usdc();
        token.decimals = 77;
        assert!(token.validate().is_err());
    }

    #[test]
    fn is_valid_address_valid() {
        assert!(is_valid_address(USDC_SEPOLIA));
        assert!(is_valid_address(NATIVE_ADDRESS));
    }

    #[test]
    fn is_valid_address_invalid() {
        assert!(!is_valid_address(
            "1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"
        )); // no 0x
        assert!(!is_valid_address("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C72")); // too short
        assert!(!is_valid_address(
            "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238ab"
        )); // too long
        assert!(!is_valid_address(
            "0xZZ7D4B196Cb0C7B01d743Fbc6116a902379C7238"
        )); // invalid chars
    }

    #[test]
    fn normalize_address_lowercases() {
        let normalized = normalize_address(USDC_SEPOLIA).unwrap();
        assert_eq!(normalized, USDC_SEPOLIA.to_lowercase());
    }

    #[test]
    fn normalize_address_rejects_invalid() {
        assert!(normalize_address("invalid").is_err());
    }

    #[test]
    fn same_address_ignores_case() {
        assert!(same_address(USDC_SEPOLIA, &USDC_SEPOLIA.to_lowercase()));
        assert!(!same_address(USDC_SEPOLIA, NATIVE_ADDRESS));
    }
}
