//! # Static Configuration
//!
//! Startup configuration for chains and tokens, parsed from TOML.
//!
//! Endpoint URLs may reference environment variables with `${VAR}`
//! placeholders, so API keys stay out of checked-in files. The
//! registries are built from a loaded configuration and never change
//! afterwards.

use crate::domain::chain::{Chain, NativeAsset};
use crate::domain::token::Token;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// QuoterV2 deployment address shared by the large EVM mainnets
/// (Ethereum, Arbitrum, Polygon, Optimism).
pub const UNISWAP_QUOTER_V2: &str = "0x61fFE014bA17989E8a2d3c236652D3e3E4b6c28a";

/// Static chain and token tables consumed at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Supported chains.
    #[serde(default)]
    pub chains: Vec<Chain>,
    /// Registered tokens across all chains.
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl CoreConfig {
    /// Parses a TOML configuration string and substitutes environment
    /// variables in RPC URLs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the TOML is malformed or a referenced
    /// environment variable is not set.
    pub fn from_toml_str(toml_str: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            CoreError::invalid_input(format!("failed to parse configuration: {}", e))
        })?;

        config.substituted()
    }

    /// Resolves `${VAR}` placeholders in every chain's RPC URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a referenced environment variable is
    /// not set.
    pub fn substituted(mut self) -> CoreResult<Self> {
        for chain in &mut self.chains {
            chain.rpc_url = substitute_env_vars(&chain.rpc_url)?;
        }
        Ok(self)
    }

    /// Returns the built-in test-network configuration: Sepolia and
    /// Polygon Amoy with their native assets and USDC/USDT test
    /// deployments. Neither chain carries a quoting facility.
    ///
    /// The Sepolia RPC URL keeps its `${ALCHEMY_API_KEY}` placeholder;
    /// call [`CoreConfig::substituted`] before connecting.
    #[must_use]
    pub fn testnet_defaults() -> Self {
        let sepolia = Chain::new(
            11155111u64,
            "Sepolia",
            NativeAsset::new("ETH", "Sepolia Ether", 18),
            "https://eth-sepolia.g.alchemy.com/v2/${ALCHEMY_API_KEY}",
            "https://sepolia.etherscan.io",
        )
        .with_testnet(true);

        let amoy = Chain::new(
            80002u64,
            "Polygon Amoy",
            NativeAsset::new("MATIC", "Polygon", 18),
            "https://rpc-amoy.polygon.technology",
            "https://amoy.polygonscan.com",
        )
        .with_testnet(true);

        let tokens = vec![
            Token::native(11155111u64, "ETH", "Ethereum", 18),
            Token::new(
                11155111u64,
                "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238",
                "USDC",
                "USD Coin",
                6,
            ),
            Token::new(
                11155111u64,
                "0x7169D38820dfd117C3FA1f22a697dBA58d90BA06",
                "USDT",
                "Tether USD",
                6,
            ),
            Token::native(80002u64, "MATIC", "Polygon", 18),
            Token::new(
                80002u64,
                "0x41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582",
                "USDC",
                "USD Coin",
                6,
            ),
            Token::new(
                80002u64,
                "0x2c852e740B62308c46DD29B982FBb650D063Bd07",
                "USDT",
                "Tether USD",
                6,
            ),
        ];

        Self {
            chains: vec![sepolia, amoy],
            tokens,
        }
    }
}

/// Substitutes environment variables in a string.
///
/// Replaces `${VAR_NAME}` patterns with the corresponding environment
/// variable value.
///
/// # Errors
///
/// Returns `InvalidInput` if a referenced environment variable is not
/// set.
pub fn substitute_env_vars(input: &str) -> CoreResult<String> {
    let mut result = input.to_string();
    let mut start = 0;

    while let Some(var_start) = result[start..].find("${") {
        let abs_start = start + var_start;
        if let Some(var_end) = result[abs_start..].find('}') {
            let abs_end = abs_start + var_end;
            let var_name = &result[abs_start + 2..abs_end];

            let var_value = std::env::var(var_name).map_err(|_| {
                CoreError::invalid_input(format!("environment variable not set: {}", var_name))
            })?;

            result.replace_range(abs_start..abs_end + 1, &var_value);
            start = abs_start + var_value.len();
        } else {
            break;
        }
    }

    Ok(result)
}
