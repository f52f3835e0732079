//! # Infrastructure Layer
//!
//! Technical capabilities the engines are built on.
//!
//! ## Configuration
//!
//! TOML startup configuration with `${VAR}` substitution, plus the
//! immutable chain and token registries built from it.
//!
//! ## Node
//!
//! Read-only JSON-RPC access behind the [`node::ChainNode`] trait,
//! with ABI helpers for the contract calls the engines issue.
//!
//! ## Oracle
//!
//! Narrow seam to an external USD price source.

pub mod abi;
pub mod config;
pub mod node;
pub mod oracle;
pub mod registry;

pub use config::{substitute_env_vars, CoreConfig, UNISWAP_QUOTER_V2};
pub use node::{ChainNode, EthersNode, HttpProvider, PendingCall};
pub use oracle::{PriceOracle, StaticPriceOracle};
pub use registry::{build_registries, ChainRegistry, TokenRegistry};
