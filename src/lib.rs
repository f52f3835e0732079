//! # DEX Core
//!
//! Chain-aware quoting, gas estimation and balance aggregation engine
//! for a cross-chain DEX front end.
//!
//! ## Architecture
//!
//! This crate follows Domain-Driven Design with a layered architecture:
//!
//! - **Domain Layer** (`domain`): Chains, tokens, amounts, balances,
//!   gas tiers and swap quotes
//! - **Application Layer** (`application`): The balance, gas, quote and
//!   bridge engines
//! - **Infrastructure Layer** (`infrastructure`): RPC node access,
//!   price oracles, configuration and registries
//!
//! ## Example
//!
//! ```rust,ignore
//! use dex_core::application::{QuoteEngine, QuoteRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! // Quote 1.5 WETH for USDC on Ethereum mainnet
//! let request = QuoteRequest::new(1u64, WETH, USDC, "1.5");
//! let quote = engine.quote(&request, &CancellationToken::new()).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{CoreError, CoreResult, ErrorKind};
