//! # Domain Layer
//!
//! Vocabulary types shared by every engine in the crate.
//!
//! This layer contains:
//! - **Chain / Token**: static descriptors loaded from configuration
//! - **TokenAmount**: raw on-chain quantities with decimal scaling
//! - **Balance**: per-token holdings with USD valuation
//! - **GasTier / GasEstimate**: three-speed fee model
//! - **SwapQuote**: expected-output estimate for a prospective swap

pub mod amount;
pub mod balance;
pub mod chain;
pub mod gas;
pub mod quote;
pub mod token;

pub use amount::{TokenAmount, MAX_DECIMALS};
pub use balance::{Balance, BalanceStatus};
pub use chain::{Chain, ChainId, NativeAsset};
pub use gas::{GasEstimate, GasFee, GasTier};
pub use quote::SwapQuote;
pub use token::{
    is_valid_address, normalize_address, same_address, Token, NATIVE_ADDRESS,
};
