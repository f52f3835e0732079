//! # Gas Fee Tiers
//!
//! Three-speed fee model for a pending call.
//!
//! Tier multipliers are fixed fractions of the chain's current base
//! gas price: slow pays 0.8x, standard pays the base price, fast pays
//! 1.5x. Each tier carries a human confirmation-time label.

use ethers::types::U256;
use rust_decimal::Decimal;
use serde::Serialize;

/// Fee speed tier for a pending call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum GasTier {
    /// 0.8x base price, slowest confirmation.
    Slow,
    /// 1.0x base price.
    #[default]
    Standard,
    /// 1.5x base price, fastest confirmation.
    Fast,
}

impl GasTier {
    /// Returns the base-price multiplier for this tier.
    #[must_use]
    pub fn multiplier(&self) -> Decimal {
        match self {
            Self::Slow => Decimal::new(8, 1),
            Self::Standard => Decimal::ONE,
            Self::Fast => Decimal::new(15, 1),
        }
    }

    /// Returns the expected confirmation-time label.
    #[must_use]
    pub fn confirmation_time(&self) -> &'static str {
        match self {
            Self::Slow => "15-30s",
            Self::Standard => "5-15s",
            Self::Fast => "<5s",
        }
    }

    /// Returns all tiers in ascending price order.
    #[must_use]
    pub fn all() -> [GasTier; 3] {
        [Self::Slow, Self::Standard, Self::Fast]
    }
}

impl std::fmt::Display for GasTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Slow => "slow",
            Self::Standard => "standard",
            Self::Fast => "fast",
        };
        write!(f, "{}", name)
    }
}

/// Fee figures for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasFee {
    /// Effective gas price in gwei.
    pub gas_price_gwei: Decimal,
    /// Total cost in the chain's native unit.
    pub total_native: Decimal,
    /// Total cost converted to USD (0 when no price was supplied).
    pub total_usd: Decimal,
    /// Expected confirmation-time label.
    pub confirmation_time: &'static str,
}

/// Three-tier fee quote for a pending call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasEstimate {
    /// Estimated gas units for the call.
    pub gas_units: U256,
    /// Base gas price in wei the tiers were derived from.
    pub base_gas_price: U256,
    /// 0.8x tier.
    pub slow: GasFee,
    /// 1.0x tier.
    pub standard: GasFee,
    /// 1.5x tier.
    pub fast: GasFee,
}

impl GasEstimate {
    /// Returns the fee figures for the given tier.
    #[must_use]
    pub fn tier(&self, tier: GasTier) -> &GasFee {
        match tier {
            GasTier::Slow => &self.slow,
            GasTier::Standard => &self.standard,
            GasTier::Fast => &self.fast,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn multipliers() {
        assert_eq!(GasTier::Slow.multiplier().to_string(), "0.8");
        assert_eq!(GasTier::Standard.multiplier(), Decimal::ONE);
        assert_eq!(GasTier::Fast.multiplier().to_string(), "1.5");
    }

    #[test]
    fn multipliers_are_ascending() {
        let tiers = GasTier::all();
        assert!(tiers[0].multiplier() < tiers[1].multiplier());
        assert!(tiers[1].multiplier() < tiers[2].multiplier());
    }

    #[test]
    fn confirmation_labels() {
        assert_eq!(GasTier::Slow.confirmation_time(), "15-30s");
        assert_eq!(GasTier::Standard.confirmation_time(), "5-15s");
        assert_eq!(GasTier::Fast.confirmation_time(), "<5s");
    }

    #[test]
    fn default_tier_is_standard() {
        assert_eq!(GasTier::default(), GasTier::Standard);
    }

    #[test]
    fn display() {
        assert_eq!(GasTier::Slow.to_string(), "slow");
        assert_eq!(GasTier::Fast.to_string(), "fast");
    }

    #[test]
    fn tier_accessor_maps_fields() {
        let fee = |gwei: i64| GasFee {
            gas_price_gwei: Decimal::new(gwei, 0),
            total_native: Decimal::ZERO,
            total_usd: Decimal::ZERO,
            confirmation_time: "5-15s",
        };

        let estimate = GasEstimate {
            gas_units: U256::from(21_000u64),
            base_gas_price: U256::from(10_000_000_000u64),
            slow: fee(8),
            standard: fee(10),
            fast: fee(15),
        };

        assert_eq!(estimate.tier(GasTier::Slow).gas_price_gwei, Decimal::new(8, 0));
        assert_eq!(
            estimate.tier(GasTier::Standard).gas_price_gwei,
            Decimal::new(10, 0)
        );
        assert_eq!(estimate.tier(GasTier::Fast).gas_price_gwei, Decimal::new(15, 0));
    }
}
