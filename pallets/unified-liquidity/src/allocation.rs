//! Contribution splitting across sub-pools.
//!
//! Shares are truncated per sub-pool. Whatever truncation leaves over goes to
//! the sub-pool with the largest ratio (first declared wins a tie), so the
//! shares always add back up to the contributed amount.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use sp_runtime::{PerThing, Permill, RuntimeDebug};

/// Ratios applied to every contribution, one per sub-pool.
#[derive(Clone, Copy, PartialEq, Eq, RuntimeDebug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen)]
pub struct AllocationConfig {
    /// Reserved for Suraksha pension maturity payouts
    pub suraksha_reserve: Permill,
    /// Available for Money Order swaps
    pub dex_liquidity: Permill,
    /// Available for agricultural / SME loans
    pub agri_lending: Permill,
    /// Emergency buffer
    pub emergency_reserve: Permill,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            suraksha_reserve: Permill::from_percent(20),
            dex_liquidity: Permill::from_percent(30),
            agri_lending: Permill::from_percent(40),
            emergency_reserve: Permill::from_percent(10),
        }
    }
}

/// Sub-pool buckets, in declaration order.
#[derive(Clone, Copy, PartialEq, Eq, RuntimeDebug)]
pub enum SubPool {
    SurakshaReserve,
    DexLiquidity,
    AgriLending,
    EmergencyReserve,
}

impl AllocationConfig {
    pub fn from_ppm(suraksha_reserve: u32, dex_liquidity: u32, agri_lending: u32, emergency_reserve: u32) -> Self {
        Self {
            suraksha_reserve: Permill::from_parts(suraksha_reserve),
            dex_liquidity: Permill::from_parts(dex_liquidity),
            agri_lending: Permill::from_parts(agri_lending),
            emergency_reserve: Permill::from_parts(emergency_reserve),
        }
    }

    fn ratios(&self) -> [(SubPool, Permill); 4] {
        [
            (SubPool::SurakshaReserve, self.suraksha_reserve),
            (SubPool::DexLiquidity, self.dex_liquidity),
            (SubPool::AgriLending, self.agri_lending),
            (SubPool::EmergencyReserve, self.emergency_reserve),
        ]
    }

    /// Ratios must cover exactly 100%.
    pub fn is_valid(&self) -> bool {
        let total: u64 = self.ratios().iter().map(|(_, ratio)| ratio.deconstruct() as u64).sum();
        total == Permill::ACCURACY as u64
    }

    /// Sub-pool that absorbs the truncation remainder.
    pub fn largest(&self) -> SubPool {
        let ratios = self.ratios();
        let mut largest = ratios[0];
        for candidate in ratios.iter().skip(1) {
            if candidate.1 > largest.1 {
                largest = *candidate;
            }
        }
        largest.0
    }
}

/// Result of splitting one amount.
#[derive(Clone, Copy, PartialEq, Eq, RuntimeDebug, Default)]
pub struct Split {
    pub suraksha_reserve: u128,
    pub dex_liquidity: u128,
    pub agri_lending: u128,
    pub emergency_reserve: u128,
}

impl Split {
    pub fn total(&self) -> u128 {
        self.suraksha_reserve
            .saturating_add(self.dex_liquidity)
            .saturating_add(self.agri_lending)
            .saturating_add(self.emergency_reserve)
    }

    fn share_mut(&mut self, sub_pool: SubPool) -> &mut u128 {
        match sub_pool {
            SubPool::SurakshaReserve => &mut self.suraksha_reserve,
            SubPool::DexLiquidity => &mut self.dex_liquidity,
            SubPool::AgriLending => &mut self.agri_lending,
            SubPool::EmergencyReserve => &mut self.emergency_reserve,
        }
    }
}

/// Split `amount` according to `config`.
///
/// Returns `None` when the config does not add up to 100%.
pub fn split(amount: u128, config: &AllocationConfig) -> Option<Split> {
    if !config.is_valid() {
        return None;
    }

    let mut split = Split {
        suraksha_reserve: config.suraksha_reserve.mul_floor(amount),
        dex_liquidity: config.dex_liquidity.mul_floor(amount),
        agri_lending: config.agri_lending.mul_floor(amount),
        emergency_reserve: config.emergency_reserve.mul_floor(amount),
    };

    // Floors of ratios summing to 100% never exceed the amount.
    let remainder = amount.checked_sub(split.total())?;
    let bucket = split.share_mut(config.largest());
    *bucket = bucket.checked_add(remainder)?;

    Some(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_way() -> AllocationConfig {
        AllocationConfig::from_ppm(400_000, 350_000, 250_000, 0)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AllocationConfig::default().is_valid());
        assert_eq!(AllocationConfig::default().largest(), SubPool::AgriLending);
    }

    #[test]
    fn test_split_forty_thirty_five_twenty_five() {
        let split = split(1_000_000, &three_way()).unwrap();
        assert_eq!(split.suraksha_reserve, 400_000);
        assert_eq!(split.dex_liquidity, 350_000);
        assert_eq!(split.agri_lending, 250_000);
        assert_eq!(split.emergency_reserve, 0);
    }

    #[test]
    fn test_remainder_goes_to_largest_bucket() {
        // 1 unit truncates to zero everywhere, the largest ratio takes it
        let split = split(1, &three_way()).unwrap();
        assert_eq!(split.suraksha_reserve, 1);
        assert_eq!(split.total(), 1);

        let thirds = AllocationConfig::from_ppm(333_333, 333_333, 333_334, 0);
        let split = super::split(100, &thirds).unwrap();
        assert_eq!(split.suraksha_reserve, 33);
        assert_eq!(split.dex_liquidity, 33);
        assert_eq!(split.agri_lending, 34);
    }

    #[test]
    fn test_tie_prefers_first_declared() {
        let config = AllocationConfig::from_ppm(250_000, 250_000, 250_000, 250_000);
        assert_eq!(config.largest(), SubPool::SurakshaReserve);
        let split = split(3, &config).unwrap();
        assert_eq!(split.suraksha_reserve, 3);
    }

    #[test]
    fn test_split_is_exact_across_magnitudes() {
        let configs = [
            AllocationConfig::default(),
            three_way(),
            AllocationConfig::from_ppm(333_333, 333_333, 333_334, 0),
            AllocationConfig::from_ppm(1, 2, 3, 999_994),
        ];
        let amounts: [u128; 9] = [1, 2, 3, 7, 99, 1_001, 123_456_789, 999_999_999_999, 1_000_000_000_000];

        for config in configs.iter() {
            for amount in amounts.iter() {
                let split = split(*amount, config).unwrap();
                assert_eq!(split.total(), *amount, "config {:?} amount {}", config, amount);
            }
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let over = AllocationConfig::from_ppm(500_000, 500_000, 100_000, 0);
        let under = AllocationConfig::from_ppm(100_000, 100_000, 100_000, 0);
        assert!(!over.is_valid());
        assert!(split(1_000, &over).is_none());
        assert!(split(1_000, &under).is_none());
    }
}
