//! Pool ledger: keyed storage access for unified pools and their per-asset balances.
//!
//! No validation happens here. Callers hand in state they already checked.

use crate::allocation::Split;
use crate::pallet::*;
use alloc::vec::Vec;
use codec::{Decode, Encode, MaxEncodedLen};
use deshchain_primitives::{UnifiedPoolId, VillagePoolId, FIRST_ID};
use scale_info::TypeInfo;
use sp_runtime::traits::{AtLeast32BitUnsigned, Zero};
use sp_runtime::RuntimeDebug;

/// Balances of one asset inside a unified pool.
///
/// `total_liquidity` always equals the four sub-pool balances added together.
#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen, Default)]
pub struct AssetLedger<Balance> {
    pub total_liquidity: Balance,
    pub suraksha_reserve: Balance,
    pub dex_liquidity: Balance,
    pub agri_lending: Balance,
    pub emergency_reserve: Balance,
    /// Cumulative principal ever lent out
    pub total_loans_value: Balance,
    pub monthly_dex_revenue: Balance,
    pub monthly_lending_revenue: Balance,
    /// Lifetime revenue, never reset
    pub total_revenue: Balance,
}

impl<Balance: AtLeast32BitUnsigned + Copy> AssetLedger<Balance> {
    /// Sum of all sub-pools, `None` on overflow.
    pub fn sub_pool_sum(&self) -> Option<Balance> {
        self.suraksha_reserve
            .checked_add(&self.dex_liquidity)?
            .checked_add(&self.agri_lending)?
            .checked_add(&self.emergency_reserve)
    }

    pub fn is_balanced(&self) -> bool {
        self.sub_pool_sum() == Some(self.total_liquidity)
    }

    /// Ledger with `split` added to the sub-pools and `amount` to the total.
    pub fn credited(&self, amount: Balance, split: &Split) -> Option<Self>
    where
        Balance: From<u128>,
    {
        let mut next = self.clone();
        next.suraksha_reserve = next.suraksha_reserve.checked_add(&split.suraksha_reserve.into())?;
        next.dex_liquidity = next.dex_liquidity.checked_add(&split.dex_liquidity.into())?;
        next.agri_lending = next.agri_lending.checked_add(&split.agri_lending.into())?;
        next.emergency_reserve = next.emergency_reserve.checked_add(&split.emergency_reserve.into())?;
        next.total_liquidity = next.total_liquidity.checked_add(&amount)?;
        Some(next)
    }

    /// Ledger with every sub-pool replaced by `split`. The total stays as is.
    pub fn resplit(&self, split: &Split) -> Self
    where
        Balance: From<u128>,
    {
        let mut next = self.clone();
        next.suraksha_reserve = split.suraksha_reserve.into();
        next.dex_liquidity = split.dex_liquidity.into();
        next.agri_lending = split.agri_lending.into();
        next.emergency_reserve = split.emergency_reserve.into();
        next
    }

    pub fn has_monthly_revenue(&self) -> bool {
        !self.monthly_dex_revenue.is_zero() || !self.monthly_lending_revenue.is_zero()
    }
}

impl<T: Config> Pallet<T> {
    pub fn pool(pool_id: UnifiedPoolId) -> Option<UnifiedPool<T>> {
        UnifiedPools::<T>::get(pool_id)
    }

    pub fn put_pool(pool: &UnifiedPool<T>) {
        UnifiedPools::<T>::insert(pool.pool_id, pool);
    }

    pub fn pool_by_village(village_pool_id: VillagePoolId) -> Option<UnifiedPool<T>> {
        PoolByVillage::<T>::get(village_pool_id).and_then(UnifiedPools::<T>::get)
    }

    pub fn ledger(pool_id: UnifiedPoolId, asset: &T::AssetId) -> AssetLedger<T::Balance> {
        PoolLedgers::<T>::get(pool_id, asset)
    }

    pub fn put_ledger(pool_id: UnifiedPoolId, asset: &T::AssetId, ledger: &AssetLedger<T::Balance>) {
        PoolLedgers::<T>::insert(pool_id, asset, ledger);
    }

    /// Every asset ledger of a pool.
    pub fn ledgers_of(pool_id: UnifiedPoolId) -> Vec<(T::AssetId, AssetLedger<T::Balance>)> {
        PoolLedgers::<T>::iter_prefix(pool_id).collect()
    }

    /// Existing pool ids in ascending order.
    pub fn pool_ids() -> Vec<UnifiedPoolId> {
        (FIRST_ID..NextPoolId::<T>::get())
            .filter(|pool_id| UnifiedPools::<T>::contains_key(pool_id))
            .collect()
    }
}
