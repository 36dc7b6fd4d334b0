//! Allocation engine: contributions, rebalancing and Suraksha reserve payouts.

use crate::allocation;
use crate::pallet::*;
use deshchain_primitives::{Coin, ContributionSource, UnifiedPoolId, VillagePoolId, VillageRegistry};
use frame_support::ensure;
use frame_system::pallet_prelude::BlockNumberFor;
use sp_runtime::traits::{CheckedSub, Get, Saturating, Zero};
use sp_runtime::DispatchError;

impl<T: Config> Pallet<T> {
    /// Fails unless the village is registered, active and verified.
    pub fn ensure_village_eligible(village_pool_id: VillagePoolId) -> Result<(), DispatchError> {
        ensure!(T::VillageRegistry::village_exists(village_pool_id), Error::<T>::VillageNotFound);
        ensure!(T::VillageRegistry::is_village_eligible(village_pool_id), Error::<T>::VillageInactive);
        Ok(())
    }

    /// Split `amount` into the village's unified pool, creating the pool on
    /// first use. Returns the pool id.
    pub fn do_contribute(
        village_pool_id: VillagePoolId,
        amount: Coin<T::AssetId, T::Balance>,
        source: ContributionSource,
    ) -> Result<UnifiedPoolId, DispatchError> {
        ensure!(!amount.is_zero(), Error::<T>::InvalidAmount);
        Self::ensure_village_eligible(village_pool_id)?;

        let (pool, created) = match Self::pool_by_village(village_pool_id) {
            Some(pool) => (pool, false),
            None => (Self::new_pool(village_pool_id), true),
        };
        let pool_id = pool.pool_id;

        let split = allocation::split(amount.amount.into(), &pool.allocation)
            .ok_or(Error::<T>::InvalidAllocation)?;
        let ledger = Self::ledger(pool_id, &amount.asset)
            .credited(amount.amount, &split)
            .ok_or(Error::<T>::ArithmeticOverflow)?;

        if created {
            let next_id = pool_id.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;
            NextPoolId::<T>::put(next_id);
            PoolByVillage::<T>::insert(village_pool_id, pool_id);
            Self::put_pool(&pool);

            log::info!(
                target: "unified-liquidity",
                "Created unified pool {} for village {}",
                pool_id,
                village_pool_id
            );
            Self::deposit_event(Event::UnifiedPoolCreated { pool_id, village_pool_id });
        }

        Self::put_ledger(pool_id, &amount.asset, &ledger);

        Self::deposit_event(Event::LiquidityContributed {
            pool_id,
            asset: amount.asset,
            amount: amount.amount,
            source,
            suraksha_reserve: split.suraksha_reserve.into(),
            dex_liquidity: split.dex_liquidity.into(),
            agri_lending: split.agri_lending.into(),
            emergency_reserve: split.emergency_reserve.into(),
        });

        Self::rebalance_if_due(pool_id)?;

        Ok(pool_id)
    }

    /// Re-split every asset of the pool once `RebalancePeriod` blocks have
    /// passed since its last rebalance. Returns whether a rebalance ran.
    pub fn rebalance_if_due(pool_id: UnifiedPoolId) -> Result<bool, DispatchError> {
        let period = T::RebalancePeriod::get();
        if period == 0 {
            return Ok(false);
        }

        let pool = Self::pool(pool_id).ok_or(Error::<T>::PoolNotFound)?;
        let now = frame_system::Pallet::<T>::block_number();
        if now.saturating_sub(pool.last_rebalanced_at) < BlockNumberFor::<T>::from(period) {
            return Ok(false);
        }

        let mut rebalanced = false;
        for (asset, ledger) in Self::ledgers_of(pool_id) {
            if ledger.total_liquidity.is_zero() {
                continue;
            }
            Self::do_rebalance(pool_id, asset)?;
            rebalanced = true;
        }

        Ok(rebalanced)
    }

    /// Pool record for `village_pool_id` under the next free id. Not stored.
    fn new_pool(village_pool_id: VillagePoolId) -> UnifiedPool<T> {
        let now = frame_system::Pallet::<T>::block_number();
        UnifiedPool {
            pool_id: NextPoolId::<T>::get(),
            village_pool_id,
            allocation: DefaultAllocation::<T>::get(),
            active_loans: 0,
            active_pension_accounts: 0,
            created_at: now,
            last_rebalanced_at: now,
        }
    }

    /// Re-split the on-hand liquidity of `asset` using the pool's allocation.
    pub fn do_rebalance(pool_id: UnifiedPoolId, asset: T::AssetId) -> Result<(), DispatchError> {
        let mut pool = Self::pool(pool_id).ok_or(Error::<T>::PoolNotFound)?;
        let ledger = Self::ledger(pool_id, &asset);
        ensure!(!ledger.total_liquidity.is_zero(), Error::<T>::InvalidAmount);

        let split = allocation::split(ledger.total_liquidity.into(), &pool.allocation)
            .ok_or(Error::<T>::InvalidAllocation)?;
        let rebalanced = ledger.resplit(&split);

        pool.last_rebalanced_at = frame_system::Pallet::<T>::block_number();
        Self::put_pool(&pool);
        Self::put_ledger(pool_id, &asset, &rebalanced);

        log::info!(
            target: "unified-liquidity",
            "Rebalanced pool {}: reserve {:?}, dex {:?}, lending {:?}, emergency {:?}",
            pool_id,
            rebalanced.suraksha_reserve,
            rebalanced.dex_liquidity,
            rebalanced.agri_lending,
            rebalanced.emergency_reserve
        );

        Self::deposit_event(Event::PoolRebalanced {
            pool_id,
            asset,
            total_liquidity: rebalanced.total_liquidity,
        });

        Ok(())
    }

    /// Pay `amount` out of the Suraksha reserve only.
    pub fn do_pay_from_suraksha_reserve(
        pool_id: UnifiedPoolId,
        beneficiary: &T::AccountId,
        amount: Coin<T::AssetId, T::Balance>,
    ) -> Result<(), DispatchError> {
        ensure!(!amount.is_zero(), Error::<T>::InvalidAmount);
        ensure!(UnifiedPools::<T>::contains_key(pool_id), Error::<T>::PoolNotFound);

        PoolLedgers::<T>::try_mutate(pool_id, amount.asset, |ledger| -> Result<(), DispatchError> {
            ledger.suraksha_reserve = ledger
                .suraksha_reserve
                .checked_sub(&amount.amount)
                .ok_or(Error::<T>::InsufficientSurakshaReserve)?;
            ledger.total_liquidity = ledger
                .total_liquidity
                .checked_sub(&amount.amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            Ok(())
        })?;

        Self::deposit_event(Event::SurakshaMaturityPaid {
            pool_id,
            beneficiary: beneficiary.clone(),
            asset: amount.asset,
            amount: amount.amount,
        });

        Ok(())
    }

    /// Amount of `asset` available for new loans
    pub fn lending_capacity(pool_id: UnifiedPoolId, asset: T::AssetId) -> T::Balance {
        Self::ledger(pool_id, &asset).agri_lending
    }
}
