//! Callbacks from the Suraksha pension pallet and the Money Order swap path.

use crate::pallet::*;
use crate::{SurakshaHooks, SwapHooks};
use deshchain_primitives::{Coin, ContributionSource, VillagePoolId, VillageRegistry};
use frame_support::ensure;
use frame_support::storage::with_storage_layer;
use sp_runtime::traits::{CheckedAdd, Get};
use sp_runtime::{DispatchError, PerThing};

impl<T: Config> Pallet<T> {
    /// Fee the unified pool keeps from a swap of `amount_in`.
    pub fn retained_swap_fee(amount_in: T::Balance) -> T::Balance {
        let amount_in: u128 = amount_in.into();
        let fee = T::SwapFee::get().mul_floor(amount_in);
        T::PoolFeeShare::get().mul_floor(fee).into()
    }
}

impl<T: Config> SurakshaHooks<T::AccountId, T::AssetId, T::Balance> for Pallet<T> {
    fn after_suraksha_contribution(
        pension_account_id: &[u8],
        contributor: &T::AccountId,
        amount: Coin<T::AssetId, T::Balance>,
        village_code: &[u8],
    ) -> Result<(), DispatchError> {
        let pension_id = Self::bounded_pension_id(pension_account_id)?;
        ensure!(!Self::is_zero_account(contributor), Error::<T>::ZeroAccount);
        ensure!(!amount.is_zero(), Error::<T>::InvalidAmount);

        let village_pool_id =
            T::VillageRegistry::village_by_postal_code(village_code).ok_or(Error::<T>::VillageNotFound)?;

        let existing = PensionPositions::<T>::get(&pension_id);
        if let Some(position) = &existing {
            ensure!(position.asset == amount.asset, Error::<T>::AssetMismatch);
            ensure!(
                PoolByVillage::<T>::get(village_pool_id) == Some(position.pool_id),
                Error::<T>::PensionPoolMismatch
            );
        }

        with_storage_layer(|| -> Result<(), DispatchError> {
            let pool_id = Self::do_contribute(village_pool_id, amount, ContributionSource::Pension)?;

            let position = match existing {
                Some(mut position) => {
                    position.contributed = position
                        .contributed
                        .checked_add(&amount.amount)
                        .ok_or(Error::<T>::ArithmeticOverflow)?;
                    position.contributions =
                        position.contributions.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;
                    position
                }
                None => {
                    let mut pool = Self::pool(pool_id).ok_or(Error::<T>::PoolNotFound)?;
                    pool.active_pension_accounts = pool
                        .active_pension_accounts
                        .checked_add(1)
                        .ok_or(Error::<T>::ArithmeticOverflow)?;
                    Self::put_pool(&pool);

                    PensionPosition {
                        pool_id,
                        contributor: contributor.clone(),
                        asset: amount.asset,
                        contributed: amount.amount,
                        contributions: 1,
                        first_contributed_at: frame_system::Pallet::<T>::block_number(),
                    }
                }
            };
            PensionPositions::<T>::insert(&pension_id, position);

            Ok(())
        })
    }

    fn after_suraksha_maturity(
        pension_account_id: &[u8],
        beneficiary: &T::AccountId,
        amount: Coin<T::AssetId, T::Balance>,
    ) -> Result<(), DispatchError> {
        let pension_id = Self::bounded_pension_id(pension_account_id)?;
        ensure!(!Self::is_zero_account(beneficiary), Error::<T>::ZeroAccount);
        ensure!(!amount.is_zero(), Error::<T>::InvalidAmount);

        let position = PensionPositions::<T>::get(&pension_id).ok_or(Error::<T>::PensionAccountNotFound)?;
        ensure!(position.asset == amount.asset, Error::<T>::AssetMismatch);
        let mut pool = Self::pool(position.pool_id).ok_or(Error::<T>::PoolNotFound)?;
        pool.active_pension_accounts = pool.active_pension_accounts.saturating_sub(1);

        with_storage_layer(|| -> Result<(), DispatchError> {
            Self::do_pay_from_suraksha_reserve(position.pool_id, beneficiary, amount)?;
            Self::put_pool(&pool);
            PensionPositions::<T>::remove(&pension_id);
            Ok(())
        })?;

        log::info!(
            target: "unified-liquidity",
            "Suraksha account matured, {:?} paid from pool {}",
            amount.amount,
            position.pool_id
        );

        Ok(())
    }
}

impl<T: Config> SwapHooks<T::AssetId, T::Balance> for Pallet<T> {
    fn after_swap(
        village_pool_id: VillagePoolId,
        token_in: Coin<T::AssetId, T::Balance>,
        _token_out: Coin<T::AssetId, T::Balance>,
    ) -> Result<(), DispatchError> {
        let Some(pool) = Self::pool_by_village(village_pool_id) else {
            return Ok(());
        };

        let retained = Self::retained_swap_fee(token_in.amount);
        let fee = Coin::new(token_in.asset, retained);
        if fee.is_zero() {
            return Ok(());
        }

        // Bookkeeping must never fail the swap itself
        if let Err(error) = with_storage_layer(|| Self::do_record_dex_revenue(pool.pool_id, fee)) {
            log::warn!(
                target: "unified-liquidity",
                "Failed to record swap revenue for village {}: {:?}",
                village_pool_id,
                error
            );
            Self::deposit_event(Event::DexRevenueRecordingFailed { village_pool_id, error });
        }

        Ok(())
    }
}
