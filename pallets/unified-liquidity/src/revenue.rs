//! Revenue reconciler: DEX fee bookkeeping and the monthly reset.

use crate::pallet::*;
use codec::{Decode, Encode, MaxEncodedLen};
use deshchain_primitives::{Coin, PeriodIndex, UnifiedPoolId};
use frame_support::ensure;
use scale_info::TypeInfo;
use sp_runtime::traits::{CheckedAdd, Get, Saturating, Zero};
use sp_runtime::{DispatchError, DispatchResult, PerThing, RuntimeDebug};

/// Monthly figures of one pool asset, as of the last reconciliation.
#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen, Default)]
pub struct RevenueSnapshot<Balance> {
    pub period: PeriodIndex,
    pub dex_revenue: Balance,
    pub lending_revenue: Balance,
    /// Return owed to pension holders for the month. Reported, not paid out here.
    pub pension_returns: Balance,
}

impl<T: Config> Pallet<T> {
    /// Credit a trading fee to the pool. The fee becomes DEX liquidity.
    pub fn do_record_dex_revenue(pool_id: UnifiedPoolId, fee: Coin<T::AssetId, T::Balance>) -> DispatchResult {
        ensure!(!fee.is_zero(), Error::<T>::InvalidAmount);
        ensure!(UnifiedPools::<T>::contains_key(pool_id), Error::<T>::PoolNotFound);

        PoolLedgers::<T>::try_mutate(pool_id, fee.asset, |ledger| -> DispatchResult {
            ledger.dex_liquidity = ledger
                .dex_liquidity
                .checked_add(&fee.amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            ledger.total_liquidity = ledger
                .total_liquidity
                .checked_add(&fee.amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            ledger.monthly_dex_revenue = ledger
                .monthly_dex_revenue
                .checked_add(&fee.amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            ledger.total_revenue = ledger
                .total_revenue
                .checked_add(&fee.amount)
                .ok_or(Error::<T>::ArithmeticOverflow)?;
            Ok(())
        })?;

        Self::deposit_event(Event::DexRevenueRecorded {
            pool_id,
            asset: fee.asset,
            amount: fee.amount,
        });

        Ok(())
    }

    /// Pension return for a month: the target share of the reserve, capped at
    /// what the pool actually earned.
    pub fn pension_returns(monthly_revenue: T::Balance, suraksha_reserve: T::Balance) -> T::Balance {
        let reserve: u128 = suraksha_reserve.into();
        let target: T::Balance = T::PensionReturnTarget::get().mul_floor(reserve).into();
        monthly_revenue.min(target)
    }

    /// Snapshot and reset the monthly revenue of every pool.
    ///
    /// Pools are walked in ascending id order. Returns the number of pools
    /// reconciled. A period that has not started yet is rejected, so the
    /// boundary trigger can never be pushed ahead of the chain.
    pub fn do_monthly_reconciliation(period: PeriodIndex) -> Result<u32, DispatchError> {
        let current = Self::current_period().ok_or(Error::<T>::PeriodNotReached)?;
        ensure!(period <= current, Error::<T>::PeriodNotReached);
        if let Some(last) = LastReconciledPeriod::<T>::get() {
            ensure!(period > last, Error::<T>::PeriodAlreadyReconciled);
        }

        let mut pools: u32 = 0;
        for pool_id in Self::pool_ids() {
            for (asset, mut ledger) in Self::ledgers_of(pool_id) {
                let monthly_revenue = ledger.monthly_dex_revenue.saturating_add(ledger.monthly_lending_revenue);
                let snapshot = RevenueSnapshot {
                    period,
                    dex_revenue: ledger.monthly_dex_revenue,
                    lending_revenue: ledger.monthly_lending_revenue,
                    pension_returns: Self::pension_returns(monthly_revenue, ledger.suraksha_reserve),
                };

                log::debug!(
                    target: "unified-liquidity",
                    "Pool {} period {}: dex {:?}, lending {:?}, pension returns {:?}",
                    pool_id,
                    period,
                    snapshot.dex_revenue,
                    snapshot.lending_revenue,
                    snapshot.pension_returns
                );

                Self::deposit_event(Event::MonthlyRevenueReconciled {
                    pool_id,
                    period,
                    asset,
                    dex_revenue: snapshot.dex_revenue,
                    lending_revenue: snapshot.lending_revenue,
                    pension_returns: snapshot.pension_returns,
                });
                RevenueSnapshots::<T>::insert(pool_id, asset, snapshot);

                ledger.monthly_dex_revenue = Zero::zero();
                ledger.monthly_lending_revenue = Zero::zero();
                Self::put_ledger(pool_id, &asset, &ledger);
            }
            pools = pools.saturating_add(1);
        }

        LastReconciledPeriod::<T>::put(period);

        log::info!(
            target: "unified-liquidity",
            "Reconciled period {} across {} pools",
            period,
            pools
        );

        Self::deposit_event(Event::PeriodReconciled { period, pools });

        Ok(pools)
    }
}
