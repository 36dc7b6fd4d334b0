//! Loan lifecycle: issuance against the lending sub-pool, repayment and write-off.
//!
//! Interest is simple interest over the full term, fixed at issuance:
//! `total_owed = principal + floor(rate * principal * months / 12)`.
//!
//! Repayments cover principal first. Only the part of cumulative repayment
//! above the principal is booked as lending revenue, so a loan paid in
//! several instalments realises its interest on the instalments that cross
//! the principal.

use crate::pallet::*;
use crate::UnifiedLendingApi;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use deshchain_primitives::{
    AgriLoanKind, Coin, LoanId, LoanProduct, LoanStatus, Season, UnifiedPoolId, MAX_LOAN_DURATION_MONTHS,
    MONTHS_PER_YEAR,
};
use frame_support::ensure;
use scale_info::TypeInfo;
use sp_runtime::traits::{CheckedAdd, CheckedSub, Saturating, Zero};
use sp_runtime::{DispatchError, DispatchResult, PerThing, Permill, RuntimeDebug};

/// Annual interest rates per loan product
#[derive(Clone, Copy, PartialEq, Eq, RuntimeDebug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen)]
pub struct RateBands {
    pub agri_input: Permill,
    pub agri_equipment: Permill,
    pub agri_emergency: Permill,
    pub agri_expansion: Permill,
    pub agri_general: Permill,
    /// Seasonal premium bands
    pub festival: Permill,
    pub wedding: Permill,
    pub harvest: Permill,
    /// Preferential rate for artisans
    pub traditional_craft: Permill,
    /// Taken off the general agri rate for women-led enterprises
    pub women_enterprise_discount: Permill,
}

impl Default for RateBands {
    fn default() -> Self {
        Self {
            agri_input: Permill::from_percent(6),
            agri_equipment: Permill::from_percent(8),
            agri_emergency: Permill::from_percent(9),
            agri_expansion: Permill::from_percent(10),
            agri_general: Permill::from_percent(8),
            festival: Permill::from_percent(20),
            wedding: Permill::from_percent(18),
            harvest: Permill::from_percent(12),
            traditional_craft: Permill::from_percent(5),
            women_enterprise_discount: Permill::from_percent(1),
        }
    }
}

impl RateBands {
    pub fn rate_for(&self, product: LoanProduct) -> Permill {
        match product {
            LoanProduct::Agri(AgriLoanKind::Input) => self.agri_input,
            LoanProduct::Agri(AgriLoanKind::Equipment) => self.agri_equipment,
            LoanProduct::Agri(AgriLoanKind::Emergency) => self.agri_emergency,
            LoanProduct::Agri(AgriLoanKind::Expansion) => self.agri_expansion,
            LoanProduct::Agri(AgriLoanKind::General) => self.agri_general,
            LoanProduct::Seasonal(Season::Festival) => self.festival,
            LoanProduct::Seasonal(Season::Wedding) => self.wedding,
            LoanProduct::Seasonal(Season::Harvest) => self.harvest,
            LoanProduct::TraditionalCraft => self.traditional_craft,
            LoanProduct::WomenEnterprise => Permill::from_parts(
                self.agri_general
                    .deconstruct()
                    .saturating_sub(self.women_enterprise_discount.deconstruct()),
            ),
        }
    }
}

/// Simple interest on `principal` at annual `rate` for `months`, floored.
pub fn simple_interest(principal: u128, rate: Permill, months: u32) -> Option<u128> {
    let scaled = principal.checked_mul(months as u128)?;
    Some(rate.mul_floor(scaled) / MONTHS_PER_YEAR as u128)
}

impl<T: Config> Pallet<T> {
    pub fn do_issue_loan(
        pool_id: UnifiedPoolId,
        borrower: &T::AccountId,
        amount: Coin<T::AssetId, T::Balance>,
        product: LoanProduct,
        duration_months: u32,
    ) -> Result<LoanId, DispatchError> {
        ensure!(!amount.is_zero(), Error::<T>::InvalidAmount);
        ensure!(!Self::is_zero_account(borrower), Error::<T>::ZeroAccount);
        ensure!(
            duration_months > 0 && duration_months <= MAX_LOAN_DURATION_MONTHS,
            Error::<T>::InvalidDuration
        );

        let mut pool = Self::pool(pool_id).ok_or(Error::<T>::PoolNotFound)?;
        let mut ledger = Self::ledger(pool_id, &amount.asset);

        ledger.agri_lending = ledger
            .agri_lending
            .checked_sub(&amount.amount)
            .ok_or(Error::<T>::InsufficientLendingLiquidity)?;
        ledger.total_liquidity = ledger
            .total_liquidity
            .checked_sub(&amount.amount)
            .ok_or(Error::<T>::InsufficientLendingLiquidity)?;
        ledger.total_loans_value = ledger
            .total_loans_value
            .checked_add(&amount.amount)
            .ok_or(Error::<T>::ArithmeticOverflow)?;
        pool.active_loans = pool.active_loans.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;

        let interest_rate = LoanRateBands::<T>::get().rate_for(product);
        let interest = simple_interest(amount.amount.into(), interest_rate, duration_months)
            .ok_or(Error::<T>::ArithmeticOverflow)?;
        let total_owed = amount
            .amount
            .checked_add(&interest.into())
            .ok_or(Error::<T>::ArithmeticOverflow)?;

        let loan_id = NextLoanId::<T>::get();
        let next_loan_id = loan_id.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;

        let loan = Loan::<T> {
            loan_id,
            pool_id,
            borrower: borrower.clone(),
            asset: amount.asset,
            principal: amount.amount,
            interest_rate,
            product,
            duration_months,
            total_owed,
            repaid: Zero::zero(),
            status: LoanStatus::Active,
            issued_at: frame_system::Pallet::<T>::block_number(),
            closed_at: None,
        };

        Loans::<T>::insert(loan_id, loan);
        LoansByPool::<T>::insert(pool_id, loan_id, ());
        NextLoanId::<T>::put(next_loan_id);
        Self::put_ledger(pool_id, &amount.asset, &ledger);
        Self::put_pool(&pool);

        log::info!(
            target: "unified-liquidity",
            "Loan {} issued from pool {}: principal {:?}, rate {:?}, {} months",
            loan_id,
            pool_id,
            amount.amount,
            interest_rate,
            duration_months
        );

        Self::deposit_event(Event::LoanIssued {
            loan_id,
            pool_id,
            borrower: borrower.clone(),
            asset: amount.asset,
            principal: amount.amount,
            interest_rate,
            total_owed,
            product,
            duration_months,
        });

        Ok(loan_id)
    }

    pub fn do_repay_loan(loan_id: LoanId, amount: Coin<T::AssetId, T::Balance>) -> DispatchResult {
        ensure!(!amount.is_zero(), Error::<T>::InvalidAmount);

        let mut loan = Loans::<T>::get(loan_id).ok_or(Error::<T>::LoanNotFound)?;
        ensure!(loan.status == LoanStatus::Active, Error::<T>::LoanNotActive);
        ensure!(loan.asset == amount.asset, Error::<T>::AssetMismatch);

        let outstanding = loan.total_owed.saturating_sub(loan.repaid);
        ensure!(amount.amount <= outstanding, Error::<T>::RepaymentExceedsOutstanding);

        let mut pool = Self::pool(loan.pool_id).ok_or(Error::<T>::PoolNotFound)?;
        let repaid = loan.repaid.checked_add(&amount.amount).ok_or(Error::<T>::ArithmeticOverflow)?;

        // Interest is whatever this payment adds above the principal
        let interest_realised = repaid
            .saturating_sub(loan.principal)
            .saturating_sub(loan.repaid.saturating_sub(loan.principal));

        let mut ledger = Self::ledger(loan.pool_id, &amount.asset);
        ledger.agri_lending = ledger
            .agri_lending
            .checked_add(&amount.amount)
            .ok_or(Error::<T>::ArithmeticOverflow)?;
        ledger.total_liquidity = ledger
            .total_liquidity
            .checked_add(&amount.amount)
            .ok_or(Error::<T>::ArithmeticOverflow)?;
        ledger.monthly_lending_revenue = ledger
            .monthly_lending_revenue
            .checked_add(&interest_realised)
            .ok_or(Error::<T>::ArithmeticOverflow)?;
        ledger.total_revenue = ledger
            .total_revenue
            .checked_add(&interest_realised)
            .ok_or(Error::<T>::ArithmeticOverflow)?;

        loan.repaid = repaid;
        let fully_repaid = loan.repaid == loan.total_owed;
        if fully_repaid {
            loan.status = LoanStatus::Repaid;
            loan.closed_at = Some(frame_system::Pallet::<T>::block_number());
            pool.active_loans = pool.active_loans.checked_sub(1).ok_or(Error::<T>::ArithmeticOverflow)?;
        }

        Self::put_ledger(loan.pool_id, &amount.asset, &ledger);
        Self::put_pool(&pool);
        Loans::<T>::insert(loan_id, &loan);

        Self::deposit_event(Event::LoanRepaymentReceived {
            loan_id,
            amount: amount.amount,
            interest_realised,
            outstanding: loan.total_owed.saturating_sub(loan.repaid),
        });

        if fully_repaid {
            log::info!(
                target: "unified-liquidity",
                "Loan {} fully repaid into pool {}",
                loan_id,
                loan.pool_id
            );
            Self::deposit_event(Event::LoanRepaid { loan_id, pool_id: loan.pool_id });
        }

        Ok(())
    }

    /// Close an active loan as `Defaulted`. The unpaid balance stays out of the pool.
    pub fn do_write_off_loan(loan_id: LoanId) -> DispatchResult {
        let mut loan = Loans::<T>::get(loan_id).ok_or(Error::<T>::LoanNotFound)?;
        ensure!(loan.status == LoanStatus::Active, Error::<T>::LoanNotActive);

        let mut pool = Self::pool(loan.pool_id).ok_or(Error::<T>::PoolNotFound)?;
        pool.active_loans = pool.active_loans.checked_sub(1).ok_or(Error::<T>::ArithmeticOverflow)?;

        loan.status = LoanStatus::Defaulted;
        loan.closed_at = Some(frame_system::Pallet::<T>::block_number());
        let outstanding = loan.total_owed.saturating_sub(loan.repaid);

        Self::put_pool(&pool);
        Loans::<T>::insert(loan_id, &loan);

        log::info!(
            target: "unified-liquidity",
            "Loan {} written off, {:?} outstanding",
            loan_id,
            outstanding
        );

        Self::deposit_event(Event::LoanWrittenOff {
            loan_id,
            pool_id: loan.pool_id,
            outstanding,
        });

        Ok(())
    }
}

impl<T: Config> UnifiedLendingApi<T::AccountId, T::AssetId, T::Balance> for Pallet<T> {
    fn issue_loan(
        pool_id: UnifiedPoolId,
        borrower: &T::AccountId,
        amount: Coin<T::AssetId, T::Balance>,
        product: LoanProduct,
        duration_months: u32,
    ) -> Result<LoanId, DispatchError> {
        Self::do_issue_loan(pool_id, borrower, amount, product, duration_months)
    }

    fn repay_loan(loan_id: LoanId, amount: Coin<T::AssetId, T::Balance>) -> Result<(), DispatchError> {
        Self::do_repay_loan(loan_id, amount)
    }

    fn lending_capacity(pool_id: UnifiedPoolId, asset: T::AssetId) -> T::Balance {
        // Inherent helper in pool.rs
        Self::lending_capacity(pool_id, asset)
    }
}
