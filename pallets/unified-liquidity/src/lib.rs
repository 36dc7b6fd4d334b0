//! # Unified Liquidity Pallet
//!
//! One liquidity pool per village, shared by Suraksha pension savings,
//! Money Order DEX trading and agricultural / SME lending.
//!
//! ## Overview
//!
//! - Contributions (pension hooks or direct deposits) are split across four
//!   sub-pools: Suraksha reserve, DEX liquidity, agri lending and an emergency
//!   reserve. The split is configurable per pool and always exact.
//! - Loans are issued against the lending sub-pool and repaid into it. Interest
//!   is booked as lending revenue once the principal has been recovered.
//! - DEX fee revenue arrives through [`SwapHooks`] and is credited to the
//!   DEX sub-pool.
//! - Once per period (`BlocksPerPeriod`) every pool's monthly revenue is
//!   snapshotted and the monthly counters are reset.
//!
//! ## Key Invariants
//!
//! 1. **Conservation**: per asset, `total_liquidity` equals the sum of the
//!    four sub-pools after every call.
//! 2. **No Overdraft**: a call that would take any sub-pool below zero fails
//!    before writing anything.
//! 3. **Loan Count**: `active_loans` only drops on full repayment or write-off.
//! 4. **Single Reset**: a period is reconciled at most once.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod allocation;
pub mod ledger;
pub mod loans;
pub mod pool;
pub mod revenue;
pub mod hooks;

#[cfg(test)]
mod mock;


pub use allocation::AllocationConfig;
pub use ledger::AssetLedger;
pub use loans::RateBands;
pub use revenue::RevenueSnapshot;

use deshchain_primitives::{Coin, LoanId, UnifiedPoolId, VillagePoolId};
use sp_runtime::DispatchError;

// ============================================================================
// Traits for loose coupling
// ============================================================================

/// Callbacks fired by the Suraksha pension pallet.
pub trait SurakshaHooks<AccountId, AssetId, Balance> {
    /// A pension contribution was made in the village with `village_code`.
    fn after_suraksha_contribution(
        pension_account_id: &[u8],
        contributor: &AccountId,
        amount: Coin<AssetId, Balance>,
        village_code: &[u8],
    ) -> Result<(), DispatchError>;

    /// A pension account matured and `amount` is owed to `beneficiary`.
    fn after_suraksha_maturity(
        pension_account_id: &[u8],
        beneficiary: &AccountId,
        amount: Coin<AssetId, Balance>,
    ) -> Result<(), DispatchError>;
}

/// Callback fired by the Money Order swap path after a swap executed.
pub trait SwapHooks<AssetId, Balance> {
    /// Never fails the swap for revenue bookkeeping problems.
    fn after_swap(
        village_pool_id: VillagePoolId,
        token_in: Coin<AssetId, Balance>,
        token_out: Coin<AssetId, Balance>,
    ) -> Result<(), DispatchError>;
}

/// Lending access for other pallets (e.g. the Kisaan Mitra lending pallet).
pub trait UnifiedLendingApi<AccountId, AssetId, Balance> {
    fn issue_loan(
        pool_id: UnifiedPoolId,
        borrower: &AccountId,
        amount: Coin<AssetId, Balance>,
        product: deshchain_primitives::LoanProduct,
        duration_months: u32,
    ) -> Result<LoanId, DispatchError>;

    fn repay_loan(loan_id: LoanId, amount: Coin<AssetId, Balance>) -> Result<(), DispatchError>;

    /// Amount of `asset` currently available for new loans
    fn lending_capacity(pool_id: UnifiedPoolId, asset: AssetId) -> Balance;
}

/// No-op implementations for runtimes without a pension or DEX pallet
impl<AccountId, AssetId, Balance> SurakshaHooks<AccountId, AssetId, Balance> for () {
    fn after_suraksha_contribution(_: &[u8], _: &AccountId, _: Coin<AssetId, Balance>, _: &[u8]) -> Result<(), DispatchError> { Ok(()) }
    fn after_suraksha_maturity(_: &[u8], _: &AccountId, _: Coin<AssetId, Balance>) -> Result<(), DispatchError> { Ok(()) }
}

impl<AssetId, Balance> SwapHooks<AssetId, Balance> for () {
    fn after_swap(_: VillagePoolId, _: Coin<AssetId, Balance>, _: Coin<AssetId, Balance>) -> Result<(), DispatchError> { Ok(()) }
}

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use alloc::vec::Vec;
    use deshchain_primitives::{
        AgriLoanKind, ContributionSource, LoanProduct, LoanStatus, PeriodIndex, Season, FIRST_ID,
    };
    use frame_support::pallet_prelude::*;
    use frame_system::pallet_prelude::*;
    use sp_runtime::traits::{AtLeast32BitUnsigned, UniqueSaturatedInto};
    use sp_runtime::Permill;

    // =========================================================================
    //                                  Types
    // =========================================================================

    pub type PensionAccountIdOf<T> = BoundedVec<u8, <T as Config>::MaxIdLength>;

    /// Unified pool record. Balances live in [`PoolLedgers`], one per asset.
    #[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
    #[scale_info(skip_type_params(T))]
    pub struct UnifiedPool<T: Config> {
        pub pool_id: UnifiedPoolId,
        /// Village pool this unified pool belongs to
        pub village_pool_id: VillagePoolId,
        /// Split applied to new contributions and rebalances
        pub allocation: AllocationConfig,
        /// Loans issued and not yet repaid or written off
        pub active_loans: u32,
        /// Suraksha accounts with an open position in this pool
        pub active_pension_accounts: u32,
        pub created_at: BlockNumberFor<T>,
        pub last_rebalanced_at: BlockNumberFor<T>,
    }

    /// Loan issued from a pool's lending sub-pool
    #[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
    #[scale_info(skip_type_params(T))]
    pub struct Loan<T: Config> {
        pub loan_id: LoanId,
        pub pool_id: UnifiedPoolId,
        pub borrower: T::AccountId,
        pub asset: T::AssetId,
        pub principal: T::Balance,
        /// Annual rate selected from the rate bands at issuance
        pub interest_rate: Permill,
        pub product: LoanProduct,
        pub duration_months: u32,
        /// Principal plus simple interest over the full term
        pub total_owed: T::Balance,
        /// Cumulative repayments so far
        pub repaid: T::Balance,
        pub status: LoanStatus,
        pub issued_at: BlockNumberFor<T>,
        pub closed_at: Option<BlockNumberFor<T>>,
    }

    /// Links a Suraksha pension account to the pool holding its reserve
    #[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
    #[scale_info(skip_type_params(T))]
    pub struct PensionPosition<T: Config> {
        pub pool_id: UnifiedPoolId,
        pub contributor: T::AccountId,
        pub asset: T::AssetId,
        pub contributed: T::Balance,
        pub contributions: u32,
        pub first_contributed_at: BlockNumberFor<T>,
    }

    // =========================================================================
    //                                  Config
    // =========================================================================

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Balance type
        type Balance: Parameter
            + Member
            + AtLeast32BitUnsigned
            + From<u128>
            + Into<u128>
            + Copy
            + Default
            + MaxEncodedLen;

        /// Asset ID type (the denom of a coin)
        type AssetId: Parameter + Member + Copy + Default + MaxEncodedLen;

        /// Village pool registry
        type VillageRegistry: deshchain_primitives::VillageRegistry;

        /// Origin allowed to deposit, lend and tune pools
        type OperatorOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        /// Maximum length of a pension account identifier
        #[pallet::constant]
        type MaxIdLength: Get<u32>;

        /// Blocks per reconciliation period (roughly one month)
        #[pallet::constant]
        type BlocksPerPeriod: Get<u32>;

        /// Blocks between automatic rebalances of a pool, checked on each
        /// contribution. 0 disables automatic rebalancing.
        #[pallet::constant]
        type RebalancePeriod: Get<u32>;

        /// Trading fee charged on the input side of a swap
        #[pallet::constant]
        type SwapFee: Get<Permill>;

        /// Share of the trading fee retained by the unified pool
        #[pallet::constant]
        type PoolFeeShare: Get<Permill>;

        /// Monthly return owed to pension holders, as a share of the Suraksha reserve
        #[pallet::constant]
        type PensionReturnTarget: Get<Permill>;

        /// Weight info for this pallet
        type WeightInfo: WeightInfo;
    }

    /// Weight info trait
    pub trait WeightInfo {
        fn contribute() -> Weight;
        fn issue_loan() -> Weight;
        fn repay_loan() -> Weight;
        fn write_off_loan() -> Weight;
        fn set_allocation() -> Weight;
        fn rebalance_pool() -> Weight;
        fn set_rate_bands() -> Weight;
        fn reconcile_pool() -> Weight;
    }

    impl WeightInfo for () {
        fn contribute() -> Weight {
            Weight::from_parts(50_000, 0)
        }
        fn issue_loan() -> Weight {
            Weight::from_parts(60_000, 0)
        }
        fn repay_loan() -> Weight {
            Weight::from_parts(60_000, 0)
        }
        fn write_off_loan() -> Weight {
            Weight::from_parts(30_000, 0)
        }
        fn set_allocation() -> Weight {
            Weight::from_parts(20_000, 0)
        }
        fn rebalance_pool() -> Weight {
            Weight::from_parts(40_000, 0)
        }
        fn set_rate_bands() -> Weight {
            Weight::from_parts(10_000, 0)
        }
        fn reconcile_pool() -> Weight {
            Weight::from_parts(40_000, 0)
        }
    }

    // =========================================================================
    //                                  Storage
    // =========================================================================

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Ids start at 1 so that 0 never names a pool or a loan
    pub struct FirstIdDefault;
    impl Get<u64> for FirstIdDefault {
        fn get() -> u64 {
            FIRST_ID
        }
    }

    /// Unified pools by ID
    #[pallet::storage]
    #[pallet::getter(fn unified_pools)]
    pub type UnifiedPools<T: Config> =
        StorageMap<_, Blake2_128Concat, UnifiedPoolId, UnifiedPool<T>, OptionQuery>;

    /// Village pool -> unified pool index
    #[pallet::storage]
    pub type PoolByVillage<T: Config> =
        StorageMap<_, Blake2_128Concat, VillagePoolId, UnifiedPoolId, OptionQuery>;

    /// Next unified pool ID
    #[pallet::storage]
    #[pallet::getter(fn next_pool_id)]
    pub type NextPoolId<T: Config> = StorageValue<_, UnifiedPoolId, ValueQuery, FirstIdDefault>;

    /// Per-asset balances of each pool
    #[pallet::storage]
    #[pallet::getter(fn pool_ledgers)]
    pub type PoolLedgers<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        UnifiedPoolId,
        Blake2_128Concat,
        T::AssetId,
        AssetLedger<T::Balance>,
        ValueQuery,
    >;

    /// Loans by ID
    #[pallet::storage]
    #[pallet::getter(fn loans)]
    pub type Loans<T: Config> = StorageMap<_, Blake2_128Concat, LoanId, Loan<T>, OptionQuery>;

    /// Pool -> loan index, so per-pool queries avoid a full `Loans` scan
    #[pallet::storage]
    pub type LoansByPool<T: Config> =
        StorageDoubleMap<_, Blake2_128Concat, UnifiedPoolId, Blake2_128Concat, LoanId, (), OptionQuery>;

    /// Next loan ID
    #[pallet::storage]
    #[pallet::getter(fn next_loan_id)]
    pub type NextLoanId<T: Config> = StorageValue<_, LoanId, ValueQuery, FirstIdDefault>;

    /// Open Suraksha positions by pension account ID
    #[pallet::storage]
    #[pallet::getter(fn pension_positions)]
    pub type PensionPositions<T: Config> =
        StorageMap<_, Blake2_128Concat, PensionAccountIdOf<T>, PensionPosition<T>, OptionQuery>;

    /// Split used for newly created pools
    #[pallet::storage]
    #[pallet::getter(fn default_allocation)]
    pub type DefaultAllocation<T: Config> = StorageValue<_, AllocationConfig, ValueQuery>;

    /// Interest rate bands for every loan product
    #[pallet::storage]
    #[pallet::getter(fn loan_rate_bands)]
    pub type LoanRateBands<T: Config> = StorageValue<_, RateBands, ValueQuery>;

    /// Last reconciled period, guards against resetting a period twice
    #[pallet::storage]
    #[pallet::getter(fn last_reconciled_period)]
    pub type LastReconciledPeriod<T: Config> = StorageValue<_, PeriodIndex, OptionQuery>;

    /// Output of the most recent reconciliation per (pool, asset)
    #[pallet::storage]
    #[pallet::getter(fn revenue_snapshots)]
    pub type RevenueSnapshots<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        UnifiedPoolId,
        Blake2_128Concat,
        T::AssetId,
        RevenueSnapshot<T::Balance>,
        OptionQuery,
    >;

    // =========================================================================
    //                           Genesis Configuration
    // =========================================================================

    /// Genesis split in parts per million, concrete types for serde
    #[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenesisAllocation {
        pub suraksha_reserve_ppm: u32,
        pub dex_liquidity_ppm: u32,
        pub agri_lending_ppm: u32,
        pub emergency_reserve_ppm: u32,
    }

    /// Genesis rate bands in parts per million (annual)
    #[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenesisRateBands {
        pub agri_input_ppm: u32,
        pub agri_equipment_ppm: u32,
        pub agri_emergency_ppm: u32,
        pub agri_expansion_ppm: u32,
        pub agri_general_ppm: u32,
        pub festival_ppm: u32,
        pub wedding_ppm: u32,
        pub harvest_ppm: u32,
        pub traditional_craft_ppm: u32,
        pub women_enterprise_discount_ppm: u32,
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Chain-wide default split; `AllocationConfig::default()` when absent
        pub default_allocation: Option<GenesisAllocation>,
        /// Loan rate bands; `RateBands::default()` when absent
        pub rate_bands: Option<GenesisRateBands>,
        #[serde(skip)]
        pub _phantom: core::marker::PhantomData<T>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            if let Some(allocation) = &self.default_allocation {
                let config = AllocationConfig::from_ppm(
                    allocation.suraksha_reserve_ppm,
                    allocation.dex_liquidity_ppm,
                    allocation.agri_lending_ppm,
                    allocation.emergency_reserve_ppm,
                );
                assert!(config.is_valid(), "Default allocation must sum to 100%");
                DefaultAllocation::<T>::put(config);
            }

            if let Some(bands) = &self.rate_bands {
                LoanRateBands::<T>::put(RateBands {
                    agri_input: Permill::from_parts(bands.agri_input_ppm),
                    agri_equipment: Permill::from_parts(bands.agri_equipment_ppm),
                    agri_emergency: Permill::from_parts(bands.agri_emergency_ppm),
                    agri_expansion: Permill::from_parts(bands.agri_expansion_ppm),
                    agri_general: Permill::from_parts(bands.agri_general_ppm),
                    festival: Permill::from_parts(bands.festival_ppm),
                    wedding: Permill::from_parts(bands.wedding_ppm),
                    harvest: Permill::from_parts(bands.harvest_ppm),
                    traditional_craft: Permill::from_parts(bands.traditional_craft_ppm),
                    women_enterprise_discount: Permill::from_parts(bands.women_enterprise_discount_ppm),
                });
            }
        }
    }

    // =========================================================================
    //                                  Hooks
    // =========================================================================

    #[pallet::hooks]
    impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
        /// Reconcile monthly revenue at every period boundary.
        ///
        /// The work is linear in the number of (pool, asset) ledgers. Pools are
        /// only created for registered, verified villages, which keeps the
        /// walk small enough for a single block.
        fn on_initialize(block_number: BlockNumberFor<T>) -> Weight {
            let block_num: u32 = block_number.unique_saturated_into();
            let blocks_per_period = T::BlocksPerPeriod::get();

            if blocks_per_period == 0 || block_num == 0 || block_num % blocks_per_period != 0 {
                return Weight::zero();
            }

            let period: PeriodIndex = block_num / blocks_per_period;
            match Self::do_monthly_reconciliation(period) {
                Ok(pools) => T::WeightInfo::reconcile_pool()
                    .saturating_mul(pools as u64)
                    .saturating_add(T::DbWeight::get().reads_writes(2, 1)),
                Err(e) => {
                    log::warn!(
                        target: "unified-liquidity",
                        "Skipped reconciliation for period {} at block {}: {:?}",
                        period,
                        block_num,
                        e
                    );
                    T::DbWeight::get().reads(1)
                }
            }
        }
    }

    // =========================================================================
    //                                  Events
    // =========================================================================

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// A unified pool was created for a village. [pool_id, village_pool_id]
        UnifiedPoolCreated {
            pool_id: UnifiedPoolId,
            village_pool_id: VillagePoolId,
        },
        /// A contribution was split into the sub-pools.
        LiquidityContributed {
            pool_id: UnifiedPoolId,
            asset: T::AssetId,
            amount: T::Balance,
            source: ContributionSource,
            suraksha_reserve: T::Balance,
            dex_liquidity: T::Balance,
            agri_lending: T::Balance,
            emergency_reserve: T::Balance,
        },
        /// A matured Suraksha account was paid out of the reserve.
        SurakshaMaturityPaid {
            pool_id: UnifiedPoolId,
            beneficiary: T::AccountId,
            asset: T::AssetId,
            amount: T::Balance,
        },
        /// A loan was disbursed from the lending sub-pool.
        LoanIssued {
            loan_id: LoanId,
            pool_id: UnifiedPoolId,
            borrower: T::AccountId,
            asset: T::AssetId,
            principal: T::Balance,
            interest_rate: Permill,
            total_owed: T::Balance,
            product: LoanProduct,
            duration_months: u32,
        },
        /// A (possibly partial) repayment was received.
        LoanRepaymentReceived {
            loan_id: LoanId,
            amount: T::Balance,
            interest_realised: T::Balance,
            outstanding: T::Balance,
        },
        /// A loan was repaid in full. [loan_id, pool_id]
        LoanRepaid { loan_id: LoanId, pool_id: UnifiedPoolId },
        /// A loan was written off as defaulted. [loan_id, pool_id, outstanding]
        LoanWrittenOff {
            loan_id: LoanId,
            pool_id: UnifiedPoolId,
            outstanding: T::Balance,
        },
        /// Trading fee revenue was credited to a pool.
        DexRevenueRecorded {
            pool_id: UnifiedPoolId,
            asset: T::AssetId,
            amount: T::Balance,
        },
        /// Recording swap revenue failed. The swap itself was not affected.
        DexRevenueRecordingFailed {
            village_pool_id: VillagePoolId,
            error: DispatchError,
        },
        /// Monthly revenue of one pool asset was snapshotted and reset.
        MonthlyRevenueReconciled {
            pool_id: UnifiedPoolId,
            period: PeriodIndex,
            asset: T::AssetId,
            dex_revenue: T::Balance,
            lending_revenue: T::Balance,
            pension_returns: T::Balance,
        },
        /// A period was reconciled across all pools. [period, pools]
        PeriodReconciled { period: PeriodIndex, pools: u32 },
        /// Pool allocation updated. [pool_id]
        PoolAllocationUpdated { pool_id: UnifiedPoolId },
        /// Default allocation for new pools updated.
        DefaultAllocationUpdated,
        /// Pool on-hand liquidity re-split. [pool_id, asset, total_liquidity]
        PoolRebalanced {
            pool_id: UnifiedPoolId,
            asset: T::AssetId,
            total_liquidity: T::Balance,
        },
        /// Loan rate bands updated.
        RateBandsUpdated,
    }

    // =========================================================================
    //                                  Errors
    // =========================================================================

    #[pallet::error]
    pub enum Error<T> {
        /// Amount must be greater than zero.
        InvalidAmount,
        /// Pension account identifier is empty.
        EmptyPensionAccountId,
        /// Identifier exceeds the maximum length.
        IdentifierTooLong,
        /// The all-zero account cannot take part.
        ZeroAccount,
        /// Loan duration outside 1..=MAX_LOAN_DURATION_MONTHS.
        InvalidDuration,
        /// Allocation ratios do not add up to 100%.
        InvalidAllocation,
        /// Coin asset does not match the record's asset.
        AssetMismatch,
        /// Village pool is not registered.
        VillageNotFound,
        /// Village pool is inactive or unverified.
        VillageInactive,
        /// Unified pool not found.
        PoolNotFound,
        /// Loan not found.
        LoanNotFound,
        /// Pension account has no position in any pool.
        PensionAccountNotFound,
        /// Pension account already contributes to another village's pool.
        PensionPoolMismatch,
        /// Insufficient liquidity in the lending sub-pool.
        InsufficientLendingLiquidity,
        /// Insufficient Suraksha reserve for the payout.
        InsufficientSurakshaReserve,
        /// Loan is repaid or defaulted.
        LoanNotActive,
        /// Repayment is larger than the outstanding balance.
        RepaymentExceedsOutstanding,
        /// This period (or a later one) was already reconciled.
        PeriodAlreadyReconciled,
        /// The period has not started yet.
        PeriodNotReached,
        /// Arithmetic overflow.
        ArithmeticOverflow,
    }

    // =========================================================================
    //                                Extrinsics
    // =========================================================================

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Deposit liquidity into a village's unified pool.
        ///
        /// Creates the unified pool on the village's first contribution.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::contribute())]
        pub fn contribute(
            origin: OriginFor<T>,
            village_pool_id: VillagePoolId,
            asset: T::AssetId,
            amount: T::Balance,
        ) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_contribute(village_pool_id, Coin::new(asset, amount), ContributionSource::DirectDeposit)?;

            Ok(())
        }

        /// Issue an agricultural loan at the band rate for `kind`.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::issue_loan())]
        pub fn process_agri_loan(
            origin: OriginFor<T>,
            pool_id: UnifiedPoolId,
            borrower: T::AccountId,
            asset: T::AssetId,
            amount: T::Balance,
            kind: AgriLoanKind,
            duration_months: u32,
        ) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_issue_loan(pool_id, &borrower, Coin::new(asset, amount), LoanProduct::Agri(kind), duration_months)?;

            Ok(())
        }

        /// Issue seasonal working capital at the season's premium band.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::issue_loan())]
        pub fn process_seasonal_loan(
            origin: OriginFor<T>,
            pool_id: UnifiedPoolId,
            borrower: T::AccountId,
            asset: T::AssetId,
            amount: T::Balance,
            season: Season,
            duration_months: u32,
        ) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_issue_loan(pool_id, &borrower, Coin::new(asset, amount), LoanProduct::Seasonal(season), duration_months)?;

            Ok(())
        }

        /// Issue a traditional-craft loan at the preferential band.
        #[pallet::call_index(3)]
        #[pallet::weight(T::WeightInfo::issue_loan())]
        pub fn process_traditional_craft_loan(
            origin: OriginFor<T>,
            pool_id: UnifiedPoolId,
            artisan: T::AccountId,
            asset: T::AssetId,
            amount: T::Balance,
            duration_months: u32,
        ) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_issue_loan(pool_id, &artisan, Coin::new(asset, amount), LoanProduct::TraditionalCraft, duration_months)?;

            Ok(())
        }

        /// Issue a women-enterprise loan (general agri rate minus the discount).
        #[pallet::call_index(4)]
        #[pallet::weight(T::WeightInfo::issue_loan())]
        pub fn process_women_enterprise_loan(
            origin: OriginFor<T>,
            pool_id: UnifiedPoolId,
            entrepreneur: T::AccountId,
            asset: T::AssetId,
            amount: T::Balance,
            duration_months: u32,
        ) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_issue_loan(pool_id, &entrepreneur, Coin::new(asset, amount), LoanProduct::WomenEnterprise, duration_months)?;

            Ok(())
        }

        /// Repay part or all of a loan.
        #[pallet::call_index(5)]
        #[pallet::weight(T::WeightInfo::repay_loan())]
        pub fn process_loan_repayment(
            origin: OriginFor<T>,
            loan_id: LoanId,
            asset: T::AssetId,
            amount: T::Balance,
        ) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_repay_loan(loan_id, Coin::new(asset, amount))
        }

        /// Mark an active loan as defaulted.
        #[pallet::call_index(6)]
        #[pallet::weight(T::WeightInfo::write_off_loan())]
        pub fn write_off_loan(origin: OriginFor<T>, loan_id: LoanId) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_write_off_loan(loan_id)
        }

        /// Change the split used by one pool.
        #[pallet::call_index(7)]
        #[pallet::weight(T::WeightInfo::set_allocation())]
        pub fn set_pool_allocation(
            origin: OriginFor<T>,
            pool_id: UnifiedPoolId,
            allocation: AllocationConfig,
        ) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            ensure!(allocation.is_valid(), Error::<T>::InvalidAllocation);
            UnifiedPools::<T>::try_mutate(pool_id, |maybe_pool| -> DispatchResult {
                let pool = maybe_pool.as_mut().ok_or(Error::<T>::PoolNotFound)?;
                pool.allocation = allocation;
                Ok(())
            })?;

            Self::deposit_event(Event::PoolAllocationUpdated { pool_id });

            Ok(())
        }

        /// Change the split given to pools created from now on.
        #[pallet::call_index(8)]
        #[pallet::weight(T::WeightInfo::set_allocation())]
        pub fn set_default_allocation(origin: OriginFor<T>, allocation: AllocationConfig) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            ensure!(allocation.is_valid(), Error::<T>::InvalidAllocation);
            DefaultAllocation::<T>::put(allocation);

            Self::deposit_event(Event::DefaultAllocationUpdated);

            Ok(())
        }

        /// Re-split a pool's on-hand liquidity of `asset` by its allocation.
        #[pallet::call_index(9)]
        #[pallet::weight(T::WeightInfo::rebalance_pool())]
        pub fn rebalance_pool(origin: OriginFor<T>, pool_id: UnifiedPoolId, asset: T::AssetId) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_rebalance(pool_id, asset)
        }

        /// Replace the loan rate bands.
        #[pallet::call_index(10)]
        #[pallet::weight(T::WeightInfo::set_rate_bands())]
        pub fn set_rate_bands(origin: OriginFor<T>, bands: RateBands) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            LoanRateBands::<T>::put(bands);

            Self::deposit_event(Event::RateBandsUpdated);

            Ok(())
        }

        /// Reconcile a period by hand (e.g. after a missed boundary block).
        ///
        /// Only periods that have already started can be reconciled.
        #[pallet::call_index(11)]
        #[pallet::weight(T::WeightInfo::reconcile_pool())]
        pub fn reconcile_period(origin: OriginFor<T>, period: PeriodIndex) -> DispatchResult {
            T::OperatorOrigin::ensure_origin(origin)?;

            Self::do_monthly_reconciliation(period)?;

            Ok(())
        }
    }

    // =========================================================================
    //                           Helper Functions
    // =========================================================================

    impl<T: Config> Pallet<T> {
        /// Whether `who` is the account decoded from all-zero bytes
        pub fn is_zero_account(who: &T::AccountId) -> bool {
            use sp_runtime::traits::TrailingZeroInput;
            T::AccountId::decode(&mut TrailingZeroInput::zeroes())
                .map(|zero| &zero == who)
                .unwrap_or(false)
        }

        /// Bound a raw pension account id
        pub fn bounded_pension_id(raw: &[u8]) -> Result<PensionAccountIdOf<T>, DispatchError> {
            ensure!(!raw.is_empty(), Error::<T>::EmptyPensionAccountId);
            let bounded: PensionAccountIdOf<T> = raw
                .to_vec()
                .try_into()
                .map_err(|_| Error::<T>::IdentifierTooLong)?;
            Ok(bounded)
        }

        /// Current status of a loan
        pub fn loan_status(loan_id: LoanId) -> Option<LoanStatus> {
            Loans::<T>::get(loan_id).map(|loan| loan.status)
        }

        /// All loans of a pool, for queries
        pub fn loans_of_pool(pool_id: UnifiedPoolId) -> Vec<Loan<T>> {
            LoansByPool::<T>::iter_key_prefix(pool_id)
                .filter_map(Loans::<T>::get)
                .collect()
        }

        /// Period the current block falls in, `None` when periods are disabled
        pub fn current_period() -> Option<PeriodIndex> {
            let block_num: u32 = frame_system::Pallet::<T>::block_number().unique_saturated_into();
            block_num.checked_div(T::BlocksPerPeriod::get())
        }
    }
}
