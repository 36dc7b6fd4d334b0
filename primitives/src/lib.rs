//! DeshChain Shared Primitives
//!
//! Common types used across the DeshChain liquidity pallets.

#![cfg_attr(not(feature = "std"), no_std)]

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use sp_runtime::traits::Zero;

// ============================================================================
// Common ID Types
// ============================================================================

/// Unified liquidity pool identifier
pub type UnifiedPoolId = u64;

/// Village pool identifier (owned by the village registry)
pub type VillagePoolId = u64;

/// Loan identifier
pub type LoanId = u64;

/// Reconciliation period index (block number / blocks per period)
pub type PeriodIndex = u32;

// ============================================================================
// Amounts
// ============================================================================

/// An amount of a single asset. The asset id plays the role of a denom.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen, Default)]
pub struct Coin<AssetId, Balance> {
    pub asset: AssetId,
    pub amount: Balance,
}

impl<AssetId, Balance: Zero> Coin<AssetId, Balance> {
    pub fn new(asset: AssetId, amount: Balance) -> Self {
        Self { asset, amount }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

// ============================================================================
// Contributions
// ============================================================================

/// Where a unified pool contribution came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen)]
pub enum ContributionSource {
    /// Suraksha pension contribution routed through the pension hooks
    Pension,
    /// Direct liquidity deposit through the pallet call
    DirectDeposit,
}

// ============================================================================
// Loans
// ============================================================================

/// Loan lifecycle state. Rejected requests never produce a record.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen, Default)]
pub enum LoanStatus {
    #[default]
    Active,
    Repaid,
    Defaulted,
}

/// Agricultural loan purpose. Each purpose maps to its own rate band.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen)]
pub enum AgriLoanKind {
    /// Seeds, fertilizers
    Input,
    /// Tractors, tools
    Equipment,
    /// Crop failure, medical
    Emergency,
    /// Land purchase
    Expansion,
    /// Anything else
    General,
}

/// Business season for seasonal working-capital loans.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen)]
pub enum Season {
    Festival,
    Wedding,
    Harvest,
}

/// Lending product. Products are rate overlays, they share one lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen)]
pub enum LoanProduct {
    Agri(AgriLoanKind),
    Seasonal(Season),
    TraditionalCraft,
    WomenEnterprise,
}

impl Default for LoanProduct {
    fn default() -> Self {
        Self::Agri(AgriLoanKind::General)
    }
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Read access to registered village pools.
pub trait VillageRegistry {
    /// Resolve a postal code to its village pool
    fn village_by_postal_code(postal_code: &[u8]) -> Option<VillagePoolId>;

    /// Whether the village exists
    fn village_exists(village_pool_id: VillagePoolId) -> bool;

    /// Whether the village may back a unified pool (active and verified)
    fn is_village_eligible(village_pool_id: VillagePoolId) -> bool;
}

/// No villages registered
impl VillageRegistry for () {
    fn village_by_postal_code(_: &[u8]) -> Option<VillagePoolId> {
        None
    }
    fn village_exists(_: VillagePoolId) -> bool {
        false
    }
    fn is_village_eligible(_: VillagePoolId) -> bool {
        false
    }
}

// ============================================================================
// Configuration Constants
// ============================================================================

/// Months per year, for pro-rating annual interest rates
pub const MONTHS_PER_YEAR: u32 = 12;

/// Longest loan term accepted (10 years)
pub const MAX_LOAN_DURATION_MONTHS: u32 = 120;

/// First id handed out for unified pools and loans
pub const FIRST_ID: u64 = 1;
