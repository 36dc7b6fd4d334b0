//! Test runtime for the unified liquidity pallet.

use crate as pallet_unified_liquidity;
use deshchain_primitives::{VillagePoolId, VillageRegistry};
use frame_support::{derive_impl, parameter_types, traits::Hooks};
use frame_system::EnsureRoot;
use sp_runtime::{BuildStorage, Permill};
use std::cell::RefCell;
use std::collections::BTreeMap;

type Block = frame_system::mocking::MockBlock<Test>;

// =============================================================================
//                          Construct Runtime
// =============================================================================

frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        UnifiedLiquidity: pallet_unified_liquidity,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type Block = Block;
}

pub type Balance = u128;
pub type AssetId = u32;

pub const NAMO: AssetId = 1;
pub const USDT: AssetId = 2;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
/// Decodes from all-zero bytes
pub const ZERO_ACCOUNT: u64 = 0;

pub const VILLAGE_A: VillagePoolId = 10;
pub const VILLAGE_B: VillagePoolId = 20;
pub const INACTIVE_VILLAGE: VillagePoolId = 30;
pub const UNKNOWN_VILLAGE: VillagePoolId = 99;

pub const POSTAL_A: &[u8] = b"110001";
pub const POSTAL_B: &[u8] = b"400001";
pub const POSTAL_INACTIVE: &[u8] = b"560001";

pub const BLOCKS_PER_PERIOD: u32 = 100;
/// About a week of a 100-block month
pub const REBALANCE_PERIOD: u32 = 25;

// =============================================================================
//                          Mock Village Registry
// =============================================================================

thread_local! {
    static VILLAGES: RefCell<BTreeMap<VillagePoolId, (Vec<u8>, bool)>> = RefCell::new(BTreeMap::new());
}

pub struct MockVillages;

impl MockVillages {
    pub fn reset() {
        VILLAGES.with(|v| v.borrow_mut().clear());
    }

    pub fn register(village_pool_id: VillagePoolId, postal_code: &[u8], eligible: bool) {
        VILLAGES.with(|v| v.borrow_mut().insert(village_pool_id, (postal_code.to_vec(), eligible)));
    }

    pub fn set_eligible(village_pool_id: VillagePoolId, eligible: bool) {
        VILLAGES.with(|v| {
            if let Some(entry) = v.borrow_mut().get_mut(&village_pool_id) {
                entry.1 = eligible;
            }
        });
    }
}

impl VillageRegistry for MockVillages {
    fn village_by_postal_code(postal_code: &[u8]) -> Option<VillagePoolId> {
        VILLAGES.with(|v| {
            v.borrow()
                .iter()
                .find(|(_, (code, _))| code.as_slice() == postal_code)
                .map(|(id, _)| *id)
        })
    }

    fn village_exists(village_pool_id: VillagePoolId) -> bool {
        VILLAGES.with(|v| v.borrow().contains_key(&village_pool_id))
    }

    fn is_village_eligible(village_pool_id: VillagePoolId) -> bool {
        VILLAGES.with(|v| v.borrow().get(&village_pool_id).map(|(_, eligible)| *eligible).unwrap_or(false))
    }
}

// =============================================================================
//                          Unified Liquidity Pallet
// =============================================================================

parameter_types! {
    pub const MaxIdLength: u32 = 32;
    pub const BlocksPerPeriod: u32 = BLOCKS_PER_PERIOD;
    pub const RebalancePeriod: u32 = REBALANCE_PERIOD;
    /// 0.3% trading fee
    pub SwapFee: Permill = Permill::from_parts(3_000);
    /// Half of the fee stays with the pool
    pub PoolFeeShare: Permill = Permill::from_percent(50);
    pub PensionReturnTarget: Permill = Permill::from_percent(1);
}

impl pallet_unified_liquidity::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Balance = Balance;
    type AssetId = AssetId;
    type VillageRegistry = MockVillages;
    type OperatorOrigin = EnsureRoot<u64>;
    type MaxIdLength = MaxIdLength;
    type BlocksPerPeriod = BlocksPerPeriod;
    type RebalancePeriod = RebalancePeriod;
    type SwapFee = SwapFee;
    type PoolFeeShare = PoolFeeShare;
    type PensionReturnTarget = PensionReturnTarget;
    type WeightInfo = ();
}

// =============================================================================
//                          Externalities
// =============================================================================

pub fn new_test_ext() -> sp_io::TestExternalities {
    new_test_ext_with(Default::default())
}

pub fn new_test_ext_with(genesis: pallet_unified_liquidity::GenesisConfig<Test>) -> sp_io::TestExternalities {
    MockVillages::reset();
    MockVillages::register(VILLAGE_A, POSTAL_A, true);
    MockVillages::register(VILLAGE_B, POSTAL_B, true);
    MockVillages::register(INACTIVE_VILLAGE, POSTAL_INACTIVE, false);

    let storage = RuntimeGenesisConfig {
        system: Default::default(),
        unified_liquidity: genesis,
    }
    .build_storage()
    .unwrap();

    let mut ext = sp_io::TestExternalities::new(storage);
    ext.execute_with(|| System::set_block_number(1));
    ext
}

/// Genesis with a 40/35/25 split and no emergency reserve
pub fn forty_thirty_five_twenty_five() -> pallet_unified_liquidity::GenesisConfig<Test> {
    pallet_unified_liquidity::GenesisConfig {
        default_allocation: Some(pallet_unified_liquidity::GenesisAllocation {
            suraksha_reserve_ppm: 400_000,
            dex_liquidity_ppm: 350_000,
            agri_lending_ppm: 250_000,
            emergency_reserve_ppm: 0,
        }),
        rate_bands: None,
        _phantom: Default::default(),
    }
}

pub fn run_to_block(n: u64) {
    while System::block_number() < n {
        let next = System::block_number() + 1;
        System::set_block_number(next);
        UnifiedLiquidity::on_initialize(next);
    }
}
