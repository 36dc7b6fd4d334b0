//! Test runtime for the village registry pallet.

use crate as pallet_village_registry;
use frame_support::{derive_impl, parameter_types};
use frame_system::EnsureRoot;
use sp_runtime::BuildStorage;

type Block = frame_system::mocking::MockBlock<Test>;

frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        VillageRegistry: pallet_village_registry,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type Block = Block;
}

parameter_types! {
    pub const MaxNameLength: u32 = 16;
    pub const MaxPostalCodeLength: u32 = 6;
}

impl pallet_village_registry::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type RegistrarOrigin = EnsureRoot<u64>;
    type MaxNameLength = MaxNameLength;
    type MaxPostalCodeLength = MaxPostalCodeLength;
}

pub const PANCHAYAT_HEAD: u64 = 7;

/// Rampur (verified, active) and Sitapur (unverified) at genesis
pub fn new_test_ext() -> sp_io::TestExternalities {
    let storage = RuntimeGenesisConfig {
        system: Default::default(),
        village_registry: pallet_village_registry::GenesisConfig {
            villages: vec![
                pallet_village_registry::GenesisVillage {
                    name: b"Rampur".to_vec(),
                    postal_code: b"244901".to_vec(),
                    state_code: *b"UP",
                    verified: true,
                    active: true,
                },
                pallet_village_registry::GenesisVillage {
                    name: b"Sitapur".to_vec(),
                    postal_code: b"261001".to_vec(),
                    state_code: *b"UP",
                    verified: false,
                    active: true,
                },
            ],
            _phantom: Default::default(),
        },
    }
    .build_storage()
    .unwrap();

    let mut ext = sp_io::TestExternalities::new(storage);
    ext.execute_with(|| System::set_block_number(1));
    ext
}
