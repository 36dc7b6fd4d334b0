//! # Village Registry Pallet
//!
//! Registry of village pools, the community entities that unified liquidity
//! pools are attached to.
//!
//! ## Overview
//!
//! - A panchayat head registers a village under its postal code (one village
//!   per postal code)
//! - The registrar verifies villages and can deactivate or reactivate them
//! - Only villages that are both verified and active may back a unified pool
//! - Other pallets read the registry through [`VillageRegistry`]

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

#[cfg(test)]
mod mock;

#[cfg(test)]
mod tests;

use deshchain_primitives::{VillagePoolId, VillageRegistry};

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use alloc::vec::Vec;
    use deshchain_primitives::FIRST_ID;
    use frame_support::pallet_prelude::*;
    use frame_system::pallet_prelude::*;
    use sp_runtime::traits::Zero;

    // =========================================================================
    //                                  Types
    // =========================================================================

    pub type NameOf<T> = BoundedVec<u8, <T as Config>::MaxNameLength>;
    pub type PostalCodeOf<T> = BoundedVec<u8, <T as Config>::MaxPostalCodeLength>;

    #[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
    #[scale_info(skip_type_params(T))]
    pub struct VillagePool<T: Config> {
        pub village_pool_id: VillagePoolId,
        /// Human-readable name, e.g. b"Rampur"
        pub name: NameOf<T>,
        /// Postal (PIN) code, unique across villages
        pub postal_code: PostalCodeOf<T>,
        /// Two-letter state code, e.g. b"UP"
        pub state_code: [u8; 2],
        /// Registering account, `None` for genesis villages
        pub panchayat_head: Option<T::AccountId>,
        pub verified: bool,
        pub active: bool,
        pub registered_at: BlockNumberFor<T>,
    }

    impl<T: Config> VillagePool<T> {
        /// Verified and active
        pub fn is_eligible(&self) -> bool {
            self.verified && self.active
        }
    }

    // =========================================================================
    //                                  Config
    // =========================================================================

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Origin allowed to verify and (de)activate villages
        type RegistrarOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        #[pallet::constant]
        type MaxNameLength: Get<u32>;

        #[pallet::constant]
        type MaxPostalCodeLength: Get<u32>;
    }

    // =========================================================================
    //                                  Storage
    // =========================================================================

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    pub struct FirstIdDefault;
    impl Get<VillagePoolId> for FirstIdDefault {
        fn get() -> VillagePoolId {
            FIRST_ID
        }
    }

    /// Registered villages by ID
    #[pallet::storage]
    #[pallet::getter(fn villages)]
    pub type Villages<T: Config> = StorageMap<_, Blake2_128Concat, VillagePoolId, VillagePool<T>, OptionQuery>;

    /// Postal code -> village index
    #[pallet::storage]
    #[pallet::getter(fn village_by_postal)]
    pub type VillageByPostalCode<T: Config> =
        StorageMap<_, Blake2_128Concat, PostalCodeOf<T>, VillagePoolId, OptionQuery>;

    /// Next village ID
    #[pallet::storage]
    #[pallet::getter(fn next_village_id)]
    pub type NextVillageId<T> = StorageValue<_, VillagePoolId, ValueQuery, FirstIdDefault>;

    // =========================================================================
    //                           Genesis Configuration
    // =========================================================================

    /// Genesis village using concrete types for serde compatibility
    #[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenesisVillage {
        pub name: Vec<u8>,
        pub postal_code: Vec<u8>,
        pub state_code: [u8; 2],
        pub verified: bool,
        pub active: bool,
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Villages registered at genesis, ids assigned in order from 1
        pub villages: Vec<GenesisVillage>,
        #[serde(skip)]
        pub _phantom: core::marker::PhantomData<T>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            for village in self.villages.iter() {
                let name: NameOf<T> = village.name.clone().try_into().expect("Village name too long");
                let postal_code: PostalCodeOf<T> =
                    village.postal_code.clone().try_into().expect("Postal code too long");
                assert!(
                    !VillageByPostalCode::<T>::contains_key(&postal_code),
                    "Duplicate postal code in genesis villages"
                );

                let village_pool_id = NextVillageId::<T>::get();
                VillageByPostalCode::<T>::insert(&postal_code, village_pool_id);
                Villages::<T>::insert(
                    village_pool_id,
                    VillagePool {
                        village_pool_id,
                        name,
                        postal_code,
                        state_code: village.state_code,
                        panchayat_head: None,
                        verified: village.verified,
                        active: village.active,
                        registered_at: Zero::zero(),
                    },
                );
                NextVillageId::<T>::put(village_pool_id + 1);
            }
        }
    }

    // =========================================================================
    //                                  Events
    // =========================================================================

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// A village was registered. [village_pool_id, postal_code]
        VillageRegistered {
            village_pool_id: VillagePoolId,
            postal_code: PostalCodeOf<T>,
            panchayat_head: T::AccountId,
        },
        /// A village was verified. [village_pool_id]
        VillageVerified { village_pool_id: VillagePoolId },
        /// A village was activated or deactivated. [village_pool_id, active]
        VillageActiveSet { village_pool_id: VillagePoolId, active: bool },
    }

    // =========================================================================
    //                                  Errors
    // =========================================================================

    #[pallet::error]
    pub enum Error<T> {
        /// Village not found.
        VillageNotFound,
        /// A village is already registered under this postal code.
        PostalCodeTaken,
        /// Postal code is empty.
        EmptyPostalCode,
        /// Name too long.
        NameTooLong,
        /// Postal code too long.
        PostalCodeTooLong,
        /// Village is already verified.
        AlreadyVerified,
        /// Arithmetic overflow.
        ArithmeticOverflow,
    }

    // =========================================================================
    //                                Extrinsics
    // =========================================================================

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Register a village. The caller becomes its panchayat head.
        ///
        /// New villages start active but unverified.
        #[pallet::call_index(0)]
        #[pallet::weight(Weight::from_parts(10_000, 0))]
        pub fn register_village(
            origin: OriginFor<T>,
            name: Vec<u8>,
            postal_code: Vec<u8>,
            state_code: [u8; 2],
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;

            ensure!(!postal_code.is_empty(), Error::<T>::EmptyPostalCode);
            let name: NameOf<T> = name.try_into().map_err(|_| Error::<T>::NameTooLong)?;
            let postal_code: PostalCodeOf<T> =
                postal_code.try_into().map_err(|_| Error::<T>::PostalCodeTooLong)?;
            ensure!(
                !VillageByPostalCode::<T>::contains_key(&postal_code),
                Error::<T>::PostalCodeTaken
            );

            let village_pool_id = NextVillageId::<T>::get();
            let next_id = village_pool_id.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;

            Villages::<T>::insert(
                village_pool_id,
                VillagePool {
                    village_pool_id,
                    name,
                    postal_code: postal_code.clone(),
                    state_code,
                    panchayat_head: Some(who.clone()),
                    verified: false,
                    active: true,
                    registered_at: frame_system::Pallet::<T>::block_number(),
                },
            );
            VillageByPostalCode::<T>::insert(&postal_code, village_pool_id);
            NextVillageId::<T>::put(next_id);

            log::info!(
                target: "village-registry",
                "Registered village {} by {:?}",
                village_pool_id,
                who
            );

            Self::deposit_event(Event::VillageRegistered {
                village_pool_id,
                postal_code,
                panchayat_head: who,
            });

            Ok(())
        }

        /// Mark a village as verified.
        #[pallet::call_index(1)]
        #[pallet::weight(Weight::from_parts(10_000, 0))]
        pub fn verify_village(origin: OriginFor<T>, village_pool_id: VillagePoolId) -> DispatchResult {
            T::RegistrarOrigin::ensure_origin(origin)?;

            Villages::<T>::try_mutate(village_pool_id, |maybe_village| -> DispatchResult {
                let village = maybe_village.as_mut().ok_or(Error::<T>::VillageNotFound)?;
                ensure!(!village.verified, Error::<T>::AlreadyVerified);
                village.verified = true;
                Ok(())
            })?;

            Self::deposit_event(Event::VillageVerified { village_pool_id });

            Ok(())
        }

        /// Activate or deactivate a village.
        #[pallet::call_index(2)]
        #[pallet::weight(Weight::from_parts(10_000, 0))]
        pub fn set_village_active(
            origin: OriginFor<T>,
            village_pool_id: VillagePoolId,
            active: bool,
        ) -> DispatchResult {
            T::RegistrarOrigin::ensure_origin(origin)?;

            Villages::<T>::try_mutate(village_pool_id, |maybe_village| -> DispatchResult {
                let village = maybe_village.as_mut().ok_or(Error::<T>::VillageNotFound)?;
                village.active = active;
                Ok(())
            })?;

            if !active {
                log::info!(target: "village-registry", "Village {} deactivated", village_pool_id);
            }

            Self::deposit_event(Event::VillageActiveSet { village_pool_id, active });

            Ok(())
        }
    }
}

// =============================================================================
//                           VillageRegistry Trait
// =============================================================================

impl<T: Config> VillageRegistry for Pallet<T> {
    fn village_by_postal_code(postal_code: &[u8]) -> Option<VillagePoolId> {
        let postal_code: PostalCodeOf<T> = postal_code.to_vec().try_into().ok()?;
        VillageByPostalCode::<T>::get(postal_code)
    }

    fn village_exists(village_pool_id: VillagePoolId) -> bool {
        Villages::<T>::contains_key(village_pool_id)
    }

    fn is_village_eligible(village_pool_id: VillagePoolId) -> bool {
        Villages::<T>::get(village_pool_id)
            .map(|village| village.is_eligible())
            .unwrap_or(false)
    }
}
