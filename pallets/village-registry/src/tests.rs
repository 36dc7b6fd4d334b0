use crate::mock::*;
use crate::{Error, Event, Villages};
use deshchain_primitives::VillageRegistry as _;
use frame_support::{assert_noop, assert_ok};
use sp_runtime::DispatchError;

type Registry = crate::Pallet<Test>;

#[test]
fn test_genesis_villages_are_indexed() {
    new_test_ext().execute_with(|| {
        assert_eq!(Registry::village_by_postal_code(b"244901"), Some(1));
        assert_eq!(Registry::village_by_postal_code(b"261001"), Some(2));
        assert_eq!(Registry::village_by_postal_code(b"999999"), None);
        assert_eq!(Registry::village_by_postal_code(b"1234567"), None);
        assert_eq!(VillageRegistry::next_village_id(), 3);

        assert!(Registry::village_exists(1));
        assert!(!Registry::village_exists(3));
        assert!(Registry::is_village_eligible(1));
        assert!(!Registry::is_village_eligible(2));
        assert!(!Registry::is_village_eligible(3));
    });
}

#[test]
fn test_register_village() {
    new_test_ext().execute_with(|| {
        assert_ok!(VillageRegistry::register_village(
            RuntimeOrigin::signed(PANCHAYAT_HEAD),
            b"Nandgaon".to_vec(),
            b"281403".to_vec(),
            *b"UP"
        ));

        let village = Villages::<Test>::get(3).unwrap();
        assert_eq!(village.panchayat_head, Some(PANCHAYAT_HEAD));
        assert!(village.active);
        assert!(!village.verified);
        assert_eq!(village.registered_at, 1);

        // Unverified villages cannot back a unified pool yet
        assert_eq!(Registry::village_by_postal_code(b"281403"), Some(3));
        assert!(!Registry::is_village_eligible(3));

        System::assert_last_event(
            Event::VillageRegistered {
                village_pool_id: 3,
                postal_code: b"281403".to_vec().try_into().unwrap(),
                panchayat_head: PANCHAYAT_HEAD,
            }
            .into(),
        );
    });
}

#[test]
fn test_register_village_validation() {
    new_test_ext().execute_with(|| {
        let head = RuntimeOrigin::signed(PANCHAYAT_HEAD);

        assert_noop!(
            VillageRegistry::register_village(head.clone(), b"Rampur Khas".to_vec(), b"244901".to_vec(), *b"UP"),
            Error::<Test>::PostalCodeTaken
        );
        assert_noop!(
            VillageRegistry::register_village(head.clone(), b"Nowhere".to_vec(), Vec::new(), *b"UP"),
            Error::<Test>::EmptyPostalCode
        );
        assert_noop!(
            VillageRegistry::register_village(head.clone(), b"Nowhere".to_vec(), b"1234567".to_vec(), *b"UP"),
            Error::<Test>::PostalCodeTooLong
        );
        assert_noop!(
            VillageRegistry::register_village(head, vec![b'a'; 17], b"123456".to_vec(), *b"UP"),
            Error::<Test>::NameTooLong
        );
        assert_noop!(
            VillageRegistry::register_village(RuntimeOrigin::root(), b"Nowhere".to_vec(), b"123456".to_vec(), *b"UP"),
            DispatchError::BadOrigin
        );
    });
}

#[test]
fn test_verify_village() {
    new_test_ext().execute_with(|| {
        assert_noop!(
            VillageRegistry::verify_village(RuntimeOrigin::signed(PANCHAYAT_HEAD), 2),
            DispatchError::BadOrigin
        );

        assert_ok!(VillageRegistry::verify_village(RuntimeOrigin::root(), 2));
        assert!(Registry::is_village_eligible(2));
        System::assert_last_event(Event::VillageVerified { village_pool_id: 2 }.into());

        assert_noop!(
            VillageRegistry::verify_village(RuntimeOrigin::root(), 2),
            Error::<Test>::AlreadyVerified
        );
        assert_noop!(
            VillageRegistry::verify_village(RuntimeOrigin::root(), 42),
            Error::<Test>::VillageNotFound
        );
    });
}

#[test]
fn test_deactivated_village_is_not_eligible() {
    new_test_ext().execute_with(|| {
        assert_ok!(VillageRegistry::set_village_active(RuntimeOrigin::root(), 1, false));
        assert!(Registry::village_exists(1));
        assert!(!Registry::is_village_eligible(1));
        System::assert_last_event(Event::VillageActiveSet { village_pool_id: 1, active: false }.into());

        assert_ok!(VillageRegistry::set_village_active(RuntimeOrigin::root(), 1, true));
        assert!(Registry::is_village_eligible(1));

        assert_noop!(
            VillageRegistry::set_village_active(RuntimeOrigin::root(), 42, true),
            Error::<Test>::VillageNotFound
        );
    });
}
