//! Behaviour of the `Store` contract through the public API only.

use std::sync::atomic::{AtomicBool, Ordering};

use busfleet_core::{PlateNumber, VehicleId};
use busfleet_store::{RocksStore, Status, Store, StoreConfig, StoreError, Vehicle};
use chrono::Utc;
use tempfile::TempDir;

fn open(dir: &TempDir) -> RocksStore {
    let config = StoreConfig {
        sync_writes: false,
        ..StoreConfig::new(dir.path())
    };
    RocksStore::open_with_config(&config).unwrap()
}

fn vehicle(plate: &str, route: &str) -> Vehicle {
    Vehicle {
        vehicle_id: VehicleId::generate(),
        plate_number: PlateNumber::parse(plate).unwrap(),
        driver_first_name: "Ivan".to_string(),
        driver_last_name: "Petrov".to_string(),
        route_number: route.to_string(),
        registered_at: Utc::now(),
    }
}

/// Runs the dispatch scenario against any store implementation.
fn dispatch_scenario<S: Store>(store: &S) {
    let bus = vehicle("7744", "12");
    store.insert_vehicle(&bus).unwrap();

    let record = store.locate(&bus.plate_number).unwrap().unwrap();
    assert!(record.memberships.is_empty());

    store
        .set_status(&bus.plate_number, Status::OnRoute, Utc::now())
        .unwrap();
    let on_route = store.list_by_status(Status::OnRoute).unwrap();
    assert_eq!(on_route.len(), 1);
    assert_eq!(on_route[0].vehicle, bus);

    store
        .set_status(&bus.plate_number, Status::InDepot, Utc::now())
        .unwrap();
    assert!(store.list_by_status(Status::OnRoute).unwrap().is_empty());
    assert_eq!(store.list_by_status(Status::InDepot).unwrap().len(), 1);

    assert_eq!(store.clear_status(&bus.plate_number).unwrap(), 1);
    assert_eq!(store.clear_status(&bus.plate_number).unwrap(), 0);
    assert!(store.audit().unwrap().is_clean());
}

#[test]
fn rocks_store_runs_dispatch_scenario() {
    let dir = TempDir::new().unwrap();
    dispatch_scenario(&open(&dir));
}

#[test]
fn rejected_insert_leaves_first_record() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let first = vehicle("A100", "5");
    store.insert_vehicle(&first).unwrap();
    let err = store.insert_vehicle(&vehicle("a100", "9")).unwrap_err();

    assert!(matches!(err, StoreError::AlreadyExists));
    let stored = store.get_vehicle_by_plate(&first.plate_number).unwrap();
    assert_eq!(stored, Some(first));
}

#[test]
fn readers_never_see_two_memberships() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let bus = vehicle("7744", "12");
    store.insert_vehicle(&bus).unwrap();

    let done = AtomicBool::new(false);
    std::thread::scope(|s| {
        let reader = s.spawn(|| loop {
            let finished = done.load(Ordering::Acquire);
            let record = store.locate(&bus.plate_number).unwrap().unwrap();
            assert!(record.memberships.len() <= 1);
            if finished {
                break;
            }
        });

        for i in 0..200 {
            let status = Status::ALL[i % Status::ALL.len()];
            store
                .set_status(&bus.plate_number, status, Utc::now())
                .unwrap();
        }
        done.store(true, Ordering::Release);

        reader.join().unwrap();
    });

    let record = store.locate(&bus.plate_number).unwrap().unwrap();
    assert_eq!(record.memberships.len(), 1);
    assert_eq!(record.memberships[0].status, Status::ALL[199 % 3]);
}
