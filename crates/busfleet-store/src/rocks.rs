//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//!
//! Mutations are serialized by a single write lock and committed as one
//! `WriteBatch` each, so the resolve-then-write sequence of an operation
//! cannot interleave with another writer. Reads run against a snapshot and
//! never take the lock.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use busfleet_core::{PlateNumber, VehicleId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, SnapshotWithThreadMode, WriteBatch, WriteOptions,
};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf, status_column_family};
use crate::types::{
    AuditReport, DuplicatedMembership, Membership, Status, StatusEntry, Vehicle, VehicleRecord,
};
use crate::Store;

type Db = DBWithThreadMode<MultiThreaded>;
type Snapshot<'a> = SnapshotWithThreadMode<'a, Db>;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<Db>,
    write_lock: Mutex<()>,
    sync_writes: bool,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(&StoreConfig::new(path))
    }

    /// Open a `RocksDB` database as described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened, or does not exist
    /// and `create_if_missing` is off.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db: Db = DBWithThreadMode::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(
            path = %config.path.display(),
            sync_writes = config.sync_writes,
            "Opened RocksDB store"
        );

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
            sync_writes: config.sync_writes,
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode_vehicle_id(bytes: &[u8]) -> Result<VehicleId> {
        keys::extract_vehicle_id(bytes).map_err(|e| StoreError::Corrupted(e.to_string()))
    }

    /// Commit a batch atomically, honouring the configured sync policy.
    fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);

        self.db
            .write_opt(batch, &opts)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn vehicle_by_id(
        &self,
        snapshot: &Snapshot<'_>,
        vehicle_id: &VehicleId,
    ) -> Result<Option<Vehicle>> {
        let cf = self.cf(cf::VEHICLES)?;

        snapshot
            .get_cf(&cf, keys::vehicle_key(vehicle_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn vehicle_by_plate(
        &self,
        snapshot: &Snapshot<'_>,
        plate: &PlateNumber,
    ) -> Result<Option<Vehicle>> {
        let cf_by_plate = self.cf(cf::VEHICLES_BY_PLATE)?;

        let Some(id_bytes) = snapshot
            .get_cf(&cf_by_plate, keys::plate_key(plate))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let vehicle_id = Self::decode_vehicle_id(&id_bytes)?;
        let vehicle = self.vehicle_by_id(snapshot, &vehicle_id)?.ok_or_else(|| {
            StoreError::Corrupted(format!("plate {plate} indexes missing vehicle {vehicle_id}"))
        })?;

        Ok(Some(vehicle))
    }

    /// Membership rows referencing `vehicle_id`, in priority order.
    fn memberships_of(
        &self,
        snapshot: &Snapshot<'_>,
        vehicle_id: &VehicleId,
    ) -> Result<Vec<Membership>> {
        let key = keys::vehicle_key(vehicle_id);
        let mut memberships = Vec::new();

        for status in Status::ALL {
            let cf = self.cf(status_column_family(status))?;
            if let Some(data) = snapshot
                .get_cf(&cf, &key)
                .map_err(|e| StoreError::Database(e.to_string()))?
            {
                memberships.push(Self::deserialize(&data)?);
            }
        }

        Ok(memberships)
    }

    /// Stage the removal of `vehicle_id` from every status family.
    fn evict(&self, batch: &mut WriteBatch, vehicle_id: &VehicleId) -> Result<()> {
        let key = keys::vehicle_key(vehicle_id);
        for status in Status::ALL {
            let cf = self.cf(status_column_family(status))?;
            batch.delete_cf(&cf, &key);
        }
        Ok(())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Vehicle Operations
    // =========================================================================

    fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        let _guard = self.write_lock.lock();

        let cf_vehicles = self.cf(cf::VEHICLES)?;
        let cf_by_plate = self.cf(cf::VEHICLES_BY_PLATE)?;

        let plate_key = keys::plate_key(&vehicle.plate_number);
        let taken = self
            .db
            .get_cf(&cf_by_plate, &plate_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if taken {
            return Err(StoreError::AlreadyExists);
        }

        let vehicle_key = keys::vehicle_key(&vehicle.vehicle_id);
        let value = Self::serialize(vehicle)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_vehicles, &vehicle_key, &value);
        batch.put_cf(&cf_by_plate, &plate_key, &vehicle_key);
        self.commit(batch)?;

        tracing::debug!(
            vehicle_id = %vehicle.vehicle_id,
            plate = %vehicle.plate_number,
            "Inserted vehicle"
        );

        Ok(())
    }

    fn get_vehicle_by_plate(&self, plate: &PlateNumber) -> Result<Option<Vehicle>> {
        let snapshot = self.db.snapshot();
        self.vehicle_by_plate(&snapshot, plate)
    }

    fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let cf = self.cf(cf::VEHICLES)?;

        let mut vehicles = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let vehicle: Vehicle = Self::deserialize(&value)?;
            vehicles.push(vehicle);
        }

        Ok(vehicles)
    }

    fn delete_vehicle(&self, plate: &PlateNumber) -> Result<Vehicle> {
        let _guard = self.write_lock.lock();
        let snapshot = self.db.snapshot();

        let vehicle = self
            .vehicle_by_plate(&snapshot, plate)?
            .ok_or(StoreError::NotFound)?;

        let cf_vehicles = self.cf(cf::VEHICLES)?;
        let cf_by_plate = self.cf(cf::VEHICLES_BY_PLATE)?;

        let mut batch = WriteBatch::default();
        self.evict(&mut batch, &vehicle.vehicle_id)?;
        batch.delete_cf(&cf_by_plate, keys::plate_key(plate));
        batch.delete_cf(&cf_vehicles, keys::vehicle_key(&vehicle.vehicle_id));
        self.commit(batch)?;

        Ok(vehicle)
    }

    // =========================================================================
    // Status Operations
    // =========================================================================

    fn locate(&self, plate: &PlateNumber) -> Result<Option<VehicleRecord>> {
        let snapshot = self.db.snapshot();

        let Some(vehicle) = self.vehicle_by_plate(&snapshot, plate)? else {
            return Ok(None);
        };
        let memberships = self.memberships_of(&snapshot, &vehicle.vehicle_id)?;

        Ok(Some(VehicleRecord {
            vehicle,
            memberships,
        }))
    }

    fn list_by_status(&self, status: Status) -> Result<Vec<StatusEntry>> {
        let snapshot = self.db.snapshot();
        let cf = self.cf(status_column_family(status))?;

        let mut entries = Vec::new();
        let iter = snapshot.iterator_cf(&cf, IteratorMode::Start);

        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let vehicle_id = Self::decode_vehicle_id(&key)?;

            let Some(vehicle) = self.vehicle_by_id(&snapshot, &vehicle_id)? else {
                tracing::warn!(
                    vehicle_id = %vehicle_id,
                    status = %status,
                    "Skipping membership of missing vehicle"
                );
                continue;
            };

            entries.push(StatusEntry {
                vehicle,
                membership: Self::deserialize(&value)?,
            });
        }

        Ok(entries)
    }

    fn set_status(
        &self,
        plate: &PlateNumber,
        status: Status,
        event_time: DateTime<Utc>,
    ) -> Result<Membership> {
        let _guard = self.write_lock.lock();
        let snapshot = self.db.snapshot();

        let vehicle = self
            .vehicle_by_plate(&snapshot, plate)?
            .ok_or(StoreError::NotFound)?;

        let membership = Membership::new(vehicle.vehicle_id, status, event_time);
        let cf_target = self.cf(status_column_family(status))?;

        // Evict from all three families, the target included, so the
        // category always holds exactly one fresh row for this vehicle.
        let mut batch = WriteBatch::default();
        self.evict(&mut batch, &vehicle.vehicle_id)?;
        batch.put_cf(
            &cf_target,
            keys::vehicle_key(&vehicle.vehicle_id),
            Self::serialize(&membership)?,
        );
        self.commit(batch)?;

        Ok(membership)
    }

    fn clear_status(&self, plate: &PlateNumber) -> Result<usize> {
        let _guard = self.write_lock.lock();
        let snapshot = self.db.snapshot();

        let vehicle = self
            .vehicle_by_plate(&snapshot, plate)?
            .ok_or(StoreError::NotFound)?;

        let removed = self.memberships_of(&snapshot, &vehicle.vehicle_id)?.len();
        if removed > 0 {
            let mut batch = WriteBatch::default();
            self.evict(&mut batch, &vehicle.vehicle_id)?;
            self.commit(batch)?;
        }

        Ok(removed)
    }

    fn audit(&self) -> Result<AuditReport> {
        let snapshot = self.db.snapshot();
        let cf_vehicles = self.cf(cf::VEHICLES)?;

        let mut seen: BTreeMap<VehicleId, Vec<Status>> = BTreeMap::new();
        let mut report = AuditReport::default();

        for status in Status::ALL {
            let cf = self.cf(status_column_family(status))?;

            for item in snapshot.iterator_cf(&cf, IteratorMode::Start) {
                let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
                let vehicle_id = Self::decode_vehicle_id(&key)?;

                let exists = snapshot
                    .get_cf(&cf_vehicles, &key)
                    .map_err(|e| StoreError::Database(e.to_string()))?
                    .is_some();
                if !exists {
                    report.orphaned.push(Self::deserialize(&value)?);
                }

                seen.entry(vehicle_id).or_default().push(status);
            }
        }

        report.duplicated = seen
            .into_iter()
            .filter(|(_, statuses)| statuses.len() > 1)
            .map(|(vehicle_id, statuses)| DuplicatedMembership {
                vehicle_id,
                statuses,
            })
            .collect();

        Ok(report)
    }
}
