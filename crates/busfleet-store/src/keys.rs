//! Key encoding utilities for `RocksDB`.
//!
//! Vehicle ids are stored as their 16 raw UUID bytes. Because ids are v7
//! UUIDs, iterating a vehicle-keyed column family yields registration order.

use busfleet_core::{IdError, PlateNumber, VehicleId};

/// Encode a vehicle key (just the vehicle ID bytes).
///
/// The same key addresses the vehicle record and its row in each membership
/// column family, which is what makes a vehicle unique within a category.
#[must_use]
pub fn vehicle_key(vehicle_id: &VehicleId) -> Vec<u8> {
    vehicle_id.as_bytes().to_vec()
}

/// Encode a plate index key (the normalized plate bytes).
#[must_use]
pub fn plate_key(plate: &PlateNumber) -> Vec<u8> {
    plate.as_bytes().to_vec()
}

/// Decode a vehicle id from a vehicle key or a plate index value.
///
/// # Errors
///
/// Returns an error if the bytes are not a 16-byte id.
pub fn extract_vehicle_id(bytes: &[u8]) -> Result<VehicleId, IdError> {
    VehicleId::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_key_roundtrip() {
        let vehicle_id = VehicleId::generate();
        let key = vehicle_key(&vehicle_id);
        assert_eq!(key.len(), 16);
        assert_eq!(extract_vehicle_id(&key).unwrap(), vehicle_id);
    }

    #[test]
    fn vehicle_keys_sort_in_registration_order() {
        let older = vehicle_key(&VehicleId::generate());
        let newer = vehicle_key(&VehicleId::generate());
        assert!(older < newer);
    }

    #[test]
    fn plate_key_uses_normalized_form() {
        let a = PlateNumber::parse("ab12").unwrap();
        let b = PlateNumber::parse(" AB12 ").unwrap();
        assert_eq!(plate_key(&a), plate_key(&b));
        assert_eq!(plate_key(&a), b"AB12".to_vec());
    }

    #[test]
    fn truncated_key_is_rejected() {
        assert!(extract_vehicle_id(&[0u8; 15]).is_err());
    }
}
