use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cache::SnapshotDecodeError;
use crate::groundtrack::{CatalogObject, ExcludedObject};
use crate::predict::{Cadence, TimeGrid};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Every object's ground track for one UTC day. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogSnapshot {
    pub format_version: u32,
    pub generated_on: NaiveDate,
    pub generated_at: DateTime<Utc>,
    /// Identifies the sweep that produced this snapshot.
    pub sweep_id: Uuid,
    pub grid: TimeGrid,
    pub objects: BTreeMap<u64, CatalogObject>,
    #[serde(default)]
    pub excluded: Vec<ExcludedObject>,
}

impl CatalogSnapshot {
    pub fn new(
        generated_at: DateTime<Utc>,
        grid: TimeGrid,
        objects: BTreeMap<u64, CatalogObject>,
        excluded: Vec<ExcludedObject>,
    ) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            generated_on: grid.date,
            generated_at,
            sweep_id: Uuid::new_v4(),
            grid,
            objects,
            excluded,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotDecodeError> {
        let snapshot: CatalogSnapshot = serde_json::from_slice(bytes)?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotDecodeError::Version {
                found: snapshot.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Usable as today's snapshot: same date and the grid this process would
    /// generate itself.
    pub fn is_valid_for(&self, today: NaiveDate, cadence: Cadence) -> bool {
        self.generated_on == today && self.grid.matches(today, cadence)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    Computed,
    Persisted,
}

/// The controller's in-memory layer.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: Arc<CatalogSnapshot>,
    pub source: EntrySource,
    pub valid_on: NaiveDate,
    pub loaded_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(snapshot: CatalogSnapshot, source: EntrySource, loaded_at: DateTime<Utc>) -> Self {
        Self {
            valid_on: snapshot.generated_on,
            snapshot: Arc::new(snapshot),
            source,
            loaded_at,
        }
    }

    pub fn is_fresh(&self, today: NaiveDate) -> bool {
        self.valid_on == today
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn empty_snapshot(date: NaiveDate) -> CatalogSnapshot {
        let at = Utc.from_utc_datetime(&date.and_hms_opt(3, 0, 0).unwrap());
        CatalogSnapshot::new(
            at,
            TimeGrid::for_date(date, Cadence::default()),
            BTreeMap::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_snapshot_bytes_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let snapshot = empty_snapshot(date);
        let decoded = CatalogSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
        assert!(decoded.is_valid_for(date, Cadence::default()));
    }

    #[test]
    fn test_validity_depends_on_date_and_cadence() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let snapshot = empty_snapshot(date);
        assert!(!snapshot.is_valid_for(date.succ_opt().unwrap(), Cadence::default()));
        assert!(!snapshot.is_valid_for(date, Cadence::from_minutes(5).unwrap()));
    }

    #[test]
    fn test_rejects_corrupt_and_foreign_versions() {
        assert!(matches!(
            CatalogSnapshot::from_bytes(b"\x80\x04garbage"),
            Err(SnapshotDecodeError::Malformed(_))
        ));

        let mut snapshot = empty_snapshot(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        snapshot.format_version = 99;
        let bytes = serde_json::to_vec(&snapshot).unwrap();
        assert!(matches!(
            CatalogSnapshot::from_bytes(&bytes),
            Err(SnapshotDecodeError::Version { found: 99, .. })
        ));
    }
}
