//! Milestone storage and lookup.
//!
//! This module defines the [`MilestoneStore`] trait — the read-only,
//! per-road range lookups the resolver needs — and [`MemoryStore`], an
//! in-memory implementation loaded from the ingestion CSV format.
//!
//! # Ingestion Format
//!
//! One record per line, comma separated:
//!
//! ```text
//! road/mileage,road,mileage,latitude,longitude
//! ```
//!
//! The first field is the composite natural key; `mileage` is an integer
//! number of meters; the coordinates are decimal degrees. `(road, mileage)`
//! is treated as unique: when duplicates occur, the first record in file
//! order wins.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::milestone::Milestone;

/// Number of fields in a milestone record.
const RECORD_FIELDS: usize = 5;

/// Read-only lookup interface over a persisted milestone set.
///
/// Both operations are scoped to a single road and return at most one
/// record: a single capped range query in each direction. An empty result
/// (`Ok(None)`) means no milestone satisfies the bound and is distinct
/// from a backend failure, which surfaces as [`StoreError`].
#[async_trait]
pub trait MilestoneStore: Send + Sync {
    /// The milestone with the smallest `mileage >= mileage` on `road`.
    async fn nearest_at_or_after(
        &self,
        road: &str,
        mileage: u32,
    ) -> Result<Option<Milestone>, StoreError>;

    /// The milestone with the largest `mileage <= mileage` on `road`.
    async fn nearest_at_or_before(
        &self,
        road: &str,
        mileage: u32,
    ) -> Result<Option<Milestone>, StoreError>;
}

/// Counts describing a loaded milestone set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of distinct roads.
    pub roads: usize,
    /// Total number of milestones.
    pub milestones: usize,
}

/// Milestone count and mileage extent for a single road.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadExtent {
    /// Number of milestones recorded for the road.
    pub milestones: usize,
    /// Smallest recorded mileage in meters.
    pub min_mileage: u32,
    /// Largest recorded mileage in meters.
    pub max_mileage: u32,
}

/// In-memory milestone store backed by ordered maps.
///
/// Milestones are keyed `road → mileage`, so each directional lookup is a
/// single ordered-map range scan capped at one result.
///
/// # Example
///
/// ```ignore
/// use milepost::MemoryStore;
///
/// let store = MemoryStore::from_csv_path("milestones.csv")?;
/// println!("{} milestones loaded", store.stats().milestones);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    roads: BTreeMap<String, BTreeMap<u32, Milestone>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a milestone.
    ///
    /// Duplicate `(road, mileage)` keys keep the first inserted record.
    pub fn insert(&mut self, milestone: Milestone) {
        self.roads
            .entry(milestone.road.clone())
            .or_default()
            .entry(milestone.mileage)
            .or_insert(milestone);
    }

    /// Load a store from a milestone CSV file.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the file cannot be opened,
    /// [`StoreError::MalformedRecord`] for a record that does not match
    /// the ingestion format.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a store from any reader producing the ingestion CSV format.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut store = Self::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| {
                let line = e.position().map_or(0, csv::Position::line);
                match e.into_kind() {
                    csv::ErrorKind::Io(io_err) => StoreError::Io(io_err),
                    other => StoreError::MalformedRecord {
                        line,
                        reason: format!("{other:?}"),
                    },
                }
            })?;
            let line = record.position().map_or(0, csv::Position::line);

            if record.len() != RECORD_FIELDS {
                return Err(StoreError::MalformedRecord {
                    line,
                    reason: format!("expected {RECORD_FIELDS} fields, got {}", record.len()),
                });
            }

            let road = record[1].to_string();
            let mileage: u32 = record[2]
                .trim()
                .parse()
                .map_err(|_| StoreError::MalformedRecord {
                    line,
                    reason: format!("invalid mileage: {:?}", &record[2]),
                })?;
            let latitude: f32 = record[3]
                .trim()
                .parse()
                .map_err(|_| StoreError::MalformedRecord {
                    line,
                    reason: format!("invalid latitude: {:?}", &record[3]),
                })?;
            let longitude: f32 = record[4]
                .trim()
                .parse()
                .map_err(|_| StoreError::MalformedRecord {
                    line,
                    reason: format!("invalid longitude: {:?}", &record[4]),
                })?;

            store.insert(Milestone {
                road,
                mileage,
                latitude,
                longitude,
            });
        }

        Ok(store)
    }

    /// Counts of roads and milestones loaded.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            roads: self.roads.len(),
            milestones: self.roads.values().map(BTreeMap::len).sum(),
        }
    }

    /// Road names in ascending order.
    pub fn roads(&self) -> impl Iterator<Item = &str> {
        self.roads.keys().map(String::as_str)
    }

    /// Milestone count and mileage extent for one road, if recorded.
    pub fn road_extent(&self, road: &str) -> Option<RoadExtent> {
        let milestones = self.roads.get(road)?;
        let (&min_mileage, _) = milestones.first_key_value()?;
        let (&max_mileage, _) = milestones.last_key_value()?;
        Some(RoadExtent {
            milestones: milestones.len(),
            min_mileage,
            max_mileage,
        })
    }
}

#[async_trait]
impl MilestoneStore for MemoryStore {
    async fn nearest_at_or_after(
        &self,
        road: &str,
        mileage: u32,
    ) -> Result<Option<Milestone>, StoreError> {
        Ok(self
            .roads
            .get(road)
            .and_then(|milestones| milestones.range(mileage..).next())
            .map(|(_, m)| m.clone()))
    }

    async fn nearest_at_or_before(
        &self,
        road: &str,
        mileage: u32,
    ) -> Result<Option<Milestone>, StoreError> {
        Ok(self
            .roads
            .get(road)
            .and_then(|milestones| milestones.range(..=mileage).next_back())
            .map(|(_, m)| m.clone()))
    }
}
