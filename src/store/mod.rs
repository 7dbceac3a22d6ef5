//! Persistence contract for ownership records.
//!
//! The engine owns every write to a record; a store only has to honour the
//! `(owner_id, species_id)` uniqueness constraint and keep each record read
//! internally consistent.

pub mod memory;

pub use memory::InMemoryOwnershipStore;

use crate::errors::StoreResult;
use async_trait::async_trait;
use schema::{OwnershipRecord, SpeciesId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Primary key of an ownership record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub owner_id: String,
    pub species_id: SpeciesId,
}

impl RecordKey {
    pub fn new(owner_id: impl Into<String>, species_id: SpeciesId) -> Self {
        Self {
            owner_id: owner_id.into(),
            species_id,
        }
    }

    pub fn of(record: &OwnershipRecord) -> Self {
        Self::new(record.owner_id.clone(), record.species_id)
    }
}

/// Conjunctive filter over one owner's records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanFilter {
    pub favorite_only: bool,
    pub min_level: Option<u32>,
    pub max_level: Option<u32>,
}

impl ScanFilter {
    pub fn matches(&self, record: &OwnershipRecord) -> bool {
        if self.favorite_only && !record.is_favorite {
            return false;
        }
        if self.min_level.is_some_and(|min| record.level < min) {
            return false;
        }
        if self.max_level.is_some_and(|max| record.level > max) {
            return false;
        }
        true
    }
}

/// Record fields a store can sort on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CaughtAt,
    Level,
    Experience,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Orient an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl RecordSort {
    /// Compare two records; ties fall back to ascending species id so pages are stable
    pub fn compare(&self, a: &OwnershipRecord, b: &OwnershipRecord) -> Ordering {
        let primary = match self.field {
            SortField::CaughtAt => a.caught_at.cmp(&b.caught_at),
            SortField::Level => a.level.cmp(&b.level),
            SortField::Experience => a.experience.cmp(&b.experience),
        };
        self.order
            .apply(primary)
            .then_with(|| a.species_id.cmp(&b.species_id))
    }
}

/// One-based, offset-style page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.page_size as usize
    }

    /// Cut this page out of an already ordered sequence
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size as usize)
            .collect()
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        total_count.div_ceil(self.page_size as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRequest {
    pub filter: ScanFilter,
    pub sort: RecordSort,
    pub page: PageRequest,
}

/// A page of records plus the number of records matching the filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub records: Vec<OwnershipRecord>,
    pub total_count: u64,
}

/// Keyed storage of ownership records
#[async_trait]
pub trait OwnershipStore: Send + Sync {
    async fn get(&self, key: &RecordKey) -> StoreResult<Option<OwnershipRecord>>;

    async fn exists(&self, key: &RecordKey) -> StoreResult<bool>;

    /// Insert a new record, failing with `StoreError::DuplicateKey` if the pair exists
    async fn insert(&self, record: OwnershipRecord) -> StoreResult<()>;

    /// Remove a record; `false` if there was nothing to remove
    async fn delete(&self, key: &RecordKey) -> StoreResult<bool>;

    /// Overwrite an existing record, failing with `StoreError::MissingRecord` if absent
    async fn save(&self, record: &OwnershipRecord) -> StoreResult<()>;

    /// Overwrite several existing records as one write. Either every record
    /// is stored or, on error, none of them is.
    async fn save_all(&self, records: &[OwnershipRecord]) -> StoreResult<()>;

    /// Filter, sort and paginate one owner's records
    async fn scan(&self, owner_id: &str, request: &ScanRequest) -> StoreResult<ScanPage>;

    /// Every record held by one owner, in species id order
    async fn owner_records(&self, owner_id: &str) -> StoreResult<Vec<OwnershipRecord>>;

    async fn count(&self, owner_id: &str) -> StoreResult<u64>;
}
