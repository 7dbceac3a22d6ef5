use super::{OwnershipStore, RecordKey, ScanPage, ScanRequest};
use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use schema::{OwnershipRecord, SpeciesId};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;
use tokio::sync::RwLock;

/// Ownership store kept in process memory.
///
/// Records can be written out as a postcard snapshot and restored later,
/// which is how the MCP host persists state between runs.
#[derive(Debug, Default)]
pub struct InMemoryOwnershipStore {
    records: RwLock<BTreeMap<RecordKey, OwnershipRecord>>,
}

fn owner_range(owner_id: &str) -> RangeInclusive<RecordKey> {
    RecordKey::new(owner_id, SpeciesId::MIN)..=RecordKey::new(owner_id, SpeciesId::MAX)
}

impl InMemoryOwnershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = OwnershipRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (RecordKey::of(&record), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Encode every stored record
    pub async fn snapshot(&self) -> StoreResult<Vec<u8>> {
        let records = self.records.read().await;
        let all: Vec<&OwnershipRecord> = records.values().collect();
        postcard::to_allocvec(&all).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    /// Replace the store's contents with a snapshot produced by [`Self::snapshot`]
    pub async fn restore(&self, bytes: &[u8]) -> StoreResult<usize> {
        let decoded: Vec<OwnershipRecord> =
            postcard::from_bytes(bytes).map_err(|e| StoreError::Snapshot(e.to_string()))?;
        let count = decoded.len();

        let mut records = self.records.write().await;
        *records = decoded
            .into_iter()
            .map(|record| (RecordKey::of(&record), record))
            .collect();
        Ok(count)
    }

    /// Write a snapshot to disk
    pub async fn save_to(&self, path: &Path) -> StoreResult<()> {
        let bytes = self.snapshot().await?;
        // Readers see either the previous snapshot or the new one, never a partial file
        let staging = path.with_extension("tmp");
        tokio::fs::write(&staging, &bytes).await.map_err(|e| {
            StoreError::Snapshot(format!("Failed to write {}: {}", staging.display(), e))
        })?;
        tokio::fs::rename(&staging, path).await.map_err(|e| {
            StoreError::Snapshot(format!("Failed to replace {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved ownership snapshot");
        Ok(())
    }

    /// Load a snapshot from disk. A missing file yields an empty store.
    pub async fn load_from(path: &Path) -> StoreResult<Self> {
        let store = Self::new();
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let count = store.restore(&bytes).await?;
                tracing::info!(path = %path.display(), records = count, "restored ownership snapshot");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no ownership snapshot yet, starting empty");
            }
            Err(e) => {
                return Err(StoreError::Snapshot(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        }
        Ok(store)
    }
}

#[async_trait]
impl OwnershipStore for InMemoryOwnershipStore {
    async fn get(&self, key: &RecordKey) -> StoreResult<Option<OwnershipRecord>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn exists(&self, key: &RecordKey) -> StoreResult<bool> {
        Ok(self.records.read().await.contains_key(key))
    }

    async fn insert(&self, record: OwnershipRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let key = RecordKey::of(&record);
        if records.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                owner_id: key.owner_id,
                species_id: key.species_id,
            });
        }
        records.insert(key, record);
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> StoreResult<bool> {
        Ok(self.records.write().await.remove(key).is_some())
    }

    async fn save(&self, record: &OwnershipRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&RecordKey::of(record)) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRecord {
                owner_id: record.owner_id.clone(),
                species_id: record.species_id,
            }),
        }
    }

    async fn save_all(&self, batch: &[OwnershipRecord]) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if let Some(missing) = batch
            .iter()
            .find(|record| !records.contains_key(&RecordKey::of(record)))
        {
            return Err(StoreError::MissingRecord {
                owner_id: missing.owner_id.clone(),
                species_id: missing.species_id,
            });
        }
        for record in batch {
            records.insert(RecordKey::of(record), record.clone());
        }
        Ok(())
    }

    async fn scan(&self, owner_id: &str, request: &ScanRequest) -> StoreResult<ScanPage> {
        let records = self.records.read().await;
        let mut matching: Vec<&OwnershipRecord> = records
            .range(owner_range(owner_id))
            .map(|(_, record)| record)
            .filter(|record| request.filter.matches(record))
            .collect();
        let total_count = matching.len() as u64;

        matching.sort_by(|a, b| request.sort.compare(a, b));

        Ok(ScanPage {
            records: request.page.slice(matching.into_iter().cloned()),
            total_count,
        })
    }

    async fn owner_records(&self, owner_id: &str) -> StoreResult<Vec<OwnershipRecord>> {
        Ok(self
            .records
            .read()
            .await
            .range(owner_range(owner_id))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn count(&self, owner_id: &str) -> StoreResult<u64> {
        Ok(self.records.read().await.range(owner_range(owner_id)).count() as u64)
    }
}
