//! Per-record serialization.
//!
//! Every read-modify-write on a record holds that record's lock, so two
//! concurrent operations on the same `(owner_id, species_id)` pair run one after
//! the other while operations on different pairs never wait on each other.

use crate::store::RecordKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = HashMap<RecordKey, Arc<AsyncMutex<()>>>;

#[derive(Debug, Default)]
pub struct RecordLocks {
    table: Mutex<LockTable>,
}

/// Held while a record is being read and rewritten. Dropping it releases the
/// record and forgets the lock entry once nobody else is waiting on it.
#[derive(Debug)]
pub struct RecordGuard<'a> {
    locks: &'a RecordLocks,
    key: RecordKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, LockTable> {
        match self.table.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub async fn lock(&self, key: &RecordKey) -> RecordGuard<'_> {
        let entry = {
            let mut table = self.table();
            Arc::clone(table.entry(key.clone()).or_default())
        };
        let guard = entry.lock_owned().await;
        RecordGuard {
            locks: self,
            key: key.clone(),
            guard: Some(guard),
        }
    }

    /// Lock several records. Keys are taken in sorted order so two bulk
    /// operations over overlapping keys cannot deadlock.
    pub async fn lock_all(&self, keys: &[RecordKey]) -> Vec<RecordGuard<'_>> {
        let mut sorted: Vec<&RecordKey> = keys.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for key in sorted {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Number of records with a live lock entry
    pub fn tracked(&self) -> usize {
        self.table().len()
    }
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut table = self.locks.table();
        let idle = table
            .get(&self.key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if idle {
            table.remove(&self.key);
        }
    }
}
