//! The Progression Engine.
//!
//! `OwnershipEngine` applies catch, release, metadata, training, battle, heal
//! and level-up transitions to ownership records. Each transition loads the
//! record under its per-record lock, validates, mutates a local copy and only
//! then writes it back, so a failed call never leaves a partial update behind.

pub mod clock;
pub mod locks;
pub mod meta;

#[cfg(test)]
mod tests;

pub use clock::{Clock, SystemClock};
pub use meta::{MetaUpdate, MAX_NICKNAME_LENGTH};

use crate::catalog::CatalogStore;
use crate::errors::{OwnershipError, OwnershipResult, StoreError, ValidationError};
use crate::progression::battle::BattleRequest;
use crate::progression::leveling::{add_levels, direct_level_up, heal_fully, new_caught_record};
use crate::progression::{
    apply_training, BattlePolicy, RandomSource, ThreadRandom, TrainingPlan, MAX_LEVEL,
};
use crate::query::{self, ListQuery, DEFAULT_PAGE_SIZE};
use crate::stats::OwnershipStats;
use crate::store::{OwnershipStore, RecordKey};
use crate::views::{
    BattleResultView, HealResultView, OwnedPokemonView, PagedResult, TrainingResultView,
};
use locks::RecordLocks;
use schema::{OwnershipRecord, SpeciesId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Largest `levels_to_add` a bulk level-up accepts
pub const MAX_BULK_LEVELS: u32 = MAX_LEVEL - 1;

/// Translate a write failure into the engine's taxonomy
fn write_error(error: StoreError) -> OwnershipError {
    match error {
        StoreError::DuplicateKey {
            owner_id,
            species_id,
        } => OwnershipError::AlreadyOwned {
            owner_id,
            species_id,
        },
        StoreError::MissingRecord {
            owner_id,
            species_id,
        } => OwnershipError::NotOwned {
            owner_id,
            species_id,
        },
        other => {
            warn!(error = %other, "ownership store write failed");
            OwnershipError::StoreUnavailable(other)
        }
    }
}

pub struct OwnershipEngine {
    store: Arc<dyn OwnershipStore>,
    catalog: Arc<dyn CatalogStore>,
    rng: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    battle_policy: BattlePolicy,
    default_page_size: u32,
    locks: RecordLocks,
}

impl OwnershipEngine {
    /// Engine with thread-local randomness, the system clock and the default battle policy
    pub fn new(store: Arc<dyn OwnershipStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            catalog,
            rng: Arc::new(ThreadRandom),
            clock: Arc::new(SystemClock),
            battle_policy: BattlePolicy::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            locks: RecordLocks::new(),
        }
    }

    pub fn with_random_source(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_battle_policy(mut self, battle_policy: BattlePolicy) -> Self {
        self.battle_policy = battle_policy;
        self
    }

    pub fn with_default_page_size(mut self, default_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self
    }

    /// Load a record that must exist. Callers hold the record's lock.
    async fn owned_record(
        &self,
        owner_id: &str,
        species_id: SpeciesId,
    ) -> OwnershipResult<OwnershipRecord> {
        self.store
            .get(&RecordKey::new(owner_id, species_id))
            .await?
            .ok_or_else(|| OwnershipError::not_owned(owner_id, species_id))
    }

    /// Join a record with its catalog entity
    pub async fn describe(&self, record: OwnershipRecord) -> OwnershipResult<OwnedPokemonView> {
        let pokemon = self.catalog.get_by_id(record.species_id).await?;
        Ok(OwnedPokemonView::new(record, pokemon))
    }

    // --- OWNERSHIP ---

    pub async fn catch(
        &self,
        owner_id: &str,
        species_id: SpeciesId,
        nickname: Option<String>,
    ) -> OwnershipResult<OwnershipRecord> {
        meta::validate_nickname(nickname.as_deref())?;

        let key = RecordKey::new(owner_id, species_id);
        let _guard = self.locks.lock(&key).await;

        if self.store.exists(&key).await? {
            return Err(OwnershipError::AlreadyOwned {
                owner_id: owner_id.to_string(),
                species_id,
            });
        }
        let entity = self
            .catalog
            .get_by_id(species_id)
            .await?
            .ok_or(OwnershipError::UnknownSpecies(species_id))?;

        let record = new_caught_record(owner_id, species_id, nickname, self.clock.now());
        self.store.insert(record.clone()).await.map_err(write_error)?;

        info!(owner_id, species_id, species = %entity, "caught pokemon");
        Ok(record)
    }

    /// Delete the record; `false` if there was none
    pub async fn release(&self, owner_id: &str, species_id: SpeciesId) -> OwnershipResult<bool> {
        let key = RecordKey::new(owner_id, species_id);
        let _guard = self.locks.lock(&key).await;

        let removed = self.store.delete(&key).await?;
        if removed {
            info!(owner_id, species_id, "released pokemon");
        } else {
            debug!(owner_id, species_id, "release of a pokemon that is not owned");
        }
        Ok(removed)
    }

    pub async fn update_meta(
        &self,
        owner_id: &str,
        species_id: SpeciesId,
        update: &MetaUpdate,
    ) -> OwnershipResult<OwnershipRecord> {
        update.validate()?;

        let _guard = self.locks.lock(&RecordKey::new(owner_id, species_id)).await;
        let mut record = self.owned_record(owner_id, species_id).await?;
        if update.is_empty() {
            return Ok(record);
        }

        update.apply(&mut record);
        self.store.save(&record).await.map_err(write_error)?;

        debug!(owner_id, species_id, ?update, "updated pokemon metadata");
        Ok(record)
    }

    pub async fn has_pokemon(&self, owner_id: &str, species_id: SpeciesId) -> OwnershipResult<bool> {
        Ok(self
            .store
            .exists(&RecordKey::new(owner_id, species_id))
            .await?)
    }

    pub async fn count(&self, owner_id: &str) -> OwnershipResult<u64> {
        Ok(self.store.count(owner_id).await?)
    }

    // --- PROGRESSION ---

    pub async fn train(
        &self,
        owner_id: &str,
        species_id: SpeciesId,
        plan: TrainingPlan,
    ) -> OwnershipResult<TrainingResultView> {
        let _guard = self.locks.lock(&RecordKey::new(owner_id, species_id)).await;
        let mut record = self.owned_record(owner_id, species_id).await?;

        let outcome = apply_training(&mut record, plan);
        self.store.save(&record).await.map_err(write_error)?;

        info!(
            owner_id,
            species_id,
            kind = %plan.kind,
            amount = plan.amount,
            level = record.level,
            leveled_up = outcome.leveled_up,
            "trained pokemon"
        );
        Ok(outcome.into())
    }

    /// Fight an opaque opponent. The opponent id and battle type are recorded
    /// in the log only.
    pub async fn battle(
        &self,
        owner_id: &str,
        species_id: SpeciesId,
        request: &BattleRequest,
    ) -> OwnershipResult<BattleResultView> {
        let _guard = self.locks.lock(&RecordKey::new(owner_id, species_id)).await;
        let mut record = self.owned_record(owner_id, species_id).await?;

        if record.is_fainted() {
            return Err(OwnershipError::Incapacitated { species_id });
        }

        let report = self
            .battle_policy
            .resolve(&mut record, self.rng.as_ref(), self.clock.now());
        self.store.save(&record).await.map_err(write_error)?;

        info!(
            owner_id,
            species_id,
            opponent = request.opponent_species_id,
            battle_type = %request.battle_type,
            outcome = %report.outcome,
            health_lost = report.health_lost,
            experience_gained = report.experience_gained,
            "battle resolved"
        );
        Ok(BattleResultView::new(report, &record))
    }

    pub async fn heal(&self, owner_id: &str, species_id: SpeciesId) -> OwnershipResult<HealResultView> {
        let _guard = self.locks.lock(&RecordKey::new(owner_id, species_id)).await;
        let mut record = self.owned_record(owner_id, species_id).await?;

        let previous_health = heal_fully(&mut record);
        self.store.save(&record).await.map_err(write_error)?;

        debug!(owner_id, species_id, previous_health, "healed pokemon");
        Ok(HealResultView {
            previous_health,
            new_health: record.health,
            fully_healed: true,
        })
    }

    pub async fn level_up(
        &self,
        owner_id: &str,
        species_id: SpeciesId,
    ) -> OwnershipResult<OwnershipRecord> {
        let _guard = self.locks.lock(&RecordKey::new(owner_id, species_id)).await;
        let mut record = self.owned_record(owner_id, species_id).await?;

        if !direct_level_up(&mut record) {
            return Err(OwnershipError::MaxLevelReached {
                species_id,
                level: record.level,
            });
        }
        self.store.save(&record).await.map_err(write_error)?;

        info!(owner_id, species_id, level = record.level, "leveled up pokemon");
        Ok(record)
    }

    // --- BULK ---

    /// Lock every record the owner holds and apply `change` to each one still
    /// present. The modified records are written in a single batch, so a
    /// failed write leaves the collection untouched. Returns how many records
    /// `change` reported as modified.
    async fn for_each_owned<F>(&self, owner_id: &str, mut change: F) -> OwnershipResult<u64>
    where
        F: FnMut(&mut OwnershipRecord) -> bool,
    {
        let keys: Vec<RecordKey> = self
            .store
            .owner_records(owner_id)
            .await?
            .iter()
            .map(RecordKey::of)
            .collect();
        let _guards = self.locks.lock_all(&keys).await;

        let mut modified = Vec::with_capacity(keys.len());
        for key in &keys {
            // Released between the snapshot and taking the locks
            let Some(mut record) = self.store.get(key).await? else {
                continue;
            };
            if change(&mut record) {
                modified.push(record);
            }
        }

        if !modified.is_empty() {
            self.store.save_all(&modified).await.map_err(write_error)?;
        }
        Ok(modified.len() as u64)
    }

    /// Fully heal every damaged record. `true` if any record changed.
    pub async fn bulk_heal(&self, owner_id: &str) -> OwnershipResult<bool> {
        let healed = self
            .for_each_owned(owner_id, |record| {
                if record.health < record.max_health {
                    heal_fully(record);
                    true
                } else {
                    false
                }
            })
            .await?;

        info!(owner_id, healed, "bulk heal");
        Ok(healed > 0)
    }

    /// Apply up to `levels_to_add` direct level-ups to every record, stopping
    /// each at the cap. Returns the number of records that gained a level.
    pub async fn bulk_level_up(&self, owner_id: &str, levels_to_add: u32) -> OwnershipResult<u64> {
        if !(1..=MAX_BULK_LEVELS).contains(&levels_to_add) {
            return Err(ValidationError::LevelsToAddOutOfRange {
                levels: levels_to_add,
                max: MAX_BULK_LEVELS,
            }
            .into());
        }

        let changed = self
            .for_each_owned(owner_id, |record| add_levels(record, levels_to_add) > 0)
            .await?;

        info!(owner_id, levels_to_add, changed, "bulk level up");
        Ok(changed)
    }

    // --- READS ---

    pub async fn list(
        &self,
        owner_id: &str,
        query: &ListQuery,
    ) -> OwnershipResult<PagedResult<OwnedPokemonView>> {
        query::list(
            self.store.as_ref(),
            self.catalog.as_ref(),
            owner_id,
            query,
            self.default_page_size,
        )
        .await
    }

    pub async fn stats(&self, owner_id: &str) -> OwnershipResult<OwnershipStats> {
        let records = self.store.owner_records(owner_id).await?;
        Ok(OwnershipStats::from_records(&records))
    }
}
