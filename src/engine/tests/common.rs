use crate::catalog::InMemoryCatalog;
use crate::engine::{Clock, OwnershipEngine};
use crate::errors::{StoreError, StoreResult};
use crate::progression::leveling::{BASE_MAX_HEALTH, HEALTH_PER_LEVEL};
use crate::progression::{experience_to_next_level, ScriptedRandom};
use crate::store::{InMemoryOwnershipStore, OwnershipStore, RecordKey, ScanPage, ScanRequest};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use schema::{CatalogEntity, OwnershipRecord, SpeciesId, Sprites};
use std::sync::{Arc, Mutex};

pub const OWNER: &str = "ash";
pub const RIVAL: &str = "gary";

/// Species known to the fixture catalog
pub const BULBASAUR: SpeciesId = 1;
pub const CHARMANDER: SpeciesId = 4;
pub const SQUIRTLE: SpeciesId = 7;
pub const PIKACHU: SpeciesId = 25;
/// A species id the fixture catalog does not know
pub const MISSINGNO: SpeciesId = 9999;

pub fn epoch() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single() {
        Some(time) => time,
        None => panic!("fixture epoch is not a valid timestamp"),
    }
}

fn entity(id: SpeciesId, order: &str, name: &str, height: &str, weight: &str) -> CatalogEntity {
    CatalogEntity {
        id,
        order: order.to_string(),
        name: name.to_string(),
        height: height.to_string(),
        weight: weight.to_string(),
        sprites: Sprites {
            front_default: format!("https://sprites.test/{}.png", id),
            front_shiny: format!("https://sprites.test/shiny/{}.png", id),
        },
    }
}

pub fn fixture_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        entity(BULBASAUR, "1", "bulbasaur", "7", "69"),
        entity(CHARMANDER, "5", "charmander", "6", "85"),
        entity(SQUIRTLE, "10", "squirtle", "5", "90"),
        entity(PIKACHU, "35", "pikachu", "4", "60"),
    ])
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// A store whose backend is always down
#[derive(Debug, Default)]
pub struct OfflineStore;

fn offline<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl OwnershipStore for OfflineStore {
    async fn get(&self, _key: &RecordKey) -> StoreResult<Option<OwnershipRecord>> {
        offline()
    }
    async fn exists(&self, _key: &RecordKey) -> StoreResult<bool> {
        offline()
    }
    async fn insert(&self, _record: OwnershipRecord) -> StoreResult<()> {
        offline()
    }
    async fn delete(&self, _key: &RecordKey) -> StoreResult<bool> {
        offline()
    }
    async fn save(&self, _record: &OwnershipRecord) -> StoreResult<()> {
        offline()
    }
    async fn save_all(&self, _records: &[OwnershipRecord]) -> StoreResult<()> {
        offline()
    }
    async fn scan(&self, _owner_id: &str, _request: &ScanRequest) -> StoreResult<ScanPage> {
        offline()
    }
    async fn owner_records(&self, _owner_id: &str) -> StoreResult<Vec<OwnershipRecord>> {
        offline()
    }
    async fn count(&self, _owner_id: &str) -> StoreResult<u64> {
        offline()
    }
}

/// An in-memory store that accepts a fixed number of record writes and then
/// fails. A batch that does not fit in what is left is rejected whole.
#[derive(Debug)]
pub struct FlakyStore {
    inner: InMemoryOwnershipStore,
    writes_left: Mutex<usize>,
}

impl FlakyStore {
    pub fn new(records: Vec<OwnershipRecord>, successful_writes: usize) -> Self {
        Self {
            inner: InMemoryOwnershipStore::with_records(records),
            writes_left: Mutex::new(successful_writes),
        }
    }

    fn spend_writes(&self, count: usize) -> StoreResult<()> {
        let mut left = self.writes_left.lock().unwrap();
        if *left < count {
            return Err(StoreError::Unavailable("write timed out".to_string()));
        }
        *left -= count;
        Ok(())
    }
}

#[async_trait]
impl OwnershipStore for FlakyStore {
    async fn get(&self, key: &RecordKey) -> StoreResult<Option<OwnershipRecord>> {
        self.inner.get(key).await
    }
    async fn exists(&self, key: &RecordKey) -> StoreResult<bool> {
        self.inner.exists(key).await
    }
    async fn insert(&self, record: OwnershipRecord) -> StoreResult<()> {
        self.spend_writes(1)?;
        self.inner.insert(record).await
    }
    async fn delete(&self, key: &RecordKey) -> StoreResult<bool> {
        self.spend_writes(1)?;
        self.inner.delete(key).await
    }
    async fn save(&self, record: &OwnershipRecord) -> StoreResult<()> {
        self.spend_writes(1)?;
        self.inner.save(record).await
    }
    async fn save_all(&self, records: &[OwnershipRecord]) -> StoreResult<()> {
        self.spend_writes(records.len())?;
        self.inner.save_all(records).await
    }
    async fn scan(&self, owner_id: &str, request: &ScanRequest) -> StoreResult<ScanPage> {
        self.inner.scan(owner_id, request).await
    }
    async fn owner_records(&self, owner_id: &str) -> StoreResult<Vec<OwnershipRecord>> {
        self.inner.owner_records(owner_id).await
    }
    async fn count(&self, owner_id: &str) -> StoreResult<u64> {
        self.inner.count(owner_id).await
    }
}

/// An engine over `store` with the fixture catalog and clock
pub fn engine_over(store: Arc<dyn OwnershipStore>) -> OwnershipEngine {
    OwnershipEngine::new(store, Arc::new(fixture_catalog()))
        .with_clock(Arc::new(FixedClock::new(epoch())))
}

/// A builder for ownership records with consistent defaults.
///
/// # Example
/// ```ignore
/// let record = TestRecordBuilder::new(PIKACHU)
///     .with_level(10)
///     .with_health(0)
///     .build();
/// ```
pub struct TestRecordBuilder {
    owner_id: String,
    species_id: SpeciesId,
    level: u32,
    experience: u32,
    health: Option<u32>,
    nickname: Option<String>,
    is_favorite: bool,
    battles: (u32, u32),
    caught_at: DateTime<Utc>,
}

impl TestRecordBuilder {
    pub fn new(species_id: SpeciesId) -> Self {
        Self {
            owner_id: OWNER.to_string(),
            species_id,
            level: 1,
            experience: 0,
            health: None,
            nickname: None,
            is_favorite: false,
            battles: (0, 0),
            caught_at: epoch(),
        }
    }

    pub fn owned_by(mut self, owner_id: &str) -> Self {
        self.owner_id = owner_id.to_string();
        self
    }

    /// Sets the level; max health follows the level-up rule
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    /// Sets current health. If not set, health will be max.
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_nickname(mut self, nickname: &str) -> Self {
        self.nickname = Some(nickname.to_string());
        self
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }

    pub fn with_battles(mut self, won: u32, lost: u32) -> Self {
        self.battles = (won, lost);
        self
    }

    pub fn caught_minutes_after_epoch(mut self, minutes: i64) -> Self {
        self.caught_at = epoch() + Duration::minutes(minutes);
        self
    }

    pub fn build(self) -> OwnershipRecord {
        let max_health = BASE_MAX_HEALTH + (self.level - 1) * HEALTH_PER_LEVEL;
        OwnershipRecord {
            owner_id: self.owner_id,
            species_id: self.species_id,
            caught_at: self.caught_at,
            nickname: self.nickname,
            is_favorite: self.is_favorite,
            level: self.level,
            experience: self.experience,
            experience_to_next_level: experience_to_next_level(self.level),
            health: self.health.unwrap_or(max_health),
            max_health,
            battles_won: self.battles.0,
            battles_lost: self.battles.1,
            last_battle_at: None,
        }
    }
}

/// An engine wired to in-memory collaborators the test can inspect and steer
pub struct TestHarness {
    pub engine: OwnershipEngine,
    pub store: Arc<InMemoryOwnershipStore>,
    pub rng: Arc<ScriptedRandom>,
    pub clock: Arc<FixedClock>,
}

impl TestHarness {
    pub fn new(records: Vec<OwnershipRecord>) -> Self {
        Self::with_draws(records, Vec::new())
    }

    /// Harness whose battles replay `draws` in order
    pub fn with_draws(records: Vec<OwnershipRecord>, draws: Vec<u32>) -> Self {
        let store = Arc::new(InMemoryOwnershipStore::with_records(records));
        let rng = Arc::new(ScriptedRandom::new(draws));
        let clock = Arc::new(FixedClock::new(epoch()));
        let engine = OwnershipEngine::new(store.clone(), Arc::new(fixture_catalog()))
            .with_random_source(rng.clone())
            .with_clock(clock.clone());
        Self {
            engine,
            store,
            rng,
            clock,
        }
    }

    pub async fn record(&self, species_id: SpeciesId) -> Option<OwnershipRecord> {
        self.store
            .get(&RecordKey::new(OWNER, species_id))
            .await
            .unwrap()
    }
}

/// An engine whose store is unreachable
pub fn offline_engine() -> OwnershipEngine {
    OwnershipEngine::new(Arc::new(OfflineStore), Arc::new(fixture_catalog()))
}
