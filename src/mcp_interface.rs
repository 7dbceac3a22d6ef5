//! Host-facing glue for the MCP server.
//!
//! Each function here checks that the caller acts for itself, runs one engine
//! operation and renders the result as JSON text. Errors keep their engine
//! type; `error_payload` turns them into the JSON body the server returns.

use crate::catalog::InMemoryCatalog;
use crate::config::EngineConfig;
use crate::engine::{MetaUpdate, OwnershipEngine};
use crate::errors::{OwnershipError, OwnershipResult, StoreResult};
use crate::progression::battle::BattleRequest;
use crate::progression::TrainingPlan;
use crate::query::ListQuery;
use crate::store::InMemoryOwnershipStore;
use schema::SpeciesId;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The identity established by the host before any tool runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub authenticated_owner: String,
}

impl Caller {
    pub fn new(authenticated_owner: impl Into<String>) -> Self {
        Self {
            authenticated_owner: authenticated_owner.into(),
        }
    }
}

/// Reject requests made on behalf of anyone but the caller
pub fn authorize(caller: &Caller, owner_id: &str) -> OwnershipResult<()> {
    if caller.authenticated_owner != owner_id {
        tracing::warn!(
            caller = %caller.authenticated_owner,
            owner_id,
            "rejected request for another owner"
        );
        return Err(OwnershipError::Forbidden {
            caller: caller.authenticated_owner.clone(),
            owner_id: owner_id.to_string(),
        });
    }
    Ok(())
}

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| json!({ "error": format!("Failed to render result: {}", e) }).to_string())
}

/// JSON body describing an error, e.g. `{"status": 404, "kind": "not_found", ...}`
pub fn error_payload(error: &OwnershipError) -> String {
    render(&json!({
        "status": error.status_code(),
        "kind": error.kind().to_string(),
        "message": error.to_string(),
    }))
}

/// The engine plus the persistence the host owns
pub struct OwnershipHost {
    engine: OwnershipEngine,
    store: Arc<InMemoryOwnershipStore>,
    snapshot_path: Option<PathBuf>,
    /// Held while a snapshot is taken and written, so writes land in order
    snapshot_lock: Mutex<()>,
}

impl std::fmt::Debug for OwnershipHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnershipHost")
            .field("snapshot_path", &self.snapshot_path)
            .finish_non_exhaustive()
    }
}

impl OwnershipHost {
    pub fn new(engine: OwnershipEngine, store: Arc<InMemoryOwnershipStore>) -> Self {
        Self {
            engine,
            store,
            snapshot_path: None,
            snapshot_lock: Mutex::new(()),
        }
    }

    /// Load the catalog and, when configured, the last ownership snapshot
    pub async fn open(config: &EngineConfig) -> StoreResult<Self> {
        let catalog = InMemoryCatalog::load(&config.catalog_path)?;
        let store = match &config.snapshot_path {
            Some(path) => InMemoryOwnershipStore::load_from(path).await?,
            None => InMemoryOwnershipStore::new(),
        };
        let store = Arc::new(store);

        let engine = OwnershipEngine::new(store.clone(), Arc::new(catalog))
            .with_battle_policy(config.battle)
            .with_default_page_size(config.default_page_size);

        Ok(Self {
            engine,
            store,
            snapshot_path: config.snapshot_path.clone(),
            snapshot_lock: Mutex::new(()),
        })
    }

    pub fn engine(&self) -> &OwnershipEngine {
        &self.engine
    }

    /// Persist the store after a mutation. A failed write is logged, not
    /// reported, since the mutation itself already succeeded.
    async fn persist(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        let _writing = self.snapshot_lock.lock().await;
        if let Err(e) = self.store.save_to(path).await {
            tracing::error!(path = %path.display(), error = %e, "failed to save ownership snapshot");
        }
    }

    // --- OWNERSHIP ---

    pub async fn catch(
        &self,
        caller: &Caller,
        owner_id: &str,
        species_id: SpeciesId,
        nickname: Option<String>,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let record = self.engine.catch(owner_id, species_id, nickname).await?;
        self.persist().await;
        Ok(render(&self.engine.describe(record).await?))
    }

    pub async fn release(
        &self,
        caller: &Caller,
        owner_id: &str,
        species_id: SpeciesId,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let released = self.engine.release(owner_id, species_id).await?;
        if released {
            self.persist().await;
        }
        Ok(render(&json!({ "released": released })))
    }

    pub async fn update(
        &self,
        caller: &Caller,
        owner_id: &str,
        species_id: SpeciesId,
        update: &MetaUpdate,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let record = self.engine.update_meta(owner_id, species_id, update).await?;
        if !update.is_empty() {
            self.persist().await;
        }
        Ok(render(&self.engine.describe(record).await?))
    }

    pub async fn has(
        &self,
        caller: &Caller,
        owner_id: &str,
        species_id: SpeciesId,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let owned = self.engine.has_pokemon(owner_id, species_id).await?;
        Ok(render(&json!({ "owned": owned })))
    }

    pub async fn count(&self, caller: &Caller, owner_id: &str) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let count = self.engine.count(owner_id).await?;
        Ok(render(&json!({ "count": count })))
    }

    // --- PROGRESSION ---

    pub async fn train(
        &self,
        caller: &Caller,
        owner_id: &str,
        species_id: SpeciesId,
        kind: &str,
        amount: u32,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let plan = TrainingPlan::parse(kind, amount)?;
        let result = self.engine.train(owner_id, species_id, plan).await?;
        self.persist().await;
        Ok(render(&result))
    }

    pub async fn battle(
        &self,
        caller: &Caller,
        owner_id: &str,
        species_id: SpeciesId,
        request: &BattleRequest,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let result = self.engine.battle(owner_id, species_id, request).await?;
        self.persist().await;
        Ok(render(&result))
    }

    pub async fn heal(
        &self,
        caller: &Caller,
        owner_id: &str,
        species_id: SpeciesId,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let result = self.engine.heal(owner_id, species_id).await?;
        self.persist().await;
        Ok(render(&result))
    }

    pub async fn level_up(
        &self,
        caller: &Caller,
        owner_id: &str,
        species_id: SpeciesId,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let record = self.engine.level_up(owner_id, species_id).await?;
        self.persist().await;
        Ok(render(&self.engine.describe(record).await?))
    }

    pub async fn bulk_heal(&self, caller: &Caller, owner_id: &str) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let healed = self.engine.bulk_heal(owner_id).await?;
        if healed {
            self.persist().await;
        }
        Ok(render(&json!({ "healed": healed })))
    }

    pub async fn bulk_level_up(
        &self,
        caller: &Caller,
        owner_id: &str,
        levels_to_add: u32,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        let updated = self.engine.bulk_level_up(owner_id, levels_to_add).await?;
        if updated > 0 {
            self.persist().await;
        }
        Ok(render(&json!({ "updated": updated })))
    }

    // --- READS ---

    pub async fn list(
        &self,
        caller: &Caller,
        owner_id: &str,
        query: &ListQuery,
    ) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        Ok(render(&self.engine.list(owner_id, query).await?))
    }

    pub async fn stats(&self, caller: &Caller, owner_id: &str) -> OwnershipResult<String> {
        authorize(caller, owner_id)?;
        Ok(render(&self.engine.stats(owner_id).await?))
    }
}
