//! Pokemon Ownership MCP Server
//!
//! A Model Context Protocol server using the official Rust SDK (rmcp) that
//! exposes the ownership and progression engine over stdio. The authenticated
//! owner comes from `POKEMON_OWNERSHIP_OWNER`; every tool acts for that owner
//! unless the request names another one, which is refused.

use std::borrow::Cow;
use std::sync::Arc;

use pokemon_ownership::config::{owner_from_env, EngineConfig, OWNER_ENV};
use pokemon_ownership::engine::meta::deserialize_some;
use pokemon_ownership::engine::MetaUpdate;
use pokemon_ownership::mcp_interface::{error_payload, Caller, OwnershipHost};
use pokemon_ownership::progression::battle::BattleRequest;
use pokemon_ownership::query::ListQuery;
use pokemon_ownership::{logging, OwnershipError};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};

#[derive(Debug, Clone)]
pub struct PokemonOwnershipService {
    tool_router: ToolRouter<PokemonOwnershipService>,
    host: Arc<OwnershipHost>,
    caller: Caller,
}

// Tool request structures
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OwnerRequest {
    #[schemars(description = "Owner to act for; defaults to the authenticated owner")]
    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PokemonRequest {
    #[schemars(description = "Owner to act for; defaults to the authenticated owner")]
    pub owner_id: Option<String>,
    #[schemars(description = "Pokedex id of the species")]
    pub species_id: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CatchRequest {
    pub owner_id: Option<String>,
    #[schemars(description = "Pokedex id of the species to catch")]
    pub species_id: u32,
    #[schemars(description = "Optional nickname, at most 50 characters")]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRequest {
    pub owner_id: Option<String>,
    pub species_id: u32,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schemars(
        with = "Option<Option<String>>",
        description = "New nickname; null clears it, omit to keep the current one"
    )]
    pub nickname: Option<Option<String>>,
    #[schemars(description = "Mark or unmark as favorite; omit to keep the current value")]
    pub is_favorite: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TrainRequest {
    pub owner_id: Option<String>,
    pub species_id: u32,
    #[schemars(description = "What to train: 'experience' or 'health'")]
    pub training_type: String,
    #[schemars(description = "Amount to train, 1-1000")]
    pub amount: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BattleToolRequest {
    pub owner_id: Option<String>,
    pub species_id: u32,
    #[schemars(description = "Pokedex id of the opponent")]
    pub opponent_species_id: u32,
    #[schemars(description = "Free-form battle type, e.g. 'wild' or 'trainer'")]
    #[serde(default)]
    pub battle_type: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRequest {
    pub owner_id: Option<String>,
    #[schemars(description = "Page number, starting at 1")]
    pub page: Option<u32>,
    #[schemars(description = "Items per page")]
    pub page_size: Option<u32>,
    #[schemars(description = "Sort by 'caughtAt' (default), 'level', 'experience' or 'name'")]
    pub sort_by: Option<String>,
    #[schemars(description = "'asc' for ascending, anything else is descending")]
    pub sort_order: Option<String>,
    pub favorite_only: Option<bool>,
    pub min_level: Option<u32>,
    pub max_level: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BulkLevelUpRequest {
    pub owner_id: Option<String>,
    #[schemars(description = "Levels to add to every Pokemon, 1-99 (default 1)")]
    pub levels_to_add: Option<u32>,
}

fn to_mcp_error(error: OwnershipError) -> McpError {
    McpError {
        code: ErrorCode(-32603),
        message: Cow::from(error.to_string()),
        data: serde_json::from_str(&error_payload(&error)).ok(),
    }
}

fn reply(result: Result<String, OwnershipError>) -> Result<CallToolResult, McpError> {
    result
        .map(|text| CallToolResult::success(vec![Content::text(text)]))
        .map_err(to_mcp_error)
}

#[tool_router]
impl PokemonOwnershipService {
    pub fn new(host: OwnershipHost, caller: Caller) -> Self {
        Self {
            tool_router: Self::tool_router(),
            host: Arc::new(host),
            caller,
        }
    }

    fn owner<'a>(&'a self, requested: &'a Option<String>) -> &'a str {
        requested
            .as_deref()
            .unwrap_or(&self.caller.authenticated_owner)
    }

    #[tool(description = "Catch a Pokemon species and add it to the collection")]
    async fn catch(
        &self,
        Parameters(request): Parameters<CatchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(
            self.host
                .catch(&self.caller, owner, request.species_id, request.nickname.clone())
                .await,
        )
    }

    #[tool(description = "Release an owned Pokemon")]
    async fn release(
        &self,
        Parameters(request): Parameters<PokemonRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(self.host.release(&self.caller, owner, request.species_id).await)
    }

    #[tool(description = "Change the nickname or favorite flag of an owned Pokemon")]
    async fn update(
        &self,
        Parameters(request): Parameters<UpdateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        let update = MetaUpdate {
            nickname: request.nickname.clone(),
            is_favorite: request.is_favorite,
        };
        reply(
            self.host
                .update(&self.caller, owner, request.species_id, &update)
                .await,
        )
    }

    #[tool(description = "Train an owned Pokemon's experience or health")]
    async fn train(
        &self,
        Parameters(request): Parameters<TrainRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(
            self.host
                .train(
                    &self.caller,
                    owner,
                    request.species_id,
                    &request.training_type,
                    request.amount,
                )
                .await,
        )
    }

    #[tool(description = "Battle an opponent with an owned Pokemon")]
    async fn battle(
        &self,
        Parameters(request): Parameters<BattleToolRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        let battle = BattleRequest {
            opponent_species_id: request.opponent_species_id,
            battle_type: request.battle_type.clone(),
        };
        reply(
            self.host
                .battle(&self.caller, owner, request.species_id, &battle)
                .await,
        )
    }

    #[tool(description = "Restore an owned Pokemon to full health")]
    async fn heal(
        &self,
        Parameters(request): Parameters<PokemonRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(self.host.heal(&self.caller, owner, request.species_id).await)
    }

    #[tool(description = "Raise an owned Pokemon by one level")]
    async fn level_up(
        &self,
        Parameters(request): Parameters<PokemonRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(self.host.level_up(&self.caller, owner, request.species_id).await)
    }

    #[tool(description = "List owned Pokemon with filtering, sorting and pagination")]
    async fn list(
        &self,
        Parameters(request): Parameters<ListRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        let query = ListQuery {
            page: request.page,
            page_size: request.page_size,
            sort_by: request.sort_by.clone(),
            sort_order: request.sort_order.clone(),
            favorite_only: request.favorite_only,
            min_level: request.min_level,
            max_level: request.max_level,
        };
        reply(self.host.list(&self.caller, owner, &query).await)
    }

    #[tool(description = "Summary statistics for a collection")]
    async fn stats(
        &self,
        Parameters(request): Parameters<OwnerRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(self.host.stats(&self.caller, owner).await)
    }

    #[tool(description = "Check whether a Pokemon species is owned")]
    async fn has(
        &self,
        Parameters(request): Parameters<PokemonRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(self.host.has(&self.caller, owner, request.species_id).await)
    }

    #[tool(description = "Number of Pokemon in a collection")]
    async fn count(
        &self,
        Parameters(request): Parameters<OwnerRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(self.host.count(&self.caller, owner).await)
    }

    #[tool(description = "Restore every damaged Pokemon in a collection to full health")]
    async fn bulk_heal(
        &self,
        Parameters(request): Parameters<OwnerRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        reply(self.host.bulk_heal(&self.caller, owner).await)
    }

    #[tool(description = "Raise every Pokemon in a collection by some levels, up to the cap")]
    async fn bulk_level_up(
        &self,
        Parameters(request): Parameters<BulkLevelUpRequest>,
    ) -> Result<CallToolResult, McpError> {
        let owner = self.owner(&request.owner_id);
        let levels = request.levels_to_add.unwrap_or(1);
        reply(self.host.bulk_level_up(&self.caller, owner, levels).await)
    }
}

#[tool_handler]
impl ServerHandler for PokemonOwnershipService {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    logging::init(&config.log_filter);

    let Some(owner) = owner_from_env() else {
        return Err(format!("{} must name the authenticated owner", OWNER_ENV).into());
    };
    tracing::info!(owner = %owner, "Pokemon Ownership MCP Server starting");

    let host = OwnershipHost::open(&config).await?;
    let service = PokemonOwnershipService::new(host, Caller::new(owner));
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;
    tracing::info!("server running, waiting for shutdown");
    let quit_reason = server.waiting().await?;

    tracing::info!(?quit_reason, "Pokemon Ownership MCP Server exiting");
    Ok(())
}
