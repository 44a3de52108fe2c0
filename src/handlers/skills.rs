use crate::catalog::{FullDefinition, ToolDescriptor};
use crate::error::Result;
use crate::matcher::SavingsReport;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// Queries are assumed to load this many definitions on average when
/// projecting savings.
const PROJECTED_SKILLS_PER_QUERY: u64 = 2;

#[derive(Debug, Serialize)]
pub struct DefinitionResponse {
    pub id: String,
    pub cost_tokens: u32,
    pub definition: FullDefinition,
}

/// GET /skills/:id - Full definition for one skill
pub async fn definition_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DefinitionResponse>> {
    let definition = state.catalog.get_full_definition(&id)?.clone();
    let cost_tokens = state
        .catalog
        .descriptor(&id)
        .map(|d| d.cost_tokens)
        .unwrap_or_default();

    tracing::debug!(id = %id, cost_tokens, "Full definition served");
    metrics::counter!("definitions_served_total").increment(1);

    Ok(Json(DefinitionResponse {
        id,
        cost_tokens,
        definition,
    }))
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Rendered compact index for a system prompt
    pub index: String,
    pub skills: Vec<ToolDescriptor>,
    pub index_cost: u64,
    pub savings: SavingsReport,
}

/// GET /index - Compact skill index and projected context savings
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Json<IndexResponse> {
    let catalog = &state.catalog;
    let index_cost = state.config.index_cost;

    Json(IndexResponse {
        index: catalog.compact_index().to_string(),
        skills: catalog.list_descriptors().to_vec(),
        index_cost,
        savings: SavingsReport::projected(catalog, index_cost, PROJECTED_SKILLS_PER_QUERY),
    })
}
