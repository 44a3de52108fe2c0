//! Skill matching handler.
//!
//! Ranks catalog skills against a natural language query so an agent can
//! decide which full definitions to load into its context.

use crate::error::{AppError, Result};
use crate::matcher::{estimate_context_cost, MatchMode, MatchResult};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    /// The natural language query to match against skills
    pub query: String,
    /// Maximum number of results (default from config)
    pub top_k: Option<usize>,
    /// Minimum score in [0, 1] (default from config)
    pub threshold: Option<f32>,
    #[serde(default)]
    pub mode: MatchMode,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub request_id: String,
    pub mode: MatchMode,
    pub results: Vec<MatchedSkill>,
    /// Index cost plus the cost of every matched definition
    pub estimated_cost: u64,
}

#[derive(Debug, Serialize)]
pub struct MatchedSkill {
    pub id: String,
    pub category: String,
    pub summary: String,
    pub score: f32,
    pub cost_tokens: u32,
}

impl From<&MatchResult<'_>> for MatchedSkill {
    fn from(m: &MatchResult<'_>) -> Self {
        Self {
            id: m.descriptor.id.clone(),
            category: m.descriptor.category.clone(),
            summary: m.descriptor.summary.clone(),
            score: m.score,
            cost_tokens: m.descriptor.cost_tokens,
        }
    }
}

/// POST /match - Find skills relevant to a query.
///
/// # Flow
/// 1. Validate input (non-empty query)
/// 2. Semantic mode: embed the query, score every skill by its best
///    exemplar, filter by threshold, keep top-K
///    Lexical mode: trigger phrase containment, keep top-K
/// 3. Estimate context cost of loading the matched definitions
pub async fn match_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>> {
    let start_time = std::time::Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    if request.query.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Query cannot be empty".to_string(),
        ));
    }

    let top_k = request.top_k.unwrap_or(state.config.default_top_k);
    let threshold = request.threshold.unwrap_or(state.config.default_threshold);

    let matches = match request.mode {
        MatchMode::Semantic => {
            state
                .matcher
                .match_query(&request.query, top_k, threshold)
                .await?
        }
        MatchMode::Lexical => state.matcher.match_lexical(&request.query, top_k),
    };

    let estimated_cost = estimate_context_cost(&matches, state.config.index_cost);
    let results: Vec<MatchedSkill> = matches.iter().map(MatchedSkill::from).collect();

    let elapsed = start_time.elapsed();
    tracing::info!(
        request_id = %request_id,
        query = %request.query,
        mode = ?request.mode,
        top_k,
        threshold,
        matched = results.len(),
        estimated_cost,
        elapsed_ms = elapsed.as_millis() as u64,
        "Match completed"
    );

    metrics::counter!("match_requests_total").increment(1);
    metrics::histogram!("match_latency_ms").record(elapsed.as_millis() as f64);

    Ok(Json(MatchResponse {
        request_id,
        mode: request.mode,
        results,
        estimated_cost,
    }))
}
