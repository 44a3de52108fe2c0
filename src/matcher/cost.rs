//! Context cost accounting for progressive disclosure.

use crate::catalog::Catalog;
use crate::matcher::MatchResult;
use serde::Serialize;

/// Cost of materializing `matches` on top of the resident index:
/// `index_cost + sum(cost_tokens)`.
pub fn estimate_context_cost(matches: &[MatchResult<'_>], index_cost: u64) -> u64 {
    matches
        .iter()
        .map(|m| u64::from(m.descriptor.cost_tokens))
        .fold(index_cost, |total, cost| total + cost)
}

/// Comparison between keeping every full definition resident and loading
/// only the selected ones next to the compact index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsReport {
    /// Every full definition resident
    pub traditional: u64,
    /// Index plus the loaded definitions
    pub progressive: u64,
    /// `traditional - progressive`; negative when disclosure costs more
    pub saved: i64,
    pub saved_percent: f64,
}

impl SavingsReport {
    fn new(traditional: u64, progressive: u64) -> Self {
        let saved = traditional as i64 - progressive as i64;
        let saved_percent = if traditional == 0 {
            0.0
        } else {
            saved as f64 / traditional as f64 * 100.0
        };

        Self {
            traditional,
            progressive,
            saved,
            saved_percent,
        }
    }

    /// Savings for an actual match set.
    pub fn for_matches(catalog: &Catalog, index_cost: u64, matches: &[MatchResult<'_>]) -> Self {
        Self::new(catalog.total_cost(), estimate_context_cost(matches, index_cost))
    }

    /// Expected savings when an average query loads `skills_per_query`
    /// definitions of average catalog cost.
    pub fn projected(catalog: &Catalog, index_cost: u64, skills_per_query: u64) -> Self {
        let average_cost = if catalog.is_empty() {
            0
        } else {
            catalog.total_cost() / catalog.len() as u64
        };
        let loaded = skills_per_query.min(catalog.len() as u64) * average_cost;
        Self::new(catalog.total_cost(), index_cost + loaded)
    }
}
