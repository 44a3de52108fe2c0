//! Coarse trigger-phrase matching.

use crate::catalog::Catalog;
use crate::matcher::MatchResult;

/// Select descriptors whose triggers appear in `query`.
///
/// A descriptor matches when any of its triggers is a case-insensitive
/// substring of the query. Every match scores `1.0`; results keep catalog
/// order and are capped at `top_k`.
pub fn match_triggers<'a>(catalog: &'a Catalog, query: &str, top_k: usize) -> Vec<MatchResult<'a>> {
    let query = query.to_lowercase();

    catalog
        .list_descriptors()
        .iter()
        .filter(|descriptor| {
            descriptor
                .triggers
                .iter()
                .filter(|t| !t.trim().is_empty())
                .any(|trigger| query.contains(&trigger.to_lowercase()))
        })
        .take(top_k)
        .map(|descriptor| MatchResult::new(descriptor, 1.0))
        .collect()
}
