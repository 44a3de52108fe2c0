//! Embedding-based skill matching.
//!
//! Every exemplar phrase is embedded once when the matcher is built; each
//! query is embedded fresh. A descriptor's score is the best similarity over
//! its exemplars, so one strong phrasing is enough to surface a tool.

use crate::catalog::Catalog;
use crate::embedding::{cosine_similarity, EmbeddingProvider, EmbeddingVector};
use crate::error::{AppError, Result};
use crate::matcher::lexical::match_triggers;
use crate::matcher::MatchResult;
use crate::persistence::{self, ExemplarCache};
use ndarray::Array2;
use std::path::Path;
use std::sync::Arc;

/// Ranks catalog descriptors against free-text queries.
///
/// Immutable after construction: concurrent queries share it through `Arc`
/// without locking.
pub struct Matcher {
    catalog: Arc<Catalog>,
    provider: Arc<dyn EmbeddingProvider>,
    /// One entry per descriptor, parallel to `catalog.list_descriptors()`
    exemplars: Vec<Vec<EmbeddingVector>>,
}

impl Matcher {
    /// Embed every exemplar phrase in `catalog` and build the matcher.
    ///
    /// # Errors
    /// - `AppError::EmbeddingUnavailable` if the provider fails on any phrase
    /// - `AppError::DimensionMismatch` if exemplar vectors differ in length
    pub async fn build(
        catalog: Arc<Catalog>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let phrases = all_phrases(&catalog);
        let start = std::time::Instant::now();

        let vectors = provider
            .embed_batch(&phrases)
            .await
            .map_err(as_unavailable)?;

        tracing::info!(
            provider = %provider.identity(),
            skills = catalog.len(),
            exemplars = phrases.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Exemplar embeddings computed"
        );

        Self::from_vectors(catalog, provider, vectors)
    }

    /// Like [`Matcher::build`], but reuse exemplar embeddings cached at
    /// `cache_path` when they were produced by the same provider for the same
    /// phrases. A fresh computation is written back to the cache.
    pub async fn build_cached(
        catalog: Arc<Catalog>,
        provider: Arc<dyn EmbeddingProvider>,
        cache_path: &Path,
    ) -> Result<Self> {
        let key = ExemplarCache::compute_key(&provider.identity(), &catalog);

        match persistence::try_load_exemplar_cache(cache_path, &key) {
            Ok(Some(matrix)) => {
                let vectors = matrix
                    .outer_iter()
                    .map(|row| EmbeddingVector::from(row.to_owned()))
                    .collect();
                return Self::from_vectors(catalog, provider, vectors);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read exemplar cache, recomputing");
            }
        }

        let matcher = Self::build(catalog, provider).await?;

        let flat: Vec<&EmbeddingVector> = matcher.exemplars.iter().flatten().collect();
        let dim = flat.first().map(|v| v.len()).unwrap_or(0);
        let data: Vec<f32> = flat.iter().flat_map(|v| v.to_vec()).collect();
        let matrix = Array2::from_shape_vec((flat.len(), dim), data)
            .map_err(|e| AppError::ModelError(format!("Failed to shape exemplar matrix: {}", e)))?;

        if let Err(e) = persistence::save_exemplar_cache(cache_path, key, &matrix) {
            tracing::warn!(error = %e, "Failed to write exemplar cache, continuing without it");
        }

        Ok(matcher)
    }

    fn from_vectors(
        catalog: Arc<Catalog>,
        provider: Arc<dyn EmbeddingProvider>,
        vectors: Vec<EmbeddingVector>,
    ) -> Result<Self> {
        let expected: usize = catalog
            .list_descriptors()
            .iter()
            .map(|d| d.semantic_phrases().len())
            .sum();
        if vectors.len() != expected {
            return Err(AppError::EmbeddingUnavailable(format!(
                "provider returned {} vectors for {} exemplar phrases",
                vectors.len(),
                expected
            )));
        }

        if let Some(first) = vectors.first() {
            if let Some(bad) = vectors.iter().find(|v| v.len() != first.len()) {
                return Err(AppError::DimensionMismatch {
                    left: first.len(),
                    right: bad.len(),
                });
            }
        }

        let mut remaining = vectors.into_iter();
        let exemplars: Vec<Vec<EmbeddingVector>> = catalog
            .list_descriptors()
            .iter()
            .map(|d| remaining.by_ref().take(d.semantic_phrases().len()).collect())
            .collect();

        Ok(Self {
            catalog,
            provider,
            exemplars,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Rank descriptors by semantic relevance to `query`.
    ///
    /// Returns at most `top_k` results scoring at least `threshold`, sorted by
    /// score descending with ties in catalog order. No match is an empty
    /// result, not an error. `top_k == 0` returns empty without embedding.
    ///
    /// # Errors
    /// - `AppError::ValidationError` if `threshold` is not within `[0, 1]`
    /// - `AppError::EmbeddingUnavailable` if the query cannot be embedded
    /// - `AppError::DimensionMismatch` if the query vector length differs
    ///   from the exemplar vectors
    pub async fn match_query(
        &self,
        query: &str,
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<MatchResult<'_>>> {
        validate_threshold(threshold)?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.provider.embed(query).await.map_err(as_unavailable)?;
        self.rank(&query_vector, top_k, threshold)
    }

    /// Score and rank against an already-embedded query.
    pub fn rank(
        &self,
        query_vector: &EmbeddingVector,
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<MatchResult<'_>>> {
        let mut results = Vec::new();

        for (descriptor, vectors) in self.catalog.list_descriptors().iter().zip(&self.exemplars) {
            let Some(score) = best_score(query_vector, vectors)? else {
                continue;
            };
            if score >= threshold {
                results.push(MatchResult::new(descriptor, score));
            }
        }

        // Stable sort keeps catalog order among equal scores
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        tracing::debug!(
            top_k,
            threshold,
            returned = results.len(),
            "Semantic match ranked"
        );

        Ok(results)
    }

    /// Coarse trigger-phrase matching; see [`match_triggers`].
    pub fn match_lexical(&self, query: &str, top_k: usize) -> Vec<MatchResult<'_>> {
        match_triggers(&self.catalog, query, top_k)
    }
}

fn best_score(query_vector: &EmbeddingVector, vectors: &[EmbeddingVector]) -> Result<Option<f32>> {
    let mut best: Option<f32> = None;
    for vector in vectors {
        let similarity = cosine_similarity(query_vector, vector)?;
        best = Some(best.map_or(similarity, |b| b.max(similarity)));
    }
    Ok(best)
}

fn all_phrases(catalog: &Catalog) -> Vec<String> {
    catalog
        .list_descriptors()
        .iter()
        .flat_map(|d| d.semantic_phrases().iter().cloned())
        .collect()
}

fn validate_threshold(threshold: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AppError::ValidationError(format!(
            "threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

/// Provider failures surface as `EmbeddingUnavailable`; a dimension mismatch
/// stays fatal.
fn as_unavailable(err: AppError) -> AppError {
    match err {
        AppError::EmbeddingUnavailable(_) | AppError::DimensionMismatch { .. } => err,
        other => AppError::EmbeddingUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, ToolDescriptor};
    use crate::embedding::StaticEmbedder;

    fn catalog(tools: Vec<(&str, Vec<&str>)>) -> Arc<Catalog> {
        let entries = tools
            .into_iter()
            .map(|(id, exemplars)| {
                CatalogEntry::new(
                    ToolDescriptor::new(id, "test", "summary", 10).with_exemplars(exemplars),
                    None,
                )
            })
            .collect();
        Arc::new(Catalog::new(entries).unwrap())
    }

    #[tokio::test]
    async fn test_best_exemplar_wins() {
        let catalog = catalog(vec![("tool", vec!["weak", "strong"])]);
        let provider = StaticEmbedder::new()
            .with("weak", vec![0.0, 1.0])
            .with("strong", vec![1.0, 0.1])
            .with("query", vec![1.0, 0.0]);
        let matcher = Matcher::build(catalog, Arc::new(provider)).await.unwrap();

        let results = matcher.match_query("query", 1, 0.9).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].score > 0.99);
    }

    #[tokio::test]
    async fn test_ties_keep_catalog_order() {
        let catalog = catalog(vec![("b", vec!["x"]), ("a", vec!["y"]), ("c", vec!["z"])]);
        let provider = StaticEmbedder::new()
            .with("x", vec![1.0, 0.0])
            .with("y", vec![1.0, 0.0])
            .with("z", vec![2.0, 0.0])
            .with("q", vec![3.0, 0.0]);
        let matcher = Matcher::build(catalog, Arc::new(provider)).await.unwrap();

        let ids: Vec<String> = matcher
            .match_query("q", 3, 0.0)
            .await
            .unwrap()
            .iter()
            .map(|m| m.descriptor.id.clone())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_top_k_zero_does_not_embed() {
        let catalog = catalog(vec![("tool", vec!["x"])]);
        let provider = StaticEmbedder::new().with("x", vec![1.0]);
        let matcher = Matcher::build(catalog, Arc::new(provider)).await.unwrap();

        // "unknown" has no vector, so embedding it would fail
        let results = matcher.match_query("unknown", 0, 0.3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_threshold_rejected() {
        let catalog = catalog(vec![("tool", vec!["x"])]);
        let provider = StaticEmbedder::new().with("x", vec![1.0]);
        let matcher = Matcher::build(catalog, Arc::new(provider)).await.unwrap();

        for threshold in [-0.1, 1.5, f32::NAN] {
            assert!(matches!(
                matcher.match_query("x", 1, threshold).await,
                Err(AppError::ValidationError(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_exemplar_dimension_mismatch_at_build() {
        let catalog = catalog(vec![("a", vec!["x"]), ("b", vec!["y"])]);
        let provider = StaticEmbedder::new()
            .with("x", vec![1.0, 0.0])
            .with("y", vec![1.0, 0.0, 0.0]);

        let result = Matcher::build(catalog, Arc::new(provider)).await;
        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch { left: 2, right: 3 })
        ));
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch() {
        let catalog = catalog(vec![("a", vec!["x"])]);
        let provider = StaticEmbedder::new()
            .with("x", vec![1.0, 0.0])
            .with("q", vec![1.0, 0.0, 0.0]);
        let matcher = Matcher::build(catalog, Arc::new(provider)).await.unwrap();

        assert!(matches!(
            matcher.match_query("q", 1, 0.0).await,
            Err(AppError::DimensionMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_descriptor_without_phrases_never_matches() {
        let catalog = catalog(vec![("empty", vec![]), ("full", vec!["x"])]);
        let provider = StaticEmbedder::new()
            .with("x", vec![1.0])
            .with("q", vec![1.0]);
        let matcher = Matcher::build(catalog, Arc::new(provider)).await.unwrap();

        let results = matcher.match_query("q", 5, 0.0).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].descriptor.id, "full");
    }

    #[tokio::test]
    async fn test_build_fails_when_exemplar_unembeddable() {
        let catalog = catalog(vec![("a", vec!["missing"])]);
        let result = Matcher::build(catalog, Arc::new(StaticEmbedder::new())).await;
        assert!(matches!(result, Err(AppError::EmbeddingUnavailable(_))));
    }

    #[test]
    fn test_as_unavailable_keeps_dimension_mismatch() {
        let err = as_unavailable(AppError::DimensionMismatch { left: 1, right: 2 });
        assert!(matches!(err, AppError::DimensionMismatch { .. }));

        let err = as_unavailable(AppError::ModelError("boom".into()));
        assert!(matches!(err, AppError::EmbeddingUnavailable(msg) if msg.contains("boom")));
    }
}
