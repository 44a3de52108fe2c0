use crate::catalog::{load_catalog, Catalog};
use crate::config::{Config, EmbedderKind};
use crate::embedding::{BiEncoderEmbedder, EmbeddingProvider, HashEmbedder};
use crate::error::Result;
use crate::matcher::Matcher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared across all request handlers.
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub matcher: Arc<Matcher>,
    /// Flag indicating the service is ready (exemplars embedded, warmup done)
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Initialize application state: load the catalog, construct the
    /// embedding provider, precompute exemplar embeddings and warm up.
    pub async fn new(config: Config) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => load_catalog(path)?,
            None => {
                tracing::info!("No CATALOG_PATH set, using built-in catalog");
                Catalog::builtin()?
            }
        };
        let catalog = Arc::new(catalog);

        let provider = build_provider(&config)?;

        let matcher = match &config.embeddings_cache_path {
            Some(path) => Matcher::build_cached(Arc::clone(&catalog), provider, path).await?,
            None => Matcher::build(Arc::clone(&catalog), provider).await?,
        };

        let state = Self::from_parts(Arc::new(matcher), config);
        state.ready.store(false, Ordering::SeqCst);

        state.warmup().await?;
        state.ready.store(true, Ordering::SeqCst);

        Ok(state)
    }

    /// Assemble state around an already-built matcher. The result is marked
    /// ready.
    pub fn from_parts(matcher: Arc<Matcher>, config: Config) -> Self {
        Self {
            catalog: Arc::clone(matcher.catalog()),
            matcher,
            ready: AtomicBool::new(true),
            config: Arc::new(config),
        }
    }

    /// Embed a dummy query so the first real request doesn't pay provider
    /// cold-start latency.
    async fn warmup(&self) -> Result<()> {
        tracing::info!("Running embedding warmup...");
        let _ = self.matcher.provider().embed("warmup query").await?;
        tracing::info!("Embedding warmup completed successfully");
        Ok(())
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

fn build_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.embedder {
        EmbedderKind::Hash => {
            tracing::warn!(
                dimension = config.embedding_dim,
                "Using hash embedder: scores are deterministic but not semantic"
            );
            Ok(Arc::new(HashEmbedder::new(config.embedding_dim)?))
        }
        EmbedderKind::BiEncoder => {
            let pool_size = config.encoder_pool_size.unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            });
            Ok(Arc::new(BiEncoderEmbedder::load(
                &config.bi_encoder_model_path,
                &config.bi_encoder_tokenizer_path,
                config.max_sequence_length,
                pool_size,
                config.embed_timeout,
            )?))
        }
    }
}
