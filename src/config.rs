use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Which embedding backend positions queries and exemplars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    /// Deterministic hash placeholder. Needs no model files but carries no
    /// semantic signal.
    Hash,
    /// ONNX sentence-embedding model.
    BiEncoder,
}

impl EmbedderKind {
    pub fn from_env() -> Self {
        Self::parse(&env::var("SKILLMATCH_EMBEDDER").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "bi-encoder" | "bi_encoder" | "onnx" | "model" => Self::BiEncoder,
            _ => Self::Hash,
        }
    }
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Optional path to a JSON catalog. If None, the built-in catalog is used.
    pub catalog_path: Option<PathBuf>,
    /// Token cost of the always-resident compact index.
    pub index_cost: u64,
    /// Results returned when a request omits top_k.
    pub default_top_k: usize,
    /// Minimum score when a request omits threshold.
    pub default_threshold: f32,
    pub embedder: EmbedderKind,
    /// Output dimension of the hash embedder.
    pub embedding_dim: usize,
    pub bi_encoder_model_path: PathBuf,
    pub bi_encoder_tokenizer_path: PathBuf,
    pub max_sequence_length: usize,
    /// Number of bi-encoder sessions. If None, uses available parallelism.
    pub encoder_pool_size: Option<usize>,
    /// How long a query waits for a free encoder session.
    pub embed_timeout: Duration,
    /// Optional path for the exemplar embeddings cache.
    pub embeddings_cache_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `SKILLMATCH_EMBEDDER` selects the backend: `bi-encoder` loads the ONNX
    /// model from `BI_ENCODER_MODEL_PATH`; anything else uses the hash
    /// placeholder.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            catalog_path: env::var("CATALOG_PATH").ok().map(PathBuf::from),
            index_cost: env::var("INDEX_COST")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
            default_top_k: env::var("DEFAULT_TOP_K")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            default_threshold: parse_threshold(
                &env::var("DEFAULT_THRESHOLD").unwrap_or_else(|_| "0.3".to_string()),
            )?,
            embedder: EmbedderKind::from_env(),
            embedding_dim: env::var("EMBEDDING_DIM")
                .unwrap_or_else(|_| "8".to_string())
                .parse()?,
            bi_encoder_model_path: PathBuf::from(
                env::var("BI_ENCODER_MODEL_PATH")
                    .unwrap_or_else(|_| "./bi-encoder-model/model_int8.onnx".to_string()),
            ),
            bi_encoder_tokenizer_path: PathBuf::from(
                env::var("BI_ENCODER_TOKENIZER_PATH")
                    .unwrap_or_else(|_| "./bi-encoder-model/tokenizer.json".to_string()),
            ),
            max_sequence_length: env::var("MAX_SEQ_LENGTH")
                .unwrap_or_else(|_| "512".to_string())
                .parse()?,
            encoder_pool_size: env::var("ENCODER_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok()),
            embed_timeout: Duration::from_millis(
                env::var("EMBED_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()?,
            ),
            embeddings_cache_path: env::var("EMBEDDINGS_CACHE_PATH").ok().map(PathBuf::from),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 30,
            catalog_path: None,
            index_cost: 300,
            default_top_k: 3,
            default_threshold: 0.3,
            embedder: EmbedderKind::Hash,
            embedding_dim: 8,
            bi_encoder_model_path: PathBuf::from("./bi-encoder-model/model_int8.onnx"),
            bi_encoder_tokenizer_path: PathBuf::from("./bi-encoder-model/tokenizer.json"),
            max_sequence_length: 512,
            encoder_pool_size: None,
            embed_timeout: Duration::from_secs(5),
            embeddings_cache_path: None,
        }
    }
}

fn parse_threshold(raw: &str) -> anyhow::Result<f32> {
    let threshold: f32 = raw.parse()?;
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("DEFAULT_THRESHOLD must be within [0, 1], got {}", threshold);
    }
    Ok(threshold)
}
