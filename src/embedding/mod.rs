//! Embedding providers.
//!
//! The matcher only depends on [`EmbeddingProvider`]; concrete backends are
//! swapped without touching ranking logic:
//! - [`HashEmbedder`]: deterministic hash placeholder (not semantic)
//! - [`BiEncoderEmbedder`]: ONNX sentence embeddings via a session pool
//! - [`StaticEmbedder`]: fixed text-to-vector table for tests and demos

pub mod bi_encoder;
pub mod fixed;
pub mod hash;
pub mod vector;

use crate::error::Result;
use async_trait::async_trait;

pub use bi_encoder::{BiEncoderEmbedder, BiEncoderModel};
pub use fixed::StaticEmbedder;
pub use hash::HashEmbedder;
pub use vector::{cosine_similarity, EmbeddingVector};

/// Capability that turns text into an [`EmbeddingVector`].
///
/// Implementations own their concurrency discipline; callers may invoke
/// `embed` concurrently and each call must be independently correct.
/// Failures are reported as `AppError::EmbeddingUnavailable`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector>;

    /// Embed several texts, preserving order.
    ///
    /// Default implementation calls `embed` for each text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Stable identifier of the provider and its configuration. Two providers
    /// with the same identity must embed identical text identically.
    fn identity(&self) -> String;
}

/// Lowercase hex rendering of a digest, for provider identities.
pub(crate) fn hex_digest(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
