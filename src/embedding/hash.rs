//! Deterministic hash-based placeholder embeddings.
//!
//! Each dimension is a byte of a SHA-256 digest of the text scaled to
//! `[0, 1]`. Identical text always yields identical vectors, but similar
//! text does not yield similar vectors: use only where no real model is
//! available.

use crate::embedding::{EmbeddingProvider, EmbeddingVector};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Bytes produced per digest block
const DIGEST_LEN: usize = 32;

pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(AppError::ValidationError(
                "Embedding dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn hash_vector(&self, text: &str) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.dimension);
        let mut block: u32 = 0;

        while values.len() < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(block.to_le_bytes());
            hasher.update(text.as_bytes());
            let digest = hasher.finalize();

            let needed = (self.dimension - values.len()).min(DIGEST_LEN);
            values.extend(digest.iter().take(needed).map(|&b| f32::from(b) / 255.0));
            block += 1;
        }

        values
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        if text.trim().is_empty() {
            return Err(AppError::EmbeddingUnavailable(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(EmbeddingVector::new(self.hash_vector(text)))
    }

    fn identity(&self) -> String {
        format!("hash-sha256/{}", self.dimension)
    }
}
