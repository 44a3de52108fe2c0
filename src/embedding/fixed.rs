//! Fixed text-to-vector table.
//!
//! Lets tests and demos pin exact vector assignments so similarity outcomes
//! are known in advance.

use crate::embedding::{hex_digest, EmbeddingProvider, EmbeddingVector};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Default)]
pub struct StaticEmbedder {
    table: HashMap<String, EmbeddingVector>,
}

impl StaticEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `vector` to `text`, replacing any previous assignment.
    pub fn with(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.table.insert(text.into(), EmbeddingVector::new(vector));
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        self.table.get(text).cloned().ok_or_else(|| {
            AppError::EmbeddingUnavailable(format!("no vector assigned for '{}'", text))
        })
    }

    /// Digest of every assignment, so tables that differ in any vector never
    /// share an identity.
    fn identity(&self) -> String {
        let mut entries: Vec<(&String, &EmbeddingVector)> = self.table.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = Sha256::new();
        for (text, vector) in entries {
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
            hasher.update((vector.len() as u64).to_le_bytes());
            for value in vector.to_vec() {
                hasher.update(value.to_le_bytes());
            }
        }

        format!("static/{}", hex_digest(&hasher.finalize()))
    }
}
