//! ONNX bi-encoder embeddings for semantic skill matching.
//!
//! Encodes text with a sentence-embedding model (e.g. BAAI/bge-base-en-v1.5)
//! exported to ONNX. Token embeddings are mean-pooled over the attention mask
//! and L2-normalized, so exemplar and query vectors compare by cosine.

use crate::embedding::{hex_digest, EmbeddingProvider, EmbeddingVector};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use crossbeam::queue::ArrayQueue;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayView3, Axis};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use tokenizers::{Encoding, Tokenizer};
use tokio::sync::Semaphore;

/// Texts per inference call when embedding a batch
const EMBED_BATCH_SIZE: usize = 32;

/// A single ONNX session plus its tokenizer.
///
/// `Session::run` needs `&mut self`, so each model is used by one caller at
/// a time; [`BiEncoderEmbedder`] pools several of them.
pub struct BiEncoderModel {
    session: Session,
    tokenizer: Tokenizer,
    max_length: usize,
}

impl BiEncoderModel {
    /// Load a bi-encoder session from in-memory model bytes.
    ///
    /// # Arguments
    /// * `model_bytes` - Contents of the ONNX model file
    /// * `tokenizer` - Tokenizer matching the model
    /// * `max_length` - Maximum sequence length (512 for BGE-base)
    pub fn from_memory(model_bytes: &[u8], tokenizer: Tokenizer, max_length: usize) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| AppError::ModelError(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::ModelError(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| AppError::ModelError(e.to_string()))?
            .commit_from_memory(model_bytes)
            .map_err(|e| AppError::ModelError(format!("Failed to load bi-encoder model: {}", e)))?;

        Ok(Self {
            session,
            tokenizer,
            max_length,
        })
    }

    /// Encode a single text into a normalized embedding.
    pub fn encode(&mut self, text: &str) -> Result<EmbeddingVector> {
        self.encode_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| AppError::ModelError("Bi-encoder returned no embedding".to_string()))
    }

    /// Encode texts into L2-normalized sentence embeddings, in input order.
    pub fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| AppError::ModelError(format!("Tokenization failed: {}", e)))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len().min(self.max_length))
            .max()
            .unwrap_or(1)
            .max(1);
        let (input_ids, attention_mask) = pad_encodings(&encodings, seq_len);
        let shape = [encodings.len(), seq_len];
        let weights = attention_mask.mapv(|m| m as f32);

        let outputs = self
            .session
            .run(ort::inputs![
                "input_ids" => Tensor::from_array((shape, input_ids.into_raw_vec_and_offset().0))?,
                "attention_mask" => Tensor::from_array((shape, attention_mask.into_raw_vec_and_offset().0))?,
                "token_type_ids" => Tensor::from_array((shape, vec![0i64; shape[0] * shape[1]]))?,
            ])
            .map_err(|e| AppError::ModelError(format!("Bi-encoder inference failed: {}", e)))?;

        let hidden_state = outputs
            .get("last_hidden_state")
            .ok_or_else(|| AppError::ModelError("No 'last_hidden_state' output found".to_string()))?;
        let (dims, data) = hidden_state.try_extract_tensor::<f32>()?;
        let hidden_size = dims[2] as usize;

        // (batch, seq_len, hidden_size)
        let tokens = ArrayView3::from_shape((shape[0], seq_len, hidden_size), data)
            .map_err(|e| AppError::ModelError(format!("Unexpected hidden state shape: {}", e)))?;

        Ok(tokens
            .axis_iter(Axis(0))
            .zip(weights.axis_iter(Axis(0)))
            .map(|(token_rows, mask)| mean_pool(token_rows, mask))
            .collect())
    }
}

/// Right-pad token ids and attention masks to `seq_len`, truncating longer
/// encodings.
fn pad_encodings(encodings: &[Encoding], seq_len: usize) -> (Array2<i64>, Array2<i64>) {
    let mut input_ids = Array2::<i64>::zeros((encodings.len(), seq_len));
    let mut attention_mask = Array2::<i64>::zeros((encodings.len(), seq_len));

    for (i, encoding) in encodings.iter().enumerate() {
        let tokens = encoding.get_ids().iter().zip(encoding.get_attention_mask());
        for (j, (&id, &mask)) in tokens.take(seq_len).enumerate() {
            input_ids[[i, j]] = id as i64;
            attention_mask[[i, j]] = mask as i64;
        }
    }

    (input_ids, attention_mask)
}

/// Mask-weighted mean of token embeddings, scaled to unit length.
fn mean_pool(tokens: ArrayView2<f32>, weights: ArrayView1<f32>) -> EmbeddingVector {
    let count = weights.sum();
    let mut pooled = tokens.t().dot(&weights);
    if count > 0.0 {
        pooled /= count;
    }

    let norm = pooled.dot(&pooled).sqrt();
    if norm > 0.0 {
        pooled /= norm;
    }

    EmbeddingVector::from(pooled)
}

/// Provider identity derived from the model and tokenizer contents, so a
/// file replaced in place never reuses vectors cached for the old one.
fn content_identity(model_bytes: &[u8], tokenizer_bytes: &[u8], max_length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(Sha256::digest(model_bytes));
    hasher.update(Sha256::digest(tokenizer_bytes));
    format!("bi-encoder/{}/{}", hex_digest(&hasher.finalize()), max_length)
}

/// Pooled bi-encoder provider.
///
/// # Concurrency
/// Models live in a lock-free queue. A semaphore with one permit per model
/// gates access, so a caller holding a permit always finds a model to pop.
/// Waiting longer than `acquire_timeout` surfaces as
/// `AppError::EmbeddingUnavailable`; inference runs on the blocking pool.
pub struct BiEncoderEmbedder {
    models: ArrayQueue<BiEncoderModel>,
    permits: Semaphore,
    acquire_timeout: Duration,
    identity: String,
}

impl BiEncoderEmbedder {
    /// Load `pool_size` sessions of the model at `model_path`.
    pub fn load(
        model_path: &Path,
        tokenizer_path: &Path,
        max_length: usize,
        pool_size: usize,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool_size = pool_size.max(1);

        let model_bytes = std::fs::read(model_path)
            .map_err(|e| AppError::ModelError(format!("Failed to read model file: {}", e)))?;
        let tokenizer_bytes = std::fs::read(tokenizer_path)
            .map_err(|e| AppError::ModelError(format!("Failed to read tokenizer file: {}", e)))?;
        let tokenizer = Tokenizer::from_bytes(&tokenizer_bytes).map_err(|e| {
            AppError::ModelError(format!("Failed to load bi-encoder tokenizer: {}", e))
        })?;

        let models = ArrayQueue::new(pool_size);
        for _ in 0..pool_size {
            let model = BiEncoderModel::from_memory(&model_bytes, tokenizer.clone(), max_length)?;
            models
                .push(model)
                .map_err(|_| AppError::ModelError("Failed to initialize encoder pool".into()))?;
        }

        tracing::info!(
            model = %model_path.display(),
            tokenizer = %tokenizer_path.display(),
            max_length,
            pool_size,
            "Bi-encoder pool loaded"
        );

        Ok(Self {
            models,
            permits: Semaphore::new(pool_size),
            acquire_timeout,
            identity: content_identity(&model_bytes, &tokenizer_bytes, max_length),
        })
    }

    /// Run `job` on a pooled session in the blocking pool.
    ///
    /// Waiting for a permit longer than `acquire_timeout` fails with
    /// `AppError::EmbeddingUnavailable`.
    async fn with_session<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut BiEncoderModel) -> Result<T> + Send + 'static,
    {
        let permit = tokio::time::timeout(self.acquire_timeout, self.permits.acquire())
            .await
            .map_err(|_| {
                AppError::EmbeddingUnavailable("encoder pool busy, acquire timed out".to_string())
            })?
            .map_err(|_| AppError::EmbeddingUnavailable("encoder pool closed".to_string()))?;

        let mut model = self.models.pop().ok_or_else(|| {
            AppError::EmbeddingUnavailable("no encoder session available".to_string())
        })?;

        let joined = tokio::task::spawn_blocking(move || {
            let result = job(&mut model);
            (model, result)
        })
        .await;

        match joined {
            Ok((model, result)) => {
                // Capacity equals the number of models, so this cannot overflow.
                let _ = self.models.push(model);
                drop(permit);
                result.map_err(|e| AppError::EmbeddingUnavailable(e.to_string()))
            }
            Err(e) => {
                // The session was lost with the task; retire its permit too.
                permit.forget();
                tracing::error!(error = %e, "Encoder task failed, session dropped from pool");
                Err(AppError::EmbeddingUnavailable(format!(
                    "encoder task failed: {}",
                    e
                )))
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for BiEncoderEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        reject_blank(std::slice::from_ref(&text))?;

        let text = text.to_string();
        self.with_session(move |model| model.encode(&text)).await
    }

    /// Encodes on a single session, `EMBED_BATCH_SIZE` texts per inference
    /// call.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        reject_blank(texts)?;

        let texts = texts.to_vec();
        let vectors = self
            .with_session(move |model| {
                let mut vectors = Vec::with_capacity(texts.len());
                for chunk in texts.chunks(EMBED_BATCH_SIZE) {
                    vectors.extend(model.encode_batch(chunk)?);
                }
                Ok(vectors)
            })
            .await?;

        tracing::debug!(texts = vectors.len(), "Bi-encoder batch embedded");
        Ok(vectors)
    }

    fn identity(&self) -> String {
        self.identity.clone()
    }
}

fn reject_blank<S: AsRef<str>>(texts: &[S]) -> Result<()> {
    if texts.iter().any(|t| t.as_ref().trim().is_empty()) {
        return Err(AppError::EmbeddingUnavailable(
            "cannot embed empty text".to_string(),
        ));
    }
    Ok(())
}
