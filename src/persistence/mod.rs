//! On-disk cache of exemplar embeddings.
//!
//! Embedding every exemplar phrase at startup is the slow part of building a
//! matcher with a real model. The cache stores the flattened exemplar matrix
//! keyed by a hash of the provider identity and every phrase, so any change
//! to either invalidates it.

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use ndarray::Array2;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Cache file format version. Increment when format changes.
const CACHE_VERSION: u32 = 1;

/// Magic bytes to identify valid cache files.
const CACHE_MAGIC: &[u8; 8] = b"SKILLEMB";

/// Cached exemplar embeddings with the key they were computed for.
pub struct ExemplarCache {
    pub version: u32,
    /// SHA-256 of provider identity and exemplar phrases
    pub key: [u8; 32],
    pub num_vectors: usize,
    pub embedding_dim: usize,
    /// One row per exemplar phrase, in catalog order
    pub embeddings: Array2<f32>,
}

impl ExemplarCache {
    /// Compute the cache key for a provider and catalog.
    pub fn compute_key(provider_identity: &str, catalog: &Catalog) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(provider_identity.as_bytes());
        hasher.update(b"\n");

        for descriptor in catalog.list_descriptors() {
            hasher.update(descriptor.id.as_bytes());
            for phrase in descriptor.semantic_phrases() {
                hasher.update(b"|");
                hasher.update(phrase.as_bytes());
            }
            hasher.update(b"\n");
        }

        hasher.finalize().into()
    }

    pub fn new(key: [u8; 32], embeddings: Array2<f32>) -> Self {
        Self {
            version: CACHE_VERSION,
            key,
            num_vectors: embeddings.nrows(),
            embedding_dim: embeddings.ncols(),
            embeddings,
        }
    }

    /// Save cache to binary file.
    ///
    /// File format:
    /// - 8 bytes: magic "SKILLEMB"
    /// - 4 bytes: version (u32 LE)
    /// - 32 bytes: key
    /// - 8 bytes: num_vectors (u64 LE)
    /// - 8 bytes: embedding_dim (u64 LE)
    /// - N bytes: embeddings data (f32 LE, row-major)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| cache_error("create cache directory", e))?;
        }

        let file = File::create(path).map_err(|e| cache_error("create cache file", e))?;
        let mut writer = BufWriter::new(file);

        let mut header = Vec::with_capacity(60);
        header.extend_from_slice(CACHE_MAGIC);
        header.extend_from_slice(&self.version.to_le_bytes());
        header.extend_from_slice(&self.key);
        header.extend_from_slice(&(self.num_vectors as u64).to_le_bytes());
        header.extend_from_slice(&(self.embedding_dim as u64).to_le_bytes());
        writer
            .write_all(&header)
            .map_err(|e| cache_error("write cache header", e))?;

        for &val in self.embeddings.iter() {
            writer
                .write_all(&val.to_le_bytes())
                .map_err(|e| cache_error("write embedding data", e))?;
        }

        writer.flush().map_err(|e| cache_error("flush cache file", e))?;

        tracing::info!(
            path = %path.display(),
            num_vectors = self.num_vectors,
            embedding_dim = self.embedding_dim,
            "Exemplar cache saved"
        );

        Ok(())
    }

    /// Load cache from binary file.
    ///
    /// Returns None if the file is missing, unreadable, from another format
    /// version, or truncated.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Cache file does not exist");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot open cache file, ignoring");
                return Ok(None);
            }
        };
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 8];
        if reader.read_exact(&mut magic).is_err() || &magic != CACHE_MAGIC {
            tracing::warn!(path = %path.display(), "Invalid cache magic, ignoring");
            return Ok(None);
        }

        let Some(version) = read_u32(&mut reader) else {
            return Ok(truncated(path));
        };
        if version != CACHE_VERSION {
            tracing::warn!(
                path = %path.display(),
                cache_version = version,
                expected_version = CACHE_VERSION,
                "Cache version mismatch, ignoring"
            );
            return Ok(None);
        }

        let mut key = [0u8; 32];
        if reader.read_exact(&mut key).is_err() {
            return Ok(truncated(path));
        }

        let (Some(num_vectors), Some(embedding_dim)) = (read_u64(&mut reader), read_u64(&mut reader))
        else {
            return Ok(truncated(path));
        };
        let (num_vectors, embedding_dim) = (num_vectors as usize, embedding_dim as usize);

        let Some(total_floats) = num_vectors.checked_mul(embedding_dim) else {
            return Ok(truncated(path));
        };

        let mut data = Vec::with_capacity(total_floats.min(1 << 24));
        for _ in 0..total_floats {
            let mut bytes = [0u8; 4];
            if reader.read_exact(&mut bytes).is_err() {
                return Ok(truncated(path));
            }
            data.push(f32::from_le_bytes(bytes));
        }

        let embeddings = Array2::from_shape_vec((num_vectors, embedding_dim), data).map_err(|e| {
            AppError::CatalogError(format!("Failed to reshape cached embeddings: {}", e))
        })?;

        tracing::info!(
            path = %path.display(),
            num_vectors,
            embedding_dim,
            "Exemplar cache loaded"
        );

        Ok(Some(Self {
            version,
            key,
            num_vectors,
            embedding_dim,
            embeddings,
        }))
    }

    pub fn is_valid_for(&self, key: &[u8; 32]) -> bool {
        &self.key == key
    }
}

/// Try to load exemplar embeddings computed for `key`.
///
/// Returns Some(embeddings) on a cache hit, None on a miss.
pub fn try_load_exemplar_cache(cache_path: &Path, key: &[u8; 32]) -> Result<Option<Array2<f32>>> {
    match ExemplarCache::load(cache_path)? {
        Some(cache) if cache.is_valid_for(key) => {
            tracing::info!("Using cached exemplar embeddings (cache hit)");
            Ok(Some(cache.embeddings))
        }
        Some(_) => {
            tracing::info!("Cache invalid (catalog or provider changed), will recompute");
            Ok(None)
        }
        None => {
            tracing::info!("No cache found, will compute exemplar embeddings");
            Ok(None)
        }
    }
}

/// Save computed exemplar embeddings to cache.
pub fn save_exemplar_cache(cache_path: &Path, key: [u8; 32], embeddings: &Array2<f32>) -> Result<()> {
    ExemplarCache::new(key, embeddings.clone()).save(cache_path)
}

fn read_u32(reader: &mut impl Read) -> Option<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes).ok()?;
    Some(u32::from_le_bytes(bytes))
}

fn read_u64(reader: &mut impl Read) -> Option<u64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes).ok()?;
    Some(u64::from_le_bytes(bytes))
}

fn truncated<T>(path: &Path) -> Option<T> {
    tracing::warn!(path = %path.display(), "Truncated cache file, ignoring");
    None
}

fn cache_error(action: &str, err: std::io::Error) -> AppError {
    AppError::CatalogError(format!("Failed to {}: {}", action, err))
}
