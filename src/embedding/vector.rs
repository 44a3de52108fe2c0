use crate::error::{AppError, Result};
use ndarray::Array1;

/// A text fragment's position in similarity space.
///
/// Vectors are never mutated after creation and are compared only through
/// [`cosine_similarity`], never by equality.
#[derive(Debug, Clone)]
pub struct EmbeddingVector(Array1<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(Array1::from_vec(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean norm.
    pub fn magnitude(&self) -> f32 {
        self.0.dot(&self.0).sqrt()
    }

    pub fn as_array(&self) -> &Array1<f32> {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.0.to_vec()
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl From<Array1<f32>> for EmbeddingVector {
    fn from(values: Array1<f32>) -> Self {
        Self(values)
    }
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`, clamped to `[-1, 1]`.
///
/// Zero-magnitude vectors have similarity `0` with everything.
///
/// # Errors
/// Returns `AppError::DimensionMismatch` if the vectors differ in length.
pub fn cosine_similarity(a: &EmbeddingVector, b: &EmbeddingVector) -> Result<f32> {
    if a.len() != b.len() {
        return Err(AppError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let magnitude_a = a.magnitude();
    let magnitude_b = b.magnitude();
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = a.0.dot(&b.0) / (magnitude_a * magnitude_b);
    Ok(similarity.clamp(-1.0, 1.0))
}
