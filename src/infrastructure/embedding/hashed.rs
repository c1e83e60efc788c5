//! Deterministic feature-hashing embeddings
//!
//! Each alphanumeric token of the text is hashed with SHA-256 into one of
//! `dimensions` buckets with a +1 or -1 sign, and the resulting counts are
//! L2-normalized. Texts sharing vocabulary get a high cosine similarity; the
//! vectors are identical across processes and platforms.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::{DomainError, EmbeddingProvider};

/// Offline embedding provider based on the hashing trick
#[derive(Debug, Clone)]
pub struct HashedEmbeddingProvider {
    dimensions: usize,
}

impl HashedEmbeddingProvider {
    pub fn new(dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "Hashed embedding dimension must be at least 1",
            ));
        }

        Ok(Self { dimensions })
    }

    /// Embed synchronously; the async trait method delegates here
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokens(text) {
            let digest = Sha256::digest(token.as_bytes());

            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };

            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();

        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingProvider for HashedEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.embed_text(text))
    }

    fn provider_name(&self) -> &'static str {
        "hashed"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
