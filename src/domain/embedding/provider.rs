//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Maps a normalized query to a fixed-length vector.
///
/// Implementations must be deterministic: the same text always yields a
/// bit-identical vector of length [`EmbeddingProvider::dimensions`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Length of every vector this provider returns
    fn dimensions(&self) -> usize;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Provider returning scripted vectors per text
    ///
    /// Texts without a scripted vector get a one-hot vector derived from the
    /// text's byte sum, so unrelated texts are usually orthogonal.
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        vectors: HashMap<String, Vec<f32>>,
        error: Option<String>,
        delay: Option<Duration>,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                vectors: HashMap::new(),
                error: None,
                delay: None,
            }
        }

        pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.into(), vector);
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn fallback_vector(&self, text: &str) -> Vec<f32> {
            let hash = text.bytes().fold(0usize, |acc, b| acc.wrapping_add(b as usize));
            let mut vector = vec![0.0; self.dimensions];
            vector[hash % self.dimensions] = 1.0;
            vector
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }

            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| self.fallback_vector(text)))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_scripted_vector() {
            let provider = MockEmbeddingProvider::new(3).with_vector("hello", vec![1.0, 2.0, 3.0]);

            assert_eq!(provider.embed("hello").await.unwrap(), vec![1.0, 2.0, 3.0]);
        }

        #[tokio::test]
        async fn test_mock_provider_deterministic_fallback() {
            let provider = MockEmbeddingProvider::new(16);

            let first = provider.embed("anything").await.unwrap();
            let second = provider.embed("anything").await.unwrap();

            assert_eq!(first, second);
            assert_eq!(first.len(), 16);
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let provider = MockEmbeddingProvider::new(8).with_error("API error");

            assert!(provider.embed("hello").await.is_err());
        }
    }
}
