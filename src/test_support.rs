//! Deterministic fakes shared across unit tests.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::providers::EmbeddingProvider;

const DIMS: usize = 64;

/// Offline embedder that maps each word to a hashed bucket, giving a
/// bag-of-words vector. Same text always embeds to the same vector, and
/// texts sharing words land closer in cosine space.
#[derive(Default)]
pub struct HashingEmbedder;

impl HashingEmbedder {
    fn vector_for(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMS];
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            v[(hasher.finish() as usize) % DIMS] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector_for(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
