//! Sentence encoder — dense embeddings for free-text paragraph matching.
//!
//! The production implementation calls an OpenAI-compatible `/embeddings`
//! endpoint; tests swap in a deterministic stub. Carried in `AppState` as
//! `Arc<dyn SentenceEncoder>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Batch text → vector encoding. Implementations must be safe to share
/// read-only across the evaluation worker pool.
#[async_trait]
pub trait SentenceEncoder: Send + Sync {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

/// HTTP-backed sentence encoder.
#[derive(Clone)]
pub struct HttpSentenceEncoder {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
}

impl HttpSentenceEncoder {
    pub fn new(url: String, model: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            url,
            model,
            api_key,
        }
    }
}

/// Deterministic in-process encoder for tests: embeds a text as its ASCII
/// letter-frequency vector, so identical texts score cosine 1.0 and
/// letter-disjoint texts score 0.0.
#[cfg(test)]
pub mod testing {
    use super::*;

    pub struct LetterFrequencyEncoder;

    #[async_trait]
    impl SentenceEncoder for LetterFrequencyEncoder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut v = vec![0.0f32; 26];
                    for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
                        v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
                    }
                    v
                })
                .collect())
        }
    }
}

#[async_trait]
impl SentenceEncoder for HttpSentenceEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Embeddings request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "Embeddings endpoint returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Malformed embeddings response: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Embeddings endpoint returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|row| row.embedding).collect())
    }
}
