//! Vector index collaborator — a black-box nearest-neighbor ranking service
//! keyed by résumé identifier. Re-indexing a résumé deletes its stale
//! entries before upserting, so re-evaluation never double-counts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cv::StructuredCV;
use crate::errors::AppError;

/// Nearest-neighbor index over résumé chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces the chunks for a résumé. `chunks` and
    /// `embeddings` are parallel slices.
    async fn upsert(
        &self,
        resume_id: &str,
        chunks: &[String],
        embeddings: &[Vec<f32>],
    ) -> Result<(), AppError>;

    /// Removes every entry stored for a résumé.
    async fn delete_resume(&self, resume_id: &str) -> Result<(), AppError>;

    /// Returns the texts of the top-k chunks ranked against the query
    /// embedding.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<String>, AppError>;
}

/// Flattens a structured résumé into text chunks for indexing. Every
/// non-empty field contributes: records join their fields, category maps
/// render as "category: items".
pub fn chunk_resume(cv: &StructuredCV) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut push = |text: String| {
        let text = text.trim().to_string();
        if !text.is_empty() {
            chunks.push(text);
        }
    };

    push(cv.name.clone());
    for email in &cv.emails {
        push(email.clone());
    }
    for phone in &cv.phones {
        push(phone.clone());
    }
    push(cv.branch.clone());
    push(cv.cgpa.clone());
    for edu in &cv.education {
        push(format!(
            "{} {} {} {}",
            edu.degree, edu.institution, edu.score, edu.year
        ));
    }
    for project in &cv.projects {
        push(format!("{} {} {}", project.title, project.date, project.summary));
    }
    for achievement in &cv.achievements {
        push(achievement.clone());
    }
    for (category, items) in &cv.skills {
        push(format!("{category}: {}", items.join(", ")));
    }
    for skill in &cv.extracted_skills {
        push(skill.clone());
    }
    for (category, items) in &cv.courses {
        push(format!("{category}: {}", items.join(", ")));
    }
    for item in &cv.extracurriculars {
        push(item.clone());
    }
    for item in &cv.positions {
        push(item.clone());
    }
    chunks
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
    id: String,
    values: &'a [f32],
    metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    metadata: Option<MatchMetadata>,
}

#[derive(Debug, Deserialize)]
struct MatchMetadata {
    text: Option<String>,
}

/// REST-backed vector index (Pinecone-style API surface).
#[derive(Clone)]
pub struct HttpVectorIndex {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpVectorIndex {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response, AppError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::VectorIndex(format!("Request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VectorIndex(format!(
                "{path} returned {status}: {body}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn upsert(
        &self,
        resume_id: &str,
        chunks: &[String],
        embeddings: &[Vec<f32>],
    ) -> Result<(), AppError> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::VectorIndex(format!(
                "{} chunks but {} embeddings for resume {resume_id}",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        let vectors: Vec<UpsertVector> = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (chunk, embedding))| UpsertVector {
                id: format!("{resume_id}-{i}"),
                values: embedding,
                metadata: json!({ "text": chunk, "resume_id": resume_id }),
            })
            .collect();

        self.post(
            "/vectors/upsert",
            json!({ "vectors": serde_json::to_value(&vectors).map_err(|e| {
                AppError::VectorIndex(format!("Failed to encode vectors: {e}"))
            })? }),
        )
        .await?;
        Ok(())
    }

    async fn delete_resume(&self, resume_id: &str) -> Result<(), AppError> {
        self.post(
            "/vectors/delete",
            json!({ "filter": { "resume_id": { "$eq": resume_id } } }),
        )
        .await?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<String>, AppError> {
        let response = self
            .post(
                "/query",
                json!({ "vector": embedding, "topK": top_k, "includeMetadata": true }),
            )
            .await?;

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::VectorIndex(format!("Malformed query response: {e}")))?;

        Ok(parsed
            .matches
            .into_iter()
            .filter_map(|m| m.metadata.and_then(|meta| meta.text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::{EducationEntry, Project};

    #[test]
    fn test_chunk_resume_covers_all_fields() {
        let mut cv = StructuredCV {
            name: "Asha Verma".to_string(),
            emails: vec!["asha@example.com".to_string()],
            branch: "CSE".to_string(),
            education: vec![EducationEntry {
                degree: "B.Tech".to_string(),
                institution: "IIT".to_string(),
                score: "8.4".to_string(),
                year: "2025".to_string(),
            }],
            projects: vec![Project {
                title: "Portal".to_string(),
                date: "2024".to_string(),
                summary: "built a portal".to_string(),
            }],
            achievements: vec!["won hackathon".to_string()],
            ..StructuredCV::default()
        };
        cv.skills
            .insert("languages".to_string(), vec!["Python".to_string()]);

        let chunks = chunk_resume(&cv);
        assert!(chunks.contains(&"Asha Verma".to_string()));
        assert!(chunks.contains(&"B.Tech IIT 8.4 2025".to_string()));
        assert!(chunks.contains(&"Portal 2024 built a portal".to_string()));
        assert!(chunks.contains(&"languages: Python".to_string()));
        assert!(chunks.contains(&"won hackathon".to_string()));
    }

    #[test]
    fn test_chunk_resume_skips_empty_fields() {
        let chunks = chunk_resume(&StructuredCV::default());
        assert!(chunks.is_empty());
    }
}
