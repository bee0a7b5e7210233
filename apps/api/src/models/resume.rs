use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub student_email: String,
    pub resume_name: String,
    /// URL of the résumé PDF supplied by the upload collaborator.
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}
