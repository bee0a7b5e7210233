use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub recruiter_email: String,
    pub job_type: String,
    /// URL of the job-description PDF supplied by the upload collaborator.
    pub jd_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
