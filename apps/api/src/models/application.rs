use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One (student, job, résumé) application. Evaluation writes score and
/// feedback in place; re-evaluation simply overwrites.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub student_email: String,
    pub job_id: Uuid,
    pub resume_id: Uuid,
    pub status: String,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub strengths: Option<Vec<String>>,
    pub weaknesses: Option<Vec<String>>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}
