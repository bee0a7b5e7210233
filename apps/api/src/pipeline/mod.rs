//! Evaluation pipeline — per-candidate orchestration and bounded batch runs.
//!
//! Each (résumé, job) pair is independent: extraction → eligibility →
//! scoring → feedback blend, with every outcome isolated so one candidate's
//! failure never aborts a batch. Parsed documents are cached twice: as JSONB
//! rows keyed by entity id, and in-run keyed by a content hash of the
//! fetched PDF bytes, so re-runs are idempotent and never re-parse the same
//! bytes.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cv::{CvBuilder, StructuredCV};
use crate::embedding::sentence::SentenceEncoder;
use crate::embedding::skill_space::SkillSpace;
use crate::errors::AppError;
use crate::extract::pdf;
use crate::feedback::blend::{blend_feedback, CombinedEvaluation};
use crate::feedback::parser::parse_feedback;
use crate::feedback::prompts::{build_feedback_prompt, FEEDBACK_SYSTEM};
use crate::jd::{JdBuilder, StructuredJD};
use crate::llm_client::LlmClient;
use crate::models::application::ApplicationRow;
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;
use crate::scoring::composite::{evaluate_cv, ScoreBreakdown};
use crate::search::{chunk_resume, VectorIndex};
use crate::state::AppState;

/// How many ranked résumé chunks feed the feedback prompt.
const FEEDBACK_TOP_K: usize = 5;

/// Per-item outcome of a parse or evaluation batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Batch evaluation report.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub evaluated: usize,
    pub results: Vec<BatchItem>,
}

/// One evaluation run's worth of shared services and caches. Constructed per
/// invocation; the parse caches live and die with it.
pub struct Pipeline {
    db: PgPool,
    llm: LlmClient,
    space: Arc<SkillSpace>,
    encoder: Arc<dyn SentenceEncoder>,
    index: Arc<dyn VectorIndex>,
    cv_builder: Arc<CvBuilder>,
    jd_builder: Arc<JdBuilder>,
    http: reqwest::Client,
    /// Bounds CPU-heavy extraction/parsing work.
    cpu_permits: Arc<Semaphore>,
    /// Separate, smaller bound for narrative-feedback calls.
    llm_permits: Arc<Semaphore>,
    jd_cache: Mutex<HashMap<u64, Arc<StructuredJD>>>,
    cv_cache: Mutex<HashMap<u64, Arc<StructuredCV>>>,
}

impl Pipeline {
    pub fn new(state: &AppState) -> Arc<Self> {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Arc::new(Self {
            db: state.db.clone(),
            llm: state.llm.clone(),
            space: state.skill_space.clone(),
            encoder: state.encoder.clone(),
            index: state.index.clone(),
            cv_builder: Arc::new(CvBuilder::new()),
            jd_builder: Arc::new(JdBuilder::new(state.skill_space.clone())),
            http: reqwest::Client::new(),
            cpu_permits: Arc::new(Semaphore::new(parallelism)),
            llm_permits: Arc::new(Semaphore::new(state.config.llm_concurrency.max(1))),
            jd_cache: Mutex::new(HashMap::new()),
            cv_cache: Mutex::new(HashMap::new()),
        })
    }

    // ────────────────────────────────────────────────────────────────────
    // Document parsing (stored + in-run cached)
    // ────────────────────────────────────────────────────────────────────

    /// Returns the structured JD for a job, parsing and storing it if
    /// nothing is persisted yet.
    pub async fn parsed_jd(&self, job: &JobRow) -> Result<Arc<StructuredJD>, AppError> {
        if let Some(data) =
            sqlx::query_scalar::<_, serde_json::Value>("SELECT data FROM parsed_jds WHERE job_id = $1")
                .bind(job.id)
                .fetch_optional(&self.db)
                .await?
        {
            let jd: StructuredJD = serde_json::from_value(data)
                .map_err(|e| AppError::Internal(anyhow!("Stored JD for {} is invalid: {e}", job.id)))?;
            return Ok(Arc::new(jd));
        }

        let bytes = pdf::fetch_document(&self.http, &job.jd_url).await?;
        let key = content_hash(&bytes);

        let cached = self.jd_cache.lock().expect("jd cache poisoned").get(&key).cloned();
        let jd = match cached {
            Some(jd) => jd,
            None => {
                let permit = self.cpu_permits.acquire().await.map_err(closed_pool)?;
                let builder = self.jd_builder.clone();
                let jd = tokio::task::spawn_blocking(move || -> Result<StructuredJD, AppError> {
                    let text = pdf::extract_text(&bytes)?;
                    Ok(builder.build(&text))
                })
                .await
                .map_err(|e| AppError::Internal(anyhow!("JD parse task panicked: {e}")))??;
                drop(permit);

                let jd = Arc::new(jd);
                self.jd_cache
                    .lock()
                    .expect("jd cache poisoned")
                    .insert(key, jd.clone());
                jd
            }
        };

        let data = serde_json::to_value(&*jd)
            .map_err(|e| AppError::Internal(anyhow!("Failed to encode JD: {e}")))?;
        sqlx::query(
            "INSERT INTO parsed_jds (job_id, data) VALUES ($1, $2)
             ON CONFLICT (job_id) DO UPDATE SET data = EXCLUDED.data, created_at = now()",
        )
        .bind(job.id)
        .bind(data)
        .execute(&self.db)
        .await?;

        Ok(jd)
    }

    /// Returns the structured CV for a résumé, parsing and storing it if
    /// nothing is persisted yet.
    pub async fn parsed_cv(&self, resume: &ResumeRow) -> Result<Arc<StructuredCV>, AppError> {
        if let Some(data) =
            sqlx::query_scalar::<_, serde_json::Value>("SELECT data FROM parsed_cvs WHERE resume_id = $1")
                .bind(resume.id)
                .fetch_optional(&self.db)
                .await?
        {
            let cv: StructuredCV = serde_json::from_value(data).map_err(|e| {
                AppError::Internal(anyhow!("Stored CV for {} is invalid: {e}", resume.id))
            })?;
            return Ok(Arc::new(cv));
        }

        let bytes = pdf::fetch_document(&self.http, &resume.url).await?;
        let key = content_hash(&bytes);

        let cached = self.cv_cache.lock().expect("cv cache poisoned").get(&key).cloned();
        let cv = match cached {
            Some(cv) => cv,
            None => {
                let permit = self.cpu_permits.acquire().await.map_err(closed_pool)?;
                let builder = self.cv_builder.clone();
                let cv = tokio::task::spawn_blocking(move || -> Result<StructuredCV, AppError> {
                    let text = pdf::extract_text(&bytes)?;
                    Ok(builder.build(&text))
                })
                .await
                .map_err(|e| AppError::Internal(anyhow!("CV parse task panicked: {e}")))??;
                drop(permit);

                let cv = Arc::new(cv);
                self.cv_cache
                    .lock()
                    .expect("cv cache poisoned")
                    .insert(key, cv.clone());
                cv
            }
        };

        let data = serde_json::to_value(&*cv)
            .map_err(|e| AppError::Internal(anyhow!("Failed to encode CV: {e}")))?;
        sqlx::query(
            "INSERT INTO parsed_cvs (resume_id, data) VALUES ($1, $2)
             ON CONFLICT (resume_id) DO UPDATE SET data = EXCLUDED.data, created_at = now()",
        )
        .bind(resume.id)
        .bind(data)
        .execute(&self.db)
        .await?;

        Ok(cv)
    }

    /// Parses every active job's JD concurrently. Per-item failures are
    /// recorded; the batch never aborts.
    pub async fn parse_all_jds(self: &Arc<Self>) -> Result<Vec<BatchItem>, AppError> {
        let jobs: Vec<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE is_active")
            .fetch_all(&self.db)
            .await?;

        let mut tasks = JoinSet::new();
        for job in jobs {
            let pipeline = self.clone();
            tasks.spawn(async move {
                let outcome = pipeline.parsed_jd(&job).await;
                (job.id, outcome.map(|_| ()))
            });
        }
        Ok(collect_batch(tasks).await)
    }

    /// Parses every résumé concurrently, mirroring `parse_all_jds`.
    pub async fn parse_all_cvs(self: &Arc<Self>) -> Result<Vec<BatchItem>, AppError> {
        let resumes: Vec<ResumeRow> = sqlx::query_as("SELECT * FROM resumes")
            .fetch_all(&self.db)
            .await?;

        let mut tasks = JoinSet::new();
        for resume in resumes {
            let pipeline = self.clone();
            tasks.spawn(async move {
                let outcome = pipeline.parsed_cv(&resume).await;
                (resume.id, outcome.map(|_| ()))
            });
        }
        Ok(collect_batch(tasks).await)
    }

    // ────────────────────────────────────────────────────────────────────
    // Evaluation
    // ────────────────────────────────────────────────────────────────────

    /// Quantitative evaluation of one application: eligibility and the
    /// similarity signals, persisted onto the application row.
    pub async fn evaluate_application(&self, application_id: Uuid) -> Result<ScoreBreakdown, AppError> {
        let app = self.application(application_id).await?;
        let (job, resume) = self.counterparts(&app).await?;

        let jd = self.parsed_jd(&job).await?;
        let cv = self.parsed_cv(&resume).await?;
        let breakdown = evaluate_cv(&self.space, self.encoder.as_ref(), &jd, &cv).await?;

        sqlx::query(
            "UPDATE applications
             SET score = $2, feedback = $3, status = 'evaluated', reviewed_at = now()
             WHERE id = $1",
        )
        .bind(app.id)
        .bind(breakdown.final_score)
        .bind(&breakdown.eligibility_reason)
        .execute(&self.db)
        .await?;

        Ok(breakdown)
    }

    /// Full evaluation of one application: quantitative signals, résumé
    /// re-indexing, the narrative-feedback call, and the blended score.
    pub async fn evaluate_with_feedback(
        &self,
        app: &ApplicationRow,
    ) -> Result<CombinedEvaluation, AppError> {
        let (job, resume) = self.counterparts(app).await?;
        let jd = self.parsed_jd(&job).await?;
        let cv = self.parsed_cv(&resume).await?;

        let breakdown = evaluate_cv(&self.space, self.encoder.as_ref(), &jd, &cv).await?;

        // Re-index the résumé: stale entries out, fresh chunks in.
        let resume_key = resume.id.to_string();
        let chunks = chunk_resume(&cv);
        self.index.delete_resume(&resume_key).await?;
        let embeddings = self.encoder.encode(&chunks).await?;
        self.index.upsert(&resume_key, &chunks, &embeddings).await?;

        let jd_query = build_jd_query(&jd);
        let query_embedding = self
            .encoder
            .encode(std::slice::from_ref(&jd_query))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("Encoder returned no query vector".to_string()))?;
        let top_chunks = self.index.query(&query_embedding, FEEDBACK_TOP_K).await?;

        let prompt = build_feedback_prompt(&jd_query, &chunks.join("\n"), &top_chunks.join("\n"));
        let permit = self.llm_permits.acquire().await.map_err(closed_pool)?;
        let response = self
            .llm
            .call_text(&prompt, FEEDBACK_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;
        drop(permit);

        let combined = blend_feedback(&breakdown, &parse_feedback(&response));
        self.persist_combined(app.id, &combined).await?;
        Ok(combined)
    }

    /// Evaluates every application without a score, each pair's pipeline
    /// running concurrently. Missing counterpart records skip the pair;
    /// failures are recorded per item and the batch continues.
    pub async fn evaluate_pending_with_feedback(self: &Arc<Self>) -> Result<BatchReport, AppError> {
        let pending: Vec<ApplicationRow> =
            sqlx::query_as("SELECT * FROM applications WHERE score IS NULL")
                .fetch_all(&self.db)
                .await?;

        info!("Evaluating {} pending applications", pending.len());

        let mut tasks = JoinSet::new();
        for app in pending {
            let pipeline = self.clone();
            tasks.spawn(async move {
                let outcome = pipeline.evaluate_with_feedback(&app).await;
                (app.id, outcome.map(|_| ()))
            });
        }

        let results = collect_batch(tasks).await;
        let evaluated = results.iter().filter(|r| r.status == "success").count();
        Ok(BatchReport { evaluated, results })
    }

    async fn application(&self, id: Uuid) -> Result<ApplicationRow, AppError> {
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
    }

    /// The job and résumé rows backing an application. Absence is a skip
    /// condition, surfaced as NotFound.
    async fn counterparts(&self, app: &ApplicationRow) -> Result<(JobRow, ResumeRow), AppError> {
        let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(app.job_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", app.job_id)))?;
        let resume = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(app.resume_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", app.resume_id)))?;
        Ok((job, resume))
    }

    async fn persist_combined(
        &self,
        application_id: Uuid,
        combined: &CombinedEvaluation,
    ) -> Result<(), AppError> {
        match combined.combined_score {
            Some(score) => {
                sqlx::query(
                    "UPDATE applications
                     SET score = $2, feedback = $3, strengths = $4, weaknesses = $5,
                         status = 'evaluated', reviewed_at = now()
                     WHERE id = $1",
                )
                .bind(application_id)
                .bind(score)
                .bind(&combined.feedback)
                .bind(&combined.strengths)
                .bind(&combined.weaknesses)
                .execute(&self.db)
                .await?;
            }
            // Unparseable feedback: store the raw text, leave the
            // quantitative score untouched.
            None => {
                sqlx::query("UPDATE applications SET feedback = $2 WHERE id = $1")
                    .bind(application_id)
                    .bind(&combined.feedback)
                    .execute(&self.db)
                    .await?;
            }
        }
        Ok(())
    }
}

/// Drains a JoinSet of (id, outcome) pairs into batch items. NotFound maps
/// to "skipped" (missing counterpart record), other errors to "error".
async fn collect_batch(mut tasks: JoinSet<(Uuid, Result<(), AppError>)>) -> Vec<BatchItem> {
    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((id, Ok(()))) => results.push(BatchItem {
                id,
                status: "success".to_string(),
                error: None,
            }),
            Ok((id, Err(AppError::NotFound(msg)))) => {
                results.push(BatchItem {
                    id,
                    status: "skipped".to_string(),
                    error: Some(msg),
                });
            }
            Ok((id, Err(e))) => {
                warn!("Evaluation of {id} failed: {e}");
                results.push(BatchItem {
                    id,
                    status: "error".to_string(),
                    error: Some(e.to_string()),
                });
            }
            Err(join_error) => {
                warn!("Evaluation task panicked: {join_error}");
            }
        }
    }
    results
}

/// Query text sent to the vector index and the feedback prompt: the JD's
/// role, skills, inferred facts, and domain.
fn build_jd_query(jd: &StructuredJD) -> String {
    [
        jd.job_role.clone(),
        jd.required_skills.join(" "),
        jd.responsibilities.join(" "),
        jd.preferred_skills.join(" "),
        jd.branches.join(" "),
        jd.technologies.join(" "),
        jd.non_tech_skills.join(" "),
        jd.domain.clone(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(bytes);
    hasher.finish()
}

fn closed_pool(e: tokio::sync::AcquireError) -> AppError {
    AppError::Internal(anyhow!("Worker pool closed: {e}"))
}
