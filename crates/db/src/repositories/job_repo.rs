//! Repository for the shared `jobs` table.
//!
//! Claiming is the one correctness-critical operation here: multiple
//! worker processes poll the same table, and [`JobRepo::try_claim`] is
//! the single compare-and-swap that guarantees at most one of them
//! transitions a given job from `pending` to `running`.

use canopy_core::action::JobAction;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job::{Job, JobStatus};

/// Column list for `jobs` queries.
const COLUMNS: &str =
    "id, action, payload, status, created_at, started_at, finished_at, log, error";

/// Provides claim/query/update operations for queued jobs.
pub struct JobRepo;

impl JobRepo {
    /// Enqueue a new pending job. Returns the stored row.
    pub async fn submit(
        pool: &PgPool,
        action: JobAction,
        payload: &serde_json::Value,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (action, payload, status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(action.as_str())
            .bind(payload)
            .bind(JobStatus::Pending)
            .fetch_one(pool)
            .await
    }

    /// Enqueue a job with raw action text, bypassing the known-action
    /// enum. Exists so tests can stage rows the dashboard could write
    /// with action strings this worker does not recognize.
    pub async fn submit_raw(
        pool: &PgPool,
        action: &str,
        payload: &serde_json::Value,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (action, payload, status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(action)
            .bind(payload)
            .bind(JobStatus::Pending)
            .fetch_one(pool)
            .await
    }

    /// Return the single oldest pending job, or `None`.
    pub async fn find_oldest_pending(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE status = $1 \
             ORDER BY created_at ASC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Pending)
            .fetch_optional(pool)
            .await
    }

    /// Atomically transition a job from `pending` to `running`.
    ///
    /// One conditional UPDATE, checked via `rows_affected`: if a
    /// competing worker claimed the job first (or it already reached a
    /// terminal state) no row matches and this returns `false` without
    /// mutating anything. Never read-then-write here.
    pub async fn try_claim(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET status = $1, started_at = NOW() \
             WHERE id = $2 AND status = $3",
        )
        .bind(JobStatus::Running)
        .bind(id)
        .bind(JobStatus::Pending)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Unconditional terminal write: status, `finished_at`, and the
    /// outcome text. A success stores `log` and clears `error`; a
    /// failure stores `error` and whatever output the run produced.
    pub async fn record_result(
        pool: &PgPool,
        id: Uuid,
        success: bool,
        log: &str,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        let status = if success {
            JobStatus::Success
        } else {
            JobStatus::Failed
        };
        sqlx::query(
            "UPDATE jobs SET status = $1, finished_at = NOW(), log = $2, error = $3 \
             WHERE id = $4",
        )
        .bind(status)
        .bind(non_empty(log))
        .bind(if success { None } else { non_empty(error) })
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch a job by id.
    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
