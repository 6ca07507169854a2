//! Job entity model for the shared `jobs` table.

use canopy_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Job execution status, stored as TEXT.
///
/// Transitions are monotonic: `Pending` → `Running` → `Success` or
/// `Failed`. A job never re-enters `Pending` once claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Success,
    Failed,
}

/// A row from the `jobs` table.
///
/// `action` stays a plain string here: rows with unrecognized actions
/// exist (anything the dashboard writes) and must still round-trip so
/// the worker can record a descriptive failure for them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub action: String,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub log: Option<String>,
    pub error: Option<String>,
}
