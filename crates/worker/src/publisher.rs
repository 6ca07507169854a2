//! List publication: mirror a freshly built SMS list file into the
//! dashboard's tables.
//!
//! Runs only after a successful `build_sms_list` job. The row table is
//! replaced wholesale, the metadata record carries provenance
//! (`row_count`, the job id), and a bounded preview keeps the
//! dashboard's list view cheap.

use std::collections::HashMap;
use std::path::Path;

use canopy_db::models::NewSmsListRow;
use canopy_db::repositories::list_repo::{ListRepo, PREVIEW_MAX_ROWS};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::WorkerConfig;

/// CSV header → table column renames. Headers already in table form
/// pass through unchanged.
const HEADER_RENAMES: [(&str, &str); 6] = [
    ("Phone_Number", "phone_number"),
    ("Full_Name", "full_name"),
    ("Address", "address"),
    ("Source_Address", "source_address"),
    ("Lead_Type", "lead_type"),
    ("Resident_Type", "resident_type"),
];

/// Target table columns, in positional-fallback order.
const TABLE_COLUMNS: [&str; 6] = [
    "phone_number",
    "full_name",
    "address",
    "source_address",
    "lead_type",
    "resident_type",
];

/// How a publication attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("list file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("list file is malformed: {0}")]
    Csv(#[from] csv::Error),
    #[error("list tables update failed: {0}")]
    Db(#[from] sqlx::Error),
}

/// What a successful publication wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishStats {
    pub rows: usize,
    pub preview_rows: usize,
}

/// Publish the built list file for `job_id`.
///
/// Returns `Ok(None)` when the list file does not exist — the build
/// script decides whether to produce one, and its absence is not a
/// publication failure.
pub async fn publish_sms_list(
    pool: &PgPool,
    config: &WorkerConfig,
    job_id: Uuid,
) -> Result<Option<PublishStats>, PublishError> {
    let path = config.sms_list_path();
    if !path.exists() {
        return Ok(None);
    }

    let (rows, preview, skipped) = read_list_file(&path)?;
    if skipped > 0 {
        tracing::warn!(
            job_id = %job_id,
            skipped,
            "Skipped list records with no phone number",
        );
    }

    let inserted = ListRepo::replace_rows(pool, &rows).await?;
    let now = Utc::now();
    ListRepo::upsert_metadata(pool, inserted as i64, now, job_id).await?;
    ListRepo::upsert_preview(pool, &preview, now).await?;

    Ok(Some(PublishStats {
        rows: inserted,
        preview_rows: preview.len(),
    }))
}

/// Read the list file into insertable rows plus a capped preview of
/// the raw records under their original headers.
///
/// Records with no phone number are kept in the preview (it mirrors
/// the file as produced) but never inserted; the third element counts
/// how many were skipped that way.
fn read_list_file(
    path: &Path,
) -> Result<(Vec<NewSmsListRow>, Vec<serde_json::Value>, usize), PublishError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let columns = map_columns(&headers);

    let mut rows = Vec::new();
    let mut preview = Vec::new();
    let mut skipped = 0;
    for record in reader.records() {
        let record = record?;

        if preview.len() < PREVIEW_MAX_ROWS {
            let entry: serde_json::Map<String, serde_json::Value> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), json!(v)))
                .collect();
            preview.push(serde_json::Value::Object(entry));
        }

        let field = |column: &str| -> Option<String> {
            let idx = *columns.get(column)?;
            let value = record.get(idx)?.trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };
        let Some(phone_number) = field("phone_number") else {
            skipped += 1;
            continue;
        };
        rows.push(NewSmsListRow {
            phone_number,
            full_name: field("full_name"),
            address: field("address"),
            source_address: field("source_address"),
            lead_type: field("lead_type"),
            resident_type: field("resident_type"),
        });
    }

    Ok((rows, preview, skipped))
}

/// Map table columns to CSV field indexes.
///
/// Headers are matched through the rename table; if none of the known
/// headers are present at all, the first six columns are taken
/// positionally in table order.
fn map_columns(headers: &[String]) -> HashMap<String, usize> {
    let renames: HashMap<&str, &str> = HEADER_RENAMES.into_iter().collect();

    let mut columns = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        let normalized = renames.get(header.as_str()).copied().unwrap_or(header);
        if TABLE_COLUMNS.contains(&normalized) && !columns.contains_key(normalized) {
            columns.insert(normalized.to_string(), idx);
        }
    }

    if columns.is_empty() {
        for (idx, column) in TABLE_COLUMNS.iter().take(headers.len()).enumerate() {
            columns.insert(column.to_string(), idx);
        }
    }

    columns
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
