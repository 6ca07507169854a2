//! List publication models: the published SMS list rows, their
//! metadata record, and the bounded preview.

use canopy_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Insert shape for one SMS list row.
#[derive(Debug, Clone, Default)]
pub struct NewSmsListRow {
    pub phone_number: String,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub source_address: Option<String>,
    pub lead_type: Option<String>,
    pub resident_type: Option<String>,
}

/// Provenance record for a published list, keyed by a fixed list id.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ListMetadata {
    pub id: String,
    pub name: String,
    pub list_type: String,
    pub source: String,
    pub source_identifier: Option<String>,
    pub row_count: Option<i64>,
    pub last_updated_at: Option<Timestamp>,
    pub updated_by_job_id: Option<Uuid>,
}

/// Bounded preview of a published list for cheap display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ListPreview {
    pub list_id: String,
    pub rows: serde_json::Value,
    pub updated_at: Option<Timestamp>,
}
