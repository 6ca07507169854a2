//! Repository for list publication: wholesale row replacement plus the
//! metadata and preview upserts.

use canopy_core::types::Timestamp;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::list::{ListMetadata, ListPreview, NewSmsListRow};

/// Fixed identifier of the published SMS campaign list.
pub const SMS_LIST_ID: &str = "sms_cell_list";

/// Display name stored in `list_metadata`.
pub const SMS_LIST_NAME: &str = "SMS campaign list";

/// Rows per INSERT statement. Bounded so a partial failure strands at
/// most one batch boundary and each statement stays within collaborator
/// batch-size limits.
pub const INSERT_BATCH_SIZE: usize = 100;

/// Maximum rows stored in a list preview.
pub const PREVIEW_MAX_ROWS: usize = 200;

/// Manages `sms_cell_list_rows`, `list_metadata`, and `list_preview`.
pub struct ListRepo;

impl ListRepo {
    /// Replace the entire published row set: delete everything, then
    /// reinsert `rows` in batches of [`INSERT_BATCH_SIZE`].
    ///
    /// Not transactional across batches: if batch K fails, batches
    /// 1..K-1 have already landed and the error is surfaced to the
    /// caller. Returns the number of rows inserted.
    pub async fn replace_rows(
        pool: &PgPool,
        rows: &[NewSmsListRow],
    ) -> Result<usize, sqlx::Error> {
        sqlx::query("DELETE FROM sms_cell_list_rows")
            .execute(pool)
            .await?;

        for batch in rows.chunks(INSERT_BATCH_SIZE) {
            let mut builder = QueryBuilder::new(
                "INSERT INTO sms_cell_list_rows \
                 (phone_number, full_name, address, source_address, lead_type, resident_type) ",
            );
            builder.push_values(batch, |mut b, row| {
                b.push_bind(&row.phone_number)
                    .push_bind(&row.full_name)
                    .push_bind(&row.address)
                    .push_bind(&row.source_address)
                    .push_bind(&row.lead_type)
                    .push_bind(&row.resident_type);
            });
            builder.build().execute(pool).await?;
        }

        Ok(rows.len())
    }

    /// Number of currently published rows.
    pub async fn count_rows(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sms_cell_list_rows")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Upsert the provenance record for the SMS list.
    pub async fn upsert_metadata(
        pool: &PgPool,
        row_count: i64,
        updated_at: Timestamp,
        updated_by_job_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO list_metadata \
             (id, name, list_type, source, source_identifier, row_count, last_updated_at, \
              updated_by_job_id) \
             VALUES ($1, $2, 'sms_cell', 'table', 'sms_cell_list_rows', $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 list_type = EXCLUDED.list_type, \
                 source = EXCLUDED.source, \
                 source_identifier = EXCLUDED.source_identifier, \
                 row_count = EXCLUDED.row_count, \
                 last_updated_at = EXCLUDED.last_updated_at, \
                 updated_by_job_id = EXCLUDED.updated_by_job_id",
        )
        .bind(SMS_LIST_ID)
        .bind(SMS_LIST_NAME)
        .bind(row_count)
        .bind(updated_at)
        .bind(updated_by_job_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Upsert the display preview for the SMS list.
    ///
    /// The [`PREVIEW_MAX_ROWS`] cap is enforced here so it holds for
    /// any caller, not just the publisher.
    pub async fn upsert_preview(
        pool: &PgPool,
        rows: &[serde_json::Value],
        updated_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        let capped = &rows[..rows.len().min(PREVIEW_MAX_ROWS)];
        sqlx::query(
            "INSERT INTO list_preview (list_id, rows, updated_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (list_id) DO UPDATE SET \
                 rows = EXCLUDED.rows, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(SMS_LIST_ID)
        .bind(serde_json::Value::Array(capped.to_vec()))
        .bind(updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch the SMS list metadata record.
    pub async fn get_metadata(pool: &PgPool) -> Result<Option<ListMetadata>, sqlx::Error> {
        sqlx::query_as::<_, ListMetadata>(
            "SELECT id, name, list_type, source, source_identifier, row_count, \
             last_updated_at, updated_by_job_id \
             FROM list_metadata WHERE id = $1",
        )
        .bind(SMS_LIST_ID)
        .fetch_optional(pool)
        .await
    }

    /// Fetch the SMS list preview record.
    pub async fn get_preview(pool: &PgPool) -> Result<Option<ListPreview>, sqlx::Error> {
        sqlx::query_as::<_, ListPreview>(
            "SELECT list_id, rows, updated_at FROM list_preview WHERE list_id = $1",
        )
        .bind(SMS_LIST_ID)
        .fetch_optional(pool)
        .await
    }
}
