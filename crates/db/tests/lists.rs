//! List publication tests: wholesale replacement, batching, and the
//! bounded preview.

use canopy_db::models::NewSmsListRow;
use canopy_db::repositories::list_repo::{ListRepo, PREVIEW_MAX_ROWS, SMS_LIST_ID};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

fn rows(n: usize) -> Vec<NewSmsListRow> {
    (0..n)
        .map(|i| NewSmsListRow {
            phone_number: format!("+1612555{i:04}"),
            full_name: Some(format!("Lead {i}")),
            address: None,
            source_address: None,
            lead_type: Some("Absentee".into()),
            resident_type: None,
        })
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn replace_rows_is_full_replace_not_append(pool: PgPool) {
    ListRepo::replace_rows(&pool, &rows(5)).await.unwrap();
    assert_eq!(ListRepo::count_rows(&pool).await.unwrap(), 5);

    ListRepo::replace_rows(&pool, &rows(3)).await.unwrap();
    assert_eq!(ListRepo::count_rows(&pool).await.unwrap(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn replace_rows_spans_multiple_batches(pool: PgPool) {
    // 250 rows forces three INSERT batches at the 100-row bound.
    let inserted = ListRepo::replace_rows(&pool, &rows(250)).await.unwrap();
    assert_eq!(inserted, 250);
    assert_eq!(ListRepo::count_rows(&pool).await.unwrap(), 250);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn replace_rows_with_empty_set_clears_table(pool: PgPool) {
    ListRepo::replace_rows(&pool, &rows(4)).await.unwrap();
    ListRepo::replace_rows(&pool, &[]).await.unwrap();
    assert_eq!(ListRepo::count_rows(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn metadata_upsert_overwrites_previous_run(pool: PgPool) {
    let first_job = Uuid::new_v4();
    let second_job = Uuid::new_v4();

    ListRepo::upsert_metadata(&pool, 120, Utc::now(), first_job)
        .await
        .unwrap();
    ListRepo::upsert_metadata(&pool, 80, Utc::now(), second_job)
        .await
        .unwrap();

    let meta = ListRepo::get_metadata(&pool).await.unwrap().unwrap();
    assert_eq!(meta.id, SMS_LIST_ID);
    assert_eq!(meta.row_count, Some(80));
    assert_eq!(meta.updated_by_job_id, Some(second_job));
    assert_eq!(meta.list_type, "sms_cell");
    assert_eq!(meta.source_identifier.as_deref(), Some("sms_cell_list_rows"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn preview_is_capped(pool: PgPool) {
    let preview_rows: Vec<serde_json::Value> = (0..250)
        .map(|i| json!({"Phone_Number": format!("+1612555{i:04}")}))
        .collect();

    ListRepo::upsert_preview(&pool, &preview_rows, Utc::now())
        .await
        .unwrap();

    let preview = ListRepo::get_preview(&pool).await.unwrap().unwrap();
    let stored = preview.rows.as_array().unwrap();
    assert_eq!(stored.len(), PREVIEW_MAX_ROWS);
    assert_eq!(stored[0]["Phone_Number"], "+16125550000");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn small_preview_keeps_every_row(pool: PgPool) {
    let preview_rows: Vec<serde_json::Value> =
        (0..7).map(|i| json!({"Full_Name": format!("Lead {i}")})).collect();

    ListRepo::upsert_preview(&pool, &preview_rows, Utc::now())
        .await
        .unwrap();
    // Second upsert replaces, never appends.
    ListRepo::upsert_preview(&pool, &preview_rows, Utc::now())
        .await
        .unwrap();

    let preview = ListRepo::get_preview(&pool).await.unwrap().unwrap();
    assert_eq!(preview.rows.as_array().unwrap().len(), 7);
}
