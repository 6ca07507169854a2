//! End-to-end poll cycle tests against a live database, with the
//! campaign scripts stubbed by shell scripts in a temporary work root.
//!
//! `test_config` swaps the Python interpreter for `sh`, so the stub
//! scripts are plain shell despite their `.py` names.

use canopy_core::action::JobAction;
use canopy_db::models::JobStatus;
use canopy_db::repositories::list_repo::ListRepo;
use canopy_db::repositories::JobRepo;
use canopy_worker::config::{test_config, WorkerConfig};
use canopy_worker::exporter::export_snapshots;
use canopy_worker::poll::{run_cycle, CycleOutcome};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;

fn shell_config(dir: &TempDir) -> WorkerConfig {
    let mut config = test_config(dir.path());
    config.python_bin = "sh".into();
    config
}

/// Install a stub campaign script under the work root.
fn install_script(dir: &TempDir, rel_path: &str, body: &str) {
    let path = dir.path().join(rel_path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

async fn seed_opt_out(pool: &PgPool, phone: &str, source: Option<&str>) {
    sqlx::query("INSERT INTO opt_outs (phone_number, date, source) VALUES ($1, '2026-01-05', $2)")
        .bind(phone)
        .bind(source)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_warm_lead(pool: &PgPool, phone: &str) {
    sqlx::query("INSERT INTO warm_leads (phone_number) VALUES ($1)")
        .bind(phone)
        .execute(pool)
        .await
        .unwrap();
}

// -- exporter ----------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn exporter_writes_both_snapshots(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);

    seed_opt_out(&pool, "+16125550001", Some("manual")).await;
    seed_opt_out(&pool, "+16125550002", None).await;
    seed_warm_lead(&pool, "+16125550003").await;

    let stats = export_snapshots(&pool, &config).await.unwrap();
    assert_eq!(stats.opt_outs, 2);
    assert_eq!(stats.warm_leads, 1);

    let opt_outs = std::fs::read_to_string(config.opt_outs_path()).unwrap();
    let mut lines = opt_outs.lines();
    assert_eq!(lines.next(), Some("Phone_Number,Date,Source"));
    assert_eq!(lines.next(), Some("+16125550001,2026-01-05,manual"));
    // Missing source falls back to the inbound handler's label.
    assert_eq!(lines.next(), Some("+16125550002,2026-01-05,SMS reply"));

    let warm = std::fs::read_to_string(config.warm_leads_path()).unwrap();
    assert_eq!(warm, "phone_number\n+16125550003\n");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn exporter_writes_headers_when_tables_are_empty(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);

    let stats = export_snapshots(&pool, &config).await.unwrap();
    assert_eq!(stats.opt_outs, 0);
    assert_eq!(stats.warm_leads, 0);

    assert_eq!(
        std::fs::read_to_string(config.opt_outs_path()).unwrap(),
        "Phone_Number,Date,Source\n"
    );
    assert_eq!(
        std::fs::read_to_string(config.warm_leads_path()).unwrap(),
        "phone_number\n"
    );
}

// -- poll cycle --------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_queue_is_an_idle_cycle(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let outcome = run_cycle(&pool, &shell_config(&dir)).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Idle);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_action_fails_without_spawning(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);
    let job = JobRepo::submit_raw(&pool, "make_coffee", &json!({}))
        .await
        .unwrap();

    let outcome = run_cycle(&pool, &config).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Ran);

    let done = JobRepo::get(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Failed);
    assert_eq!(done.error.as_deref(), Some("Unknown action: make_coffee"));
    assert!(done.finished_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn run_cbc_without_script_fails_as_unavailable(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);
    let job = JobRepo::submit(&pool, JobAction::RunCbc, &json!({}))
        .await
        .unwrap();

    run_cycle(&pool, &config).await.unwrap();

    let done = JobRepo::get(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Failed);
    assert!(done.error.unwrap().starts_with("Action unavailable"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn successful_run_records_stdout_as_log(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);
    install_script(&dir, "parse_quality_leads.py", "echo parsed 7 leads\n");

    let job = JobRepo::submit(&pool, JobAction::ParseQualityLeads, &json!({}))
        .await
        .unwrap();

    let outcome = run_cycle(&pool, &config).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Ran);

    let done = JobRepo::get(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Success);
    assert_eq!(done.log.as_deref(), Some("parsed 7 leads"));
    assert_eq!(done.error, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn timed_out_run_records_the_bound(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let mut config = shell_config(&dir);
    config.job_timeout = std::time::Duration::from_secs(1);
    install_script(&dir, "parse_quality_leads.py", "sleep 30\n");

    let job = JobRepo::submit(&pool, JobAction::ParseQualityLeads, &json!({}))
        .await
        .unwrap();

    run_cycle(&pool, &config).await.unwrap();

    let done = JobRepo::get(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Failed);
    assert_eq!(done.error.as_deref(), Some("Job timed out after 1s"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn build_sms_list_publishes_the_produced_list(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);
    // Stub build script: ignores its flags and writes a two-row list
    // into the work root, as the real one does.
    install_script(
        &dir,
        "scripts/build_sms_list.py",
        "printf 'Phone_Number,Full_Name,Lead_Type\\n\
         +16125550010,Pat Doe,Absentee\\n\
         +16125550011,Sam Oak,Lives at\\n' > sms_cell_list.csv\n",
    );
    seed_opt_out(&pool, "+16125550099", None).await;

    let job = JobRepo::submit(&pool, JobAction::BuildSmsList, &json!({"state": "MN"}))
        .await
        .unwrap();

    run_cycle(&pool, &config).await.unwrap();

    let done = JobRepo::get(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Success);

    // Snapshots were exported before the script ran.
    assert!(config.opt_outs_path().exists());
    assert!(config.warm_leads_path().exists());

    // Full replace landed, with provenance and preview.
    assert_eq!(ListRepo::count_rows(&pool).await.unwrap(), 2);
    let meta = ListRepo::get_metadata(&pool).await.unwrap().unwrap();
    assert_eq!(meta.row_count, Some(2));
    assert_eq!(meta.updated_by_job_id, Some(job.id));
    let preview = ListRepo::get_preview(&pool).await.unwrap().unwrap();
    assert_eq!(preview.rows.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn build_without_list_file_stays_success(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);
    install_script(&dir, "scripts/build_sms_list.py", "echo no rows matched\n");

    let job = JobRepo::submit(&pool, JobAction::BuildSmsList, &json!({}))
        .await
        .unwrap();

    run_cycle(&pool, &config).await.unwrap();

    let done = JobRepo::get(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Success);
    assert!(ListRepo::get_metadata(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_build_skips_publication(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);
    install_script(&dir, "scripts/build_sms_list.py", "exit 3\n");

    let job = JobRepo::submit(&pool, JobAction::BuildSmsList, &json!({}))
        .await
        .unwrap();

    run_cycle(&pool, &config).await.unwrap();

    let done = JobRepo::get(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Failed);
    assert_eq!(done.error.as_deref(), Some("Exit code 3"));
    assert_eq!(ListRepo::count_rows(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn oldest_pending_job_runs_first(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = shell_config(&dir);
    install_script(&dir, "parse_quality_leads.py", "echo ok\n");

    let older = JobRepo::submit(&pool, JobAction::ParseQualityLeads, &json!({}))
        .await
        .unwrap();
    let newer = JobRepo::submit_raw(&pool, "make_coffee", &json!({}))
        .await
        .unwrap();
    sqlx::query("UPDATE jobs SET created_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(older.id)
        .execute(&pool)
        .await
        .unwrap();

    run_cycle(&pool, &config).await.unwrap();

    let first = JobRepo::get(&pool, older.id).await.unwrap().unwrap();
    let second = JobRepo::get(&pool, newer.id).await.unwrap().unwrap();
    assert_eq!(first.status, JobStatus::Success);
    assert_eq!(second.status, JobStatus::Pending);
}
