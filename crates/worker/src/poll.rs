//! The poll loop: claim → export → dispatch → publish.
//!
//! Single consumer per process; horizontal scaling is multiple worker
//! processes against the same job table, serialized per job by the
//! claim CAS in [`JobRepo::try_claim`]. Every failure inside one cycle
//! is caught at the cycle boundary and logged — a single job can never
//! take the worker down. The loop ends only on the shutdown signal,
//! checked between cycles; a running subprocess is never cancelled
//! mid-flight.

use canopy_core::action::JobAction;
use canopy_core::error::ResolveError;
use canopy_core::exec;
use canopy_core::payload::ActionPayload;
use canopy_core::registry;
use canopy_db::repositories::JobRepo;
use sqlx::PgPool;
use tokio::sync::watch;

use crate::config::WorkerConfig;
use crate::exporter;
use crate::publisher;

/// What one pass over the job table did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No pending job; caller should sleep the poll interval.
    Idle,
    /// A competing worker claimed the candidate first; poll again
    /// immediately.
    ClaimLost,
    /// A job was claimed and driven to a terminal status.
    Ran,
}

/// Run the poll loop until `shutdown` flips to `true`.
pub async fn run(pool: PgPool, config: WorkerConfig, mut shutdown: watch::Receiver<bool>) {
    tracing::info!(
        poll_interval_secs = config.poll_interval.as_secs(),
        job_timeout_secs = config.job_timeout.as_secs(),
        work_root = %config.work_root.display(),
        "Worker started; polling for pending jobs",
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        match run_cycle(&pool, &config).await {
            Ok(CycleOutcome::Ran) | Ok(CycleOutcome::ClaimLost) => {
                // More work may be waiting; poll again right away.
            }
            Ok(CycleOutcome::Idle) => idle_sleep(&config, &mut shutdown).await,
            Err(e) => {
                tracing::error!(error = %e, "Poll cycle failed");
                idle_sleep(&config, &mut shutdown).await;
            }
        }
    }

    tracing::info!("Worker stopped");
}

/// Sleep the poll interval, waking early on shutdown.
async fn idle_sleep(config: &WorkerConfig, shutdown: &mut watch::Receiver<bool>) {
    tokio::select! {
        _ = tokio::time::sleep(config.poll_interval) => {}
        _ = shutdown.changed() => {}
    }
}

/// One pass: claim at most one job and drive it to a terminal status.
///
/// Only job-store errors propagate (to be logged at the loop
/// boundary); resolution, execution, export, and publish failures are
/// all folded into the job's recorded outcome or the operator log.
pub async fn run_cycle(pool: &PgPool, config: &WorkerConfig) -> Result<CycleOutcome, sqlx::Error> {
    let Some(job) = JobRepo::find_oldest_pending(pool).await? else {
        return Ok(CycleOutcome::Idle);
    };

    if !JobRepo::try_claim(pool, job.id).await? {
        tracing::debug!(job_id = %job.id, "Lost claim race to a competing worker");
        return Ok(CycleOutcome::ClaimLost);
    }

    tracing::info!(job_id = %job.id, action = %job.action, "Running job");

    let Some(action) = JobAction::parse(&job.action) else {
        let err = ResolveError::UnknownAction(job.action.clone());
        tracing::warn!(job_id = %job.id, action = %job.action, "Job has unknown action");
        JobRepo::record_result(pool, job.id, false, "", &err.to_string()).await?;
        return Ok(CycleOutcome::Ran);
    };

    if action.requires_snapshots() {
        match exporter::export_snapshots(pool, config).await {
            Ok(stats) => tracing::debug!(
                job_id = %job.id,
                opt_outs = stats.opt_outs,
                warm_leads = stats.warm_leads,
                "Exported exclusion/consent snapshots",
            ),
            // The job still runs, against header-only snapshot files.
            Err(e) => tracing::error!(
                job_id = %job.id,
                error = %e,
                "Snapshot export FAILED; running with empty exclusion/consent data — \
                 opted-out numbers are not excluded this run",
            ),
        }
    }

    let payload = ActionPayload::decode(action, &job.payload);
    let command = match registry::resolve(&payload, &config.script_catalog()) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(job_id = %job.id, action = %job.action, error = %e, "Cannot resolve job");
            JobRepo::record_result(pool, job.id, false, "", &e.to_string()).await?;
            return Ok(CycleOutcome::Ran);
        }
    };

    tracing::debug!(job_id = %job.id, program = %command.program, args = ?command.args, "Dispatching");
    let outcome = exec::run_command(&command, &config.work_root, config.job_timeout).await;

    JobRepo::record_result(pool, job.id, outcome.success, &outcome.stdout, &outcome.stderr)
        .await?;
    tracing::info!(job_id = %job.id, success = outcome.success, "Job finished");

    if action == JobAction::BuildSmsList && outcome.success {
        match publisher::publish_sms_list(pool, config, job.id).await {
            Ok(Some(stats)) => tracing::info!(
                job_id = %job.id,
                rows = stats.rows,
                preview_rows = stats.preview_rows,
                "Published SMS list",
            ),
            Ok(None) => tracing::warn!(
                job_id = %job.id,
                "Build succeeded but produced no list file; nothing published",
            ),
            // The job stays `success`; publication is a separate step.
            Err(e) => tracing::error!(
                job_id = %job.id,
                error = %e,
                "List publish failed; job remains recorded as success",
            ),
        }
    }

    Ok(CycleOutcome::Ran)
}
