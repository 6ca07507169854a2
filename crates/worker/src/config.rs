//! Worker configuration.
//!
//! Loaded from environment variables exactly once at process start and
//! passed by reference into the poll loop, exporter, and dispatcher —
//! nothing else in the worker reads ambient environment state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use canopy_core::registry::ScriptCatalog;

/// Snapshot of phone numbers that must never be messaged.
pub const OPT_OUTS_FILE: &str = "_worker_opt_outs.csv";

/// Snapshot of consented warm-lead phone numbers.
pub const WARM_LEADS_FILE: &str = "_worker_warm_leads.csv";

/// List file produced by a successful `build_sms_list` run.
pub const SMS_LIST_FILE: &str = "sms_cell_list.csv";

/// External CBC wrapper script, optional on disk.
pub const RUN_CBC_SCRIPT: &str = "run_cbc_only.sh";

/// Worker configuration loaded from environment variables.
///
/// | Env var              | Default      | Description                            |
/// |----------------------|--------------|----------------------------------------|
/// | `DATABASE_URL`       | required     | Postgres connection string             |
/// | `WORK_ROOT`          | `.`          | Script checkout root; child cwd        |
/// | `POLL_INTERVAL_SECS` | `15`         | Idle sleep between polls               |
/// | `JOB_TIMEOUT_SECS`   | `3600`       | Subprocess wall-clock bound            |
/// | `PYTHON_BIN`         | `python3`    | Interpreter for the campaign scripts   |
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    /// Root of the script checkout. Snapshot and list files live here,
    /// and every child process runs with this as its cwd.
    pub work_root: PathBuf,
    pub poll_interval: Duration,
    /// Generous by default: scraping-style sub-actions are slow.
    pub job_timeout: Duration,
    pub python_bin: String,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let work_root: PathBuf = std::env::var("WORK_ROOT")
            .unwrap_or_else(|_| ".".into())
            .into();

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        let job_timeout_secs: u64 = std::env::var("JOB_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("JOB_TIMEOUT_SECS must be a valid u64");

        let python_bin = std::env::var("PYTHON_BIN").unwrap_or_else(|_| "python3".into());

        Self {
            database_url,
            work_root,
            poll_interval: Duration::from_secs(poll_interval_secs),
            job_timeout: Duration::from_secs(job_timeout_secs),
            python_bin,
        }
    }

    pub fn opt_outs_path(&self) -> PathBuf {
        self.work_root.join(OPT_OUTS_FILE)
    }

    pub fn warm_leads_path(&self) -> PathBuf {
        self.work_root.join(WARM_LEADS_FILE)
    }

    pub fn sms_list_path(&self) -> PathBuf {
        self.work_root.join(SMS_LIST_FILE)
    }

    /// Build the script catalog the registry resolves against,
    /// probing the filesystem for the optional CBC script. This is the
    /// only I/O between claiming and resolving.
    pub fn script_catalog(&self) -> ScriptCatalog {
        let run_cbc = self.work_root.join(RUN_CBC_SCRIPT);
        ScriptCatalog {
            python_bin: self.python_bin.clone(),
            repo_root: self.work_root.clone(),
            opt_outs_csv: self.opt_outs_path(),
            warm_leads_csv: self.warm_leads_path(),
            run_cbc_script: run_cbc.exists().then_some(run_cbc),
        }
    }
}

/// A config for tests, pointing at a temporary work root.
pub fn test_config(work_root: &Path) -> WorkerConfig {
    WorkerConfig {
        database_url: String::new(),
        work_root: work_root.to_path_buf(),
        poll_interval: Duration::from_millis(10),
        job_timeout: Duration::from_secs(10),
        python_bin: "python3".into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
