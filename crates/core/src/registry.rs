//! Action registry: payload to command resolution.
//!
//! [`resolve`] is a pure mapping from a decoded [`ActionPayload`] to the
//! argv the executor will spawn. It performs no I/O; filesystem facts it
//! depends on (is the CBC script installed?) are probed by the worker
//! when it builds the [`ScriptCatalog`].

use std::path::PathBuf;

use crate::error::ResolveError;
use crate::payload::{ActionPayload, CampaignPayload};

/// Where the campaign scripts and snapshot files live, resolved once
/// by the worker from its configuration.
#[derive(Debug, Clone)]
pub struct ScriptCatalog {
    /// Interpreter used for the Python campaign scripts.
    pub python_bin: String,
    /// Root of the script checkout; child processes also run from here.
    pub repo_root: PathBuf,
    /// Exported opt-out snapshot (`_worker_opt_outs.csv`).
    pub opt_outs_csv: PathBuf,
    /// Exported consent snapshot (`_worker_warm_leads.csv`).
    pub warm_leads_csv: PathBuf,
    /// `run_cbc_only.sh`, present only when it exists on disk.
    pub run_cbc_script: Option<PathBuf>,
}

impl ScriptCatalog {
    fn script(&self, name: &str) -> String {
        self.repo_root.join("scripts").join(name).display().to_string()
    }
}

/// A fully resolved command: program plus arguments. Working directory
/// and timeout are applied by the executor, not recorded here.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

/// Resolve a decoded payload into the command to execute.
pub fn resolve(
    payload: &ActionPayload,
    catalog: &ScriptCatalog,
) -> Result<CommandSpec, ResolveError> {
    match payload {
        ActionPayload::BuildSmsList(p) => {
            let mut args = vec![
                catalog.script("build_sms_list.py"),
                "--opt-outs".into(),
                catalog.opt_outs_csv.display().to_string(),
            ];
            if p.include_unknown_phone_type {
                args.push("--include-unknown-phone-type".into());
            } else {
                args.push("--require-phone-type".into());
            }
            if let Some(city) = &p.city {
                args.extend(["--city".into(), city.clone()]);
            }
            if let Some(state) = &p.state {
                args.extend(["--state".into(), state.clone()]);
            }
            if let Some(zip) = &p.zip {
                args.extend(["--zip".into(), zip.clone()]);
            }
            Ok(CommandSpec {
                program: catalog.python_bin.clone(),
                args,
            })
        }

        ActionPayload::ParseQualityLeads => Ok(CommandSpec {
            program: catalog.python_bin.clone(),
            args: vec![catalog
                .repo_root
                .join("parse_quality_leads.py")
                .display()
                .to_string()],
        }),

        ActionPayload::RunCbc(p) => {
            let Some(script) = &catalog.run_cbc_script else {
                return Err(ResolveError::ActionUnavailable(
                    "run_cbc requires run_cbc_only.sh, which is not installed".into(),
                ));
            };
            Ok(CommandSpec {
                program: "/usr/bin/env".into(),
                args: vec![
                    "bash".into(),
                    script.display().to_string(),
                    p.addresses_csv_name.clone(),
                ],
            })
        }

        ActionPayload::SendCampaign(p) => Ok(campaign_command(catalog, p, "--send")),
        ActionPayload::SendCampaignDryRun(p) => Ok(campaign_command(catalog, p, "--dry-run")),

        ActionPayload::SendWarmLeadMessage(p) => Ok(CommandSpec {
            program: catalog.python_bin.clone(),
            args: vec![
                catalog.script("send_warm_lead_message.py"),
                "--list".into(),
                catalog.warm_leads_csv.display().to_string(),
                "--message".into(),
                p.message.clone(),
                "--delay".into(),
                format!("{}", p.sms_delay_sec),
                "--send".into(),
            ],
        }),
    }
}

fn campaign_command(catalog: &ScriptCatalog, p: &CampaignPayload, mode: &str) -> CommandSpec {
    let mut args = vec![
        catalog.script("send_campaign.py"),
        mode.into(),
        "--company".into(),
        p.company_name.clone(),
        "--delay".into(),
        format!("{}", p.sms_delay_sec),
        "--opt-outs".into(),
        catalog.opt_outs_csv.display().to_string(),
        "--warm-leads".into(),
        catalog.warm_leads_csv.display().to_string(),
        "--limit".into(),
        p.daily_batch_limit.to_string(),
    ];
    if let Some(message) = &p.message_template {
        args.extend(["--message".into(), message.clone()]);
    }
    CommandSpec {
        program: catalog.python_bin.clone(),
        args,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
