//! The closed set of job actions the worker knows how to run.
//!
//! Action identifiers are stored as text in the `jobs.action` column;
//! anything that does not parse into [`JobAction`] fails the job before
//! a subprocess is ever spawned.

use serde::{Deserialize, Serialize};

/// One kind of queued work, mapped to an executable campaign script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    /// Rebuild the cell-only SMS list from the latest leads export.
    BuildSmsList,
    /// Filter the raw leads file down to a quality shortlist.
    ParseQualityLeads,
    /// Run the external CBC enrichment script over an addresses file.
    RunCbc,
    /// Send the daily campaign batch for real.
    SendCampaign,
    /// Walk the daily campaign batch without sending anything.
    SendCampaignDryRun,
    /// Message every warm lead on the consent list.
    SendWarmLeadMessage,
}

impl JobAction {
    /// Parse the `jobs.action` text into a known action.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "build_sms_list" => Some(Self::BuildSmsList),
            "parse_quality_leads" => Some(Self::ParseQualityLeads),
            "run_cbc" => Some(Self::RunCbc),
            "send_campaign" => Some(Self::SendCampaign),
            "send_campaign_dry_run" => Some(Self::SendCampaignDryRun),
            "send_warm_lead_message" => Some(Self::SendWarmLeadMessage),
            _ => None,
        }
    }

    /// The canonical text identifier stored in the job store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BuildSmsList => "build_sms_list",
            Self::ParseQualityLeads => "parse_quality_leads",
            Self::RunCbc => "run_cbc",
            Self::SendCampaign => "send_campaign",
            Self::SendCampaignDryRun => "send_campaign_dry_run",
            Self::SendWarmLeadMessage => "send_warm_lead_message",
        }
    }

    /// Whether the opt-out/consent snapshots must be exported before
    /// this action runs. The campaign scripts read the snapshot files
    /// from disk; the remaining actions never touch them.
    pub fn requires_snapshots(self) -> bool {
        matches!(
            self,
            Self::BuildSmsList
                | Self::SendCampaign
                | Self::SendCampaignDryRun
                | Self::SendWarmLeadMessage
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_action() {
        for action in [
            JobAction::BuildSmsList,
            JobAction::ParseQualityLeads,
            JobAction::RunCbc,
            JobAction::SendCampaign,
            JobAction::SendCampaignDryRun,
            JobAction::SendWarmLeadMessage,
        ] {
            assert_eq!(JobAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn parse_rejects_unknown_text() {
        assert_eq!(JobAction::parse("scrape_everything"), None);
        assert_eq!(JobAction::parse(""), None);
        // Case-sensitive: the dashboard always writes snake_case.
        assert_eq!(JobAction::parse("Build_Sms_List"), None);
    }

    #[test]
    fn snapshot_requirement_covers_campaign_actions_only() {
        assert!(JobAction::BuildSmsList.requires_snapshots());
        assert!(JobAction::SendCampaign.requires_snapshots());
        assert!(JobAction::SendCampaignDryRun.requires_snapshots());
        assert!(JobAction::SendWarmLeadMessage.requires_snapshots());
        assert!(!JobAction::ParseQualityLeads.requires_snapshots());
        assert!(!JobAction::RunCbc.requires_snapshots());
    }
}
