//! Typed per-action payloads.
//!
//! The job store keeps `payload` as an open JSONB mapping written by the
//! dashboard. Rather than pulling keys out of it at dispatch time, the
//! whole mapping is decoded into one tagged variant per action at the
//! registry boundary, with unknown or missing keys resolving to the
//! documented defaults. Decoding is infallible: a malformed value for a
//! key behaves exactly like an absent key.

use serde_json::Value;

use crate::action::JobAction;

/// Default company identity substituted into campaign messages.
pub const DEFAULT_COMPANY_NAME: &str = "Tree Service";

/// Default seconds between individual sends.
pub const DEFAULT_SMS_DELAY_SEC: f64 = 1.0;

/// Default cap on sends per campaign run.
pub const DEFAULT_DAILY_BATCH_LIMIT: u32 = 450;

/// Default input file for the CBC enrichment script.
pub const DEFAULT_ADDRESSES_CSV: &str = "propwire_addresses.csv";

/// Default follow-up text for warm leads, matching the dashboard's
/// prefilled form value.
pub const DEFAULT_WARM_LEAD_MESSAGE: &str =
    "Thanks for your interest! We'll be in touch shortly.";

/// Payload for `build_sms_list`.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSmsListPayload {
    /// Include rows whose phone type is unknown (default) or require a
    /// known cell/mobile phone type.
    pub include_unknown_phone_type: bool,
    /// Optional location filters, passed through to the build script.
    pub city: Option<String>,
    /// Two-letter state code; longer input is truncated at decode time.
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// Payload for `run_cbc`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunCbcPayload {
    /// Input file name handed to the external script.
    pub addresses_csv_name: String,
}

/// Shared payload for `send_campaign` and `send_campaign_dry_run`.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignPayload {
    pub company_name: String,
    /// Overrides the script's built-in message body; `None` when the
    /// dashboard left the field empty.
    pub message_template: Option<String>,
    pub sms_delay_sec: f64,
    pub daily_batch_limit: u32,
}

/// Payload for `send_warm_lead_message`.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmLeadMessagePayload {
    pub message: String,
    pub sms_delay_sec: f64,
}

/// A job's payload, decoded against its action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPayload {
    BuildSmsList(BuildSmsListPayload),
    ParseQualityLeads,
    RunCbc(RunCbcPayload),
    SendCampaign(CampaignPayload),
    SendCampaignDryRun(CampaignPayload),
    SendWarmLeadMessage(WarmLeadMessagePayload),
}

impl ActionPayload {
    /// Decode the raw JSONB payload for `action`.
    pub fn decode(action: JobAction, payload: &Value) -> Self {
        match action {
            JobAction::BuildSmsList => Self::BuildSmsList(BuildSmsListPayload {
                include_unknown_phone_type: bool_field(payload, "include_unknown_phone_type")
                    .unwrap_or(true),
                city: str_field(payload, "city"),
                state: str_field(payload, "state").map(|s| truncate_chars(&s, 2)),
                zip: str_field(payload, "zip"),
            }),
            JobAction::ParseQualityLeads => Self::ParseQualityLeads,
            JobAction::RunCbc => Self::RunCbc(RunCbcPayload {
                addresses_csv_name: str_field(payload, "addresses_csv_name")
                    .unwrap_or_else(|| DEFAULT_ADDRESSES_CSV.to_string()),
            }),
            JobAction::SendCampaign => Self::SendCampaign(campaign_payload(payload)),
            JobAction::SendCampaignDryRun => Self::SendCampaignDryRun(campaign_payload(payload)),
            JobAction::SendWarmLeadMessage => {
                Self::SendWarmLeadMessage(WarmLeadMessagePayload {
                    message: str_field(payload, "message")
                        .unwrap_or_else(|| DEFAULT_WARM_LEAD_MESSAGE.to_string()),
                    sms_delay_sec: num_field(payload, "sms_delay_sec")
                        .unwrap_or(DEFAULT_SMS_DELAY_SEC),
                })
            }
        }
    }
}

fn campaign_payload(payload: &Value) -> CampaignPayload {
    // A daily limit of 0 is treated as unset; the dashboard never
    // writes it, and a zero-send campaign run is never intended.
    let daily_batch_limit = num_field(payload, "daily_batch_limit")
        .map(|n| n as u32)
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_DAILY_BATCH_LIMIT);

    CampaignPayload {
        company_name: str_field(payload, "company_name")
            .unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string()),
        message_template: str_field(payload, "message_template"),
        sms_delay_sec: num_field(payload, "sms_delay_sec").unwrap_or(DEFAULT_SMS_DELAY_SEC),
        daily_batch_limit,
    }
}

/// Fetch a string key, trimming whitespace. Empty strings and
/// non-string values count as absent.
fn str_field(payload: &Value, key: &str) -> Option<String> {
    let s = payload.get(key)?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Fetch a boolean key. Non-boolean values count as absent.
fn bool_field(payload: &Value, key: &str) -> Option<bool> {
    payload.get(key)?.as_bool()
}

/// Fetch a numeric key. Non-numeric values count as absent.
fn num_field(payload: &Value, key: &str) -> Option<f64> {
    payload.get(key)?.as_f64()
}

/// Take the first `n` characters of `s` (char-boundary safe).
fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
