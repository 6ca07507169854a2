//! Opt-out and warm-lead contact rows, read by the snapshot exporter.

use canopy_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A phone number that must never receive outbound messages.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OptOut {
    pub id: Uuid,
    pub phone_number: String,
    /// Free-text date of the opt-out, as recorded by the inbound
    /// handler (not normalized).
    pub date: Option<String>,
    pub source: Option<String>,
}

/// A contact that replied with interest, eligible for follow-up.
///
/// The exporter only reads `phone_number`; the remaining columns serve
/// the dashboard's contact view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarmLead {
    pub id: Uuid,
    pub phone_number: String,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub first_reply_text: Option<String>,
    pub reply_time: Option<Timestamp>,
    pub source_campaign: Option<String>,
}
