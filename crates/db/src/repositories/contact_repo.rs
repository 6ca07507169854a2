//! Read-only repositories over the exclusion and consent tables.
//!
//! The worker only ever reads these; the dashboard and the inbound SMS
//! handler own the writes.

use sqlx::PgPool;

use crate::models::contact::{OptOut, WarmLead};

/// Reads the `opt_outs` exclusion table.
pub struct OptOutRepo;

impl OptOutRepo {
    /// All opt-out rows, ordered for stable snapshot output.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<OptOut>, sqlx::Error> {
        sqlx::query_as::<_, OptOut>(
            "SELECT id, phone_number, date, source FROM opt_outs ORDER BY phone_number",
        )
        .fetch_all(pool)
        .await
    }
}

/// Reads the `warm_leads` consent table.
pub struct WarmLeadRepo;

impl WarmLeadRepo {
    /// All warm-lead rows, ordered for stable snapshot output.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<WarmLead>, sqlx::Error> {
        sqlx::query_as::<_, WarmLead>(
            "SELECT id, phone_number, full_name, address, first_reply_text, reply_time, \
             source_campaign \
             FROM warm_leads ORDER BY phone_number",
        )
        .fetch_all(pool)
        .await
    }
}
