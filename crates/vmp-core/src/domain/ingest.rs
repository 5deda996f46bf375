// crates/vmp-core/src/domain/ingest.rs
// ============================================================================
// Module: Ingest Row
// Description: Natural-key-addressed rows for externally-sourced invoice and
//              payment data.
// Purpose: Give a future CSV/batch parser one concrete shape to produce and
//          one natural key to upsert against, without that parser existing
//          yet.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// One externally-sourced invoice line.
///
/// Natural key: `(vendor_id, client_id, invoice_num)`. Re-ingesting the same
/// key overwrites the row rather than erroring, so a batch feed can be
/// replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestInvoiceRow {
    pub vendor_id: String,
    pub client_id: String,
    pub invoice_num: String,
    pub amount_cents: i64,
    pub currency: String,
    pub due_date: NaiveDate,
    /// Original row, preserved for replay and debugging.
    pub raw_payload: serde_json::Value,
}

/// One externally-sourced payment record.
///
/// Natural key: `(vendor_id, client_id, payment_ref)`, by the same
/// upsert rule as [`IngestInvoiceRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestPaymentRow {
    pub vendor_id: String,
    pub client_id: String,
    pub payment_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub paid_at: DateTime<Utc>,
    pub raw_payload: serde_json::Value,
}
