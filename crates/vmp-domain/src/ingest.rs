// crates/vmp-domain/src/ingest.rs
// ============================================================================
// Module: Ingest Service
// Description: Idempotent upsert port for externally-sourced invoice and
//              payment rows.
// Purpose: Give a future CSV/batch parser a single, natural-key-safe call to
//          land a row, without that parser existing in this crate.
// Dependencies: vmp-core, vmp-store-sqlite
// ============================================================================

//! A batch feed (e.g. a nightly CSV drop) is expected to re-send rows it has
//! already sent, whenever it is unsure whether the last run committed. Both
//! [`IngestService::ingest_invoice`] and [`IngestService::ingest_payment`]
//! upsert by natural key, so replaying the same feed is always safe.
//!
//! Parsing a CSV/file payload into [`IngestInvoiceRow`]/[`IngestPaymentRow`]
//! is out of scope here; this service only owns the upsert once a row has
//! already been parsed.

use std::sync::Arc;

use vmp_authz::AuthorizationFilters;
use vmp_core::Clock;
use vmp_core::domain::IngestInvoiceRow;
use vmp_core::domain::IngestPaymentRow;
use vmp_store_sqlite::Store;

use crate::error::DomainError;

/// Idempotent landing zone for externally-sourced invoice and payment rows.
pub struct IngestService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl IngestService {
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Upserts one invoice row, keyed by `(vendorId, companyId, invoiceNum)`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `invoice_num` is empty, or
    /// [`DomainError::Store`] on a backend failure.
    pub fn ingest_invoice(&self, row: IngestInvoiceRow) -> Result<(), DomainError> {
        if row.invoice_num.trim().is_empty() {
            return Err(DomainError::validation("invoice_num must not be empty"));
        }
        if row.vendor_id.trim().is_empty() || row.client_id.trim().is_empty() {
            return Err(DomainError::validation("vendor_id and client_id must not be empty"));
        }
        self.store.upsert_ingested_invoice(&row, self.clock.now())?;
        Ok(())
    }

    /// Upserts one payment row, keyed by `(vendorId, companyId, paymentRef)`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `payment_ref` is empty, or
    /// [`DomainError::Store`] on a backend failure.
    pub fn ingest_payment(&self, row: IngestPaymentRow) -> Result<(), DomainError> {
        if row.payment_ref.trim().is_empty() {
            return Err(DomainError::validation("payment_ref must not be empty"));
        }
        if row.vendor_id.trim().is_empty() || row.client_id.trim().is_empty() {
            return Err(DomainError::validation("vendor_id and client_id must not be empty"));
        }
        self.store.upsert_ingested_payment(&row, self.clock.now())?;
        Ok(())
    }

    /// Lists ingested invoice rows visible under `filters`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn list_invoices(&self, filters: &AuthorizationFilters) -> Result<Vec<IngestInvoiceRow>, DomainError> {
        Ok(self.store.list_ingested_invoices_filtered(filters)?)
    }

    /// Lists ingested payment rows visible under `filters`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn list_payments(&self, filters: &AuthorizationFilters) -> Result<Vec<IngestPaymentRow>, DomainError> {
        Ok(self.store.list_ingested_payments_filtered(filters)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions."
    )]
    use vmp_core::clock::FixedClock;

    use super::*;

    fn service() -> IngestService {
        let store = Arc::new(Store::open_in_memory().expect("open"));
        let clock = Arc::new(FixedClock::new(chrono::Utc::now()));
        IngestService::new(store, clock)
    }

    fn invoice_row() -> IngestInvoiceRow {
        IngestInvoiceRow {
            vendor_id: "TV-AAAA1111".to_string(),
            client_id: "TC-BBBB2222".to_string(),
            invoice_num: "INV-2024-0001".to_string(),
            amount_cents: 125_00,
            currency: "USD".to_string(),
            due_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
            raw_payload: serde_json::json!({"source": "batch-feed"}),
        }
    }

    #[test]
    fn replaying_the_same_invoice_row_does_not_duplicate() {
        let service = service();
        let row = invoice_row();
        service.ingest_invoice(row.clone()).expect("first ingest");
        service.ingest_invoice(row.clone()).expect("replayed ingest");

        let count = service.store.count_ingested_invoices(&row.vendor_id, &row.client_id).expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn blank_invoice_num_is_rejected() {
        let service = service();
        let mut row = invoice_row();
        row.invoice_num = String::new();
        let result = service.ingest_invoice(row);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn payment_row_upserts_by_natural_key() {
        let service = service();
        let row = IngestPaymentRow {
            vendor_id: "TV-AAAA1111".to_string(),
            client_id: "TC-BBBB2222".to_string(),
            payment_ref: "PMT-REF-0001".to_string(),
            amount_cents: 500_00,
            currency: "USD".to_string(),
            paid_at: chrono::Utc::now(),
            raw_payload: serde_json::json!({"source": "batch-feed"}),
        };
        service.ingest_payment(row.clone()).expect("first ingest");
        service.ingest_payment(row.clone()).expect("replayed ingest");

        let count = service.store.count_ingested_payments(&row.vendor_id, &row.client_id).expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn blank_payment_ref_is_rejected() {
        let service = service();
        let row = IngestPaymentRow {
            vendor_id: "TV-AAAA1111".to_string(),
            client_id: "TC-BBBB2222".to_string(),
            payment_ref: String::new(),
            amount_cents: 500_00,
            currency: "USD".to_string(),
            paid_at: chrono::Utc::now(),
            raw_payload: serde_json::json!({}),
        };
        let result = service.ingest_payment(row);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
