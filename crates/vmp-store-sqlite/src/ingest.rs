// crates/vmp-store-sqlite/src/ingest.rs
// ============================================================================
// Module: Ingest Repository
// Description: Idempotent upsert storage for externally-sourced invoice and
//              payment rows, keyed by their natural key.
// Purpose: Let a batch feed be replayed any number of times without
//          duplicating or losing rows.
// Dependencies: rusqlite, vmp-core, vmp-authz
// ============================================================================

use rusqlite::params;
use vmp_core::domain::IngestInvoiceRow;
use vmp_core::domain::IngestPaymentRow;

use crate::error::SqliteStoreError;
use crate::store::Store;

impl Store {
    /// Upserts one invoice row. Re-ingesting the same natural key overwrites
    /// the prior amount/currency/due-date rather than erroring, so a batch
    /// feed can be replayed safely.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn upsert_ingested_invoice(
        &self,
        row: &IngestInvoiceRow,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO ingested_invoices (vendor_id, client_id, invoice_num, amount_cents, currency, due_date, raw_payload, ingested_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
                 ON CONFLICT(vendor_id, client_id, invoice_num) DO UPDATE SET
                     amount_cents = excluded.amount_cents,
                     currency = excluded.currency,
                     due_date = excluded.due_date,
                     raw_payload = excluded.raw_payload,
                     ingested_at = excluded.ingested_at",
                params![
                    row.vendor_id,
                    row.client_id,
                    row.invoice_num,
                    row.amount_cents,
                    row.currency,
                    row.due_date,
                    row.raw_payload.to_string(),
                    now,
                ],
            )?;
            Ok(())
        })
    }

    /// Upserts one payment row, by the same replay-safe rule as
    /// [`Store::upsert_ingested_invoice`].
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn upsert_ingested_payment(
        &self,
        row: &IngestPaymentRow,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO ingested_payments (vendor_id, client_id, payment_ref, amount_cents, currency, paid_at, raw_payload, ingested_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
                 ON CONFLICT(vendor_id, client_id, payment_ref) DO UPDATE SET
                     amount_cents = excluded.amount_cents,
                     currency = excluded.currency,
                     paid_at = excluded.paid_at,
                     raw_payload = excluded.raw_payload,
                     ingested_at = excluded.ingested_at",
                params![
                    row.vendor_id,
                    row.client_id,
                    row.payment_ref,
                    row.amount_cents,
                    row.currency,
                    row.paid_at,
                    row.raw_payload.to_string(),
                    now,
                ],
            )?;
            Ok(())
        })
    }

    /// Counts ingested invoice rows for `(vendor_id, client_id)`, used by
    /// tests and the ingest CLI to confirm a batch landed without
    /// duplication.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn count_ingested_invoices(&self, vendor_id: &str, client_id: &str) -> Result<u64, SqliteStoreError> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM ingested_invoices WHERE vendor_id = ?1 AND client_id = ?2",
                params![vendor_id, client_id],
                |row| row.get(0),
            )?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
    }

    /// Counts ingested payment rows for `(vendor_id, client_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn count_ingested_payments(&self, vendor_id: &str, client_id: &str) -> Result<u64, SqliteStoreError> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM ingested_payments WHERE vendor_id = ?1 AND client_id = ?2",
                params![vendor_id, client_id],
                |row| row.get(0),
            )?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
    }

    /// Lists ingested invoice rows whose `(vendor_id, client_id)` pass
    /// `filters`, newest-ingested first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_ingested_invoices_filtered(
        &self,
        filters: &vmp_authz::AuthorizationFilters,
    ) -> Result<Vec<IngestInvoiceRow>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT vendor_id, client_id, invoice_num, amount_cents, currency, due_date, raw_payload
                 FROM ingested_invoices ORDER BY ingested_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    let raw_payload: String = row.get(6)?;
                    Ok(IngestInvoiceRow {
                        vendor_id: row.get(0)?,
                        client_id: row.get(1)?,
                        invoice_num: row.get(2)?,
                        amount_cents: row.get(3)?,
                        currency: row.get(4)?,
                        due_date: row.get(5)?,
                        raw_payload: serde_json::from_str(&raw_payload).unwrap_or(serde_json::Value::Null),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows
                .into_iter()
                .filter(|row| filters.allows_case(&row.client_id, &row.vendor_id))
                .collect())
        })
    }

    /// Lists ingested payment rows whose `(vendor_id, client_id)` pass
    /// `filters`, newest-ingested first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_ingested_payments_filtered(
        &self,
        filters: &vmp_authz::AuthorizationFilters,
    ) -> Result<Vec<IngestPaymentRow>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT vendor_id, client_id, payment_ref, amount_cents, currency, paid_at, raw_payload
                 FROM ingested_payments ORDER BY ingested_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    let raw_payload: String = row.get(6)?;
                    Ok(IngestPaymentRow {
                        vendor_id: row.get(0)?,
                        client_id: row.get(1)?,
                        payment_ref: row.get(2)?,
                        amount_cents: row.get(3)?,
                        currency: row.get(4)?,
                        paid_at: row.get(5)?,
                        raw_payload: serde_json::from_str(&raw_payload).unwrap_or(serde_json::Value::Null),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows
                .into_iter()
                .filter(|row| filters.allows_case(&row.client_id, &row.vendor_id))
                .collect())
        })
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
    use chrono::Utc;

    use super::*;

    fn sample_invoice() -> IngestInvoiceRow {
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
    fn re_ingesting_the_same_key_overwrites_rather_than_duplicates() {
        let store = Store::open_in_memory().expect("open");
        let mut row = sample_invoice();
        store.upsert_ingested_invoice(&row, Utc::now()).expect("insert");

        row.amount_cents = 199_00;
        store.upsert_ingested_invoice(&row, Utc::now()).expect("upsert");

        let count = store.count_ingested_invoices(&row.vendor_id, &row.client_id).expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn distinct_invoice_numbers_accumulate() {
        let store = Store::open_in_memory().expect("open");
        let first = sample_invoice();
        let mut second = sample_invoice();
        second.invoice_num = "INV-2024-0002".to_string();

        store.upsert_ingested_invoice(&first, Utc::now()).expect("insert");
        store.upsert_ingested_invoice(&second, Utc::now()).expect("insert");

        let count = store.count_ingested_invoices(&first.vendor_id, &first.client_id).expect("count");
        assert_eq!(count, 2);
    }

    #[test]
    fn payment_rows_upsert_by_natural_key() {
        let store = Store::open_in_memory().expect("open");
        let row = IngestPaymentRow {
            vendor_id: "TV-AAAA1111".to_string(),
            client_id: "TC-BBBB2222".to_string(),
            payment_ref: "PMT-REF-0001".to_string(),
            amount_cents: 500_00,
            currency: "USD".to_string(),
            paid_at: Utc::now(),
            raw_payload: serde_json::json!({"source": "batch-feed"}),
        };
        store.upsert_ingested_payment(&row, Utc::now()).expect("insert");
        store.upsert_ingested_payment(&row, Utc::now()).expect("upsert again");

        let count = store.count_ingested_payments(&row.vendor_id, &row.client_id).expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn list_invoices_respects_visibility_filters() {
        let store = Store::open_in_memory().expect("open");
        store.upsert_ingested_invoice(&sample_invoice(), Utc::now()).expect("insert");

        let everything = vmp_authz::AuthorizationFilters::internal_super("TNT-OPS");
        assert_eq!(store.list_ingested_invoices_filtered(&everything).expect("list").len(), 1);

        let nobody = vmp_authz::AuthorizationFilters::for_internal_scoped("TNT-OPS", std::collections::BTreeSet::new());
        assert!(store.list_ingested_invoices_filtered(&nobody).expect("list").is_empty());
    }
}
