// crates/vmp-store-sqlite/src/relationships.rs
// ============================================================================
// Module: Relationship Repository
// Description: CRUD for the client/vendor relationship edges.
// Purpose: Persist the graph every case's authorization check is anchored to.
// Dependencies: rusqlite, vmp-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_core::domain::Relationship;
use vmp_core::domain::RelationshipStatus;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn status_label(status: RelationshipStatus) -> &'static str {
    match status {
        RelationshipStatus::Active => "active",
        RelationshipStatus::Inactive => "inactive",
    }
}

fn parse_status(label: &str) -> Result<RelationshipStatus, SqliteStoreError> {
    match label {
        "active" => Ok(RelationshipStatus::Active),
        "inactive" => Ok(RelationshipStatus::Inactive),
        other => Err(SqliteStoreError::Invalid(format!("unknown relationship status {other}"))),
    }
}

fn row_to_relationship(row: &rusqlite::Row<'_>) -> rusqlite::Result<Relationship> {
    let status_label: String = row.get("status")?;
    let metadata_json: String = row.get("metadata")?;
    Ok(Relationship {
        relationship_id: row.get("relationship_id")?,
        client_id: row.get("client_id")?,
        vendor_id: row.get("vendor_id")?,
        status: parse_status(&status_label).unwrap_or(RelationshipStatus::Inactive),
        effective_from: row.get("effective_from")?,
        effective_to: row.get("effective_to")?,
        metadata: serde_json::from_str(&metadata_json).unwrap_or(serde_json::Value::Null),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

impl Store {
    /// Inserts a new relationship row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `relationship_id` exists.
    pub fn insert_relationship(&self, relationship: &Relationship) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| self.insert_relationship_with(conn, relationship))
    }

    /// Same as [`Store::insert_relationship`], against an already-open
    /// connection; used when invite acceptance inserts a tenant, its owner
    /// user, and the resulting relationship in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `relationship_id` exists.
    pub fn insert_relationship_with(
        &self,
        conn: &rusqlite::Connection,
        relationship: &Relationship,
    ) -> Result<(), SqliteStoreError> {
        conn.execute(
            "INSERT INTO relationships (relationship_id, client_id, vendor_id, status, effective_from, effective_to, metadata, created_at, updated_at, deleted_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                relationship.relationship_id,
                relationship.client_id,
                relationship.vendor_id,
                status_label(relationship.status),
                relationship.effective_from,
                relationship.effective_to,
                relationship.metadata.to_string(),
                relationship.created_at,
                relationship.updated_at,
                relationship.deleted_at,
            ],
        )?;
        Ok(())
    }

    /// Finds the active relationship for `(client_id, vendor_id)`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_active_relationship(
        &self,
        client_id: &str,
        vendor_id: &str,
    ) -> Result<Option<Relationship>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT * FROM relationships WHERE client_id = ?1 AND vendor_id = ?2 AND status = 'active' AND deleted_at IS NULL",
                params![client_id, vendor_id],
                row_to_relationship,
            )
            .optional()
            .map_err(SqliteStoreError::from)
        })
    }

    /// Lists every relationship naming `client_id` as the client side.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_relationships_for_client(&self, client_id: &str) -> Result<Vec<Relationship>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM relationships WHERE client_id = ?1 AND deleted_at IS NULL ORDER BY created_at",
            )?;
            let rows = stmt.query_map([client_id], row_to_relationship)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Lists every relationship naming `vendor_id` as the vendor side.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_relationships_for_vendor(&self, vendor_id: &str) -> Result<Vec<Relationship>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM relationships WHERE vendor_id = ?1 AND deleted_at IS NULL ORDER BY created_at",
            )?;
            let rows = stmt.query_map([vendor_id], row_to_relationship)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Marks a relationship inactive.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no relationship matches.
    pub fn deactivate_relationship(
        &self,
        relationship_id: &str,
        effective_to: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE relationships SET status = 'inactive', effective_to = ?1, updated_at = ?1 WHERE relationship_id = ?2",
                params![effective_to, relationship_id],
            )?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("relationship {relationship_id}")));
            }
            Ok(())
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

    fn sample() -> Relationship {
        Relationship {
            relationship_id: "REL-1".to_string(),
            client_id: "TC-AAAA1111".to_string(),
            vendor_id: "TV-BBBB2222".to_string(),
            status: RelationshipStatus::Active,
            effective_from: Utc::now() - chrono::Duration::days(1),
            effective_to: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn insert_then_find_active_by_pair() {
        let store = Store::open_in_memory().expect("open");
        let relationship = sample();
        store.insert_relationship(&relationship).expect("insert");

        let found = store
            .find_active_relationship(&relationship.client_id, &relationship.vendor_id)
            .expect("find")
            .expect("present");
        assert_eq!(found.relationship_id, relationship.relationship_id);
    }

    #[test]
    fn deactivate_removes_it_from_active_lookup() {
        let store = Store::open_in_memory().expect("open");
        let relationship = sample();
        store.insert_relationship(&relationship).expect("insert");
        store.deactivate_relationship(&relationship.relationship_id, Utc::now()).expect("deactivate");

        let found = store
            .find_active_relationship(&relationship.client_id, &relationship.vendor_id)
            .expect("find");
        assert!(found.is_none());
    }

    #[test]
    fn lists_filter_by_client_and_vendor_sides() {
        let store = Store::open_in_memory().expect("open");
        let relationship = sample();
        store.insert_relationship(&relationship).expect("insert");

        assert_eq!(store.list_relationships_for_client(&relationship.client_id).expect("list").len(), 1);
        assert_eq!(store.list_relationships_for_vendor(&relationship.vendor_id).expect("list").len(), 1);
        assert!(store.list_relationships_for_client("TC-NOPE0000").expect("list").is_empty());
    }
}
