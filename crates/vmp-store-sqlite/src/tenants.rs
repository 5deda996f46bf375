// crates/vmp-store-sqlite/src/tenants.rs
// ============================================================================
// Module: Tenant Repository
// Description: CRUD for tenants and the companies scoped under them.
// Purpose: Persist the principal organization model.
// Dependencies: rusqlite, vmp-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_core::domain::Company;
use vmp_core::domain::Tenant;
use vmp_core::domain::TenantStatus;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn tenant_status_label(status: TenantStatus) -> &'static str {
    match status {
        TenantStatus::Active => "active",
        TenantStatus::Suspended => "suspended",
        TenantStatus::Terminated => "terminated",
    }
}

fn parse_tenant_status(label: &str) -> Result<TenantStatus, SqliteStoreError> {
    match label {
        "active" => Ok(TenantStatus::Active),
        "suspended" => Ok(TenantStatus::Suspended),
        "terminated" => Ok(TenantStatus::Terminated),
        other => Err(SqliteStoreError::Invalid(format!("unknown tenant status {other}"))),
    }
}

fn row_to_tenant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tenant> {
    let status_label: String = row.get("status")?;
    let settings_json: String = row.get("settings")?;
    Ok(Tenant {
        tenant_id: row.get("tenant_id")?,
        client_id: row.get("client_id")?,
        vendor_id: row.get("vendor_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        settings: serde_json::from_str(&settings_json).unwrap_or(serde_json::Value::Null),
        status: parse_tenant_status(&status_label).unwrap_or(TenantStatus::Active),
        onboarding_status: row.get("onboarding_status")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

impl Store {
    /// Inserts a new tenant row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `tenant_id`, `client_id`, or
    /// `vendor_id` already exist.
    pub fn insert_tenant(&self, tenant: &Tenant) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| self.insert_tenant_with(conn, tenant))
    }

    /// Same as [`Store::insert_tenant`], but runs against an already-open
    /// connection so callers composing a multi-entity transaction (e.g.
    /// invite acceptance, which inserts a tenant, a user, and a
    /// relationship atomically) don't re-lock the store's mutex.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `tenant_id`, `client_id`, or
    /// `vendor_id` already exist.
    pub fn insert_tenant_with(&self, conn: &rusqlite::Connection, tenant: &Tenant) -> Result<(), SqliteStoreError> {
        conn.execute(
            "INSERT INTO tenants (tenant_id, client_id, vendor_id, name, email, phone, address, settings, status, onboarding_status, created_at, updated_at, deleted_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            params![
                tenant.tenant_id,
                tenant.client_id,
                tenant.vendor_id,
                tenant.name,
                tenant.email,
                tenant.phone,
                tenant.address,
                tenant.settings.to_string(),
                tenant_status_label(tenant.status),
                tenant.onboarding_status,
                tenant.created_at,
                tenant.updated_at,
                tenant.deleted_at,
            ],
        )?;
        Ok(())
    }

    /// Looks up a tenant by its canonical `TNT-` identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure; a missing row
    /// yields `Ok(None)`, not an error.
    pub fn find_tenant_by_id(&self, tenant_id: &str) -> Result<Option<Tenant>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT * FROM tenants WHERE tenant_id = ?1", [tenant_id], row_to_tenant)
                .optional()
                .map_err(SqliteStoreError::from)
        })
    }

    /// Looks up the tenant owning a given client-facing identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_tenant_by_client_id(&self, client_id: &str) -> Result<Option<Tenant>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT * FROM tenants WHERE client_id = ?1", [client_id], row_to_tenant)
                .optional()
                .map_err(SqliteStoreError::from)
        })
    }

    /// Looks up the tenant owning a given vendor-facing identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_tenant_by_vendor_id(&self, vendor_id: &str) -> Result<Option<Tenant>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT * FROM tenants WHERE vendor_id = ?1", [vendor_id], row_to_tenant)
                .optional()
                .map_err(SqliteStoreError::from)
        })
    }

    /// Updates a tenant's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no tenant matches.
    pub fn update_tenant_status(
        &self,
        tenant_id: &str,
        status: TenantStatus,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE tenants SET status = ?1, updated_at = ?2 WHERE tenant_id = ?3",
                params![tenant_status_label(status), updated_at, tenant_id],
            )?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("tenant {tenant_id}")));
            }
            Ok(())
        })
    }

    /// Inserts a new company scoped under a client tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `company_id` already exists.
    pub fn insert_company(&self, company: &Company) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO companies (company_id, tenant_id, group_id, name, created_at, updated_at, deleted_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7)",
                params![
                    company.company_id,
                    company.tenant_id,
                    company.group_id,
                    company.name,
                    company.created_at,
                    company.updated_at,
                    company.deleted_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Lists every company belonging to `group_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_companies_in_group(&self, group_id: &str) -> Result<Vec<Company>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM companies WHERE group_id = ?1 AND deleted_at IS NULL")?;
            let rows = stmt
                .query_map([group_id], |row| {
                    Ok(Company {
                        company_id: row.get("company_id")?,
                        tenant_id: row.get("tenant_id")?,
                        group_id: row.get("group_id")?,
                        name: row.get("name")?,
                        created_at: row.get("created_at")?,
                        updated_at: row.get("updated_at")?,
                        deleted_at: row.get("deleted_at")?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Lists every company across every group, for the org-tree view.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_all_companies(&self) -> Result<Vec<Company>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM companies WHERE deleted_at IS NULL")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Company {
                        company_id: row.get("company_id")?,
                        tenant_id: row.get("tenant_id")?,
                        group_id: row.get("group_id")?,
                        name: row.get("name")?,
                        created_at: row.get("created_at")?,
                        updated_at: row.get("updated_at")?,
                        deleted_at: row.get("deleted_at")?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Looks up a single company by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_company_by_id(&self, company_id: &str) -> Result<Option<Company>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT * FROM companies WHERE company_id = ?1 AND deleted_at IS NULL", [company_id], |row| {
                Ok(Company {
                    company_id: row.get("company_id")?,
                    tenant_id: row.get("tenant_id")?,
                    group_id: row.get("group_id")?,
                    name: row.get("name")?,
                    created_at: row.get("created_at")?,
                    updated_at: row.get("updated_at")?,
                    deleted_at: row.get("deleted_at")?,
                })
            })
            .optional()
            .map_err(SqliteStoreError::from)
        })
    }
}
