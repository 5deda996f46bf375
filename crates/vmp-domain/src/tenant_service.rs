// crates/vmp-domain/src/tenant_service.rs
// ============================================================================
// Module: Tenant & Relationship Service
// Description: Tenant/user provisioning, client-vendor relationships, invite
//              issuance and redemption, password reset.
// Purpose: Every operation that creates or authenticates a tenant principal
//          without yet touching a case.
// Dependencies: vmp-core, vmp-authz, vmp-store-sqlite, chrono
// ============================================================================

use std::sync::Arc;

use chrono::Duration;
use vmp_core::Clock;
use vmp_core::domain::Invite;
use vmp_core::domain::InviteStatus;
use vmp_core::domain::Relationship;
use vmp_core::domain::RelationshipStatus;
use vmp_core::domain::Scope;
use vmp_core::domain::Tenant;
use vmp_core::domain::TenantStatus;
use vmp_core::domain::User;
use vmp_core::domain::UserRole;
use vmp_core::new_id;
use vmp_core::new_tenant_ids;
use vmp_store_sqlite::Store;

use crate::error::DomainError;
use crate::password::hash_password;
use crate::tokens::generate_token;
use crate::tokens::hash_token;

/// The window an issued invite or password-reset token stays redeemable.
const INVITE_TTL: Duration = Duration::days(7);

/// Every tenant/user/relationship/invite operation, backed by one
/// [`Store`] and a [`Clock`] for testable timestamps.
pub struct TenantService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

/// An invite together with the cleartext token, returned exactly once to
/// the caller who must relay it out of band (email). Only the hash is
/// ever persisted.
pub struct IssuedInvite {
    pub invite: Invite,
    pub token: String,
}

/// Result of successfully redeeming an invite: the new vendor tenant, its
/// owner user, and the client-vendor relationship created together.
#[derive(Debug)]
pub struct OnboardedVendor {
    pub tenant: Tenant,
    pub owner: User,
    pub relationship: Relationship,
}

impl TenantService {
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates a new tenant (client or vendor) with no users yet.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `name` or `email` is empty,
    /// [`DomainError::Store`] on a backend failure.
    pub fn create_tenant(
        &self,
        name: &str,
        email: &str,
        phone: Option<String>,
        address: Option<String>,
    ) -> Result<Tenant, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("tenant name must not be empty"));
        }
        if email.trim().is_empty() {
            return Err(DomainError::validation("tenant email must not be empty"));
        }
        let ids = new_tenant_ids(name);
        let now = self.clock.now();
        let tenant = Tenant {
            tenant_id: ids.tenant_id,
            client_id: ids.client_id,
            vendor_id: ids.vendor_id,
            name: name.to_string(),
            email: email.to_lowercase(),
            phone,
            address,
            settings: serde_json::json!({}),
            status: TenantStatus::Active,
            onboarding_status: "pending".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.store.insert_tenant(&tenant)?;
        Ok(tenant)
    }

    /// Creates a user under an existing tenant, hashing a local password if
    /// one is supplied (mutually exclusive with external auth binding).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if neither `password` nor
    /// `external_auth_id` is supplied, [`DomainError::Conflict`] if the
    /// email is already registered, [`DomainError::Hash`] on a hashing
    /// failure.
    pub async fn create_user(
        &self,
        tenant_id: &str,
        email: &str,
        password: Option<String>,
        external_auth_id: Option<String>,
        role: UserRole,
        scope: Option<Scope>,
    ) -> Result<User, DomainError> {
        if password.is_none() && external_auth_id.is_none() {
            return Err(DomainError::validation(
                "a user must have a password or an external auth binding",
            ));
        }
        if self.store.find_user_by_email(email)?.is_some() {
            return Err(DomainError::conflict(format!("email {email} is already registered")));
        }
        let password_hash = match password {
            Some(cleartext) => Some(hash_password(cleartext).await?),
            None => None,
        };
        let now = self.clock.now();
        let user = User {
            user_id: new_id("USR", None),
            tenant_id: tenant_id.to_string(),
            email: email.to_lowercase(),
            password_hash,
            external_auth_id,
            role,
            scope,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.store.insert_user(&user)?;
        Ok(user)
    }

    /// Links a client tenant to a vendor tenant.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn create_relationship(&self, client_id: &str, vendor_id: &str) -> Result<Relationship, DomainError> {
        let now = self.clock.now();
        let relationship = Relationship {
            relationship_id: new_id("REL", None),
            client_id: client_id.to_string(),
            vendor_id: vendor_id.to_string(),
            status: RelationshipStatus::Active,
            effective_from: now,
            effective_to: None,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.store.insert_relationship(&relationship)?;
        Ok(relationship)
    }

    /// Issues an invite for a prospective vendor, scoped to `inviting_tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `invitee_email` is empty,
    /// [`DomainError::Store`] on a backend failure.
    pub fn create_invite(
        &self,
        inviting_tenant_id: &str,
        invitee_email: &str,
        created_by: &str,
    ) -> Result<IssuedInvite, DomainError> {
        if invitee_email.trim().is_empty() {
            return Err(DomainError::validation("invitee email must not be empty"));
        }
        let token = generate_token();
        let now = self.clock.now();
        let invite = Invite {
            invite_id: new_id("INV", None),
            inviting_tenant_id: inviting_tenant_id.to_string(),
            invitee_email: invitee_email.to_lowercase(),
            token_hash: hash_token(&token),
            status: InviteStatus::Pending,
            created_by: created_by.to_string(),
            expires_at: now + INVITE_TTL,
            accepted_at: None,
            resulting_tenant_id: None,
            created_at: now,
        };
        self.store.insert_invite(&invite)?;
        Ok(IssuedInvite { invite, token })
    }

    /// Redeems an invite token, atomically creating the vendor tenant, its
    /// owner user, the client-vendor relationship, and marking the invite
    /// accepted. Notifying the inviting tenant is a separate step left to
    /// the caller, since a notification requires a case and none exists
    /// yet at this point (onboarding case creation happens in the case
    /// engine).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if the token does not match a
    /// pending invite, [`DomainError::Precondition`] if the invite is
    /// expired or already used, [`DomainError::Conflict`] if the owner
    /// email is already registered.
    pub async fn accept_invite(
        &self,
        token: &str,
        vendor_name: &str,
        owner_password: String,
    ) -> Result<OnboardedVendor, DomainError> {
        let token_hash = hash_token(token);
        let invite = self
            .store
            .find_invite_by_token_hash(&token_hash)?
            .ok_or_else(|| DomainError::not_found("invite not found"))?;
        let now = self.clock.now();
        if !invite.is_redeemable_at(now) {
            return Err(DomainError::precondition("invite is expired or already used"));
        }
        if self.store.find_user_by_email(&invite.invitee_email)?.is_some() {
            return Err(DomainError::conflict(format!(
                "email {} is already registered",
                invite.invitee_email
            )));
        }

        let ids = new_tenant_ids(vendor_name);
        let tenant = Tenant {
            tenant_id: ids.tenant_id.clone(),
            client_id: ids.client_id,
            vendor_id: ids.vendor_id,
            name: vendor_name.to_string(),
            email: invite.invitee_email.clone(),
            phone: None,
            address: None,
            settings: serde_json::json!({}),
            status: TenantStatus::Active,
            onboarding_status: "pending".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let password_hash = hash_password(owner_password).await?;
        let owner = User {
            user_id: new_id("USR", None),
            tenant_id: ids.tenant_id.clone(),
            email: invite.invitee_email.clone(),
            password_hash: Some(password_hash),
            external_auth_id: None,
            role: UserRole::Owner,
            scope: None,
            active: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let relationship = Relationship {
            relationship_id: new_id("REL", None),
            client_id: invite.inviting_tenant_id.clone(),
            vendor_id: ids.tenant_id.clone(),
            status: RelationshipStatus::Active,
            effective_from: now,
            effective_to: None,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.store.with_case_lock(&invite.invite_id, |conn| {
            self.store.insert_tenant_with(conn, &tenant)?;
            self.store.insert_user_with(conn, &owner)?;
            self.store.insert_relationship_with(conn, &relationship)?;
            self.store
                .mark_invite_accepted_with(conn, &invite.invite_id, now, &ids.tenant_id)?;
            Ok(())
        })?;

        Ok(OnboardedVendor { tenant, owner, relationship })
    }

    /// Issues a password-reset token for an existing user, reusing the
    /// invite table: `inviting_tenant_id` records the user's own tenant and
    /// `resulting_tenant_id` is left unset until redemption, when it is
    /// repurposed to record which tenant's user was reset.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if no active user has `email`.
    pub fn request_password_reset(&self, email: &str) -> Result<IssuedInvite, DomainError> {
        let user = self
            .store
            .find_user_by_email(email)?
            .filter(|user| user.active && user.deleted_at.is_none())
            .ok_or_else(|| DomainError::not_found("no active user with that email"))?;
        let token = generate_token();
        let now = self.clock.now();
        let invite = Invite {
            invite_id: new_id("PRS", None),
            inviting_tenant_id: user.tenant_id,
            invitee_email: user.email,
            token_hash: hash_token(&token),
            status: InviteStatus::Pending,
            created_by: user.user_id,
            expires_at: now + INVITE_TTL,
            accepted_at: None,
            resulting_tenant_id: None,
            created_at: now,
        };
        self.store.insert_invite(&invite)?;
        Ok(IssuedInvite { invite, token })
    }

    /// Redeems a password-reset token, replacing the user's password hash.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if the token does not match a
    /// pending reset, [`DomainError::Precondition`] if it is expired or
    /// already used.
    pub async fn redeem_password_reset(&self, token: &str, new_password: String) -> Result<(), DomainError> {
        let token_hash = hash_token(token);
        let invite = self
            .store
            .find_invite_by_token_hash(&token_hash)?
            .ok_or_else(|| DomainError::not_found("reset token not found"))?;
        let now = self.clock.now();
        if !invite.is_redeemable_at(now) {
            return Err(DomainError::precondition("reset token is expired or already used"));
        }
        let user = self
            .store
            .find_user_by_email(&invite.invitee_email)?
            .ok_or_else(|| DomainError::not_found("user not found"))?;
        let password_hash = hash_password(new_password).await?;

        self.store.with_case_lock(&invite.invite_id, |conn| {
            self.store
                .update_user_password_hash(conn, &user.user_id, &password_hash, now)?;
            self.store
                .mark_invite_accepted_with(conn, &invite.invite_id, now, &user.tenant_id)?;
            Ok(())
        })?;
        Ok(())
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
    use vmp_core::clock::FixedClock;

    use super::*;

    fn service() -> TenantService {
        let store = Arc::new(Store::open_in_memory().expect("open"));
        let clock = Arc::new(FixedClock::new(Utc::now()));
        TenantService::new(store, clock)
    }

    #[tokio::test]
    async fn create_user_rejects_passwordless_local_accounts() {
        let service = service();
        let tenant = service.create_tenant("Acme", "ops@acme.test", None, None).expect("tenant");
        let err = service
            .create_user(&tenant.tenant_id, "jane@acme.test", None, None, UserRole::Member, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn accept_invite_creates_vendor_tenant_user_and_relationship() {
        let service = service();
        let client = service.create_tenant("Acme", "ops@acme.test", None, None).expect("tenant");
        let issued = service
            .create_invite(&client.tenant_id, "owner@vendor.test", "USR-SEED0000")
            .expect("invite");

        let onboarded = service
            .accept_invite(&issued.token, "Vendor Co", "hunter2-hunter2".to_string())
            .await
            .expect("accept");

        assert_eq!(onboarded.relationship.client_id, client.tenant_id);
        assert_eq!(onboarded.relationship.vendor_id, onboarded.tenant.tenant_id);
        assert_eq!(onboarded.owner.role, UserRole::Owner);
        assert!(!onboarded.owner.active, "owner starts inactive pending onboarding approval");
    }

    #[tokio::test]
    async fn accept_invite_rejects_reused_token() {
        let service = service();
        let client = service.create_tenant("Acme", "ops@acme.test", None, None).expect("tenant");
        let issued = service
            .create_invite(&client.tenant_id, "owner@vendor.test", "USR-SEED0000")
            .expect("invite");
        service
            .accept_invite(&issued.token, "Vendor Co", "hunter2-hunter2".to_string())
            .await
            .expect("first accept");

        let err = service
            .accept_invite(&issued.token, "Vendor Co Two", "hunter2-hunter2".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Precondition(_)));
    }

    #[tokio::test]
    async fn redeem_password_reset_updates_hash_and_consumes_token() {
        let service = service();
        let tenant = service.create_tenant("Acme", "ops@acme.test", None, None).expect("tenant");
        service
            .create_user(
                &tenant.tenant_id,
                "jane@acme.test",
                Some("old-password".to_string()),
                None,
                UserRole::Member,
                None,
            )
            .await
            .expect("user");

        let issued = service.request_password_reset("jane@acme.test").expect("reset issued");
        service
            .redeem_password_reset(&issued.token, "new-password".to_string())
            .await
            .expect("redeemed");

        let err = service
            .redeem_password_reset(&issued.token, "another-password".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Precondition(_)));
    }
}
