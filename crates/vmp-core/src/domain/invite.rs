// crates/vmp-core/src/domain/invite.rs
// ============================================================================
// Module: Invite
// Description: A single-use, time-bounded token that establishes a new
//              client/vendor relationship when redeemed.
// Purpose: Let one tenant onboard a counterparty without a shared password.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Invite lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

/// A single-use invitation to form a client/vendor relationship.
///
/// # Invariants
/// - `token_hash` stores only the SHA-256 hex digest of the invite token;
///   the cleartext token is returned to the caller exactly once, at
///   creation, and never persisted or logged.
/// - Acceptance after `expires_at` or while `status != Pending` fails with
///   `ErrorKind::Precondition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    /// Invite identifier (`INV-`).
    pub invite_id: String,
    /// Tenant that issued the invite.
    pub inviting_tenant_id: String,
    /// Contact email the invite was sent to.
    pub invitee_email: String,
    /// SHA-256 hex digest of the invite token; never the cleartext token.
    pub token_hash: String,
    pub status: InviteStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    /// Tenant created upon acceptance, once known.
    pub resulting_tenant_id: Option<String>,
}

impl Invite {
    /// True if this invite can still be redeemed at `at`.
    #[must_use]
    pub fn is_redeemable_at(&self, at: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Pending && at < self.expires_at
    }
}
