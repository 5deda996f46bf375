// crates/vmp-core/src/domain/relationship.rs
// ============================================================================
// Module: Relationship
// Description: Directed client/vendor edge created by invitation acceptance.
// Purpose: Anchor every case to the pair of tenants that co-own it.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Relationship lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// Relationship is currently in force.
    Active,
    /// Relationship has been wound down.
    Inactive,
}

/// A directed edge between a client tenant and a vendor tenant.
///
/// # Invariants
/// - At most one `Active` relationship exists for a given `(client_id, vendor_id)` pair.
/// - `client_id` carries the `TC-` prefix, `vendor_id` the `TV-` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship identifier.
    pub relationship_id: String,
    /// Client-side identifier of the relationship.
    pub client_id: String,
    /// Vendor-side identifier of the relationship.
    pub vendor_id: String,
    pub status: RelationshipStatus,
    /// Start of the effective window.
    pub effective_from: DateTime<Utc>,
    /// End of the effective window, if bounded.
    pub effective_to: Option<DateTime<Utc>>,
    /// Free-form relationship metadata.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Relationship {
    /// Returns true if this relationship is active at `at`.
    #[must_use]
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.status == RelationshipStatus::Active
            && self.effective_from <= at
            && self.effective_to.is_none_or(|to| at <= to)
    }
}
