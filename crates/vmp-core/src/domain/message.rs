// crates/vmp-core/src/domain/message.rs
// ============================================================================
// Module: Message
// Description: One turn in a case's client/vendor/internal conversation.
// Purpose: Carry case discussion, with an optional machine-generated hint.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Which side of the case a message's author was acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderContext {
    Client,
    Vendor,
    Internal,
    /// The platform itself, posting without a human author (e.g. a
    /// classifier follow-up).
    System,
    /// An AI-assisted follow-up authored on a human's behalf.
    Ai,
}

/// Delivery surface a message was posted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Portal,
    Whatsapp,
    Email,
    Slack,
}

impl Default for Channel {
    fn default() -> Self {
        Self::Portal
    }
}

/// One message posted to a case thread.
///
/// # Invariants
/// - `is_internal_note` messages are never returned to client or vendor
///   principals, regardless of their case access (see the authorization
///   filter rules). This is independent of `channel`, which only names the
///   surface the message arrived on or was sent to.
/// - `classifier_hint`, when present, is advisory only; it never changes
///   case status or checklist state on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier (`MSG-`).
    pub message_id: String,
    pub case_id: String,
    pub sender_user_id: String,
    pub sender_context: SenderContext,
    pub channel: Channel,
    /// True for a staff-only note; false for a message on the shared case
    /// thread. Orthogonal to `channel`.
    pub is_internal_note: bool,
    pub body: String,
    /// Best-effort classification hint (e.g. a detected invoice number).
    pub classifier_hint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}
