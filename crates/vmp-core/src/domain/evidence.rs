// crates/vmp-core/src/domain/evidence.rs
// ============================================================================
// Module: Evidence
// Description: A content-addressed, versioned file attached to a case.
// Purpose: Give every uploaded document a stable identity, version lineage,
//          and storage location independent of the blob store used.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Evidence review state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A single version of an uploaded document attached to a case.
///
/// # Invariants
/// - `version` is 1-based and contiguous within `(case_id, evidence_type)`.
/// - `content_hash` is the SHA-256 hex digest of the uploaded bytes; two
///   uploads with identical bytes produce identical `content_hash` values
///   but distinct `evidence_id`/`version` rows (evidence is an event log,
///   not a dedup index).
/// - `storage_key` is derived from `(case_id, evidence_type, version,
///   sanitized_filename)` and never contains a raw client-supplied path
///   component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Evidence identifier (`EVD-`).
    pub evidence_id: String,
    pub case_id: String,
    /// Caller-defined category, e.g. `"w9"`, `"invoice_pdf"`, `"bank_letter"`.
    pub evidence_type: String,
    /// 1-based version within `(case_id, evidence_type)`.
    pub version: u32,
    /// Original filename as supplied by the uploader, for display only.
    pub original_filename: String,
    /// Key under which the blob is stored in the storage gateway.
    pub storage_key: String,
    /// SHA-256 hex digest of the uploaded bytes.
    pub content_hash: String,
    /// Size of the uploaded bytes.
    pub size_bytes: u64,
    /// Declared MIME type.
    pub content_type: String,
    pub status: EvidenceStatus,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer note, required when `status == Rejected`.
    pub review_note: Option<String>,
}

/// Strips path separators and control characters from an uploaded filename
/// so it is safe to embed in a storage key.
///
/// # Invariants
/// - The returned string never contains `/`, `\`, NUL, or other ASCII
///   control characters.
/// - An input that sanitizes to the empty string yields `"file"`.
#[must_use]
pub fn sanitize_filename(original: &str) -> String {
    let cleaned: String = original
        .chars()
        .filter(|c| !c.is_control() && *c != '/' && *c != '\\')
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the storage key for one evidence version.
///
/// Format: `evidence/{case_id}/{evidence_type}/v{version}/{sanitized_filename}`.
#[must_use]
pub fn build_storage_key(case_id: &str, evidence_type: &str, version: u32, filename: &str) -> String {
    format!(
        "evidence/{case_id}/{evidence_type}/v{version}/{}",
        sanitize_filename(filename)
    )
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions."
    )]
    use super::*;

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize_filename("evil\0name.pdf"), "evilname.pdf");
    }

    #[test]
    fn sanitize_empty_result_falls_back_to_file() {
        assert_eq!(sanitize_filename("///"), "file");
    }

    #[test]
    fn storage_key_has_expected_shape() {
        let key = build_storage_key("CASE-1", "w9", 2, "my form.pdf");
        assert_eq!(key, "evidence/CASE-1/w9/v2/my form.pdf");
    }

    #[test]
    fn storage_key_cannot_traverse_directories() {
        let key = build_storage_key("CASE-1", "w9", 1, "../../secrets.pdf");
        assert!(!key.contains(".."));
    }
}
