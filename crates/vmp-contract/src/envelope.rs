// crates/vmp-contract/src/envelope.rs
// ============================================================================
// Module: Envelopes
// Description: The error envelope and pagination envelope shared by every
//              endpoint.
// Purpose: One shape for "something went wrong" and one shape for "here is
//          a page of rows", so handlers never hand-rolled either.
// Dependencies: vmp-core, serde, serde_json
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use vmp_core::error::VmpError;

/// Wire shape of `VmpError`: `{kind, message, details?}`.
///
/// `ErrorKind` already serializes as `snake_case` and `VmpError` already
/// skips absent `details`, so this is a direct re-export rather than a
/// parallel struct that could drift from it.
pub type ErrorBody = VmpError;

/// Top-level JSON body returned on every non-2xx response: `{error: {...}}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

impl From<VmpError> for ApiError {
    fn from(error: VmpError) -> Self {
        Self { error }
    }
}

/// A page of rows plus the pagination metadata the caller needs to fetch
/// the next one: `{items, page, limit, total, pages}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

impl<T> Page<T> {
    /// Builds a page from an already-sliced `items` vector and the total
    /// row count across every page.
    #[must_use]
    pub fn new(items: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        };
        Self { items, page, limit, total, pages }
    }
}

/// Query parameters shared by every paginated list endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "PageRequest::default_page")]
    pub page: u32,
    #[serde(default = "PageRequest::default_limit")]
    pub limit: u32,
}

impl PageRequest {
    const DEFAULT_LIMIT: u32 = 25;
    const MAX_LIMIT: u32 = 200;

    const fn default_page() -> u32 {
        1
    }

    const fn default_limit() -> u32 {
        Self::DEFAULT_LIMIT
    }

    /// Clamps `page` to at least 1 and `limit` to `1..=200`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Zero-based row offset for this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: Self::default_page(), limit: Self::default_limit() }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "Test-only assertions.")]
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let page = Page::<()>::new(vec![], 1, 10, 25);
        assert_eq!(page.pages, 3);
    }

    #[test]
    fn page_request_clamps_limit() {
        let req = PageRequest { page: 0, limit: 10_000 }.normalized();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 200);
    }

    #[test]
    fn error_body_omits_absent_details() {
        let api_err = ApiError::from(VmpError::not_found("case not found"));
        let json = serde_json::to_value(&api_err).expect("serialize");
        assert!(json["error"]["details"].is_null() || json["error"].get("details").is_none());
    }
}
