// crates/vmp-server/src/error.rs
// ============================================================================
// Module: HTTP Error Mapping
// Description: Turns a VmpError into the `{error: {kind, message, details}}`
//              envelope at the correct HTTP status.
// Purpose: Give every handler one `?`-compatible error type.
// Dependencies: axum, vmp-core, vmp-contract
// ============================================================================

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use vmp_contract::ApiError;
use vmp_core::VmpError;

/// Wraps [`VmpError`] so it can be returned directly from an axum handler.
pub struct HttpError(pub VmpError);

impl From<VmpError> for HttpError {
    fn from(err: VmpError) -> Self {
        Self(err)
    }
}

impl From<vmp_domain::DomainError> for HttpError {
    fn from(err: vmp_domain::DomainError) -> Self {
        Self(err.into())
    }
}

impl From<vmp_authz::AuthzError> for HttpError {
    fn from(err: vmp_authz::AuthzError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ApiError::from(self.0))).into_response()
    }
}
