// crates/vmp-server/src/extract.rs
// ============================================================================
// Module: Principal Extractor
// Description: Pulls the `Authorization: Bearer` header off a request and
//              resolves it to a Principal before a handler body runs.
// Purpose: Make "no token, or an invalid one" a rejection at the extractor
//          boundary instead of a check duplicated in every handler.
// Dependencies: axum, vmp-authz
// ============================================================================

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use vmp_authz::PrincipalResolver;
use vmp_authz::Principal;
use vmp_core::VmpError;

use crate::error::HttpError;
use crate::state::AppState;

/// An authenticated caller, extracted from the bearer token on the request.
pub struct AuthenticatedPrincipal(pub Principal);

impl FromRequestParts<AppState> for AuthenticatedPrincipal {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| HttpError::from(VmpError::unauthenticated("missing bearer token")))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| HttpError::from(VmpError::unauthenticated("expected a Bearer authorization header")))?;
        let principal = state.resolver.resolve(token).await?;
        Ok(Self(principal))
    }
}
