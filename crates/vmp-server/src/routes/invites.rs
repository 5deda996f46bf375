// crates/vmp-server/src/routes/invites.rs
// ============================================================================
// Module: Invite Routes
// Description: Issues vendor-onboarding invites.
// Purpose: The only route that mints a cleartext invite token.
// Dependencies: axum, vmp-domain, vmp-contract
// ============================================================================

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use vmp_contract::requests::CreateInviteRequest;
use vmp_contract::requests::CreateInviteResponse;

use crate::error::HttpError;
use crate::extract::AuthenticatedPrincipal;
use crate::state::AppState;

pub async fn create_invite(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(body): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<CreateInviteResponse>), HttpError> {
    let issued = state.tenants.create_invite(&principal.tenant_id, &body.email, &principal.user_id)?;
    let token_url = format!("{}/invites/{}/accept", state.base_url, issued.token);
    Ok((
        StatusCode::CREATED,
        Json(CreateInviteResponse { invite_id: issued.invite.invite_id, token_url, expires_at: issued.invite.expires_at }),
    ))
}
