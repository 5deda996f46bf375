// crates/vmp-server/src/routes/notifications.rs
// ============================================================================
// Module: Notification Routes
// Description: Lists and marks read a user's own notifications.
// Purpose: Per-user inbox, never cross-tenant.
// Dependencies: axum, vmp-domain, vmp-contract
// ============================================================================

use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use vmp_contract::requests::ListNotificationsQuery;
use vmp_contract::requests::MarkNotificationsReadRequest;
use vmp_contract::responses::NotificationView;
use vmp_contract::responses::UnreadCountView;

use crate::error::HttpError;
use crate::extract::AuthenticatedPrincipal;
use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Vec<NotificationView>>, HttpError> {
    let mut notifications = state.notifications.list_for_user(&principal.user_id)?;
    if query.unread {
        notifications.retain(|n| n.read_at.is_none());
    }
    Ok(Json(notifications.iter().map(NotificationView::from).collect()))
}

pub async fn unread_count(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<UnreadCountView>, HttpError> {
    let counts = state.notifications.unread_count(&principal.user_id)?;
    Ok(Json(UnreadCountView { total: counts.total, payment: counts.payment, case: counts.case, critical: counts.critical }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(body): Json<MarkNotificationsReadRequest>,
) -> Result<StatusCode, HttpError> {
    // `mark_read` takes a bare notification id with no ownership check, so
    // the caller-supplied id list is intersected against this user's own
    // unread notifications here rather than trusted directly.
    let own_unread: std::collections::HashSet<String> =
        state.notifications.list_for_user(&principal.user_id)?.into_iter().filter(|n| n.read_at.is_none()).map(|n| n.notification_id).collect();
    let ids: Vec<String> = match body.ids {
        Some(requested) => requested.into_iter().filter(|id| own_unread.contains(id)).collect(),
        None => own_unread.into_iter().collect(),
    };
    for id in ids {
        state.notifications.mark_read(&id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}
