//! Approval workflow routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::approvals;
use crate::state::AppState;

/// Ticket-scoped approval routes, merged into `/tickets`.
///
/// ```text
/// POST   /{id}/approve      approve_ticket
/// POST   /{id}/reject       reject_ticket
/// GET    /{id}/approvals    list_for_ticket
/// ```
pub fn ticket_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/approve", post(approvals::approve_ticket))
        .route("/{id}/reject", post(approvals::reject_ticket))
        .route("/{id}/approvals", get(approvals::list_for_ticket))
}

/// Top-level approval routes, nested under `/approvals`.
///
/// ```text
/// GET    /pending           list_pending
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/pending", get(approvals::list_pending))
}
