pub mod admin;
pub mod approvals;
pub mod assets;
pub mod auth;
pub mod health;
pub mod tickets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                     login (public)
/// /auth/me                        current user
///
/// /admin/users                    list, create (admin only)
/// /admin/users/{id}               deactivate (admin only)
///
/// /tickets                        list, create
/// /tickets/{id}                   get, update, delete
/// /tickets/{id}/assign            assign to admin (admin only)
/// /tickets/{id}/status            explicit status change (admin only)
/// /tickets/{id}/comments          add comment
/// /tickets/{id}/approve           approve (approver/admin)
/// /tickets/{id}/reject            reject (approver/admin)
/// /tickets/{id}/approvals         approval history (approver/admin)
///
/// /approvals/pending              approver queue (approver/admin)
///
/// /assets                         list, create (admin only)
/// /assets/{id}                    get, update (admin only)
/// /assets/{id}/inventory          manual inventory change (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/tickets", tickets::router().merge(approvals::ticket_router()))
        .nest("/approvals", approvals::router())
        .nest("/assets", assets::router())
}
