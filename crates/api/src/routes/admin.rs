//! Admin routes, nested under `/admin`.
//!
//! ```text
//! GET    /users         list_users
//! POST   /users         create_user
//! DELETE /users/{id}    deactivate_user
//! ```

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", delete(admin::deactivate_user))
}
