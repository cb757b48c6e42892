//! Ticket routes, nested under `/tickets`.
//!
//! ```text
//! GET    /                  list_tickets
//! POST   /                  create_ticket
//! GET    /{id}              get_ticket
//! PUT    /{id}              update_ticket
//! DELETE /{id}              delete_ticket
//! POST   /{id}/assign       assign_ticket
//! PUT    /{id}/status       update_status
//! POST   /{id}/comments     add_comment
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_tickets).post(tickets::create_ticket))
        .route(
            "/{id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/{id}/assign", post(tickets::assign_ticket))
        .route("/{id}/status", put(tickets::update_status))
        .route("/{id}/comments", post(tickets::add_comment))
}
