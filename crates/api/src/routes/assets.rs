//! Asset routes, nested under `/assets` (admin only).
//!
//! ```text
//! GET    /                  list_assets
//! POST   /                  create_asset
//! GET    /{id}              get_asset
//! PUT    /{id}              update_asset
//! PUT    /{id}/inventory    update_inventory
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route("/{id}", get(assets::get_asset).put(assets::update_asset))
        .route("/{id}/inventory", put(assets::update_inventory))
}
