//! Use-case layer: orchestration between HTTP handlers and the domain.
//!
//! Each function resolves access control, loads the aggregate, delegates
//! to the domain, and persists under the version guard with history
//! appended in the same transaction. Handlers stay thin.

pub mod approvals;
pub mod assets;
pub mod tickets;

use gasvc_core::asset::Asset;
use gasvc_core::error::{CoreError, CoreResult};
use gasvc_core::ticket::Ticket;
use gasvc_core::types::Id;
use gasvc_db::repositories::{AssetRepo, TicketRepo};
use gasvc_db::DbPool;

use crate::error::AppResult;

/// Load a fully-hydrated ticket aggregate (snapshot, history, comments).
pub(crate) async fn load_ticket(pool: &DbPool, id: Id) -> AppResult<Ticket> {
    let row = TicketRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Ticket",
            id,
        })?;
    let snapshot = row.into_snapshot()?;

    let history = TicketRepo::list_history(pool, id)
        .await?
        .into_iter()
        .map(|r| r.into_entry())
        .collect::<CoreResult<Vec<_>>>()?;
    let comments = TicketRepo::list_comments(pool, id)
        .await?
        .into_iter()
        .map(|r| r.into_comment())
        .collect();

    Ok(Ticket::from_snapshot(snapshot, history, comments))
}

/// Load an asset aggregate with its inventory log.
pub(crate) async fn load_asset(pool: &DbPool, id: Id) -> AppResult<Asset> {
    let row = AssetRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Asset", id })?;
    let snapshot = row.into_snapshot()?;

    let log = AssetRepo::list_logs(pool, id)
        .await?
        .into_iter()
        .map(|r| r.into_entry())
        .collect::<CoreResult<Vec<_>>>()?;

    Ok(Asset::from_snapshot(snapshot, log))
}
