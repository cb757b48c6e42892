//! Ticket use cases: creation, reads, edits, assignment, status changes,
//! deletion (= closing), and comments.

use chrono::{Datelike, Utc};
use gasvc_core::approval::ApprovalRecord;
use gasvc_core::asset::Asset;
use gasvc_core::error::CoreError;
use gasvc_core::money::Money;
use gasvc_core::roles::Role;
use gasvc_core::ticket::{
    format_ticket_number, Comment, NewTicket, Ticket, TicketCategory, TicketPriority, TicketStatus,
};
use gasvc_core::types::{Id, Timestamp};
use gasvc_db::models::ticket::{
    AddCommentRequest, AssignTicketRequest, CreateTicketRequest, TicketRow, UpdateStatusRequest,
    UpdateTicketRequest,
};
use gasvc_db::repositories::{ApprovalRepo, AssetRepo, TicketRepo, UserRepo};
use sqlx::PgConnection;

use super::load_ticket;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Create a ticket. The ticket number is drawn from the per-year
/// sequence, history is seeded, and a pending approval record is created
/// in the same transaction when the approval policy fires.
pub async fn create_ticket(
    state: &AppState,
    actor: &AuthUser,
    input: CreateTicketRequest,
) -> AppResult<Ticket> {
    let category = TicketCategory::parse(&input.category)?;
    let priority = TicketPriority::parse(&input.priority)?;
    let estimated_cost = Money::idr(input.estimated_cost)?;

    // A linked asset must exist before the ticket can reference it.
    if let Some(asset_id) = input.asset_id {
        AssetRepo::find_by_id(&state.pool, asset_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Asset",
                id: asset_id,
            })?;
    }

    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let sequence = TicketRepo::next_ticket_number(&mut tx, now.year()).await?;
    let ticket_number = format_ticket_number(now.year(), sequence);

    let ticket = Ticket::create(
        NewTicket {
            title: input.title,
            description: input.description,
            category,
            priority,
            estimated_cost,
            requester_id: actor.user_id,
            asset_id: input.asset_id,
            asset_quantity: input.asset_quantity,
        },
        ticket_number,
        &state.config.approval_policy(),
        now,
    )?;

    TicketRepo::insert(&mut tx, &ticket.snapshot()).await?;
    for entry in ticket.status_history() {
        TicketRepo::insert_history(&mut tx, entry).await?;
    }
    if ticket.requires_approval() {
        let record = ApprovalRecord::pending(ticket.id(), now);
        ApprovalRepo::insert_pending(&mut tx, &record).await?;
    }

    tx.commit().await?;

    tracing::info!(
        ticket_id = %ticket.id(),
        ticket_number = %ticket.ticket_number(),
        requester_id = %actor.user_id,
        requires_approval = ticket.requires_approval(),
        "Ticket created"
    );
    Ok(ticket)
}

/// Load a ticket the actor is allowed to view.
pub async fn get_ticket(state: &AppState, actor: &AuthUser, id: Id) -> AppResult<Ticket> {
    let ticket = load_ticket(&state.pool, id).await?;
    if !ticket.can_be_viewed_by(actor.user_id, actor.role) {
        return Err(CoreError::Forbidden("You cannot view this ticket".into()).into());
    }
    Ok(ticket)
}

/// Role-scoped ticket listing. Requesters see their own tickets,
/// approvers additionally see everything awaiting approval, admins see
/// all (optionally filtered by status).
pub async fn list_tickets(
    state: &AppState,
    actor: &AuthUser,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<TicketRow>> {
    let rows = match actor.role {
        Role::Admin => match status {
            Some(status) => {
                let status = TicketStatus::parse(status)?;
                TicketRepo::list_by_status(&state.pool, status.as_str(), limit, offset).await?
            }
            None => TicketRepo::list_all(&state.pool, limit, offset).await?,
        },
        Role::Approver => {
            TicketRepo::list_for_approver(&state.pool, actor.user_id, limit, offset).await?
        }
        Role::Requester => {
            TicketRepo::list_for_requester(&state.pool, actor.user_id, limit, offset).await?
        }
    };
    Ok(rows)
}

/// Edit ticket fields. Estimated-cost edits re-derive the approval
/// requirement and, when it fires on a still-pending ticket, move it to
/// `waiting_approval` with a fresh pending approval record.
pub async fn update_ticket(
    state: &AppState,
    actor: &AuthUser,
    id: Id,
    input: UpdateTicketRequest,
) -> AppResult<Ticket> {
    let mut ticket = load_ticket(&state.pool, id).await?;
    ensure_owner_or_admin(&ticket, actor)?;

    let observed = ticket.version();
    let now = Utc::now();

    if let Some(title) = &input.title {
        ticket.set_title(title, now)?;
    }
    if let Some(description) = &input.description {
        ticket.set_description(description, now)?;
    }
    if let Some(priority) = &input.priority {
        ticket.set_priority(TicketPriority::parse(priority)?, now);
    }

    let mut new_entry = None;
    let mut new_approval = None;
    if let Some(cost) = input.estimated_cost {
        ticket.set_estimated_cost(Money::idr(cost)?, &state.config.approval_policy(), now)?;
        if ticket.requires_approval() && ticket.status() == TicketStatus::Pending {
            new_entry = ticket.transition_to(
                TicketStatus::WaitingApproval,
                "Approval required after cost update",
                actor.user_id,
                now,
            )?;
            new_approval = Some(ApprovalRecord::pending(ticket.id(), now));
        }
    }

    let mut tx = state.pool.begin().await?;
    let won = TicketRepo::update_guarded(&mut tx, &ticket.snapshot(), observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "ticket was modified concurrently, reload and retry".into(),
        ));
    }
    if let Some(entry) = &new_entry {
        TicketRepo::insert_history(&mut tx, entry).await?;
    }
    if let Some(record) = &new_approval {
        ApprovalRepo::insert_pending(&mut tx, record).await?;
    }
    tx.commit().await?;

    load_ticket(&state.pool, id).await
}

/// Assign a ticket to an admin. From `pending` or `approved` the
/// assignment moves the ticket straight into fulfillment, which may
/// allocate linked inventory.
pub async fn assign_ticket(
    state: &AppState,
    actor: &AuthUser,
    id: Id,
    input: AssignTicketRequest,
) -> AppResult<Ticket> {
    let target = UserRepo::find_by_id(&state.pool, input.admin_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: input.admin_id,
        })?;
    if Role::parse(&target.role)? != Role::Admin || !target.is_active {
        return Err(CoreError::Validation("assignee must be an active admin".into()).into());
    }

    let mut ticket = load_ticket(&state.pool, id).await?;
    let observed = ticket.version();
    let now = Utc::now();

    let entry = ticket.assign_to_admin(input.admin_id, now)?;

    let mut tx = state.pool.begin().await?;
    if ticket.status() == TicketStatus::InProgress && !ticket.asset_allocated() {
        allocate_linked_asset(&mut tx, &mut ticket, actor.user_id, now).await?;
    }
    let won = TicketRepo::update_guarded(&mut tx, &ticket.snapshot(), observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "ticket was modified concurrently, reload and retry".into(),
        ));
    }
    if let Some(entry) = &entry {
        TicketRepo::insert_history(&mut tx, entry).await?;
    }
    tx.commit().await?;

    tracing::info!(
        ticket_id = %id,
        admin_id = %input.admin_id,
        status = %ticket.status(),
        "Ticket assigned"
    );
    load_ticket(&state.pool, id).await
}

/// Explicit status update along the legal-edge table. Entering
/// fulfillment allocates linked inventory in the same transaction;
/// closing an in-progress ticket without completing it releases the
/// allocation.
pub async fn update_status(
    state: &AppState,
    actor: &AuthUser,
    id: Id,
    input: UpdateStatusRequest,
) -> AppResult<Ticket> {
    let next = TicketStatus::parse(&input.status)?;
    let mut ticket = load_ticket(&state.pool, id).await?;
    let observed = ticket.version();
    let now = Utc::now();

    let reason = input.reason.as_deref().unwrap_or("Status updated");
    let Some(entry) = ticket.transition_to(next, reason, actor.user_id, now)? else {
        // Same-status transition: idempotent no-op, nothing persisted.
        return Ok(ticket);
    };
    if let Some(cost) = input.actual_cost {
        ticket.set_actual_cost(Money::idr(cost)?, now)?;
    }

    let mut tx = state.pool.begin().await?;
    if next == TicketStatus::InProgress && !ticket.asset_allocated() {
        allocate_linked_asset(&mut tx, &mut ticket, actor.user_id, now).await?;
    }
    if next == TicketStatus::Closed
        && entry.from_status == Some(TicketStatus::InProgress)
        && ticket.asset_allocated()
    {
        release_linked_asset(&mut tx, &mut ticket, actor.user_id, now).await?;
    }
    let won = TicketRepo::update_guarded(&mut tx, &ticket.snapshot(), observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "ticket was modified concurrently, reload and retry".into(),
        ));
    }
    TicketRepo::insert_history(&mut tx, &entry).await?;
    tx.commit().await?;

    tracing::info!(
        ticket_id = %id,
        from = %entry.from_status.map(|s| s.as_str()).unwrap_or("-"),
        to = %next,
        changed_by = %actor.user_id,
        "Ticket status updated"
    );
    load_ticket(&state.pool, id).await
}

/// Delete a ticket. Tickets are never removed from the database: this is
/// a close with an attributed reason, legal only from `pending` or
/// `rejected`, by the requester or an admin.
pub async fn delete_ticket(state: &AppState, actor: &AuthUser, id: Id) -> AppResult<()> {
    let mut ticket = load_ticket(&state.pool, id).await?;
    ensure_owner_or_admin(&ticket, actor)?;
    if !matches!(
        ticket.status(),
        TicketStatus::Pending | TicketStatus::Rejected
    ) {
        return Err(CoreError::Validation(
            "only pending or rejected tickets can be deleted".into(),
        )
        .into());
    }

    let observed = ticket.version();
    let now = Utc::now();
    let entry = ticket.transition_to(TicketStatus::Closed, "Ticket deleted", actor.user_id, now)?;

    let mut tx = state.pool.begin().await?;
    let won = TicketRepo::update_guarded(&mut tx, &ticket.snapshot(), observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "ticket was modified concurrently, reload and retry".into(),
        ));
    }
    if let Some(entry) = &entry {
        TicketRepo::insert_history(&mut tx, entry).await?;
    }
    tx.commit().await?;

    tracing::info!(ticket_id = %id, deleted_by = %actor.user_id, "Ticket closed via delete");
    Ok(())
}

/// Append a comment to a ticket the actor can view.
pub async fn add_comment(
    state: &AppState,
    actor: &AuthUser,
    id: Id,
    input: AddCommentRequest,
) -> AppResult<Comment> {
    let mut ticket = load_ticket(&state.pool, id).await?;
    if !ticket.can_be_viewed_by(actor.user_id, actor.role) {
        return Err(CoreError::Forbidden("You cannot comment on this ticket".into()).into());
    }

    let observed = ticket.version();
    let comment = ticket.add_comment(&input.content, actor.user_id, Utc::now())?;

    // The comment row commits together with a guarded version bump, so
    // concurrent writers holding the old version observe the append.
    let mut tx = state.pool.begin().await?;
    let won = TicketRepo::update_guarded(&mut tx, &ticket.snapshot(), observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "ticket was modified concurrently, reload and retry".into(),
        ));
    }
    TicketRepo::insert_comment(&mut tx, &comment).await?;
    tx.commit().await?;
    Ok(comment)
}

fn ensure_owner_or_admin(ticket: &Ticket, actor: &AuthUser) -> AppResult<()> {
    if actor.role != Role::Admin && ticket.requester_id() != actor.user_id {
        return Err(CoreError::Forbidden("You do not own this ticket".into()).into());
    }
    Ok(())
}

/// Allocate the ticket's linked asset quantity under the asset's version
/// guard. A failed allocation (insufficient stock, unusable asset, lost
/// guard) propagates an error, rolling back the surrounding transaction
/// so the ticket never reaches fulfillment holding a failed allocation.
async fn allocate_linked_asset(
    conn: &mut PgConnection,
    ticket: &mut Ticket,
    actor: Id,
    now: Timestamp,
) -> AppResult<()> {
    let (Some(asset_id), Some(quantity)) = (ticket.asset_id(), ticket.asset_quantity()) else {
        return Ok(());
    };

    let row = AssetRepo::find_by_id_conn(conn, asset_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Asset",
            id: asset_id,
        })?;
    let snapshot = row.into_snapshot()?;
    let asset_observed = snapshot.version;
    let mut asset = Asset::from_snapshot(snapshot, Vec::new());

    let entry = asset
        .allocate(quantity, ticket.ticket_number(), actor, now)?
        .clone();
    let won = AssetRepo::update_guarded(conn, &asset.snapshot(), asset_observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "asset inventory was modified concurrently, retry".into(),
        ));
    }
    AssetRepo::insert_log(conn, &entry).await?;

    ticket.record_allocation(now);
    tracing::info!(
        ticket_id = %ticket.id(),
        asset_id = %asset_id,
        quantity,
        "Inventory allocated for ticket"
    );
    Ok(())
}

/// Reverse a prior allocation when fulfillment is abandoned.
async fn release_linked_asset(
    conn: &mut PgConnection,
    ticket: &mut Ticket,
    actor: Id,
    now: Timestamp,
) -> AppResult<()> {
    let (Some(asset_id), Some(quantity)) = (ticket.asset_id(), ticket.asset_quantity()) else {
        return Ok(());
    };

    let row = AssetRepo::find_by_id_conn(conn, asset_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Asset",
            id: asset_id,
        })?;
    let snapshot = row.into_snapshot()?;
    let asset_observed = snapshot.version;
    let mut asset = Asset::from_snapshot(snapshot, Vec::new());

    let entry = asset
        .release(quantity, ticket.ticket_number(), actor, now)?
        .clone();
    let won = AssetRepo::update_guarded(conn, &asset.snapshot(), asset_observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "asset inventory was modified concurrently, retry".into(),
        ));
    }
    AssetRepo::insert_log(conn, &entry).await?;

    ticket.record_release(now);
    tracing::info!(
        ticket_id = %ticket.id(),
        asset_id = %asset_id,
        quantity,
        "Inventory released for ticket"
    );
    Ok(())
}
