//! The approval coordinator: first-come-first-served arbitration between
//! racing approvers.
//!
//! The committed write is a conditional UPDATE on the ticket's observed
//! version. Zero affected rows means another writer got there first; a
//! re-read distinguishes a decided ticket (conflict) from an unrelated
//! version bump (one bounded retry, then conflict). The winner's write is
//! an ordinary state-machine transition plus resolution of the pending
//! approval record, all in one transaction. Losers get an explicit
//! conflict, never a silent overwrite.

use chrono::Utc;
use gasvc_core::approval::{ApprovalDecision, ApprovalStatus};
use gasvc_core::error::CoreError;
use gasvc_core::ticket::{Ticket, TicketStatus};
use gasvc_core::types::Id;
use gasvc_db::models::approval::PendingApprovalRow;
use gasvc_db::repositories::{ApprovalRepo, TicketRepo};

use super::load_ticket;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Decide a ticket awaiting approval. Exactly one of any set of racing
/// decisions commits; the rest observe `ApprovalConflict`.
pub async fn decide(
    state: &AppState,
    actor: &AuthUser,
    ticket_id: Id,
    decision: ApprovalDecision,
    notes: Option<String>,
) -> AppResult<Ticket> {
    decision.validate_notes(notes.as_deref())?;

    let mut attempts = 0u32;
    loop {
        let mut ticket = load_ticket(&state.pool, ticket_id).await?;
        if !ticket.requires_approval() {
            return Err(CoreError::ApprovalNotRequired.into());
        }
        match ticket.status() {
            TicketStatus::WaitingApproval => {}
            TicketStatus::Approved | TicketStatus::Rejected => {
                return Err(CoreError::ApprovalConflict.into());
            }
            status => return Err(CoreError::NotAwaitingApproval { status }.into()),
        }

        let observed = ticket.version();
        let now = Utc::now();
        let (target, record_status) = match decision {
            ApprovalDecision::Approve => (TicketStatus::Approved, ApprovalStatus::Approved),
            ApprovalDecision::Reject => (TicketStatus::Rejected, ApprovalStatus::Rejected),
        };
        let reason = notes.clone().unwrap_or_else(|| match decision {
            ApprovalDecision::Approve => "Approved".to_string(),
            ApprovalDecision::Reject => "Rejected".to_string(),
        });

        let entry = ticket.transition_to(target, &reason, actor.user_id, now)?;

        let mut tx = state.pool.begin().await?;
        let won = TicketRepo::update_guarded(&mut tx, &ticket.snapshot(), observed).await?;
        if !won {
            drop(tx);
            attempts += 1;

            let current = TicketRepo::find_by_id(&state.pool, ticket_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Ticket",
                    id: ticket_id,
                })?;
            if current.status != TicketStatus::WaitingApproval.as_str() || attempts > 1 {
                return Err(CoreError::ApprovalConflict.into());
            }
            // Version moved but the ticket is still undecided (e.g. a
            // concurrent field edit); one retry against the new version.
            continue;
        }

        if let Some(entry) = &entry {
            TicketRepo::insert_history(&mut tx, entry).await?;
        }
        let resolved = ApprovalRepo::resolve_pending(
            &mut tx,
            ticket_id,
            record_status.as_str(),
            actor.user_id,
            notes.as_deref(),
            now,
        )
        .await?;
        if !resolved {
            // Pending record already resolved; dropping the transaction
            // rolls back the ticket write.
            return Err(CoreError::ApprovalConflict.into());
        }
        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket_id,
            approver_id = %actor.user_id,
            decision = %record_status,
            "Approval decided"
        );
        return load_ticket(&state.pool, ticket_id).await;
    }
}

/// The approver queue: pending approvals joined with their tickets.
pub async fn list_pending(
    state: &AppState,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<PendingApprovalRow>> {
    Ok(ApprovalRepo::list_pending(&state.pool, limit, offset).await?)
}
