//! Repository for the `ticket_approvals` table.
//!
//! A partial unique index keeps at most one `pending` row per ticket.
//! [`ApprovalRepo::resolve_pending`] is the arbitration primitive behind
//! first-come-first-served decisions: it only matches the pending row, so
//! exactly one of any set of racing writers sees an affected row.

use gasvc_core::approval::ApprovalRecord;
use gasvc_core::types::Timestamp;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::approval::{ApprovalRow, PendingApprovalRow};

const APPROVAL_COLUMNS: &str = "id, ticket_id, approver_id, status, notes, created_at, decided_at";

pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Insert the pending record for a ticket entering approval.
    pub async fn insert_pending(
        conn: &mut PgConnection,
        record: &ApprovalRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO ticket_approvals (id, ticket_id, status, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(record.id)
        .bind(record.ticket_id)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn find_pending_for_ticket(
        pool: &PgPool,
        ticket_id: Uuid,
    ) -> Result<Option<ApprovalRow>, sqlx::Error> {
        let query = format!(
            "SELECT {APPROVAL_COLUMNS} FROM ticket_approvals
             WHERE ticket_id = $1 AND status = 'pending'"
        );
        sqlx::query_as::<_, ApprovalRow>(&query)
            .bind(ticket_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the pending record for a ticket. The WHERE clause only
    /// matches an unresolved row, so a second resolver observes zero
    /// affected rows and must treat the decision as already taken.
    pub async fn resolve_pending(
        conn: &mut PgConnection,
        ticket_id: Uuid,
        status: &str,
        approver_id: Uuid,
        notes: Option<&str>,
        decided_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ticket_approvals SET
                status = $2,
                approver_id = $3,
                notes = $4,
                decided_at = $5
             WHERE ticket_id = $1 AND status = 'pending'",
        )
        .bind(ticket_id)
        .bind(status)
        .bind(approver_id)
        .bind(notes)
        .bind(decided_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All approval records for one ticket, newest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: Uuid,
    ) -> Result<Vec<ApprovalRow>, sqlx::Error> {
        let query = format!(
            "SELECT {APPROVAL_COLUMNS} FROM ticket_approvals
             WHERE ticket_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ApprovalRow>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// The approver queue: pending approvals joined with their tickets,
    /// oldest first.
    pub async fn list_pending(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PendingApprovalRow>, sqlx::Error> {
        sqlx::query_as::<_, PendingApprovalRow>(
            "SELECT
                a.id,
                a.ticket_id,
                t.ticket_number,
                t.title,
                t.category,
                t.priority,
                t.requester_id,
                t.estimated_cost,
                a.created_at
             FROM ticket_approvals a
             JOIN tickets t ON t.id = a.ticket_id
             WHERE a.status = 'pending'
             ORDER BY a.created_at ASC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
