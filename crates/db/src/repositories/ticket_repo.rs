//! Repository for the `tickets` table and its child tables.

use gasvc_core::ticket::{Comment, StatusHistoryEntry, TicketSnapshot};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::ticket::{CommentRow, StatusHistoryRow, TicketRow};

const TICKET_COLUMNS: &str = "id, ticket_number, title, description, category, priority, \
    status, requester_id, assigned_admin_id, estimated_cost, actual_cost, requires_approval, \
    asset_id, asset_quantity, asset_allocated, version, created_at, updated_at, completed_at, \
    assigned_at";

const HISTORY_COLUMNS: &str =
    "id, ticket_id, from_status, to_status, changed_by, reason, created_at";

const COMMENT_COLUMNS: &str = "id, ticket_id, author_id, content, created_at";

pub struct TicketRepo;

impl TicketRepo {
    /// Hand out the next per-year sequence value for human-facing ticket
    /// numbers. The upsert serializes concurrent callers on the year row,
    /// so values are unique and monotonic within a transaction's commit
    /// order.
    pub async fn next_ticket_number(conn: &mut PgConnection, year: i32) -> Result<i32, sqlx::Error> {
        let (value,): (i32,) = sqlx::query_as(
            "INSERT INTO ticket_sequences (year, last_value) VALUES ($1, 1)
             ON CONFLICT (year)
             DO UPDATE SET last_value = ticket_sequences.last_value + 1
             RETURNING last_value",
        )
        .bind(year)
        .fetch_one(conn)
        .await?;
        Ok(value)
    }

    /// Insert a freshly-created ticket from its snapshot.
    pub async fn insert(
        conn: &mut PgConnection,
        snapshot: &TicketSnapshot,
    ) -> Result<TicketRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets
                (id, ticket_number, title, description, category, priority, status,
                 requester_id, assigned_admin_id, estimated_cost, actual_cost,
                 requires_approval, asset_id, asset_quantity, asset_allocated, version,
                 created_at, updated_at, completed_at, assigned_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20)
             RETURNING {TICKET_COLUMNS}"
        );
        sqlx::query_as::<_, TicketRow>(&query)
            .bind(snapshot.id)
            .bind(&snapshot.ticket_number)
            .bind(&snapshot.title)
            .bind(&snapshot.description)
            .bind(snapshot.category.as_str())
            .bind(snapshot.priority.as_str())
            .bind(snapshot.status.as_str())
            .bind(snapshot.requester_id)
            .bind(snapshot.assigned_admin_id)
            .bind(snapshot.estimated_cost.amount())
            .bind(snapshot.actual_cost.map(|c| c.amount()))
            .bind(snapshot.requires_approval)
            .bind(snapshot.asset_id)
            .bind(snapshot.asset_quantity)
            .bind(snapshot.asset_allocated)
            .bind(snapshot.version)
            .bind(snapshot.created_at)
            .bind(snapshot.updated_at)
            .bind(snapshot.completed_at)
            .bind(snapshot.assigned_at)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<TicketRow>, sqlx::Error> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, TicketRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Re-read a ticket inside a use-case transaction, e.g. after losing
    /// a guarded update.
    pub async fn find_by_id_conn(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<TicketRow>, sqlx::Error> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, TicketRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List every ticket, newest first. Admin and approver scope.
    pub async fn list_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TicketRow>, sqlx::Error> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, TicketRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List tickets created by one requester, newest first.
    pub async fn list_for_requester(
        pool: &PgPool,
        requester_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TicketRow>, sqlx::Error> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE requester_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TicketRow>(&query)
            .bind(requester_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Approver scope: their own tickets plus every ticket that requires
    /// approval, newest first.
    pub async fn list_for_approver(
        pool: &PgPool,
        approver_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TicketRow>, sqlx::Error> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE requester_id = $1 OR requires_approval = TRUE
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TicketRow>(&query)
            .bind(approver_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_status(
        pool: &PgPool,
        status: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TicketRow>, sqlx::Error> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE status = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TicketRow>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Write back mutable ticket state, guarded by the version the caller
    /// observed when loading. Returns whether the row was won: `false`
    /// means another writer committed first and the caller must re-read.
    pub async fn update_guarded(
        conn: &mut PgConnection,
        snapshot: &TicketSnapshot,
        observed_version: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET
                title = $3,
                description = $4,
                priority = $5,
                status = $6,
                assigned_admin_id = $7,
                estimated_cost = $8,
                actual_cost = $9,
                requires_approval = $10,
                asset_allocated = $11,
                updated_at = $12,
                completed_at = $13,
                assigned_at = $14,
                version = version + 1
             WHERE id = $1 AND version = $2",
        )
        .bind(snapshot.id)
        .bind(observed_version)
        .bind(&snapshot.title)
        .bind(&snapshot.description)
        .bind(snapshot.priority.as_str())
        .bind(snapshot.status.as_str())
        .bind(snapshot.assigned_admin_id)
        .bind(snapshot.estimated_cost.amount())
        .bind(snapshot.actual_cost.map(|c| c.amount()))
        .bind(snapshot.requires_approval)
        .bind(snapshot.asset_allocated)
        .bind(snapshot.updated_at)
        .bind(snapshot.completed_at)
        .bind(snapshot.assigned_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_history(
        conn: &mut PgConnection,
        entry: &StatusHistoryEntry,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO ticket_status_history
                (id, ticket_id, from_status, to_status, changed_by, reason, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(entry.ticket_id)
        .bind(entry.from_status.map(|s| s.as_str()))
        .bind(entry.to_status.as_str())
        .bind(entry.changed_by)
        .bind(&entry.reason)
        .bind(entry.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Status history for one ticket, oldest first.
    pub async fn list_history(
        pool: &PgPool,
        ticket_id: Uuid,
    ) -> Result<Vec<StatusHistoryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM ticket_status_history
             WHERE ticket_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, StatusHistoryRow>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a comment row. Callers commit this together with the
    /// guarded ticket write so the ticket version moves with the append.
    pub async fn insert_comment(
        conn: &mut PgConnection,
        comment: &Comment,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO ticket_comments (id, ticket_id, author_id, content, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(comment.id)
        .bind(comment.ticket_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Comments for one ticket, oldest first.
    pub async fn list_comments(
        pool: &PgPool,
        ticket_id: Uuid,
    ) -> Result<Vec<CommentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM ticket_comments
             WHERE ticket_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }
}
