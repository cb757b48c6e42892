//! Ticket row models, request payloads, and response views.

use gasvc_core::error::CoreResult;
use gasvc_core::money::Money;
use gasvc_core::ticket::{
    Comment, StatusHistoryEntry, Ticket, TicketCategory, TicketPriority, TicketSnapshot,
    TicketStatus,
};
use gasvc_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `tickets` table. Enum-valued columns are stored as
/// text and parsed at the domain boundary.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketRow {
    pub id: Uuid,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub requester_id: Uuid,
    pub assigned_admin_id: Option<Uuid>,
    pub estimated_cost: i64,
    pub actual_cost: Option<i64>,
    pub requires_approval: bool,
    pub asset_id: Option<Uuid>,
    pub asset_quantity: Option<i32>,
    pub asset_allocated: bool,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub assigned_at: Option<Timestamp>,
}

impl TicketRow {
    /// Parse the stored row into the aggregate's persisted shape.
    pub fn into_snapshot(self) -> CoreResult<TicketSnapshot> {
        Ok(TicketSnapshot {
            id: self.id,
            ticket_number: self.ticket_number,
            title: self.title,
            description: self.description,
            category: TicketCategory::parse(&self.category)?,
            priority: TicketPriority::parse(&self.priority)?,
            status: TicketStatus::parse(&self.status)?,
            requester_id: self.requester_id,
            assigned_admin_id: self.assigned_admin_id,
            estimated_cost: Money::idr(self.estimated_cost)?,
            actual_cost: self.actual_cost.map(Money::idr).transpose()?,
            requires_approval: self.requires_approval,
            asset_id: self.asset_id,
            asset_quantity: self.asset_quantity,
            asset_allocated: self.asset_allocated,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            assigned_at: self.assigned_at,
        })
    }
}

/// A row from the `ticket_status_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusHistoryRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_by: Uuid,
    pub reason: String,
    pub created_at: Timestamp,
}

impl StatusHistoryRow {
    pub fn into_entry(self) -> CoreResult<StatusHistoryEntry> {
        Ok(StatusHistoryEntry {
            id: self.id,
            ticket_id: self.ticket_id,
            from_status: self
                .from_status
                .as_deref()
                .map(TicketStatus::parse)
                .transpose()?,
            to_status: TicketStatus::parse(&self.to_status)?,
            changed_by: self.changed_by,
            reason: self.reason,
            created_at: self.created_at,
        })
    }
}

/// A row from the `ticket_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: Timestamp,
}

impl CommentRow {
    pub fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            ticket_id: self.ticket_id,
            author_id: self.author_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// Request body for creating a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub estimated_cost: i64,
    pub asset_id: Option<Uuid>,
    pub asset_quantity: Option<i32>,
}

/// Request body for updating ticket fields. Only non-`None` fields are
/// applied.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub estimated_cost: Option<i64>,
}

/// Request body for assigning a ticket to an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignTicketRequest {
    pub admin_id: Uuid,
}

/// Request body for an explicit status update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub reason: Option<String>,
    /// Fulfillment cost; accepted together with a move to `completed`.
    pub actual_cost: Option<i64>,
}

/// Request body for adding a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

/// Pagination query parameters shared by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    /// Clamp to sane bounds: limit in [1, 100] (default 20), offset >= 0.
    pub fn clamped(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Fully-hydrated ticket response, including the owned child
/// collections.
#[derive(Debug, Serialize)]
pub struct TicketView {
    pub id: Id,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub requester_id: Id,
    pub assigned_admin_id: Option<Id>,
    pub estimated_cost: i64,
    pub actual_cost: Option<i64>,
    pub requires_approval: bool,
    pub asset_id: Option<Id>,
    pub asset_quantity: Option<i32>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub assigned_at: Option<Timestamp>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub comments: Vec<Comment>,
}

impl TicketView {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id(),
            ticket_number: ticket.ticket_number().to_string(),
            title: ticket.title().to_string(),
            description: ticket.description().to_string(),
            category: ticket.category(),
            priority: ticket.priority(),
            status: ticket.status(),
            requester_id: ticket.requester_id(),
            assigned_admin_id: ticket.assigned_admin_id(),
            estimated_cost: ticket.estimated_cost().amount(),
            actual_cost: ticket.actual_cost().map(|c| c.amount()),
            requires_approval: ticket.requires_approval(),
            asset_id: ticket.asset_id(),
            asset_quantity: ticket.asset_quantity(),
            version: ticket.version(),
            created_at: ticket.created_at(),
            updated_at: ticket.updated_at(),
            completed_at: ticket.completed_at(),
            assigned_at: ticket.assigned_at(),
            status_history: ticket.status_history().to_vec(),
            comments: ticket.comments().to_vec(),
        }
    }
}
