//! Approval row models and request payloads.

use gasvc_core::approval::{ApprovalRecord, ApprovalStatus};
use gasvc_core::error::CoreResult;
use gasvc_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `ticket_approvals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub approver_id: Option<Uuid>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub decided_at: Option<Timestamp>,
}

impl ApprovalRow {
    pub fn into_record(self) -> CoreResult<ApprovalRecord> {
        Ok(ApprovalRecord {
            id: self.id,
            ticket_id: self.ticket_id,
            approver_id: self.approver_id,
            status: ApprovalStatus::parse(&self.status)?,
            notes: self.notes,
            created_at: self.created_at,
            decided_at: self.decided_at,
        })
    }
}

/// A pending approval joined with its ticket, for the approver queue.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingApprovalRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub ticket_number: String,
    pub title: String,
    pub category: String,
    pub priority: String,
    pub requester_id: Uuid,
    pub estimated_cost: i64,
    pub created_at: Timestamp,
}

/// Request body for approving a ticket. Notes are optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApproveTicketRequest {
    pub notes: Option<String>,
}

/// Request body for rejecting a ticket. The reason is mandatory.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectTicketRequest {
    pub reason: String,
}
