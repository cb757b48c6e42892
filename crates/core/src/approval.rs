//! Approval records and decision rules.
//!
//! One pending record is created whenever a ticket enters
//! `waiting_approval`; it is resolved exactly once. The
//! first-come-first-served arbitration between racing approvers lives in
//! the use-case layer on top of the repository's version-guarded write;
//! this module owns the record's own small state machine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{Id, Timestamp};

/// Lifecycle of a single approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "invalid approval status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An actor's decision on a ticket awaiting approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    /// Validate decision inputs: a rejection must carry a reason.
    pub fn validate_notes(self, notes: Option<&str>) -> CoreResult<()> {
        if self == ApprovalDecision::Reject
            && notes.map(str::trim).filter(|n| !n.is_empty()).is_none()
        {
            return Err(CoreError::Validation(
                "rejection reason is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single approval record for a (ticket, decision) pair.
#[derive(Debug, Clone)]
pub struct ApprovalRecord {
    pub id: Id,
    pub ticket_id: Id,
    /// The actor who resolved the record; unset while pending.
    pub approver_id: Option<Id>,
    pub status: ApprovalStatus,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub decided_at: Option<Timestamp>,
}

impl ApprovalRecord {
    /// Create the pending record for a ticket entering `waiting_approval`.
    pub fn pending(ticket_id: Id, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            approver_id: None,
            status: ApprovalStatus::Pending,
            notes: None,
            created_at: now,
            decided_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Resolve the record. A record already out of `pending` is terminal:
    /// later attempts observe the committed decision and conflict.
    pub fn resolve(
        &mut self,
        decision: ApprovalDecision,
        approver_id: Id,
        notes: Option<String>,
        now: Timestamp,
    ) -> CoreResult<()> {
        if !self.is_pending() {
            return Err(CoreError::ApprovalConflict);
        }
        decision.validate_notes(notes.as_deref())?;

        self.status = match decision {
            ApprovalDecision::Approve => ApprovalStatus::Approved,
            ApprovalDecision::Reject => ApprovalStatus::Rejected,
        };
        self.approver_id = Some(approver_id);
        self.notes = notes;
        self.decided_at = Some(now);
        Ok(())
    }
}
