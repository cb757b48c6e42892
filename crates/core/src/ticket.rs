//! Ticket aggregate: classification, costs, the lifecycle state machine,
//! and the owned status-history / comment collections.
//!
//! The aggregate is persistence-free. Timestamps are always supplied by
//! the caller, and the `version` field is the value observed at load time;
//! the repository's conditional write increments it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::roles::Role;
use crate::types::{Id, Timestamp};

/// Human-facing ticket number prefix (`GA-2026-0001`).
pub const TICKET_NUMBER_PREFIX: &str = "GA";

/// Maximum ticket title length.
pub const MAX_TITLE_LEN: usize = 255;

/// Request categories. `OfficeFurniture` is a permanent approval trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    OfficeSupplies,
    FacilityMaintenance,
    PantrySupplies,
    MeetingRoom,
    OfficeFurniture,
    GeneralService,
}

impl TicketCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketCategory::OfficeSupplies => "office_supplies",
            TicketCategory::FacilityMaintenance => "facility_maintenance",
            TicketCategory::PantrySupplies => "pantry_supplies",
            TicketCategory::MeetingRoom => "meeting_room",
            TicketCategory::OfficeFurniture => "office_furniture",
            TicketCategory::GeneralService => "general_service",
        }
    }

    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "office_supplies" => Ok(TicketCategory::OfficeSupplies),
            "facility_maintenance" => Ok(TicketCategory::FacilityMaintenance),
            "pantry_supplies" => Ok(TicketCategory::PantrySupplies),
            "meeting_room" => Ok(TicketCategory::MeetingRoom),
            "office_furniture" => Ok(TicketCategory::OfficeFurniture),
            "general_service" => Ok(TicketCategory::GeneralService),
            other => Err(CoreError::Validation(format!(
                "invalid ticket category: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational priority; carries no workflow weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

impl TicketPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
        }
    }

    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "low" => Ok(TicketPriority::Low),
            "medium" => Ok(TicketPriority::Medium),
            "high" => Ok(TicketPriority::High),
            other => Err(CoreError::Validation(format!(
                "invalid ticket priority: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle states. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    WaitingApproval,
    Approved,
    Rejected,
    InProgress,
    Completed,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::WaitingApproval => "waiting_approval",
            TicketStatus::Approved => "approved",
            TicketStatus::Rejected => "rejected",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Completed => "completed",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "pending" => Ok(TicketStatus::Pending),
            "waiting_approval" => Ok(TicketStatus::WaitingApproval),
            "approved" => Ok(TicketStatus::Approved),
            "rejected" => Ok(TicketStatus::Rejected),
            "in_progress" => Ok(TicketStatus::InProgress),
            "completed" => Ok(TicketStatus::Completed),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(CoreError::Validation(format!(
                "invalid ticket status: {other}"
            ))),
        }
    }

    /// The legal-edge table. A transition is permitted only to one of
    /// these targets (or to the current state, which is a no-op).
    pub fn legal_targets(self) -> &'static [TicketStatus] {
        match self {
            TicketStatus::Pending => &[
                TicketStatus::WaitingApproval,
                TicketStatus::InProgress,
                TicketStatus::Closed,
            ],
            TicketStatus::WaitingApproval => &[
                TicketStatus::Approved,
                TicketStatus::Rejected,
                TicketStatus::Closed,
            ],
            TicketStatus::Approved => &[TicketStatus::InProgress, TicketStatus::Closed],
            TicketStatus::Rejected => &[TicketStatus::Closed],
            TicketStatus::InProgress => &[TicketStatus::Completed, TicketStatus::Closed],
            TicketStatus::Completed => &[TicketStatus::Closed],
            TicketStatus::Closed => &[],
        }
    }

    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        self == next || self.legal_targets().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self == TicketStatus::Closed
    }

    /// Every status, for exhaustive checks.
    pub fn all() -> &'static [TicketStatus] {
        &[
            TicketStatus::Pending,
            TicketStatus::WaitingApproval,
            TicketStatus::Approved,
            TicketStatus::Rejected,
            TicketStatus::InProgress,
            TicketStatus::Completed,
            TicketStatus::Closed,
        ]
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a ticket needs financial approval.
///
/// Approval is required when the category is office furniture or the
/// estimated cost reaches the threshold (inclusive).
#[derive(Debug, Clone, Copy)]
pub struct ApprovalPolicy {
    /// Estimated-cost threshold in IDR, inclusive.
    pub threshold: i64,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self { threshold: 500_000 }
    }
}

impl ApprovalPolicy {
    pub fn requires_approval(&self, category: TicketCategory, estimated_cost: &Money) -> bool {
        category == TicketCategory::OfficeFurniture || estimated_cost.amount() >= self.threshold
    }
}

/// Format a human-facing ticket number from the per-year sequence.
pub fn format_ticket_number(year: i32, sequence: i32) -> String {
    format!("{TICKET_NUMBER_PREFIX}-{year}-{sequence:04}")
}

/// One entry in a ticket's append-only status history.
#[derive(Debug, Clone, Serialize)]
pub struct StatusHistoryEntry {
    pub id: Id,
    pub ticket_id: Id,
    /// `None` for the creation entry.
    pub from_status: Option<TicketStatus>,
    pub to_status: TicketStatus,
    pub changed_by: Id,
    pub reason: String,
    pub created_at: Timestamp,
}

/// A comment on a ticket. Owned by the ticket; no independent identity.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Id,
    pub ticket_id: Id,
    pub author_id: Id,
    pub content: String,
    pub created_at: Timestamp,
}

/// Input for creating a ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub estimated_cost: Money,
    pub requester_id: Id,
    /// Optional link to a stocked asset consumed by fulfillment.
    pub asset_id: Option<Id>,
    pub asset_quantity: Option<i32>,
}

/// Persisted shape of a ticket, used to hydrate and store the aggregate.
#[derive(Debug, Clone)]
pub struct TicketSnapshot {
    pub id: Id,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub requester_id: Id,
    pub assigned_admin_id: Option<Id>,
    pub estimated_cost: Money,
    pub actual_cost: Option<Money>,
    pub requires_approval: bool,
    pub asset_id: Option<Id>,
    pub asset_quantity: Option<i32>,
    pub asset_allocated: bool,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub assigned_at: Option<Timestamp>,
}

/// The ticket aggregate root.
#[derive(Debug, Clone)]
pub struct Ticket {
    id: Id,
    ticket_number: String,
    title: String,
    description: String,
    category: TicketCategory,
    priority: TicketPriority,
    status: TicketStatus,
    requester_id: Id,
    assigned_admin_id: Option<Id>,
    estimated_cost: Money,
    actual_cost: Option<Money>,
    requires_approval: bool,
    asset_id: Option<Id>,
    asset_quantity: Option<i32>,
    asset_allocated: bool,
    version: i64,
    created_at: Timestamp,
    updated_at: Timestamp,
    completed_at: Option<Timestamp>,
    assigned_at: Option<Timestamp>,
    status_history: Vec<StatusHistoryEntry>,
    comments: Vec<Comment>,
}

impl Ticket {
    /// Create a new ticket.
    ///
    /// Derives `requires_approval` from the policy; when it is true the
    /// ticket starts directly in `waiting_approval`. Seeds the first
    /// status-history entry.
    pub fn create(
        input: NewTicket,
        ticket_number: String,
        policy: &ApprovalPolicy,
        now: Timestamp,
    ) -> CoreResult<Self> {
        if input.title.trim().is_empty() {
            return Err(CoreError::Validation("title is required".to_string()));
        }
        if input.title.len() > MAX_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "title must be {MAX_TITLE_LEN} characters or less"
            )));
        }
        if input.description.trim().is_empty() {
            return Err(CoreError::Validation(
                "description is required".to_string(),
            ));
        }
        match (input.asset_id, input.asset_quantity) {
            (None, None) => {}
            (Some(_), Some(qty)) if qty > 0 => {}
            (Some(_), Some(_)) => {
                return Err(CoreError::Validation(
                    "asset quantity must be greater than 0".to_string(),
                ));
            }
            _ => {
                return Err(CoreError::Validation(
                    "asset id and asset quantity must be provided together".to_string(),
                ));
            }
        }

        let requires_approval = policy.requires_approval(input.category, &input.estimated_cost);
        let status = if requires_approval {
            TicketStatus::WaitingApproval
        } else {
            TicketStatus::Pending
        };

        let id = Uuid::new_v4();
        let creation_entry = StatusHistoryEntry {
            id: Uuid::new_v4(),
            ticket_id: id,
            from_status: None,
            to_status: status,
            changed_by: input.requester_id,
            reason: "Ticket created".to_string(),
            created_at: now,
        };

        Ok(Self {
            id,
            ticket_number,
            title: input.title,
            description: input.description,
            category: input.category,
            priority: input.priority,
            status,
            requester_id: input.requester_id,
            assigned_admin_id: None,
            estimated_cost: input.estimated_cost,
            actual_cost: None,
            requires_approval,
            asset_id: input.asset_id,
            asset_quantity: input.asset_quantity,
            asset_allocated: false,
            version: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
            assigned_at: None,
            status_history: vec![creation_entry],
            comments: Vec::new(),
        })
    }

    /// Rebuild the aggregate from its persisted state.
    pub fn from_snapshot(
        snapshot: TicketSnapshot,
        status_history: Vec<StatusHistoryEntry>,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id: snapshot.id,
            ticket_number: snapshot.ticket_number,
            title: snapshot.title,
            description: snapshot.description,
            category: snapshot.category,
            priority: snapshot.priority,
            status: snapshot.status,
            requester_id: snapshot.requester_id,
            assigned_admin_id: snapshot.assigned_admin_id,
            estimated_cost: snapshot.estimated_cost,
            actual_cost: snapshot.actual_cost,
            requires_approval: snapshot.requires_approval,
            asset_id: snapshot.asset_id,
            asset_quantity: snapshot.asset_quantity,
            asset_allocated: snapshot.asset_allocated,
            version: snapshot.version,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            completed_at: snapshot.completed_at,
            assigned_at: snapshot.assigned_at,
            status_history,
            comments,
        }
    }

    /// Persisted shape of the current in-memory state.
    pub fn snapshot(&self) -> TicketSnapshot {
        TicketSnapshot {
            id: self.id,
            ticket_number: self.ticket_number.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            priority: self.priority,
            status: self.status,
            requester_id: self.requester_id,
            assigned_admin_id: self.assigned_admin_id,
            estimated_cost: self.estimated_cost,
            actual_cost: self.actual_cost,
            requires_approval: self.requires_approval,
            asset_id: self.asset_id,
            asset_quantity: self.asset_quantity,
            asset_allocated: self.asset_allocated,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            assigned_at: self.assigned_at,
        }
    }

    // --- accessors ---

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn ticket_number(&self) -> &str {
        &self.ticket_number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> TicketCategory {
        self.category
    }

    pub fn priority(&self) -> TicketPriority {
        self.priority
    }

    pub fn status(&self) -> TicketStatus {
        self.status
    }

    pub fn requester_id(&self) -> Id {
        self.requester_id
    }

    pub fn assigned_admin_id(&self) -> Option<Id> {
        self.assigned_admin_id
    }

    pub fn estimated_cost(&self) -> &Money {
        &self.estimated_cost
    }

    pub fn actual_cost(&self) -> Option<&Money> {
        self.actual_cost.as_ref()
    }

    pub fn requires_approval(&self) -> bool {
        self.requires_approval
    }

    pub fn asset_id(&self) -> Option<Id> {
        self.asset_id
    }

    pub fn asset_quantity(&self) -> Option<i32> {
        self.asset_quantity
    }

    pub fn asset_allocated(&self) -> bool {
        self.asset_allocated
    }

    /// The version observed at load time; the repository's conditional
    /// write uses it as the compare value and increments it on success.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn assigned_at(&self) -> Option<Timestamp> {
        self.assigned_at
    }

    pub fn status_history(&self) -> &[StatusHistoryEntry] {
        &self.status_history
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    // --- mutations ---

    /// Apply a status transition along the legal-edge table.
    ///
    /// Returns `Ok(None)` when the target equals the current status (an
    /// idempotent no-op that appends no history and changes nothing), or
    /// `Ok(Some(entry))` with the appended history entry. Reaching
    /// `completed` stamps the completion timestamp once.
    pub fn transition_to(
        &mut self,
        next: TicketStatus,
        reason: &str,
        actor: Id,
        now: Timestamp,
    ) -> CoreResult<Option<StatusHistoryEntry>> {
        if next == self.status {
            return Ok(None);
        }
        if !self.status.can_transition_to(next) {
            return Err(CoreError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }

        let entry = StatusHistoryEntry {
            id: Uuid::new_v4(),
            ticket_id: self.id,
            from_status: Some(self.status),
            to_status: next,
            changed_by: actor,
            reason: reason.to_string(),
            created_at: now,
        };

        self.status = next;
        self.updated_at = now;
        if next == TicketStatus::Completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        self.status_history.push(entry.clone());
        Ok(Some(entry))
    }

    /// Assign the ticket to an admin.
    ///
    /// Only legal while unassigned. From `pending` or `approved` the
    /// assignment auto-drives a transition to `in_progress`; the appended
    /// history entry (if any) is returned for persistence.
    pub fn assign_to_admin(
        &mut self,
        admin_id: Id,
        now: Timestamp,
    ) -> CoreResult<Option<StatusHistoryEntry>> {
        if self.assigned_admin_id.is_some() {
            return Err(CoreError::Validation(
                "ticket is already assigned".to_string(),
            ));
        }

        self.assigned_admin_id = Some(admin_id);
        self.assigned_at = Some(now);
        self.updated_at = now;

        if matches!(self.status, TicketStatus::Pending | TicketStatus::Approved) {
            return self.transition_to(TicketStatus::InProgress, "Assigned to admin", admin_id, now);
        }
        Ok(None)
    }

    /// Append a comment; the created comment is returned for persistence.
    pub fn add_comment(&mut self, content: &str, author_id: Id, now: Timestamp) -> CoreResult<Comment> {
        if content.trim().is_empty() {
            return Err(CoreError::Validation(
                "comment content is required".to_string(),
            ));
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            ticket_id: self.id,
            author_id,
            content: content.to_string(),
            created_at: now,
        };
        self.comments.push(comment.clone());
        self.updated_at = now;
        Ok(comment)
    }

    pub fn set_title(&mut self, title: &str, now: Timestamp) -> CoreResult<()> {
        if title.trim().is_empty() {
            return Err(CoreError::Validation("title is required".to_string()));
        }
        if title.len() > MAX_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "title must be {MAX_TITLE_LEN} characters or less"
            )));
        }
        self.title = title.to_string();
        self.updated_at = now;
        Ok(())
    }

    pub fn set_description(&mut self, description: &str, now: Timestamp) -> CoreResult<()> {
        if description.trim().is_empty() {
            return Err(CoreError::Validation(
                "description is required".to_string(),
            ));
        }
        self.description = description.to_string();
        self.updated_at = now;
        Ok(())
    }

    pub fn set_priority(&mut self, priority: TicketPriority, now: Timestamp) {
        self.priority = priority;
        self.updated_at = now;
    }

    /// Change the estimated cost and re-derive `requires_approval`.
    ///
    /// Only legal while the ticket is still `pending`; once it has left
    /// the initial state the approval requirement is frozen.
    pub fn set_estimated_cost(
        &mut self,
        cost: Money,
        policy: &ApprovalPolicy,
        now: Timestamp,
    ) -> CoreResult<()> {
        if self.status != TicketStatus::Pending {
            return Err(CoreError::Validation(
                "estimated cost can only be changed while the ticket is pending".to_string(),
            ));
        }
        self.estimated_cost = cost;
        self.requires_approval = policy.requires_approval(self.category, &self.estimated_cost);
        self.updated_at = now;
        Ok(())
    }

    /// Record the actual fulfillment cost. Settable only during
    /// fulfillment; once set it is never cleared.
    pub fn set_actual_cost(&mut self, cost: Money, now: Timestamp) -> CoreResult<()> {
        if !matches!(
            self.status,
            TicketStatus::InProgress | TicketStatus::Completed
        ) {
            return Err(CoreError::Validation(
                "actual cost can only be set during fulfillment".to_string(),
            ));
        }
        self.actual_cost = Some(cost);
        self.updated_at = now;
        Ok(())
    }

    /// Record that the linked asset quantity has been allocated.
    pub fn record_allocation(&mut self, now: Timestamp) {
        self.asset_allocated = true;
        self.updated_at = now;
    }

    /// Record that a prior allocation has been released.
    pub fn record_release(&mut self, now: Timestamp) {
        self.asset_allocated = false;
        self.updated_at = now;
    }

    /// View access: admins always; the requester on their own ticket; the
    /// assigned admin; approvers on tickets requiring approval.
    pub fn can_be_viewed_by(&self, user_id: Id, role: Role) -> bool {
        if role == Role::Admin {
            return true;
        }
        if self.requester_id == user_id {
            return true;
        }
        if self.assigned_admin_id == Some(user_id) {
            return true;
        }
        role == Role::Approver && self.requires_approval
    }
}
