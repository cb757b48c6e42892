//! Role tags and the permission-lookup table.
//!
//! Roles are a closed set dispatched through a static permission table,
//! so the state machine and coordinator stay free of role branching
//! beyond the access-control boundary in the use-case layer.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// The three user roles known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Requester,
    Approver,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Requester => "requester",
            Role::Approver => "approver",
            Role::Admin => "admin",
        }
    }

    /// Parse a stored role name.
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "requester" => Ok(Role::Requester),
            "approver" => Ok(Role::Approver),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("invalid role: {other}"))),
        }
    }

    /// Whether this role carries the given permission.
    pub fn can(self, permission: Permission) -> bool {
        permissions(self).contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    CreateTicket,
    ViewOwnTickets,
    ViewAllTickets,
    CommentOnTicket,
    DeleteOwnTicket,
    ViewApprovalQueue,
    DecideApproval,
    AssignTicket,
    UpdateTicketStatus,
    ManageAssets,
}

const REQUESTER_PERMISSIONS: &[Permission] = &[
    Permission::CreateTicket,
    Permission::ViewOwnTickets,
    Permission::CommentOnTicket,
    Permission::DeleteOwnTicket,
];

const APPROVER_PERMISSIONS: &[Permission] = &[
    Permission::CreateTicket,
    Permission::ViewOwnTickets,
    Permission::CommentOnTicket,
    Permission::DeleteOwnTicket,
    Permission::ViewApprovalQueue,
    Permission::DecideApproval,
];

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::CreateTicket,
    Permission::ViewOwnTickets,
    Permission::ViewAllTickets,
    Permission::CommentOnTicket,
    Permission::DeleteOwnTicket,
    Permission::ViewApprovalQueue,
    Permission::DecideApproval,
    Permission::AssignTicket,
    Permission::UpdateTicketStatus,
    Permission::ManageAssets,
];

/// The permission set for a role.
pub fn permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Requester => REQUESTER_PERMISSIONS,
        Role::Approver => APPROVER_PERMISSIONS,
        Role::Admin => ADMIN_PERMISSIONS,
    }
}
