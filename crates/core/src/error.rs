use crate::ticket::TicketStatus;
use crate::types::Id;

/// Domain error taxonomy shared by every layer.
///
/// All core operations return these explicitly; nothing is swallowed.
/// `InvariantViolation` marks internal consistency failures that should be
/// unreachable in correct operation and is surfaced opaquely by the API.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: Id },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition {
        from: TicketStatus,
        to: TicketStatus,
    },

    #[error("Ticket does not require approval")]
    ApprovalNotRequired,

    #[error("Ticket is not awaiting approval (current status: {status})")]
    NotAwaitingApproval { status: TicketStatus },

    #[error("Another approval decision was already committed for this ticket")]
    ApprovalConflict,

    #[error("Insufficient available quantity (available: {available}, requested: {requested})")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for core operation results.
pub type CoreResult<T> = Result<T, CoreError>;
