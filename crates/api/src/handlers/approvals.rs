//! HTTP handlers for the approval workflow (approver or admin only).

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use gasvc_core::approval::ApprovalDecision;
use gasvc_core::types::Id;
use gasvc_db::models::approval::{ApproveTicketRequest, RejectTicketRequest};
use gasvc_db::models::ticket::{PageParams, TicketView};
use gasvc_db::repositories::ApprovalRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireApprover;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::usecases;

/// POST /api/v1/tickets/{id}/approve
pub async fn approve_ticket(
    RequireApprover(approver): RequireApprover,
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(input): Json<ApproveTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket =
        usecases::approvals::decide(&state, &approver, id, ApprovalDecision::Approve, input.notes)
            .await?;
    Ok(Json(DataResponse {
        data: TicketView::from_ticket(&ticket),
    }))
}

/// POST /api/v1/tickets/{id}/reject
///
/// A rejection must carry a reason; the decision layer enforces it.
pub async fn reject_ticket(
    RequireApprover(approver): RequireApprover,
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(input): Json<RejectTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = usecases::approvals::decide(
        &state,
        &approver,
        id,
        ApprovalDecision::Reject,
        Some(input.reason),
    )
    .await?;
    Ok(Json(DataResponse {
        data: TicketView::from_ticket(&ticket),
    }))
}

/// GET /api/v1/approvals/pending
///
/// The approver queue, oldest first.
pub async fn list_pending(
    RequireApprover(_approver): RequireApprover,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page.clamped();
    let rows = usecases::approvals::list_pending(&state, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/tickets/{id}/approvals
///
/// Full approval history for one ticket, newest first.
pub async fn list_for_ticket(
    RequireApprover(_approver): RequireApprover,
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let rows = ApprovalRepo::list_for_ticket(&state.pool, id).await?;
    Ok(Json(DataResponse { data: rows }))
}
