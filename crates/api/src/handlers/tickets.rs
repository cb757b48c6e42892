//! HTTP handlers for tickets. Handlers stay thin: deserialize, call the
//! use case, shape the response.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use gasvc_core::types::Id;
use gasvc_db::models::ticket::{
    AddCommentRequest, AssignTicketRequest, CreateTicketRequest, PageParams, TicketView,
    UpdateStatusRequest, UpdateTicketRequest,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::usecases;

#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/tickets
pub async fn create_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = usecases::tickets::create_ticket(&state, &auth, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TicketView::from_ticket(&ticket),
        }),
    ))
}

/// GET /api/v1/tickets
///
/// Role-scoped listing. The `status` filter only applies to admins.
pub async fn list_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListTicketsParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = PageParams {
        limit: params.limit,
        offset: params.offset,
    }
    .clamped();
    let rows =
        usecases::tickets::list_tickets(&state, &auth, params.status.as_deref(), limit, offset)
            .await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/tickets/{id}
pub async fn get_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let ticket = usecases::tickets::get_ticket(&state, &auth, id).await?;
    Ok(Json(DataResponse {
        data: TicketView::from_ticket(&ticket),
    }))
}

/// PUT /api/v1/tickets/{id}
pub async fn update_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = usecases::tickets::update_ticket(&state, &auth, id, input).await?;
    Ok(Json(DataResponse {
        data: TicketView::from_ticket(&ticket),
    }))
}

/// DELETE /api/v1/tickets/{id}
pub async fn delete_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    usecases::tickets::delete_ticket(&state, &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tickets/{id}/assign (admin only)
pub async fn assign_ticket(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(input): Json<AssignTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = usecases::tickets::assign_ticket(&state, &admin, id, input).await?;
    Ok(Json(DataResponse {
        data: TicketView::from_ticket(&ticket),
    }))
}

/// PUT /api/v1/tickets/{id}/status (admin only)
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = usecases::tickets::update_status(&state, &admin, id, input).await?;
    Ok(Json(DataResponse {
        data: TicketView::from_ticket(&ticket),
    }))
}

/// POST /api/v1/tickets/{id}/comments
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(input): Json<AddCommentRequest>,
) -> AppResult<impl IntoResponse> {
    let comment = usecases::tickets::add_comment(&state, &auth, id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}
