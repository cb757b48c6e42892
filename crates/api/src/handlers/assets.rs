//! HTTP handlers for asset management (admin only).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use gasvc_core::types::Id;
use gasvc_db::models::asset::{
    AssetView, CreateAssetRequest, UpdateAssetRequest, UpdateInventoryRequest,
};
use gasvc_db::models::ticket::PageParams;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::usecases;

#[derive(Debug, Deserialize)]
pub struct ListAssetsParams {
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/assets
pub async fn create_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAssetRequest>,
) -> AppResult<impl IntoResponse> {
    let asset = usecases::assets::create_asset(&state, &admin, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AssetView::from_asset(&asset),
        }),
    ))
}

/// GET /api/v1/assets
pub async fn list_assets(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListAssetsParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = PageParams {
        limit: params.limit,
        offset: params.offset,
    }
    .clamped();
    let rows =
        usecases::assets::list_assets(&state, params.category.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/assets/{id}
pub async fn get_asset(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let asset = usecases::assets::get_asset(&state, id).await?;
    Ok(Json(DataResponse {
        data: AssetView::from_asset(&asset),
    }))
}

/// PUT /api/v1/assets/{id}
pub async fn update_asset(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateAssetRequest>,
) -> AppResult<impl IntoResponse> {
    let asset = usecases::assets::update_asset(&state, id, input).await?;
    Ok(Json(DataResponse {
        data: AssetView::from_asset(&asset),
    }))
}

/// PUT /api/v1/assets/{id}/inventory
pub async fn update_inventory(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(input): Json<UpdateInventoryRequest>,
) -> AppResult<impl IntoResponse> {
    let asset = usecases::assets::update_inventory(&state, &admin, id, input).await?;
    Ok(Json(DataResponse {
        data: AssetView::from_asset(&asset),
    }))
}
