//! Admin-only user management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use gasvc_core::error::CoreError;
use gasvc_core::roles::Role;
use gasvc_core::types::Id;
use gasvc_db::models::user::CreateUserRequest;
use gasvc_db::repositories::{NewUserRecord, UserRepo};
use uuid::Uuid;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/users
///
/// Register a user. The role must parse and the password must meet the
/// strength floor before anything touches the database.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    Role::parse(&input.role)?;
    validate_password_strength(&input.password).map_err(AppError::BadRequest)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("password hashing failed: {e}")))?;

    let record = NewUserRecord {
        id: Uuid::new_v4(),
        employee_id: input.employee_id,
        name: input.name,
        email: input.email,
        department: input.department,
        role: input.role,
        password_hash,
    };
    let user = UserRepo::create(&state.pool, &record).await?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        created_by = %admin.user_id,
        "User created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: user.into_view(),
        }),
    ))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list_all(&state.pool).await?;
    let views: Vec<_> = users.into_iter().map(|u| u.into_view()).collect();
    Ok(Json(DataResponse { data: views }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Deactivate an account. Users are never deleted; an inactive account
/// simply cannot log in any more.
pub async fn deactivate_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let changed = UserRepo::deactivate(&state.pool, id).await?;
    if !changed {
        return Err(CoreError::NotFound { entity: "User", id }.into());
    }

    tracing::info!(user_id = %id, deactivated_by = %admin.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}
