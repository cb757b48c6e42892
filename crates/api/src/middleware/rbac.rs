//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not carry the required permission. Access checks go through the
//! permission-lookup table in `gasvc_core::roles`, never through ad-hoc
//! role comparisons in handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gasvc_core::error::CoreError;
use gasvc_core::roles::Permission;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `ManageAssets` permission (admins). Rejects with 403
/// Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.can(Permission::ManageAssets) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `DecideApproval` permission (approvers and admins).
/// Rejects with 403 Forbidden otherwise.
pub struct RequireApprover(pub AuthUser);

impl FromRequestParts<AppState> for RequireApprover {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.can(Permission::DecideApproval) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Approver or Admin role required".into(),
            )));
        }
        Ok(RequireApprover(user))
    }
}
