//! User row models, auth payloads, and the public user view.

use gasvc_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `users` table. The password hash never leaves the db
/// layer; handlers respond with [`UserView`].
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserRow {
    pub fn into_view(self) -> UserView {
        UserView {
            id: self.id,
            employee_id: self.employee_id,
            name: self.name,
            email: self.email,
            department: self.department,
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for registering a user (admin only).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: String,
    pub role: String,
    pub password: String,
}

/// Public shape of a user, without credentials.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Id,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}
