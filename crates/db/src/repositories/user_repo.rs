//! Repository for the `users` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::UserRow;

const USER_COLUMNS: &str = "id, employee_id, name, email, department, role, password_hash, \
    is_active, created_at, updated_at";

/// Input for inserting a user. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub id: Uuid,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: String,
    pub password_hash: String,
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewUserRecord) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, employee_id, name, email, department, role, password_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(input.id)
            .bind(&input.employee_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.department)
            .bind(&input.role)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up a user for login. Inactive accounts are excluded.
    pub async fn find_active_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        let query =
            format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND is_active = TRUE");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<UserRow>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY name ASC");
        sqlx::query_as::<_, UserRow>(&query).fetch_all(pool).await
    }

    /// Deactivate a user. Returns whether a row changed.
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = now()
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
