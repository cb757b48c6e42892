//! Repository for the `assets` and `inventory_logs` tables.

use chrono::NaiveDate;
use gasvc_core::asset::{AssetSnapshot, InventoryLogEntry};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::asset::{AssetRow, InventoryLogRow};

const ASSET_COLUMNS: &str = "id, asset_code, name, description, category, total_quantity, \
    available_quantity, location, condition, unit_cost, last_maintenance_at, \
    next_maintenance_at, version, created_at, updated_at";

const LOG_COLUMNS: &str = "id, asset_id, change_type, quantity, reason, created_by, created_at";

pub struct AssetRepo;

impl AssetRepo {
    /// Hand out the next per-day sequence value for human-facing asset
    /// codes.
    pub async fn next_asset_code_seq(
        conn: &mut PgConnection,
        day: NaiveDate,
    ) -> Result<i32, sqlx::Error> {
        let (value,): (i32,) = sqlx::query_as(
            "INSERT INTO asset_code_sequences (day, last_value) VALUES ($1, 1)
             ON CONFLICT (day)
             DO UPDATE SET last_value = asset_code_sequences.last_value + 1
             RETURNING last_value",
        )
        .bind(day)
        .fetch_one(conn)
        .await?;
        Ok(value)
    }

    /// Insert a freshly-created asset from its snapshot.
    pub async fn insert(
        conn: &mut PgConnection,
        snapshot: &AssetSnapshot,
    ) -> Result<AssetRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets
                (id, asset_code, name, description, category, total_quantity,
                 available_quantity, location, condition, unit_cost, last_maintenance_at,
                 next_maintenance_at, version, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {ASSET_COLUMNS}"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(snapshot.id)
            .bind(&snapshot.asset_code)
            .bind(&snapshot.name)
            .bind(&snapshot.description)
            .bind(snapshot.category.as_str())
            .bind(snapshot.total_quantity)
            .bind(snapshot.available_quantity)
            .bind(&snapshot.location)
            .bind(snapshot.condition.as_str())
            .bind(snapshot.unit_cost.amount())
            .bind(snapshot.last_maintenance_at)
            .bind(snapshot.next_maintenance_at)
            .bind(snapshot.version)
            .bind(snapshot.created_at)
            .bind(snapshot.updated_at)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Re-read an asset inside a use-case transaction, e.g. after losing
    /// a guarded update.
    pub async fn find_by_id_conn(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AssetRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ASSET_COLUMNS} FROM assets
             ORDER BY asset_code ASC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_category(
        pool: &PgPool,
        category: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AssetRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ASSET_COLUMNS} FROM assets
             WHERE category = $1
             ORDER BY asset_code ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Write back mutable asset state, guarded by the version the caller
    /// observed when loading. Returns whether the row was won. The
    /// quantity CHECK constraints back up the domain invariant even if a
    /// caller computes a bad pair.
    pub async fn update_guarded(
        conn: &mut PgConnection,
        snapshot: &AssetSnapshot,
        observed_version: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE assets SET
                name = $3,
                description = $4,
                total_quantity = $5,
                available_quantity = $6,
                location = $7,
                condition = $8,
                unit_cost = $9,
                last_maintenance_at = $10,
                next_maintenance_at = $11,
                updated_at = $12,
                version = version + 1
             WHERE id = $1 AND version = $2",
        )
        .bind(snapshot.id)
        .bind(observed_version)
        .bind(&snapshot.name)
        .bind(&snapshot.description)
        .bind(snapshot.total_quantity)
        .bind(snapshot.available_quantity)
        .bind(&snapshot.location)
        .bind(snapshot.condition.as_str())
        .bind(snapshot.unit_cost.amount())
        .bind(snapshot.last_maintenance_at)
        .bind(snapshot.next_maintenance_at)
        .bind(snapshot.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_log(
        conn: &mut PgConnection,
        entry: &InventoryLogEntry,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO inventory_logs
                (id, asset_id, change_type, quantity, reason, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(entry.asset_id)
        .bind(entry.change_type.as_str())
        .bind(entry.quantity)
        .bind(&entry.reason)
        .bind(entry.created_by)
        .bind(entry.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Inventory log for one asset, oldest first.
    pub async fn list_logs(
        pool: &PgPool,
        asset_id: Uuid,
    ) -> Result<Vec<InventoryLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM inventory_logs
             WHERE asset_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, InventoryLogRow>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }
}
