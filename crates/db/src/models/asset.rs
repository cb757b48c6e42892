//! Asset row models, request payloads, and response views.

use gasvc_core::asset::{
    Asset, AssetCategory, AssetCondition, AssetSnapshot, ChangeType, InventoryLogEntry,
};
use gasvc_core::error::CoreResult;
use gasvc_core::money::Money;
use gasvc_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetRow {
    pub id: Uuid,
    pub asset_code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub location: String,
    pub condition: String,
    pub unit_cost: i64,
    pub last_maintenance_at: Option<Timestamp>,
    pub next_maintenance_at: Option<Timestamp>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AssetRow {
    pub fn into_snapshot(self) -> CoreResult<AssetSnapshot> {
        Ok(AssetSnapshot {
            id: self.id,
            asset_code: self.asset_code,
            name: self.name,
            description: self.description,
            category: AssetCategory::parse(&self.category)?,
            total_quantity: self.total_quantity,
            available_quantity: self.available_quantity,
            location: self.location,
            condition: AssetCondition::parse(&self.condition)?,
            unit_cost: Money::idr(self.unit_cost)?,
            last_maintenance_at: self.last_maintenance_at,
            next_maintenance_at: self.next_maintenance_at,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A row from the `inventory_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InventoryLogRow {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub change_type: String,
    pub quantity: i32,
    pub reason: String,
    pub created_by: Uuid,
    pub created_at: Timestamp,
}

impl InventoryLogRow {
    pub fn into_entry(self) -> CoreResult<InventoryLogEntry> {
        Ok(InventoryLogEntry {
            id: self.id,
            asset_id: self.asset_id,
            change_type: ChangeType::parse(&self.change_type)?,
            quantity: self.quantity,
            reason: self.reason,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

/// Request body for registering an asset.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssetRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub quantity: i32,
    pub location: String,
    pub unit_cost: i64,
}

/// Request body for editing asset metadata. Quantities are never
/// touched here; those go through the inventory endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub unit_cost: Option<i64>,
    pub last_maintenance_at: Option<Timestamp>,
    pub next_maintenance_at: Option<Timestamp>,
}

/// Request body for a manual inventory change (`add`, `remove`, or
/// `adjust`).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInventoryRequest {
    pub change_type: String,
    pub quantity: i32,
    pub reason: String,
}

/// Asset response, optionally carrying the inventory log.
#[derive(Debug, Serialize)]
pub struct AssetView {
    pub id: Id,
    pub asset_code: String,
    pub name: String,
    pub description: String,
    pub category: AssetCategory,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub location: String,
    pub condition: AssetCondition,
    pub unit_cost: i64,
    pub last_maintenance_at: Option<Timestamp>,
    pub next_maintenance_at: Option<Timestamp>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub inventory_log: Vec<InventoryLogEntry>,
}

impl AssetView {
    pub fn from_asset(asset: &Asset) -> Self {
        Self {
            id: asset.id(),
            asset_code: asset.asset_code().to_string(),
            name: asset.name().to_string(),
            description: asset.description().to_string(),
            category: asset.category(),
            total_quantity: asset.total_quantity(),
            available_quantity: asset.available_quantity(),
            location: asset.location().to_string(),
            condition: asset.condition(),
            unit_cost: asset.unit_cost().amount(),
            last_maintenance_at: asset.last_maintenance_at(),
            next_maintenance_at: asset.next_maintenance_at(),
            version: asset.version(),
            created_at: asset.created_at(),
            updated_at: asset.updated_at(),
            inventory_log: asset.inventory_log().to_vec(),
        }
    }
}
