//! Asset use cases (admin only): registration, metadata edits, and the
//! manual inventory operations (add / remove / adjust).

use chrono::Utc;
use gasvc_core::asset::{
    format_asset_code, Asset, AssetCategory, AssetCondition, ChangeType, NewAsset,
};
use gasvc_core::money::Money;
use gasvc_core::types::Id;
use gasvc_db::models::asset::{
    AssetRow, CreateAssetRequest, UpdateAssetRequest, UpdateInventoryRequest,
};
use gasvc_db::repositories::AssetRepo;

use super::load_asset;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Register a new asset. The code is drawn from the per-day sequence;
/// total and available start equal, condition starts good.
pub async fn create_asset(
    state: &AppState,
    actor: &AuthUser,
    input: CreateAssetRequest,
) -> AppResult<Asset> {
    let category = AssetCategory::parse(&input.category)?;
    let unit_cost = Money::idr(input.unit_cost)?;

    let now = Utc::now();
    let today = now.date_naive();
    let mut tx = state.pool.begin().await?;

    let sequence = AssetRepo::next_asset_code_seq(&mut tx, today).await?;
    let asset_code = format_asset_code(category, today, sequence);

    let asset = Asset::create(
        NewAsset {
            name: input.name,
            description: input.description,
            category,
            quantity: input.quantity,
            location: input.location,
            unit_cost,
        },
        asset_code,
        now,
    )?;

    AssetRepo::insert(&mut tx, &asset.snapshot()).await?;
    tx.commit().await?;

    tracing::info!(
        asset_id = %asset.id(),
        asset_code = %asset.asset_code(),
        created_by = %actor.user_id,
        "Asset registered"
    );
    Ok(asset)
}

/// Load an asset hydrated with its inventory log.
pub async fn get_asset(state: &AppState, id: Id) -> AppResult<Asset> {
    load_asset(&state.pool, id).await
}

pub async fn list_assets(
    state: &AppState,
    category: Option<&str>,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<AssetRow>> {
    let rows = match category {
        Some(category) => {
            let category = AssetCategory::parse(category)?;
            AssetRepo::list_by_category(&state.pool, category.as_str(), limit, offset).await?
        }
        None => AssetRepo::list_all(&state.pool, limit, offset).await?,
    };
    Ok(rows)
}

/// Edit asset metadata. Quantities never change here; those go through
/// [`update_inventory`]. Retirement is a condition change, never a
/// delete.
pub async fn update_asset(
    state: &AppState,
    id: Id,
    input: UpdateAssetRequest,
) -> AppResult<Asset> {
    let mut asset = load_asset(&state.pool, id).await?;
    let observed = asset.version();
    let now = Utc::now();

    if let Some(name) = &input.name {
        asset.set_name(name, now)?;
    }
    if let Some(description) = &input.description {
        asset.set_description(description, now);
    }
    if let Some(location) = &input.location {
        asset.set_location(location, now)?;
    }
    if let Some(condition) = &input.condition {
        asset.set_condition(AssetCondition::parse(condition)?, now);
    }
    if let Some(unit_cost) = input.unit_cost {
        asset.set_unit_cost(Money::idr(unit_cost)?, now);
    }
    if input.last_maintenance_at.is_some() || input.next_maintenance_at.is_some() {
        asset.set_maintenance_dates(
            input.last_maintenance_at.or(asset.last_maintenance_at()),
            input.next_maintenance_at.or(asset.next_maintenance_at()),
            now,
        );
    }

    let mut tx = state.pool.begin().await?;
    let won = AssetRepo::update_guarded(&mut tx, &asset.snapshot(), observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "asset was modified concurrently, reload and retry".into(),
        ));
    }
    tx.commit().await?;

    load_asset(&state.pool, id).await
}

/// Apply a manual inventory change. The quantity write and its log entry
/// commit in one transaction under the asset's version guard.
pub async fn update_inventory(
    state: &AppState,
    actor: &AuthUser,
    id: Id,
    input: UpdateInventoryRequest,
) -> AppResult<Asset> {
    let change = ChangeType::parse(&input.change_type)?;
    let mut asset = load_asset(&state.pool, id).await?;
    let observed = asset.version();
    let now = Utc::now();

    let entry = match change {
        ChangeType::Add => asset.add_stock(input.quantity, &input.reason, actor.user_id, now)?,
        ChangeType::Remove => {
            asset.remove_stock(input.quantity, &input.reason, actor.user_id, now)?
        }
        ChangeType::Adjust => {
            asset.adjust_stock(input.quantity, &input.reason, actor.user_id, now)?
        }
    }
    .clone();

    let mut tx = state.pool.begin().await?;
    let won = AssetRepo::update_guarded(&mut tx, &asset.snapshot(), observed).await?;
    if !won {
        return Err(AppError::Conflict(
            "asset inventory was modified concurrently, reload and retry".into(),
        ));
    }
    AssetRepo::insert_log(&mut tx, &entry).await?;
    tx.commit().await?;

    tracing::info!(
        asset_id = %id,
        change = %change,
        quantity = input.quantity,
        changed_by = %actor.user_id,
        "Inventory updated"
    );
    load_asset(&state.pool, id).await
}
