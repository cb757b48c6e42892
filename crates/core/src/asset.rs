//! Asset aggregate: quantities, condition, and the append-only inventory
//! ledger.
//!
//! Invariant at every point in time: `0 <= available <= total`. Every
//! quantity mutation appends exactly one log entry, so the history is
//! fully reconstructable by replay. Assets are never deleted; retirement
//! is a condition change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Id, Timestamp};

/// Asset categories, each with a two-letter code used in asset codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    OfficeFurniture,
    OfficeSupplies,
    PantrySupplies,
    FacilityEquipment,
    MeetingRoomEquipment,
    CleaningSupplies,
}

impl AssetCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetCategory::OfficeFurniture => "office_furniture",
            AssetCategory::OfficeSupplies => "office_supplies",
            AssetCategory::PantrySupplies => "pantry_supplies",
            AssetCategory::FacilityEquipment => "facility_equipment",
            AssetCategory::MeetingRoomEquipment => "meeting_room_equipment",
            AssetCategory::CleaningSupplies => "cleaning_supplies",
        }
    }

    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "office_furniture" => Ok(AssetCategory::OfficeFurniture),
            "office_supplies" => Ok(AssetCategory::OfficeSupplies),
            "pantry_supplies" => Ok(AssetCategory::PantrySupplies),
            "facility_equipment" => Ok(AssetCategory::FacilityEquipment),
            "meeting_room_equipment" => Ok(AssetCategory::MeetingRoomEquipment),
            "cleaning_supplies" => Ok(AssetCategory::CleaningSupplies),
            other => Err(CoreError::Validation(format!(
                "invalid asset category: {other}"
            ))),
        }
    }

    /// Two-letter prefix used in human-facing asset codes.
    pub fn code(self) -> &'static str {
        match self {
            AssetCategory::OfficeFurniture => "OF",
            AssetCategory::OfficeSupplies => "OS",
            AssetCategory::PantrySupplies => "PS",
            AssetCategory::FacilityEquipment => "FE",
            AssetCategory::MeetingRoomEquipment => "MR",
            AssetCategory::CleaningSupplies => "CS",
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical condition. Only `Good` assets are usable for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCondition {
    Good,
    NeedsMaintenance,
    Broken,
}

impl AssetCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetCondition::Good => "good",
            AssetCondition::NeedsMaintenance => "needs_maintenance",
            AssetCondition::Broken => "broken",
        }
    }

    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "good" => Ok(AssetCondition::Good),
            "needs_maintenance" => Ok(AssetCondition::NeedsMaintenance),
            "broken" => Ok(AssetCondition::Broken),
            other => Err(CoreError::Validation(format!(
                "invalid asset condition: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for AssetCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed inventory change classes. Allocations and releases are folded
/// into `Remove` / `Add` entries with a tagged reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Add,
    Remove,
    Adjust,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Add => "add",
            ChangeType::Remove => "remove",
            ChangeType::Adjust => "adjust",
        }
    }

    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "add" => Ok(ChangeType::Add),
            "remove" => Ok(ChangeType::Remove),
            "adjust" => Ok(ChangeType::Adjust),
            other => Err(CoreError::Validation(format!(
                "invalid change type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in an asset's append-only inventory log.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryLogEntry {
    pub id: Id,
    pub asset_id: Id,
    pub change_type: ChangeType,
    pub quantity: i32,
    pub reason: String,
    pub created_by: Id,
    pub created_at: Timestamp,
}

/// Format a human-facing asset code, e.g. `OF-20260824-0012`.
pub fn format_asset_code(category: AssetCategory, date: chrono::NaiveDate, sequence: i32) -> String {
    format!("{}-{}-{sequence:04}", category.code(), date.format("%Y%m%d"))
}

/// Input for creating an asset. Total and available start equal.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub description: String,
    pub category: AssetCategory,
    pub quantity: i32,
    pub location: String,
    pub unit_cost: Money,
}

/// Persisted shape of an asset.
#[derive(Debug, Clone)]
pub struct AssetSnapshot {
    pub id: Id,
    pub asset_code: String,
    pub name: String,
    pub description: String,
    pub category: AssetCategory,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub location: String,
    pub condition: AssetCondition,
    pub unit_cost: Money,
    pub last_maintenance_at: Option<Timestamp>,
    pub next_maintenance_at: Option<Timestamp>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The asset aggregate root, owner of the inventory ledger.
#[derive(Debug, Clone)]
pub struct Asset {
    id: Id,
    asset_code: String,
    name: String,
    description: String,
    category: AssetCategory,
    total_quantity: i32,
    available_quantity: i32,
    location: String,
    condition: AssetCondition,
    unit_cost: Money,
    last_maintenance_at: Option<Timestamp>,
    next_maintenance_at: Option<Timestamp>,
    version: i64,
    created_at: Timestamp,
    updated_at: Timestamp,
    inventory_log: Vec<InventoryLogEntry>,
}

impl Asset {
    /// Create a new asset with `total = available = quantity` and a
    /// `good` condition.
    pub fn create(input: NewAsset, asset_code: String, now: Timestamp) -> CoreResult<Self> {
        if input.name.trim().is_empty() {
            return Err(CoreError::Validation("asset name is required".to_string()));
        }
        if input.quantity < 0 {
            return Err(CoreError::Validation(
                "quantity cannot be negative".to_string(),
            ));
        }
        if input.location.trim().is_empty() {
            return Err(CoreError::Validation("location is required".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            asset_code,
            name: input.name,
            description: input.description,
            category: input.category,
            total_quantity: input.quantity,
            available_quantity: input.quantity,
            location: input.location,
            condition: AssetCondition::Good,
            unit_cost: input.unit_cost,
            last_maintenance_at: None,
            next_maintenance_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
            inventory_log: Vec::new(),
        })
    }

    /// Rebuild the aggregate from its persisted state.
    pub fn from_snapshot(snapshot: AssetSnapshot, inventory_log: Vec<InventoryLogEntry>) -> Self {
        Self {
            id: snapshot.id,
            asset_code: snapshot.asset_code,
            name: snapshot.name,
            description: snapshot.description,
            category: snapshot.category,
            total_quantity: snapshot.total_quantity,
            available_quantity: snapshot.available_quantity,
            location: snapshot.location,
            condition: snapshot.condition,
            unit_cost: snapshot.unit_cost,
            last_maintenance_at: snapshot.last_maintenance_at,
            next_maintenance_at: snapshot.next_maintenance_at,
            version: snapshot.version,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            inventory_log,
        }
    }

    /// Persisted shape of the current in-memory state.
    pub fn snapshot(&self) -> AssetSnapshot {
        AssetSnapshot {
            id: self.id,
            asset_code: self.asset_code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category,
            total_quantity: self.total_quantity,
            available_quantity: self.available_quantity,
            location: self.location.clone(),
            condition: self.condition,
            unit_cost: self.unit_cost,
            last_maintenance_at: self.last_maintenance_at,
            next_maintenance_at: self.next_maintenance_at,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // --- accessors ---

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn asset_code(&self) -> &str {
        &self.asset_code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> AssetCategory {
        self.category
    }

    pub fn total_quantity(&self) -> i32 {
        self.total_quantity
    }

    pub fn available_quantity(&self) -> i32 {
        self.available_quantity
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn condition(&self) -> AssetCondition {
        self.condition
    }

    pub fn unit_cost(&self) -> &Money {
        &self.unit_cost
    }

    pub fn last_maintenance_at(&self) -> Option<Timestamp> {
        self.last_maintenance_at
    }

    pub fn next_maintenance_at(&self) -> Option<Timestamp> {
        self.next_maintenance_at
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn inventory_log(&self) -> &[InventoryLogEntry] {
        &self.inventory_log
    }

    /// Usable for allocation: stock on hand and in good condition.
    pub fn is_usable(&self) -> bool {
        self.available_quantity > 0 && self.condition == AssetCondition::Good
    }

    // --- simple mutations ---

    pub fn set_name(&mut self, name: &str, now: Timestamp) -> CoreResult<()> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("asset name is required".to_string()));
        }
        self.name = name.to_string();
        self.updated_at = now;
        Ok(())
    }

    pub fn set_description(&mut self, description: &str, now: Timestamp) {
        self.description = description.to_string();
        self.updated_at = now;
    }

    pub fn set_location(&mut self, location: &str, now: Timestamp) -> CoreResult<()> {
        if location.trim().is_empty() {
            return Err(CoreError::Validation("location is required".to_string()));
        }
        self.location = location.to_string();
        self.updated_at = now;
        Ok(())
    }

    pub fn set_condition(&mut self, condition: AssetCondition, now: Timestamp) {
        self.condition = condition;
        self.updated_at = now;
    }

    pub fn set_unit_cost(&mut self, cost: Money, now: Timestamp) {
        self.unit_cost = cost;
        self.updated_at = now;
    }

    pub fn set_maintenance_dates(
        &mut self,
        last: Option<Timestamp>,
        next: Option<Timestamp>,
        now: Timestamp,
    ) {
        self.last_maintenance_at = last;
        self.next_maintenance_at = next;
        self.updated_at = now;
    }

    // --- ledger operations ---

    /// Receive stock: both quantities grow, `add` log entry.
    pub fn add_stock(
        &mut self,
        quantity: i32,
        reason: &str,
        actor: Id,
        now: Timestamp,
    ) -> CoreResult<&InventoryLogEntry> {
        Self::require_positive(quantity)?;
        Self::require_reason(reason)?;

        self.total_quantity += quantity;
        self.available_quantity += quantity;
        Ok(self.append_log(ChangeType::Add, quantity, reason, actor, now))
    }

    /// Consume stock permanently: both quantities shrink, `remove` entry.
    pub fn remove_stock(
        &mut self,
        quantity: i32,
        reason: &str,
        actor: Id,
        now: Timestamp,
    ) -> CoreResult<&InventoryLogEntry> {
        Self::require_positive(quantity)?;
        Self::require_reason(reason)?;
        if self.available_quantity < quantity {
            return Err(CoreError::InsufficientStock {
                available: self.available_quantity,
                requested: quantity,
            });
        }

        self.total_quantity -= quantity;
        self.available_quantity -= quantity;
        Ok(self.append_log(ChangeType::Remove, quantity, reason, actor, now))
    }

    /// Reconcile against a physical count: total is set to `new_total`
    /// and available shifts by the same delta, clamped to
    /// `[0, new_total]`. `adjust` entry records the new total.
    pub fn adjust_stock(
        &mut self,
        new_total: i32,
        reason: &str,
        actor: Id,
        now: Timestamp,
    ) -> CoreResult<&InventoryLogEntry> {
        if new_total < 0 {
            return Err(CoreError::Validation(
                "adjusted quantity cannot be negative".to_string(),
            ));
        }
        Self::require_reason(reason)?;

        let delta = new_total - self.total_quantity;
        self.total_quantity = new_total;
        self.available_quantity = (self.available_quantity + delta).clamp(0, new_total);
        Ok(self.append_log(ChangeType::Adjust, new_total, reason, actor, now))
    }

    /// Reserve stock for a ticket: only `available` shrinks. Folded into
    /// the typed log as a `remove`-class entry tagged as an allocation.
    pub fn allocate(
        &mut self,
        quantity: i32,
        ticket_number: &str,
        actor: Id,
        now: Timestamp,
    ) -> CoreResult<&InventoryLogEntry> {
        Self::require_positive(quantity)?;
        if !self.is_usable() {
            return Err(CoreError::Validation(format!(
                "asset {} is not usable for allocation (condition: {})",
                self.asset_code, self.condition
            )));
        }
        if self.available_quantity < quantity {
            return Err(CoreError::InsufficientStock {
                available: self.available_quantity,
                requested: quantity,
            });
        }

        self.available_quantity -= quantity;
        let reason = format!("allocation for ticket {ticket_number}");
        Ok(self.append_log(ChangeType::Remove, quantity, &reason, actor, now))
    }

    /// Reverse a prior allocation: only `available` grows. Fails if the
    /// release would push available above total.
    pub fn release(
        &mut self,
        quantity: i32,
        ticket_number: &str,
        actor: Id,
        now: Timestamp,
    ) -> CoreResult<&InventoryLogEntry> {
        Self::require_positive(quantity)?;
        if self.available_quantity + quantity > self.total_quantity {
            return Err(CoreError::InvariantViolation(format!(
                "release of {quantity} would exceed total quantity {} (available: {})",
                self.total_quantity, self.available_quantity
            )));
        }

        self.available_quantity += quantity;
        let reason = format!("release for ticket {ticket_number}");
        Ok(self.append_log(ChangeType::Add, quantity, &reason, actor, now))
    }

    fn append_log(
        &mut self,
        change_type: ChangeType,
        quantity: i32,
        reason: &str,
        actor: Id,
        now: Timestamp,
    ) -> &InventoryLogEntry {
        debug_assert!(self.available_quantity >= 0);
        debug_assert!(self.available_quantity <= self.total_quantity);

        let entry_index = self.inventory_log.len();
        self.inventory_log.push(InventoryLogEntry {
            id: Uuid::new_v4(),
            asset_id: self.id,
            change_type,
            quantity,
            reason: reason.to_string(),
            created_by: actor,
            created_at: now,
        });
        self.updated_at = now;
        &self.inventory_log[entry_index]
    }

    fn require_positive(quantity: i32) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(CoreError::Validation(
                "quantity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn require_reason(reason: &str) -> CoreResult<()> {
        if reason.trim().is_empty() {
            return Err(CoreError::Validation("reason is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    use super::*;

    fn make_asset(quantity: i32) -> Asset {
        Asset::create(
            NewAsset {
                name: "Office chair".to_string(),
                description: "Ergonomic swivel chair".to_string(),
                category: AssetCategory::OfficeFurniture,
                quantity,
                location: "Warehouse B".to_string(),
                unit_cost: Money::idr(1_500_000).unwrap(),
            },
            format_asset_code(
                AssetCategory::OfficeFurniture,
                chrono::NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
                1,
            ),
            Utc::now(),
        )
        .unwrap()
    }

    fn actor() -> Id {
        Uuid::new_v4()
    }

    #[test]
    fn test_creation_starts_full_and_good() {
        let asset = make_asset(10);
        assert_eq!(asset.total_quantity(), 10);
        assert_eq!(asset.available_quantity(), 10);
        assert_eq!(asset.condition(), AssetCondition::Good);
        assert!(asset.inventory_log().is_empty());
    }

    #[test]
    fn test_asset_code_format() {
        let asset = make_asset(1);
        assert_eq!(asset.asset_code(), "OF-20260824-0001");
    }

    #[test]
    fn test_add_stock_grows_both_quantities() {
        let mut asset = make_asset(10);
        asset.add_stock(5, "restock", actor(), Utc::now()).unwrap();
        assert_eq!(asset.total_quantity(), 15);
        assert_eq!(asset.available_quantity(), 15);
        assert_eq!(asset.inventory_log().len(), 1);
        assert_eq!(asset.inventory_log()[0].change_type, ChangeType::Add);
    }

    #[test]
    fn test_remove_stock_insufficient() {
        let mut asset = make_asset(3);
        assert_matches!(
            asset.remove_stock(4, "shrinkage", actor(), Utc::now()),
            Err(CoreError::InsufficientStock {
                available: 3,
                requested: 4
            })
        );
        // Failed operation must not mutate or log.
        assert_eq!(asset.total_quantity(), 3);
        assert!(asset.inventory_log().is_empty());
    }

    #[test]
    fn test_adjust_clamps_available() {
        let mut asset = make_asset(10);
        asset
            .allocate(8, "GA-2026-0001", actor(), Utc::now())
            .unwrap();
        assert_eq!(asset.available_quantity(), 2);

        // Shrinking total by 5 drives available to -3, clamped at 0.
        asset
            .adjust_stock(5, "physical count", actor(), Utc::now())
            .unwrap();
        assert_eq!(asset.total_quantity(), 5);
        assert_eq!(asset.available_quantity(), 0);
    }

    #[test]
    fn test_allocation_reserves_without_shrinking_total() {
        let mut asset = make_asset(10);
        let entry = asset
            .allocate(4, "GA-2026-0002", actor(), Utc::now())
            .unwrap()
            .clone();

        assert_eq!(asset.total_quantity(), 10);
        assert_eq!(asset.available_quantity(), 6);
        assert_eq!(entry.change_type, ChangeType::Remove);
        assert!(entry.reason.contains("allocation"));
    }

    #[test]
    fn test_allocation_requires_good_condition() {
        let mut asset = make_asset(10);
        asset.set_condition(AssetCondition::Broken, Utc::now());
        assert_matches!(
            asset.allocate(1, "GA-2026-0003", actor(), Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn test_release_cannot_exceed_total() {
        let mut asset = make_asset(10);
        asset
            .allocate(2, "GA-2026-0004", actor(), Utc::now())
            .unwrap();

        asset
            .release(2, "GA-2026-0004", actor(), Utc::now())
            .unwrap();
        assert_eq!(asset.available_quantity(), 10);

        assert_matches!(
            asset.release(1, "GA-2026-0004", actor(), Utc::now()),
            Err(CoreError::InvariantViolation(_))
        );
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        let mut asset = make_asset(10);
        for qty in [0, -1] {
            assert_matches!(
                asset.add_stock(qty, "x", actor(), Utc::now()),
                Err(CoreError::Validation(_))
            );
            assert_matches!(
                asset.allocate(qty, "GA-2026-0005", actor(), Utc::now()),
                Err(CoreError::Validation(_))
            );
        }
        assert_matches!(
            asset.adjust_stock(-1, "x", actor(), Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn test_empty_reason_rejected() {
        let mut asset = make_asset(10);
        assert_matches!(
            asset.add_stock(1, "  ", actor(), Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn test_every_mutation_appends_exactly_one_log_entry() {
        let mut asset = make_asset(10);
        let user = actor();
        let now = Utc::now();

        asset.add_stock(3, "restock", user, now).unwrap();
        asset.remove_stock(1, "damaged", user, now).unwrap();
        asset.adjust_stock(12, "count", user, now).unwrap();
        asset.allocate(2, "GA-2026-0006", user, now).unwrap();
        asset.release(2, "GA-2026-0006", user, now).unwrap();

        assert_eq!(asset.inventory_log().len(), 5);
    }

    /// One step of a random ledger workload.
    #[derive(Debug, Clone)]
    enum LedgerOp {
        Add(i32),
        Remove(i32),
        Adjust(i32),
        Allocate(i32),
        Release(i32),
    }

    fn ledger_op() -> impl Strategy<Value = LedgerOp> {
        prop_oneof![
            (1..50i32).prop_map(LedgerOp::Add),
            (1..50i32).prop_map(LedgerOp::Remove),
            (0..100i32).prop_map(LedgerOp::Adjust),
            (1..50i32).prop_map(LedgerOp::Allocate),
            (1..50i32).prop_map(LedgerOp::Release),
        ]
    }

    proptest! {
        /// Random interleavings of the five ledger operations never
        /// violate `0 <= available <= total`, whether an individual
        /// operation succeeds or fails.
        #[test]
        fn prop_quantity_invariant_holds(
            initial in 0..100i32,
            ops in proptest::collection::vec(ledger_op(), 1..60),
        ) {
            let mut asset = make_asset(initial);
            let user = actor();
            let now = Utc::now();

            for op in ops {
                let _ = match op {
                    LedgerOp::Add(q) => asset.add_stock(q, "prop", user, now).map(|_| ()),
                    LedgerOp::Remove(q) => asset.remove_stock(q, "prop", user, now).map(|_| ()),
                    LedgerOp::Adjust(q) => asset.adjust_stock(q, "prop", user, now).map(|_| ()),
                    LedgerOp::Allocate(q) => {
                        asset.allocate(q, "GA-2026-0000", user, now).map(|_| ())
                    }
                    LedgerOp::Release(q) => {
                        asset.release(q, "GA-2026-0000", user, now).map(|_| ())
                    }
                };

                prop_assert!(asset.available_quantity() >= 0);
                prop_assert!(asset.available_quantity() <= asset.total_quantity());
            }
        }
    }
}
