//! # Stock Reconciliation
//!
//! Folds the three ledgers of one organization into the numbers every screen
//! shows: what was distributed, what was sold, what is still on the ground
//! and what is left in the master pool.
//!
//! ## The Fold
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  master_stocks ──────► master_total(item)                               │
//! │  (date == day)                    │                                     │
//! │                                   ▼                                     │
//! │  daily_stocks ───────► distributed(item, outlet?) ──┐                   │
//! │  (date == day)                    │                 │                   │
//! │                                   ▼                 ▼                   │
//! │                   remaining_in_master =     live = max(0,               │
//! │                   max(0, total - Σdist)       distributed - sold)       │
//! │                                                     ▲                   │
//! │  transaction_items ──► sold(item, outlet?) ─────────┘                   │
//! │  (sold_at in local day)                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fold is synchronous and order independent. Rows for other days are
//! dropped on the way in, so callers may pass wider fetches. There is no
//! cache: build a fresh view after every write or change notification.
//!
//! Absent data is zero. A stock-tracked item without a master row has zero
//! availability; a continuous-supply item is always [`StockLevel::Unlimited`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DistributionEntry, MasterStockEntry, MenuItem, SoldLine};

// =============================================================================
// Stock Level
// =============================================================================

/// Quantity a terminal may still sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "quantity", rename_all = "camelCase")]
#[ts(export)]
pub enum StockLevel {
    Limited(i64),
    /// Continuous supply.
    Unlimited,
}

impl StockLevel {
    /// Whether `additional` more units fit on top of `already_reserved`.
    pub fn allows(&self, already_reserved: i64, additional: i64) -> bool {
        match self {
            StockLevel::Unlimited => true,
            StockLevel::Limited(qty) => *qty - already_reserved >= additional,
        }
    }
}

// =============================================================================
// Local Day Window
// =============================================================================

/// The UTC instants bounding `day` in the organization's offset:
/// `[day 00:00 local, day+1 00:00 local)`.
///
/// ## Example
/// ```rust
/// use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
/// use stockhub_core::reconciliation::local_day_window;
///
/// let ist = FixedOffset::east_opt(330 * 60).unwrap();
/// let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
/// let (start, end) = local_day_window(day, ist);
///
/// assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 13, 18, 30, 0).unwrap());
/// assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 14, 18, 30, 0).unwrap());
/// ```
pub fn local_day_window(day: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = day.and_time(NaiveTime::MIN);
    let start = (local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc();
    (start, start + Duration::days(1))
}

/// The business day `now` falls on in the given offset.
pub fn business_day(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

// =============================================================================
// Ledger Input
// =============================================================================

/// Borrowed row sets for one organization. Wider fetches are fine; rows for
/// other days are ignored by [`StockView::build`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerSet<'a> {
    pub master: &'a [MasterStockEntry],
    pub distributions: &'a [DistributionEntry],
    pub sales: &'a [SoldLine],
}

// =============================================================================
// Read Models
// =============================================================================

/// One row of the admin stock hub and the report's stock section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemStockSummary {
    pub menu_item_id: String,
    pub name: String,
    pub category: String,
    pub requires_daily_stock: bool,
    /// `None` when no master row exists for the day.
    pub master_total: Option<i64>,
    pub daily_price_cents: Option<i64>,
    pub distributed: i64,
    pub sold: i64,
    pub remaining_in_master: i64,
    /// Across all outlets.
    pub live: StockLevel,
}

/// One sellable item as a terminal sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OutletStockLine {
    pub menu_item_id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub unit_price_cents: i64,
    pub stock: StockLevel,
}

// =============================================================================
// Stock View
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MasterFigures {
    total: i64,
    daily_price_cents: Option<i64>,
}

/// The reconciled state of one organization for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockView {
    day: NaiveDate,
    menu: Vec<MenuItem>,
    master: HashMap<String, MasterFigures>,
    /// (item, outlet) → Σ distribution quantity
    distributed: HashMap<(String, String), i64>,
    distributed_by_item: HashMap<String, i64>,
    /// (item, outlet) → Σ sold quantity
    sold: HashMap<(String, String), i64>,
    sold_by_item: HashMap<String, i64>,
    /// Outlets with at least one distribution row today.
    supplied_outlets: HashSet<String>,
}

impl StockView {
    /// Folds the ledgers for `day`.
    ///
    /// `menu` supplies names, prices and the continuous-supply flag. Items
    /// missing from `menu` are treated as stock-tracked.
    pub fn build(
        day: NaiveDate,
        offset: FixedOffset,
        menu: &[MenuItem],
        ledgers: LedgerSet<'_>,
    ) -> Self {
        let (window_start, window_end) = local_day_window(day, offset);

        let mut master = HashMap::new();
        for row in ledgers.master.iter().filter(|m| m.stock_date == day) {
            // The store holds one row per (item, day); the larger total wins otherwise.
            let entry = master
                .entry(row.menu_item_id.clone())
                .or_insert(MasterFigures::default());
            if row.total_quantity >= entry.total {
                *entry = MasterFigures {
                    total: row.total_quantity,
                    daily_price_cents: row.daily_price_cents,
                };
            }
        }

        let mut distributed = HashMap::new();
        let mut distributed_by_item = HashMap::new();
        let mut supplied_outlets = HashSet::new();
        for row in ledgers.distributions.iter().filter(|d| d.stock_date == day) {
            *distributed
                .entry((row.menu_item_id.clone(), row.outlet_id.clone()))
                .or_insert(0) += row.quantity;
            *distributed_by_item
                .entry(row.menu_item_id.clone())
                .or_insert(0) += row.quantity;
            supplied_outlets.insert(row.outlet_id.clone());
        }

        let mut sold = HashMap::new();
        let mut sold_by_item = HashMap::new();
        for line in ledgers
            .sales
            .iter()
            .filter(|s| s.sold_at >= window_start && s.sold_at < window_end)
        {
            *sold
                .entry((line.menu_item_id.clone(), line.outlet_id.clone()))
                .or_insert(0) += line.quantity;
            *sold_by_item.entry(line.menu_item_id.clone()).or_insert(0) += line.quantity;
        }

        StockView {
            day,
            menu: menu.to_vec(),
            master,
            distributed,
            distributed_by_item,
            sold,
            sold_by_item,
            supplied_outlets,
        }
    }

    /// A view with no ledger rows at all. Used when a fetch fails.
    pub fn empty(day: NaiveDate, menu: &[MenuItem]) -> Self {
        StockView {
            day,
            menu: menu.to_vec(),
            master: HashMap::new(),
            distributed: HashMap::new(),
            distributed_by_item: HashMap::new(),
            sold: HashMap::new(),
            sold_by_item: HashMap::new(),
            supplied_outlets: HashSet::new(),
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn menu_item(&self, menu_item_id: &str) -> Option<&MenuItem> {
        self.menu.iter().find(|m| m.id == menu_item_id)
    }

    /// `false` only for menu items flagged as continuous supply.
    pub fn is_stock_tracked(&self, menu_item_id: &str) -> bool {
        self.menu_item(menu_item_id)
            .map_or(true, |m| m.requires_daily_stock)
    }

    // -------------------------------------------------------------------------
    // Master pool
    // -------------------------------------------------------------------------

    pub fn has_master(&self, menu_item_id: &str) -> bool {
        self.master.contains_key(menu_item_id)
    }

    /// Day total for the item, zero without a master row.
    pub fn master_total(&self, menu_item_id: &str) -> i64 {
        self.master.get(menu_item_id).map_or(0, |m| m.total)
    }

    pub fn daily_price(&self, menu_item_id: &str) -> Option<Money> {
        self.master
            .get(menu_item_id)
            .and_then(|m| m.daily_price_cents)
            .map(Money::from_minor)
    }

    /// The day's price override when present, else the base price.
    pub fn unit_price(&self, item: &MenuItem) -> Money {
        self.daily_price(&item.id).unwrap_or_else(|| item.base_price())
    }

    /// `max(0, total - Σ distributions across all outlets)`.
    pub fn remaining_in_master(&self, menu_item_id: &str) -> i64 {
        (self.master_total(menu_item_id) - self.distributed(menu_item_id, None)).max(0)
    }

    // -------------------------------------------------------------------------
    // Outlet figures
    // -------------------------------------------------------------------------

    /// Σ distribution quantity, for one outlet or all of them.
    pub fn distributed(&self, menu_item_id: &str, outlet_id: Option<&str>) -> i64 {
        match outlet_id {
            Some(outlet) => self
                .distributed
                .get(&(menu_item_id.to_string(), outlet.to_string()))
                .copied()
                .unwrap_or(0),
            None => self
                .distributed_by_item
                .get(menu_item_id)
                .copied()
                .unwrap_or(0),
        }
    }

    /// Σ quantity sold inside the local day window.
    pub fn sold(&self, menu_item_id: &str, outlet_id: Option<&str>) -> i64 {
        match outlet_id {
            Some(outlet) => self
                .sold
                .get(&(menu_item_id.to_string(), outlet.to_string()))
                .copied()
                .unwrap_or(0),
            None => self.sold_by_item.get(menu_item_id).copied().unwrap_or(0),
        }
    }

    /// `max(0, distributed - sold)` as a number, ignoring the supply flag.
    pub fn on_ground(&self, menu_item_id: &str, outlet_id: Option<&str>) -> i64 {
        (self.distributed(menu_item_id, outlet_id) - self.sold(menu_item_id, outlet_id)).max(0)
    }

    /// What the outlet's terminal may sell.
    pub fn live(&self, menu_item_id: &str, outlet_id: &str) -> StockLevel {
        self.level(menu_item_id, Some(outlet_id))
    }

    fn level(&self, menu_item_id: &str, outlet_id: Option<&str>) -> StockLevel {
        if self.is_stock_tracked(menu_item_id) {
            StockLevel::Limited(self.on_ground(menu_item_id, outlet_id))
        } else {
            StockLevel::Unlimited
        }
    }

    /// A terminal is locked until its outlet receives any distribution row
    /// for the day.
    pub fn outlet_is_locked(&self, outlet_id: &str) -> bool {
        !self.supplied_outlets.contains(outlet_id)
    }

    // -------------------------------------------------------------------------
    // Read models
    // -------------------------------------------------------------------------

    /// Per menu item totals, in menu order.
    pub fn item_summaries(&self) -> Vec<ItemStockSummary> {
        self.menu
            .iter()
            .map(|item| ItemStockSummary {
                menu_item_id: item.id.clone(),
                name: item.name.clone(),
                category: item.category.clone(),
                requires_daily_stock: item.requires_daily_stock,
                master_total: self.master.get(&item.id).map(|m| m.total),
                daily_price_cents: self.master.get(&item.id).and_then(|m| m.daily_price_cents),
                distributed: self.distributed(&item.id, None),
                sold: self.sold(&item.id, None),
                remaining_in_master: self.remaining_in_master(&item.id),
                live: self.level(&item.id, None),
            })
            .collect()
    }

    /// Live stock of every active menu item for one outlet's terminal.
    pub fn outlet_stock(&self, outlet_id: &str) -> Vec<OutletStockLine> {
        self.menu
            .iter()
            .filter(|item| item.is_active)
            .map(|item| OutletStockLine {
                menu_item_id: item.id.clone(),
                name: item.name.clone(),
                category: item.category.clone(),
                unit: item.unit.clone(),
                unit_price_cents: self.unit_price(item).minor(),
                stock: self.live(&item.id, outlet_id),
            })
            .collect()
    }

    /// Items an admin may distribute today: active items with a master row,
    /// plus continuous-supply items.
    pub fn distributable_items(&self) -> Vec<&MenuItem> {
        self.menu
            .iter()
            .filter(|item| item.is_active)
            .filter(|item| item.is_continuous_supply() || self.has_master(&item.id))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
