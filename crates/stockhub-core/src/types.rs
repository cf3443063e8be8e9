//! # Domain Types
//!
//! Rows of the StockHub data model, shared by the database layer (which
//! loads them) and the server (which serializes them to the browser).
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Organization ──┬── Outlet                                              │
//! │                 ├── UserProfile (role, optional outlet, login)          │
//! │                 └── MenuItem (base price, requires_daily_stock)         │
//! │                                                                         │
//! │  Ledgers (per organization, per day)                                    │
//! │  ┌──────────────────┐ ┌───────────────────┐ ┌────────────────────────┐ │
//! │  │ MasterStockEntry │ │ DistributionEntry │ │ SaleTransaction        │ │
//! │  │ ──────────────── │ │ ───────────────── │ │ ────────────────────── │ │
//! │  │ item, date       │ │ outlet, item,date │ │ outlet, total, method  │ │
//! │  │ total_quantity   │ │ signed quantity   │ │   └─ SaleLineItem[]    │ │
//! │  │ daily_price?     │ │ append-only       │ │      item, qty, price  │ │
//! │  └──────────────────┘ └───────────────────┘ └────────────────────────┘ │
//! │                                                                         │
//! │  SoldLine: flattened (outlet, item, qty, timestamp) view of the sales  │
//! │  ledger, the only shape the reconciliation fold needs.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All identifiers are UUID v4 strings. All JSON is camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::roles::Role;

// =============================================================================
// Organization
// =============================================================================

/// The tenant every other record is scoped to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Outlet
// =============================================================================

/// A physical restaurant location with its own terminal(s).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Outlet {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub location: Option<String>,
    pub table_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Menu Item
// =============================================================================

/// A dish or product on the organization's shared menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub category: String,

    /// Unit of measure shown next to quantities ("plate", "kg", "pcs").
    pub unit: String,

    /// Price in minor units, unless the day's master stock overrides it.
    pub base_price_cents: i64,

    /// Price is expected to change daily (seafood by weight, etc.).
    pub is_market_priced: bool,

    /// `false` means continuous supply: no ledger checks at all.
    pub requires_daily_stock: bool,

    /// Soft delete flag.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_minor(self.base_price_cents)
    }

    /// Continuous-supply items bypass every stock check.
    #[inline]
    pub fn is_continuous_supply(&self) -> bool {
        !self.requires_daily_stock
    }
}

// =============================================================================
// Master Stock Entry
// =============================================================================

/// Organization-wide availability of one item on one day.
///
/// Keyed by (organization, item, date). A missing row means zero
/// availability for a stock-tracked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MasterStockEntry {
    pub id: String,
    pub organization_id: String,
    pub menu_item_id: String,
    #[ts(as = "String")]
    pub stock_date: NaiveDate,
    pub total_quantity: i64,
    pub daily_price_cents: Option<i64>,
}

impl MasterStockEntry {
    pub fn new(
        organization_id: impl Into<String>,
        menu_item_id: impl Into<String>,
        stock_date: NaiveDate,
        total_quantity: i64,
        daily_price_cents: Option<i64>,
    ) -> Self {
        MasterStockEntry {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.into(),
            menu_item_id: menu_item_id.into(),
            stock_date,
            total_quantity,
            daily_price_cents,
        }
    }
}

// =============================================================================
// Distribution Entry
// =============================================================================

/// One signed adjustment of an outlet's allotment. Never updated; entries
/// for the same (outlet, item, date) are summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DistributionEntry {
    pub id: String,
    pub organization_id: String,
    pub outlet_id: String,
    pub menu_item_id: String,
    #[ts(as = "String")]
    pub stock_date: NaiveDate,
    pub quantity: i64,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DistributionEntry {
    pub fn new(
        organization_id: impl Into<String>,
        outlet_id: impl Into<String>,
        menu_item_id: impl Into<String>,
        stock_date: NaiveDate,
        quantity: i64,
        created_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        DistributionEntry {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.into(),
            outlet_id: outlet_id.into(),
            menu_item_id: menu_item_id.into(),
            stock_date,
            quantity,
            created_by: created_by.into(),
            created_at,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// A settled sale. Created once at settlement and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleTransaction {
    pub id: String,
    pub organization_id: String,
    pub outlet_id: String,
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub created_by: String,
    pub is_paid: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleTransaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_amount_cents)
    }
}

/// A line of a settled sale. Name and unit price are snapshots taken at
/// settlement so later menu edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLineItem {
    pub id: String,
    pub transaction_id: String,
    pub menu_item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// `unit_price_cents * quantity`.
    pub subtotal_cents: i64,
}

/// The sales ledger flattened to what the stock fold consumes: one row per
/// line item joined with its transaction's outlet and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SoldLine {
    pub outlet_id: String,
    pub menu_item_id: String,
    pub quantity: i64,
    pub sold_at: DateTime<Utc>,
}

// =============================================================================
// User Profile
// =============================================================================

/// A person who can sign in. Staff and managers are pinned to `outlet_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: String,
    pub organization_id: String,
    pub full_name: String,
    pub role: Role,
    pub outlet_id: Option<String>,
    pub username: Option<String>,

    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
