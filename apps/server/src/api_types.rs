//! Request and response bodies for the HTTP API.
//!
//! Everything is camelCase on the wire. Domain rows (outlets, menu items,
//! profiles, stock lines) are returned as their core types directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockhub_core::cart::{CartSnapshot, LowStockAlert};
use stockhub_core::distribution::ItemDistributionResult;
use stockhub_core::master_stock::{ItemMasterStockResult, MasterStockInput};
use stockhub_core::reconciliation::{ItemStockSummary, OutletStockLine};
use stockhub_core::{Organization, PaymentMethod, Role, SaleLineItem, SaleTransaction, UserProfile};

use crate::auth::SessionContext;

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
    pub database: bool,
}

// ---------------------------------------------------------------------------
// Auth & bootstrap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub organization_id: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub session: SessionContext,
}

/// Creates an organization together with its first admin login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapRequest {
    pub name: String,
    pub admin_full_name: String,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    pub organization: Organization,
    pub admin: UserProfile,
}

// ---------------------------------------------------------------------------
// Catalog administration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletRequest {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub table_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemRequest {
    pub name: String,
    pub category: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub base_price_cents: i64,
    #[serde(default)]
    pub is_market_priced: bool,
    #[serde(default)]
    pub requires_daily_stock: bool,
    /// Only honoured on update; new items are always active.
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn default_unit() -> String {
    "plate".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub outlet_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub role: Role,
    #[serde(default)]
    pub outlet_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Stock hub
// ---------------------------------------------------------------------------

/// `?date=YYYY-MM-DD`; absent means the current business day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletStockPanel {
    pub outlet_id: String,
    pub outlet_name: String,
    pub locked: bool,
    pub stock: Vec<OutletStockLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHubResponse {
    pub date: NaiveDate,
    pub items: Vec<ItemStockSummary>,
    pub outlets: Vec<OutletStockPanel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterStockRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub items: Vec<MasterStockInput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterStockResponse {
    pub date: NaiveDate,
    pub results: Vec<ItemMasterStockResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributableItem {
    pub menu_item_id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub requires_daily_stock: bool,
    /// `None` for continuous-supply items.
    pub master_total: Option<i64>,
    pub remaining_in_master: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributableItemsResponse {
    pub date: NaiveDate,
    pub items: Vec<DistributableItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeRequest {
    pub outlet_id: String,
    #[serde(default)]
    pub date: Option<String>,
    /// Menu item id → signed quantity delta.
    pub adjustments: std::collections::BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeResponse {
    pub date: NaiveDate,
    pub outlet_id: String,
    pub written: usize,
    pub results: Vec<ItemDistributionResult>,
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalStockResponse {
    pub outlet_id: String,
    pub date: NaiveDate,
    pub locked: bool,
    pub items: Vec<OutletStockLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub menu_item_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub transaction: SaleTransaction,
    pub lines: Vec<SaleLineItem>,
    pub low_stock: Vec<LowStockAlert>,
    pub cart: CartSnapshot,
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

/// Browsers cannot set headers on an `EventSource`, so the stream also
/// accepts the token as a query parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub token: Option<String>,
}
