//! # Master Stock Planning
//!
//! Turns an admin's stock setup for a day into per-item writes:
//!
//! | input quantity | write                                    |
//! |----------------|------------------------------------------|
//! | `> 0`          | upsert keyed by (organization, item, day)|
//! | `== 0`         | delete that day's row                    |
//! | `< 0`          | rejected, nothing written for the item   |
//!
//! Daily price overrides must be non-negative. Each item stands alone.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::MenuItem;
use crate::validation::{validate_master_quantity, validate_price_cents};

/// One line of a stock setup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MasterStockInput {
    pub menu_item_id: String,
    pub total_quantity: i64,
    #[serde(default)]
    pub daily_price_cents: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterStockDecision {
    Upsert {
        menu_item_id: String,
        total_quantity: i64,
        daily_price_cents: Option<i64>,
    },
    Delete {
        menu_item_id: String,
    },
    Reject {
        menu_item_id: String,
        error: CoreError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "camelCase")]
#[ts(export)]
pub enum MasterStockOutcome {
    Upserted { quantity: i64 },
    Deleted,
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMasterStockResult {
    pub menu_item_id: String,
    #[serde(flatten)]
    pub outcome: MasterStockOutcome,
}

pub fn plan_master_stock(menu: &[MenuItem], inputs: &[MasterStockInput]) -> Vec<MasterStockDecision> {
    inputs.iter().map(|input| plan_item(menu, input)).collect()
}

fn plan_item(menu: &[MenuItem], input: &MasterStockInput) -> MasterStockDecision {
    let reject = |error: CoreError| MasterStockDecision::Reject {
        menu_item_id: input.menu_item_id.clone(),
        error,
    };

    if !menu.iter().any(|m| m.id == input.menu_item_id) {
        return reject(CoreError::MenuItemNotFound(input.menu_item_id.clone()));
    }

    if let Err(e) = validate_master_quantity(input.total_quantity) {
        return reject(e.into());
    }

    if let Some(price) = input.daily_price_cents {
        if let Err(e) = validate_price_cents("dailyPriceCents", price) {
            return reject(e.into());
        }
    }

    if input.total_quantity == 0 {
        MasterStockDecision::Delete {
            menu_item_id: input.menu_item_id.clone(),
        }
    } else {
        MasterStockDecision::Upsert {
            menu_item_id: input.menu_item_id.clone(),
            total_quantity: input.total_quantity,
            daily_price_cents: input.daily_price_cents,
        }
    }
}
