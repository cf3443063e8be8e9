//! # Distribution Planning
//!
//! Decides, item by item, which adjustments of an admin distribution batch
//! may be appended to the distribution ledger.
//!
//! ## Batch Flow
//! ```text
//! POST /v1/stock/distribute { outletId, date, adjustments: { item: delta } }
//!      │
//!      ▼
//! fetch ledgers → StockView
//!      │
//!      ▼
//! plan_distribution() ← THIS MODULE
//!      │
//!      ├── delta == 0            → Skip
//!      ├── continuous supply     → Append
//!      ├── no master row         → Reject (max adjustment 0)
//!      ├── Σdist + delta > total → Reject (max adjustment total - Σdist)
//!      ├── outlet net + delta < 0→ Reject (max reduction = outlet net)
//!      └── otherwise             → Append
//!      │
//!      ▼
//! one INSERT per Append, each independent of the others
//! ```
//!
//! Rejections never affect the other items of the batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::reconciliation::StockView;

/// What to do with one item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionDecision {
    Append { menu_item_id: String, quantity: i64 },
    Skip { menu_item_id: String },
    Reject { menu_item_id: String, error: CoreError },
}

impl DistributionDecision {
    pub fn menu_item_id(&self) -> &str {
        match self {
            DistributionDecision::Append { menu_item_id, .. }
            | DistributionDecision::Skip { menu_item_id }
            | DistributionDecision::Reject { menu_item_id, .. } => menu_item_id,
        }
    }
}

/// Per-item result reported back to the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "camelCase")]
#[ts(export)]
pub enum DistributionOutcome {
    Written { quantity: i64 },
    Skipped,
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDistributionResult {
    pub menu_item_id: String,
    #[serde(flatten)]
    pub outcome: DistributionOutcome,
}

/// Plans a batch of signed adjustments for one outlet.
///
/// `view` must be built from a fresh fetch of the same day. Keys are
/// visited in sorted order so the result order is stable.
pub fn plan_distribution(
    view: &StockView,
    outlet_id: &str,
    adjustments: &BTreeMap<String, i64>,
) -> Vec<DistributionDecision> {
    adjustments
        .iter()
        .map(|(item_id, &delta)| plan_item(view, outlet_id, item_id, delta))
        .collect()
}

fn plan_item(view: &StockView, outlet_id: &str, item_id: &str, delta: i64) -> DistributionDecision {
    let reject = |error: CoreError| DistributionDecision::Reject {
        menu_item_id: item_id.to_string(),
        error,
    };

    if delta == 0 {
        return DistributionDecision::Skip {
            menu_item_id: item_id.to_string(),
        };
    }

    let Some(item) = view.menu_item(item_id) else {
        return reject(CoreError::MenuItemNotFound(item_id.to_string()));
    };

    if !item.is_active {
        return reject(CoreError::ItemInactive(item.name.clone()));
    }

    if item.is_continuous_supply() {
        return DistributionDecision::Append {
            menu_item_id: item_id.to_string(),
            quantity: delta,
        };
    }

    if !view.has_master(item_id) {
        return reject(CoreError::NoMasterStock {
            item: item.name.clone(),
        });
    }

    let total = view.master_total(item_id);
    let current = view.distributed(item_id, None);
    if current + delta > total {
        return reject(CoreError::DistributionExceedsMaster {
            item: item.name.clone(),
            max_delta: (total - current).max(0),
        });
    }

    let outlet_net = view.distributed(item_id, Some(outlet_id));
    if outlet_net + delta < 0 {
        return reject(CoreError::NegativeOutletBalance {
            item: item.name.clone(),
            max_reduction: outlet_net.max(0),
        });
    }

    DistributionDecision::Append {
        menu_item_id: item_id.to_string(),
        quantity: delta,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
