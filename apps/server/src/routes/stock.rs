//! Admin stock hub: the reconciled overview, master stock setup and
//! distribution to outlets.
//!
//! ## Distribution Flow
//! ```text
//! POST /v1/stock/distribute { outletId, adjustments: { item: delta } }
//!      │
//!      ▼
//! fresh ledger snapshot ──► plan_distribution (pure, per item)
//!      │
//!      ▼
//! append one daily_stocks row per accepted item
//!      │
//!      ▼
//! any row written? ──► Advisory::StockAvailable { outletId }
//! ```

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use stockhub_core::distribution::{plan_distribution, DistributionOutcome};
use stockhub_core::master_stock::plan_master_stock;
use stockhub_core::Capability;
use stockhub_db::DistributionContext;
use tracing::info;

use super::{load_outlet, resolve_day};
use crate::api_types::{
    DayQuery, DistributableItem, DistributableItemsResponse, DistributeRequest, DistributeResponse,
    MasterStockRequest, MasterStockResponse, OutletStockPanel, StockHubResponse,
};
use crate::auth::SessionContext;
use crate::broadcast::Advisory;
use crate::error::ApiResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /v1/stock/hub
// ---------------------------------------------------------------------------

pub(crate) async fn stock_hub(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Query(query): Query<DayQuery>,
) -> ApiResult<Json<StockHubResponse>> {
    session.require(Capability::ViewStockHub)?;
    let day = resolve_day(&st, query.date.as_deref())?;

    let outlets = st.db.outlets().list(&session.organization_id).await?;
    let view = st
        .db
        .ledgers()
        .stock_view(&session.organization_id, day, st.utc_offset())
        .await;

    let panels = outlets
        .into_iter()
        .map(|outlet| OutletStockPanel {
            locked: view.outlet_is_locked(&outlet.id),
            stock: view.outlet_stock(&outlet.id),
            outlet_id: outlet.id,
            outlet_name: outlet.name,
        })
        .collect();

    Ok(Json(StockHubResponse {
        date: day,
        items: view.item_summaries(),
        outlets: panels,
    }))
}

// ---------------------------------------------------------------------------
// PUT /v1/stock/master
// ---------------------------------------------------------------------------

/// Sets absolute day totals. 0 removes the item's row for the day.
pub(crate) async fn set_master_stock(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Json(req): Json<MasterStockRequest>,
) -> ApiResult<Json<MasterStockResponse>> {
    session.require(Capability::SetupMasterStock)?;
    let day = resolve_day(&st, req.date.as_deref())?;

    let menu = st.db.menu().list(&session.organization_id, true).await?;
    let decisions = plan_master_stock(&menu, &req.items);
    let results = st
        .db
        .master_stock()
        .apply(&session.organization_id, day, decisions)
        .await;

    info!(org = %session.organization_id, %day, items = results.len(), "Master stock applied");
    Ok(Json(MasterStockResponse { date: day, results }))
}

// ---------------------------------------------------------------------------
// GET /v1/stock/distribution/items
// ---------------------------------------------------------------------------

/// Items with a master row for the day, plus continuous-supply items.
pub(crate) async fn distribution_items(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Query(query): Query<DayQuery>,
) -> ApiResult<Json<DistributableItemsResponse>> {
    session.require(Capability::DistributeStock)?;
    let day = resolve_day(&st, query.date.as_deref())?;

    let view = st
        .db
        .ledgers()
        .stock_view(&session.organization_id, day, st.utc_offset())
        .await;

    let items = view
        .distributable_items()
        .into_iter()
        .map(|item| {
            let tracked = view.has_master(&item.id) && item.requires_daily_stock;
            DistributableItem {
                menu_item_id: item.id.clone(),
                name: item.name.clone(),
                category: item.category.clone(),
                unit: item.unit.clone(),
                requires_daily_stock: item.requires_daily_stock,
                master_total: tracked.then(|| view.master_total(&item.id)),
                remaining_in_master: tracked.then(|| view.remaining_in_master(&item.id)),
            }
        })
        .collect();

    Ok(Json(DistributableItemsResponse { date: day, items }))
}

// ---------------------------------------------------------------------------
// POST /v1/stock/distribute
// ---------------------------------------------------------------------------

pub(crate) async fn distribute(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Json(req): Json<DistributeRequest>,
) -> ApiResult<Json<DistributeResponse>> {
    session.require(Capability::DistributeStock)?;
    let outlet = load_outlet(&st, &session, &req.outlet_id).await?;
    let day = resolve_day(&st, req.date.as_deref())?;

    // Writes must be planned against what is stored now, never a fallback.
    let view = st
        .db
        .ledgers()
        .snapshot(&session.organization_id, day, st.utc_offset())
        .await?
        .view();

    let decisions = plan_distribution(&view, &outlet.id, &req.adjustments);
    let ctx = DistributionContext {
        organization_id: &session.organization_id,
        outlet_id: &outlet.id,
        day,
        created_by: &session.user_id,
        now: Utc::now(),
    };
    let results = st.db.distributions().apply(&ctx, decisions).await;

    let written = results
        .iter()
        .filter(|r| matches!(r.outcome, DistributionOutcome::Written { .. }))
        .count();

    if written > 0 {
        st.broadcaster.publish(
            &session.organization_id,
            Advisory::StockAvailable {
                outlet_id: outlet.id.clone(),
            },
        );
    }

    info!(
        outlet = %outlet.id,
        %day,
        requested = results.len(),
        written,
        "Distribution batch applied"
    );
    Ok(Json(DistributeResponse {
        date: day,
        outlet_id: outlet.id,
        written,
        results,
    }))
}
