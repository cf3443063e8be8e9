//! Outlet terminal: live stock, the cart and settlement.
//!
//! ## Settlement
//! ```text
//! begin_settlement ──► Settling (cart repriced and frozen into a draft)
//!      │
//!      ▼  ┌─ spawned task ─────────────────────────────────────────────────┐
//!         │ INSERT transactions, then transaction_items                     │
//!         │   ├── Err ──► fail_settlement: Building, cart kept              │
//!         │   └── Ok  ──► complete_settlement: Idle, empty cart             │
//!         └─────────────────────────────────────────────────────────────────┘
//!      │
//!      ▼
//! refold stock ──► Advisory::LowStock for items at or below the threshold
//! ```
//!
//! The task runs to completion even when the client disconnects and the
//! handler is dropped, so a session never stays in `Settling`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use stockhub_core::cart::{low_stock_alerts, CartSnapshot, SettlementDraft};
use stockhub_core::{CoreError, StockView};
use stockhub_db::DbError;
use tracing::{error, info, warn};

use super::load_outlet;
use crate::api_types::{AddItemRequest, SettleRequest, SettleResponse, TerminalStockResponse};
use crate::auth::SessionContext;
use crate::broadcast::Advisory;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Checks terminal access and that the outlet belongs to the organization.
async fn open_terminal(st: &AppState, session: &SessionContext, outlet_id: &str) -> ApiResult<()> {
    session.authorize_terminal(outlet_id)?;
    load_outlet(st, session, outlet_id).await?;
    Ok(())
}

async fn todays_view(st: &AppState, session: &SessionContext) -> StockView {
    st.db
        .ledgers()
        .stock_view(&session.organization_id, st.today(), st.utc_offset())
        .await
}

// ---------------------------------------------------------------------------
// GET /v1/pos/{outlet_id}/stock
// ---------------------------------------------------------------------------

pub(crate) async fn terminal_stock(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(outlet_id): Path<String>,
) -> ApiResult<Json<TerminalStockResponse>> {
    open_terminal(&st, &session, &outlet_id).await?;
    let view = todays_view(&st, &session).await;

    Ok(Json(TerminalStockResponse {
        date: view.day(),
        locked: view.outlet_is_locked(&outlet_id),
        items: view.outlet_stock(&outlet_id),
        outlet_id,
    }))
}

// ---------------------------------------------------------------------------
// /v1/pos/{outlet_id}/cart
// ---------------------------------------------------------------------------

pub(crate) async fn get_cart(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(outlet_id): Path<String>,
) -> ApiResult<Json<CartSnapshot>> {
    open_terminal(&st, &session, &outlet_id).await?;
    let snapshot = st
        .terminals
        .with_session(&outlet_id, &session.user_id, |s| s.snapshot());
    Ok(Json(snapshot))
}

pub(crate) async fn add_item(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(outlet_id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<Json<CartSnapshot>> {
    open_terminal(&st, &session, &outlet_id).await?;
    let view = todays_view(&st, &session).await;

    let item = view
        .menu_item(&req.menu_item_id)
        .ok_or_else(|| CoreError::MenuItemNotFound(req.menu_item_id.clone()))?;

    let snapshot = st
        .terminals
        .with_session(&outlet_id, &session.user_id, |s| {
            s.add_item(item, &view).map(|_| s.snapshot())
        })?;
    Ok(Json(snapshot))
}

pub(crate) async fn remove_item(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path((outlet_id, item_id)): Path<(String, String)>,
) -> ApiResult<Json<CartSnapshot>> {
    open_terminal(&st, &session, &outlet_id).await?;
    let snapshot = st
        .terminals
        .with_session(&outlet_id, &session.user_id, |s| {
            s.remove_item(&item_id).map(|_| s.snapshot())
        })?;
    Ok(Json(snapshot))
}

pub(crate) async fn clear_cart(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(outlet_id): Path<String>,
) -> ApiResult<Json<CartSnapshot>> {
    open_terminal(&st, &session, &outlet_id).await?;
    let snapshot = st
        .terminals
        .with_session(&outlet_id, &session.user_id, |s| s.clear().map(|_| s.snapshot()))?;
    Ok(Json(snapshot))
}

// ---------------------------------------------------------------------------
// POST /v1/pos/{outlet_id}/settle
// ---------------------------------------------------------------------------

pub(crate) async fn settle(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(outlet_id): Path<String>,
    Json(req): Json<SettleRequest>,
) -> ApiResult<Json<SettleResponse>> {
    open_terminal(&st, &session, &outlet_id).await?;
    let view = todays_view(&st, &session).await;

    let draft = st.terminals.with_session(&outlet_id, &session.user_id, |s| {
        s.begin_settlement(&session.organization_id, req.payment_method, &view, Utc::now())
    })?;

    // No await between begin_settlement and the spawn.
    let task = {
        let st = Arc::clone(&st);
        let outlet_id = outlet_id.clone();
        let user_id = session.user_id.clone();
        let draft = draft.clone();
        tokio::spawn(async move { finish_settlement(&st, &outlet_id, &user_id, &draft).await })
    };

    let cart = match task.await {
        Ok(result) => result?,
        Err(e) => {
            error!(outlet = %outlet_id, txn = %draft.transaction.id, error = %e, "Settlement task aborted");
            st.terminals.with_session(&outlet_id, &session.user_id, |s| {
                s.fail_settlement("settlement did not complete")
            });
            return Err(ApiError::internal("Settlement did not complete"));
        }
    };

    let view = todays_view(&st, &session).await;
    let low_stock = low_stock_alerts(&view, &outlet_id, &draft.lines, st.low_stock_threshold());
    for alert in &low_stock {
        st.broadcaster.publish(
            &session.organization_id,
            Advisory::low_stock(&outlet_id, alert.clone()),
        );
    }

    Ok(Json(SettleResponse {
        transaction: draft.transaction,
        lines: draft.lines,
        low_stock,
        cart,
    }))
}

/// Writes the sale and moves the session out of `Settling` either way.
async fn finish_settlement(
    st: &AppState,
    outlet_id: &str,
    user_id: &str,
    draft: &SettlementDraft,
) -> Result<CartSnapshot, DbError> {
    if let Err(e) = st.db.sales().record_settlement(draft).await {
        warn!(outlet = %outlet_id, txn = %draft.transaction.id, error = %e, "Settlement failed");
        st.terminals
            .with_session(outlet_id, user_id, |s| s.fail_settlement(e.to_string()));
        return Err(e);
    }

    info!(
        outlet = %outlet_id,
        txn = %draft.transaction.id,
        total_cents = draft.transaction.total_amount_cents,
        method = draft.transaction.payment_method.as_str(),
        "Sale settled"
    );

    Ok(st.terminals.with_session(outlet_id, user_id, |s| {
        s.complete_settlement(&draft.transaction.id);
        s.snapshot()
    }))
}
