//! Axum router and HTTP handlers.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! the tracing and CORS layers, so tests can drive the bare router.
//!
//! ## Route Groups
//! ```text
//! health     GET  /v1/health
//! session    POST /v1/organizations, POST /v1/auth/login, GET /v1/auth/me
//! admin      /v1/outlets, /v1/menu, /v1/profiles, POST /v1/admin/reset
//! stock      /v1/stock/hub, /v1/stock/master, /v1/stock/distribution/items,
//!            /v1/stock/distribute
//! pos        /v1/pos/{outlet_id}/...
//! reports    GET  /v1/reports/daily
//! stream     GET  /v1/stream (SSE)
//! ```

mod admin;
mod health;
mod pos;
mod reports;
mod session;
mod stock;
mod stream;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::NaiveDate;
use stockhub_core::validation::parse_business_day;
use stockhub_core::Outlet;

use crate::auth::SessionContext;
use crate::error::ApiResult;
use crate::state::AppState;

/// Builds the complete router wired to `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health::health))
        // Session
        .route("/v1/organizations", post(session::bootstrap_organization))
        .route("/v1/auth/login", post(session::login))
        .route("/v1/auth/me", get(session::me))
        // Administration
        .route("/v1/outlets", get(admin::list_outlets).post(admin::create_outlet))
        .route("/v1/outlets/{id}", put(admin::update_outlet))
        .route("/v1/menu", get(admin::list_menu).post(admin::create_menu_item))
        .route(
            "/v1/menu/{id}",
            put(admin::update_menu_item).delete(admin::deactivate_menu_item),
        )
        .route("/v1/profiles", get(admin::list_profiles).post(admin::create_profile))
        .route("/v1/profiles/{id}", put(admin::update_profile))
        .route("/v1/admin/reset", post(admin::reset_ledgers))
        // Stock hub
        .route("/v1/stock/hub", get(stock::stock_hub))
        .route("/v1/stock/master", put(stock::set_master_stock))
        .route("/v1/stock/distribution/items", get(stock::distribution_items))
        .route("/v1/stock/distribute", post(stock::distribute))
        // Terminal
        .route("/v1/pos/{outlet_id}/stock", get(pos::terminal_stock))
        .route("/v1/pos/{outlet_id}/cart", get(pos::get_cart).delete(pos::clear_cart))
        .route("/v1/pos/{outlet_id}/cart/items", post(pos::add_item))
        .route("/v1/pos/{outlet_id}/cart/items/{item_id}", delete(pos::remove_item))
        .route("/v1/pos/{outlet_id}/settle", post(pos::settle))
        // Reports & realtime
        .route("/v1/reports/daily", get(reports::daily_report))
        .route("/v1/stream", get(stream::stream))
        .with_state(state)
}

/// `date` as a business day, or today in the configured offset.
pub(crate) fn resolve_day(state: &AppState, date: Option<&str>) -> ApiResult<NaiveDate> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(value) => Ok(parse_business_day(value)?),
        None => Ok(state.today()),
    }
}

/// Loads an outlet of the caller's organization (404 otherwise).
pub(crate) async fn load_outlet(
    state: &AppState,
    session: &SessionContext,
    outlet_id: &str,
) -> ApiResult<Outlet> {
    Ok(state
        .db
        .outlets()
        .get(&session.organization_id, outlet_id)
        .await?)
}
