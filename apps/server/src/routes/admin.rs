//! Outlets, menu items, profiles and the ledger reset. Admin only, except
//! the read-only lists which any signed-in role may use.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use stockhub_core::validation::{
    validate_name, validate_password, validate_price_cents, validate_table_count, validate_username,
};
use stockhub_core::{Capability, MenuItem, Outlet, Role, UserProfile};
use stockhub_db::{hash_password, ResetSummary};
use tracing::{info, warn};
use uuid::Uuid;

use super::load_outlet;
use crate::api_types::{
    CreateProfileRequest, MenuItemRequest, MenuQuery, OutletRequest, UpdateProfileRequest,
};
use crate::auth::SessionContext;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn clean_location(location: Option<String>) -> Option<String> {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

fn validate_outlet(req: &OutletRequest) -> ApiResult<()> {
    validate_name("name", &req.name)?;
    validate_table_count(req.table_count)?;
    Ok(())
}

fn validate_menu_item(req: &MenuItemRequest) -> ApiResult<()> {
    validate_name("name", &req.name)?;
    validate_name("category", &req.category)?;
    validate_name("unit", &req.unit)?;
    validate_price_cents("basePriceCents", req.base_price_cents)?;
    Ok(())
}

/// Managers and staff must be pinned to an outlet of the organization.
async fn check_assignment(
    st: &AppState,
    session: &SessionContext,
    role: Role,
    outlet_id: Option<&str>,
) -> ApiResult<()> {
    match outlet_id {
        Some(outlet_id) => {
            load_outlet(st, session, outlet_id).await?;
        }
        None if matches!(role, Role::Manager | Role::Staff) => {
            return Err(ApiError::validation(format!(
                "{} profiles need an outlet",
                role.as_str()
            )));
        }
        None => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// /v1/outlets
// ---------------------------------------------------------------------------

pub(crate) async fn list_outlets(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
) -> ApiResult<Json<Vec<Outlet>>> {
    Ok(Json(st.db.outlets().list(&session.organization_id).await?))
}

pub(crate) async fn create_outlet(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Json(req): Json<OutletRequest>,
) -> ApiResult<(StatusCode, Json<Outlet>)> {
    session.require(Capability::ManageCatalog)?;
    validate_outlet(&req)?;

    let outlet = Outlet {
        id: Uuid::new_v4().to_string(),
        organization_id: session.organization_id.clone(),
        name: req.name.trim().to_string(),
        location: clean_location(req.location),
        table_count: req.table_count,
        created_at: Utc::now(),
    };
    st.db.outlets().insert(&outlet).await?;

    info!(outlet = %outlet.id, name = %outlet.name, "Outlet created");
    Ok((StatusCode::CREATED, Json(outlet)))
}

pub(crate) async fn update_outlet(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(id): Path<String>,
    Json(req): Json<OutletRequest>,
) -> ApiResult<Json<Outlet>> {
    session.require(Capability::ManageCatalog)?;
    validate_outlet(&req)?;

    let existing = load_outlet(&st, &session, &id).await?;
    let outlet = Outlet {
        name: req.name.trim().to_string(),
        location: clean_location(req.location),
        table_count: req.table_count,
        ..existing
    };
    st.db.outlets().update(&outlet).await?;

    Ok(Json(outlet))
}

// ---------------------------------------------------------------------------
// /v1/menu
// ---------------------------------------------------------------------------

pub(crate) async fn list_menu(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    let items = st
        .db
        .menu()
        .list(&session.organization_id, query.include_inactive)
        .await?;
    Ok(Json(items))
}

pub(crate) async fn create_menu_item(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Json(req): Json<MenuItemRequest>,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    session.require(Capability::ManageCatalog)?;
    validate_menu_item(&req)?;

    let now = Utc::now();
    let item = MenuItem {
        id: Uuid::new_v4().to_string(),
        organization_id: session.organization_id.clone(),
        name: req.name.trim().to_string(),
        category: req.category.trim().to_string(),
        unit: req.unit.trim().to_string(),
        base_price_cents: req.base_price_cents,
        is_market_priced: req.is_market_priced,
        requires_daily_stock: req.requires_daily_stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    st.db.menu().insert(&item).await?;

    info!(item = %item.id, name = %item.name, tracked = item.requires_daily_stock, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub(crate) async fn update_menu_item(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(id): Path<String>,
    Json(req): Json<MenuItemRequest>,
) -> ApiResult<Json<MenuItem>> {
    session.require(Capability::ManageCatalog)?;
    validate_menu_item(&req)?;

    let existing = st.db.menu().get(&session.organization_id, &id).await?;
    let is_active = req.is_active.unwrap_or(existing.is_active);
    let item = MenuItem {
        name: req.name.trim().to_string(),
        category: req.category.trim().to_string(),
        unit: req.unit.trim().to_string(),
        base_price_cents: req.base_price_cents,
        is_market_priced: req.is_market_priced,
        requires_daily_stock: req.requires_daily_stock,
        is_active,
        ..existing
    };

    Ok(Json(st.db.menu().update(&item).await?))
}

pub(crate) async fn deactivate_menu_item(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    session.require(Capability::ManageCatalog)?;
    st.db.menu().deactivate(&session.organization_id, &id).await?;
    info!(item = %id, "Menu item deactivated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// /v1/profiles
// ---------------------------------------------------------------------------

pub(crate) async fn list_profiles(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
) -> ApiResult<Json<Vec<UserProfile>>> {
    session.require(Capability::ManageCatalog)?;
    Ok(Json(st.db.profiles().list(&session.organization_id).await?))
}

pub(crate) async fn create_profile(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Json(req): Json<CreateProfileRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    session.require(Capability::ManageCatalog)?;
    validate_name("fullName", &req.full_name)?;
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    check_assignment(&st, &session, req.role, req.outlet_id.as_deref()).await?;

    let profile = UserProfile {
        id: Uuid::new_v4().to_string(),
        organization_id: session.organization_id.clone(),
        full_name: req.full_name.trim().to_string(),
        role: req.role,
        outlet_id: req.outlet_id,
        username: Some(req.username.trim().to_string()),
        password_hash: Some(hash_password(&req.password)?),
        created_at: Utc::now(),
    };
    st.db.profiles().insert(&profile).await?;

    info!(user = %profile.id, role = profile.role.as_str(), "Profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

pub(crate) async fn update_profile(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    session.require(Capability::ManageCatalog)?;

    if id == session.user_id && req.role != Role::Admin {
        return Err(ApiError::validation("Admins cannot demote themselves"));
    }
    check_assignment(&st, &session, req.role, req.outlet_id.as_deref()).await?;

    let profile = st
        .db
        .profiles()
        .update_assignment(&session.organization_id, &id, req.role, req.outlet_id.as_deref())
        .await?;

    info!(user = %id, role = req.role.as_str(), "Profile assignment changed");
    Ok(Json(profile))
}

// ---------------------------------------------------------------------------
// POST /v1/admin/reset
// ---------------------------------------------------------------------------

/// Deletes every master stock, distribution and sale row of the caller's
/// organization and drops the open terminal carts of its outlets.
pub(crate) async fn reset_ledgers(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
) -> ApiResult<Json<ResetSummary>> {
    session.require(Capability::ResetLedgers)?;

    let summary = st.db.ledgers().reset(&session.organization_id).await?;

    let outlet_ids: Vec<String> = match st.db.outlets().list(&session.organization_id).await {
        Ok(outlets) => outlets.into_iter().map(|o| o.id).collect(),
        Err(e) => {
            warn!(error = %e, "Could not list outlets after reset, carts kept");
            Vec::new()
        }
    };
    let dropped = st.terminals.forget_outlets(&outlet_ids);

    warn!(
        org = %session.organization_id,
        by = %session.user_id,
        master_stocks = summary.master_stocks,
        daily_stocks = summary.daily_stocks,
        transactions = summary.transactions,
        carts_dropped = dropped,
        "Ledgers reset"
    );
    Ok(Json(summary))
}
