//! Organization bootstrap, login and the current session.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use stockhub_core::validation::{validate_name, validate_password, validate_username};
use stockhub_core::{Role, UserProfile};
use stockhub_db::{hash_password, verify_password};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api_types::{BootstrapRequest, BootstrapResponse, LoginRequest, LoginResponse};
use crate::auth::SessionContext;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /v1/organizations
// ---------------------------------------------------------------------------

pub(crate) async fn bootstrap_organization(
    State(st): State<Arc<AppState>>,
    Json(req): Json<BootstrapRequest>,
) -> ApiResult<(StatusCode, Json<BootstrapResponse>)> {
    validate_name("name", &req.name)?;
    validate_name("adminFullName", &req.admin_full_name)?;
    validate_username(&req.admin_username)?;
    validate_password(&req.admin_password)?;

    let password_hash = hash_password(&req.admin_password)?;
    let organization = st.db.organizations().create(req.name.trim()).await?;

    let admin = UserProfile {
        id: Uuid::new_v4().to_string(),
        organization_id: organization.id.clone(),
        full_name: req.admin_full_name.trim().to_string(),
        role: Role::Admin,
        outlet_id: None,
        username: Some(req.admin_username.trim().to_string()),
        password_hash: Some(password_hash),
        created_at: Utc::now(),
    };
    st.db.profiles().insert(&admin).await?;

    info!(org = %organization.id, name = %organization.name, "Organization bootstrapped");
    Ok((
        StatusCode::CREATED,
        Json(BootstrapResponse {
            organization,
            admin,
        }),
    ))
}

// ---------------------------------------------------------------------------
// POST /v1/auth/login
// ---------------------------------------------------------------------------

pub(crate) async fn login(
    State(st): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let invalid = || ApiError::unauthorized("Invalid username or password");

    let profile = st
        .db
        .profiles()
        .find_by_username(&req.organization_id, req.username.trim())
        .await?
        .ok_or_else(invalid)?;

    let verified = profile
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&req.password, hash));
    if !verified {
        warn!(org = %req.organization_id, username = %req.username, "Login rejected");
        return Err(invalid());
    }

    if profile.role == Role::Inactive {
        return Err(ApiError::unauthorized("Account is inactive"));
    }

    let access_token = st.jwt.generate_access_token(&profile)?;
    info!(user = %profile.id, role = profile.role.as_str(), "Login");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: st.jwt.access_lifetime_secs(),
        session: SessionContext::from_profile(&profile),
    }))
}

// ---------------------------------------------------------------------------
// GET /v1/auth/me
// ---------------------------------------------------------------------------

pub(crate) async fn me(session: SessionContext) -> Json<SessionContext> {
    Json(session)
}
