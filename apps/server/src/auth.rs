//! Session tokens and the per-request session context.
//!
//! Login issues an HS256 access token whose subject is the profile id. Each
//! authenticated request re-reads the profile, so a role change or a
//! deactivation takes effect on the very next call.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use stockhub_core::{Capability, CoreResult, Role, UserProfile};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

const ACCESS_TOKEN: &str = "access";

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id
    pub sub: String,
    pub organization_id: String,
    /// Role at issue time. Informational; the stored profile wins.
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, access_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
        }
    }

    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime_secs
    }

    pub fn generate_access_token(&self, profile: &UserProfile) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: profile.id.clone(),
            organization_id: profile.organization_id.clone(),
            role: profile.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        if token_data.claims.token_type != ACCESS_TOKEN {
            return Err(ApiError::unauthorized("Expected access token"));
        }

        Ok(token_data.claims)
    }
}

pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Session Context
// =============================================================================

/// Who is calling, resolved from the bearer token and the stored profile.
///
/// Handlers take it as an extractor argument; nothing about the caller is
/// kept anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: String,
    pub organization_id: String,
    /// Assigned outlet, if any. Pins terminal access for managers and staff.
    pub outlet_id: Option<String>,
    pub role: Role,
    pub full_name: String,
}

impl SessionContext {
    pub fn from_profile(profile: &UserProfile) -> Self {
        SessionContext {
            user_id: profile.id.clone(),
            organization_id: profile.organization_id.clone(),
            outlet_id: profile.outlet_id.clone(),
            role: profile.role,
            full_name: profile.full_name.clone(),
        }
    }

    pub fn require(&self, capability: Capability) -> CoreResult<()> {
        self.role.require(capability)
    }

    /// Checks terminal access to `outlet_id`.
    pub fn authorize_terminal(&self, outlet_id: &str) -> CoreResult<()> {
        stockhub_core::roles::authorize_terminal(self.role, self.outlet_id.as_deref(), outlet_id)
    }
}

impl FromRequestParts<Arc<AppState>> for SessionContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Expected a Bearer token"))?;

        resolve_session(state, token).await
    }
}

/// Validates `token` and loads the profile behind it.
pub async fn resolve_session(state: &AppState, token: &str) -> Result<SessionContext, ApiError> {
    let claims = state.jwt.validate_access_token(token)?;

    let profile = state
        .db
        .profiles()
        .get_by_id(&claims.organization_id, &claims.sub)
        .await
        .map_err(|e| {
            tracing::debug!(user = %claims.sub, error = %e, "Token subject not found");
            ApiError::unauthorized("Session is no longer valid")
        })?;

    if profile.role == Role::Inactive {
        return Err(ApiError::unauthorized("Account is inactive"));
    }

    Ok(SessionContext::from_profile(&profile))
}
