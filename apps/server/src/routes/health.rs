use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::api_types::HealthResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

/// 200 while the database answers, 503 otherwise.
pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let database = st.db.health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            ok: database,
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
        }),
    )
}
