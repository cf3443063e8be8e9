//! `GET /v1/stream`: server-sent events for one organization.
//!
//! Two event names:
//! - `change`: a [`ChangeEvent`] from the database feed (refetch trigger)
//! - `advisory`: an [`AdvisoryMessage`] (stock available, low stock)
//!
//! A subscriber that falls behind skips the missed events; its next refetch
//! catches up.

use std::convert::Infallible;
use std::future::ready;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::{stream, StreamExt};
use stockhub_db::ChangeEvent;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use crate::api_types::StreamQuery;
use crate::auth::{extract_bearer_token, resolve_session};
use crate::broadcast::AdvisoryMessage;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn stream(
    State(st): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
    request_headers: HeaderMap,
) -> ApiResult<Response> {
    let header_token = request_headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token);
    let token = header_token
        .or(query.token.as_deref())
        .ok_or_else(|| ApiError::unauthorized("Missing token"))?;

    let session = resolve_session(&st, token).await?;
    let org = session.organization_id;
    info!(user = %session.user_id, org = %org, "Stream subscriber connected");

    let changes = {
        let org = org.clone();
        BroadcastStream::new(st.db.changes().subscribe())
            .filter_map(move |msg| ready(change_to_sse(&org, msg.ok())))
    };
    let advisories = BroadcastStream::new(st.broadcaster.subscribe())
        .filter_map(move |msg| ready(advisory_to_sse(&org, msg.ok())));

    let events = stream::select(changes, advisories);

    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    Ok((headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response())
}

fn change_to_sse(org: &str, event: Option<ChangeEvent>) -> Option<Result<Event, Infallible>> {
    let event = event.filter(|e| e.organization_id == org)?;
    let data = serde_json::to_string(&event).ok()?;
    Some(Ok(Event::default().event("change").data(data)))
}

fn advisory_to_sse(org: &str, message: Option<AdvisoryMessage>) -> Option<Result<Event, Infallible>> {
    let message = message.filter(|m| m.organization_id == org)?;
    let data = serde_json::to_string(&message).ok()?;
    Some(Ok(Event::default().event("advisory").data(data)))
}
