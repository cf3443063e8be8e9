use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use stockhub_core::reconciliation::local_day_window;
use stockhub_core::report::{build_daily_report, DailyReport};
use stockhub_core::Capability;
use tracing::debug;

use super::resolve_day;
use crate::api_types::DayQuery;
use crate::auth::SessionContext;
use crate::error::ApiResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /v1/reports/daily?date=YYYY-MM-DD
// ---------------------------------------------------------------------------

pub(crate) async fn daily_report(
    State(st): State<Arc<AppState>>,
    session: SessionContext,
    Query(query): Query<DayQuery>,
) -> ApiResult<Json<DailyReport>> {
    session.require(Capability::ViewReports)?;
    let day = resolve_day(&st, query.date.as_deref())?;
    let offset = st.utc_offset();
    let (start, end) = local_day_window(day, offset);
    let org = &session.organization_id;

    let outlets = st.db.outlets().list(org).await?;
    let transactions = st.db.sales().transactions_between(org, start, end).await?;
    let lines = st.db.sales().line_items_between(org, start, end).await?;
    let view = st.db.ledgers().stock_view(org, day, offset).await;

    debug!(%day, transactions = transactions.len(), lines = lines.len(), "Building daily report");
    Ok(Json(build_daily_report(&view, &outlets, &transactions, &lines)))
}
