//! # Distribution Repository
//!
//! The `daily_stocks` ledger. Rows are only ever appended; an adjustment is
//! a new signed row, and a trigger aborts any UPDATE.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
use crate::error::DbResult;
use stockhub_core::distribution::{DistributionDecision, DistributionOutcome, ItemDistributionResult};
use stockhub_core::DistributionEntry;

#[derive(Debug, Clone)]
pub struct DistributionRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

/// Who is writing, for which outlet and day.
#[derive(Debug, Clone)]
pub struct DistributionContext<'a> {
    pub organization_id: &'a str,
    pub outlet_id: &'a str,
    pub day: NaiveDate,
    pub created_by: &'a str,
    pub now: DateTime<Utc>,
}

impl DistributionRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        DistributionRepository { pool, feed }
    }

    pub async fn for_day(&self, organization_id: &str, day: NaiveDate) -> DbResult<Vec<DistributionEntry>> {
        let rows = sqlx::query_as::<_, DistributionEntry>(
            r#"
            SELECT id, organization_id, outlet_id, menu_item_id, stock_date,
                   quantity, created_by, created_at
            FROM daily_stocks
            WHERE organization_id = ?1 AND stock_date = ?2
            ORDER BY created_at, id
            "#,
        )
        .bind(organization_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn append(&self, entry: &DistributionEntry) -> DbResult<()> {
        debug!(
            outlet = %entry.outlet_id,
            item = %entry.menu_item_id,
            quantity = entry.quantity,
            "Appending distribution"
        );

        sqlx::query(
            r#"
            INSERT INTO daily_stocks (
                id, organization_id, outlet_id, menu_item_id, stock_date,
                quantity, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.organization_id)
        .bind(&entry.outlet_id)
        .bind(&entry.menu_item_id)
        .bind(entry.stock_date)
        .bind(entry.quantity)
        .bind(&entry.created_by)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        self.feed.publish(ChangeEvent::new(
            ChangeTable::DailyStocks,
            ChangeOp::Insert,
            &entry.organization_id,
            &entry.id,
        ));
        Ok(())
    }

    /// Writes the accepted items of a planned batch, one row each. A failed
    /// insert turns into a rejection for that item only.
    pub async fn apply(
        &self,
        ctx: &DistributionContext<'_>,
        decisions: Vec<DistributionDecision>,
    ) -> Vec<ItemDistributionResult> {
        let mut results = Vec::with_capacity(decisions.len());

        for decision in decisions {
            let (menu_item_id, outcome) = match decision {
                DistributionDecision::Append {
                    menu_item_id,
                    quantity,
                } => {
                    let entry = DistributionEntry::new(
                        ctx.organization_id,
                        ctx.outlet_id,
                        &menu_item_id,
                        ctx.day,
                        quantity,
                        ctx.created_by,
                        ctx.now,
                    );
                    let outcome = match self.append(&entry).await {
                        Ok(()) => DistributionOutcome::Written { quantity },
                        Err(e) => {
                            warn!(item = %menu_item_id, error = %e, "Distribution insert failed");
                            DistributionOutcome::Rejected { reason: e.to_string() }
                        }
                    };
                    (menu_item_id, outcome)
                }
                DistributionDecision::Skip { menu_item_id } => (menu_item_id, DistributionOutcome::Skipped),
                DistributionDecision::Reject { menu_item_id, error } => {
                    (menu_item_id, DistributionOutcome::Rejected { reason: error.to_string() })
                }
            };
            results.push(ItemDistributionResult { menu_item_id, outcome });
        }

        let written = results
            .iter()
            .filter(|r| matches!(r.outcome, DistributionOutcome::Written { .. }))
            .count();
        info!(
            outlet = %ctx.outlet_id,
            day = %ctx.day,
            written,
            total = results.len(),
            "Distribution batch applied"
        );
        results
    }
}
