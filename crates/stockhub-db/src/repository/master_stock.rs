//! # Master Stock Repository
//!
//! One row per (organization, item, day), written by upsert. A total of zero
//! is stored as "no row" so the item drops out of the day's distribution list.
//!
//! ```text
//! plan_master_stock()          apply()
//! ───────────────────          ───────────────────────────────────────────
//! Upsert { qty, price }  ───►  INSERT .. ON CONFLICT (org,item,date) DO UPDATE
//! Delete                 ───►  DELETE WHERE (org,item,date)
//! Reject { error }       ───►  reported, nothing written
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
use crate::error::DbResult;
use stockhub_core::master_stock::{ItemMasterStockResult, MasterStockDecision, MasterStockOutcome};
use stockhub_core::MasterStockEntry;

#[derive(Debug, Clone)]
pub struct MasterStockRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl MasterStockRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        MasterStockRepository { pool, feed }
    }

    /// All master rows of the organization for `day`.
    pub async fn for_day(&self, organization_id: &str, day: NaiveDate) -> DbResult<Vec<MasterStockEntry>> {
        let rows = sqlx::query_as::<_, MasterStockEntry>(
            r#"
            SELECT id, organization_id, menu_item_id, stock_date, total_quantity, daily_price_cents
            FROM master_stocks
            WHERE organization_id = ?1 AND stock_date = ?2
            "#,
        )
        .bind(organization_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Inserts or replaces the (organization, item, day) row and returns it.
    pub async fn upsert(
        &self,
        organization_id: &str,
        menu_item_id: &str,
        day: NaiveDate,
        total_quantity: i64,
        daily_price_cents: Option<i64>,
    ) -> DbResult<MasterStockEntry> {
        debug!(item = %menu_item_id, %day, total_quantity, "Upserting master stock");

        let entry = sqlx::query_as::<_, MasterStockEntry>(
            r#"
            INSERT INTO master_stocks (
                id, organization_id, menu_item_id, stock_date,
                total_quantity, daily_price_cents, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (organization_id, menu_item_id, stock_date) DO UPDATE SET
                total_quantity = excluded.total_quantity,
                daily_price_cents = excluded.daily_price_cents,
                updated_at = excluded.updated_at
            RETURNING id, organization_id, menu_item_id, stock_date, total_quantity, daily_price_cents
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(organization_id)
        .bind(menu_item_id)
        .bind(day)
        .bind(total_quantity)
        .bind(daily_price_cents)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        self.feed.publish(ChangeEvent::new(
            ChangeTable::MasterStocks,
            ChangeOp::Update,
            organization_id,
            &entry.id,
        ));
        Ok(entry)
    }

    /// Removes the day's row. Returns `false` when there was none.
    pub async fn delete(&self, organization_id: &str, menu_item_id: &str, day: NaiveDate) -> DbResult<bool> {
        let result = sqlx::query(
            "DELETE FROM master_stocks WHERE organization_id = ?1 AND menu_item_id = ?2 AND stock_date = ?3",
        )
        .bind(organization_id)
        .bind(menu_item_id)
        .bind(day)
        .execute(&self.pool)
        .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.feed.publish(ChangeEvent::new(
                ChangeTable::MasterStocks,
                ChangeOp::Delete,
                organization_id,
                menu_item_id,
            ));
        }
        Ok(deleted)
    }

    /// Applies a planned batch item by item. A failed write is reported as a
    /// rejection for that item; the rest of the batch still runs.
    pub async fn apply(
        &self,
        organization_id: &str,
        day: NaiveDate,
        decisions: Vec<MasterStockDecision>,
    ) -> Vec<ItemMasterStockResult> {
        let mut results = Vec::with_capacity(decisions.len());

        for decision in decisions {
            let (menu_item_id, outcome) = match decision {
                MasterStockDecision::Upsert {
                    menu_item_id,
                    total_quantity,
                    daily_price_cents,
                } => {
                    let outcome = match self
                        .upsert(organization_id, &menu_item_id, day, total_quantity, daily_price_cents)
                        .await
                    {
                        Ok(entry) => MasterStockOutcome::Upserted {
                            quantity: entry.total_quantity,
                        },
                        Err(e) => {
                            warn!(item = %menu_item_id, error = %e, "Master stock upsert failed");
                            MasterStockOutcome::Rejected { reason: e.to_string() }
                        }
                    };
                    (menu_item_id, outcome)
                }
                MasterStockDecision::Delete { menu_item_id } => {
                    let outcome = match self.delete(organization_id, &menu_item_id, day).await {
                        Ok(_) => MasterStockOutcome::Deleted,
                        Err(e) => {
                            warn!(item = %menu_item_id, error = %e, "Master stock delete failed");
                            MasterStockOutcome::Rejected { reason: e.to_string() }
                        }
                    };
                    (menu_item_id, outcome)
                }
                MasterStockDecision::Reject { menu_item_id, error } => {
                    (menu_item_id, MasterStockOutcome::Rejected { reason: error.to_string() })
                }
            };
            results.push(ItemMasterStockResult { menu_item_id, outcome });
        }

        info!(
            org = %organization_id,
            %day,
            items = results.len(),
            "Master stock batch applied"
        );
        results
    }
}
