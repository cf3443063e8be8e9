//! # Ledger Repository
//!
//! Reads the three ledgers plus the menu for one organization and day, and
//! folds them into a [`StockView`]. Nothing is cached: every call refetches.
//!
//! ```text
//! menu_items ─────┐
//! master_stocks ──┤  snapshot(org, day)  ──►  StockView::build()
//! daily_stocks ───┤
//! transactions ───┘  (sales restricted to the local day window)
//! ```
//!
//! Also owns the admin reset, which empties every ledger of an organization.

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
use crate::error::DbResult;
use crate::repository::distribution::DistributionRepository;
use crate::repository::master_stock::MasterStockRepository;
use crate::repository::menu::MenuRepository;
use crate::repository::sale::SaleRepository;
use stockhub_core::reconciliation::{local_day_window, LedgerSet};
use stockhub_core::{DistributionEntry, MasterStockEntry, MenuItem, SoldLine, StockView};

/// Owned rows behind one stock view.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub day: NaiveDate,
    pub offset: FixedOffset,
    pub menu: Vec<MenuItem>,
    pub master: Vec<MasterStockEntry>,
    pub distributions: Vec<DistributionEntry>,
    pub sales: Vec<SoldLine>,
}

impl LedgerSnapshot {
    pub fn view(&self) -> StockView {
        StockView::build(
            self.day,
            self.offset,
            &self.menu,
            LedgerSet {
                master: &self.master,
                distributions: &self.distributions,
                sales: &self.sales,
            },
        )
    }
}

/// Rows removed by a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    pub master_stocks: u64,
    pub daily_stocks: u64,
    pub transactions: u64,
    pub transaction_items: u64,
}

#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        LedgerRepository { pool, feed }
    }

    /// Fetches everything the fold needs. The menu includes inactive items so
    /// historical sales still resolve to a name.
    pub async fn snapshot(
        &self,
        organization_id: &str,
        day: NaiveDate,
        offset: FixedOffset,
    ) -> DbResult<LedgerSnapshot> {
        let (start, end) = local_day_window(day, offset);

        let menu = MenuRepository::new(self.pool.clone(), self.feed.clone())
            .list(organization_id, true)
            .await?;
        let master = MasterStockRepository::new(self.pool.clone(), self.feed.clone())
            .for_day(organization_id, day)
            .await?;
        let distributions = DistributionRepository::new(self.pool.clone(), self.feed.clone())
            .for_day(organization_id, day)
            .await?;
        let sales = SaleRepository::new(self.pool.clone(), self.feed.clone())
            .sold_lines(organization_id, start, end)
            .await?;

        Ok(LedgerSnapshot {
            day,
            offset,
            menu,
            master,
            distributions,
            sales,
        })
    }

    /// The reconciled view for `day`. A failed read is logged and yields a
    /// view with no ledger rows (and, if the menu is unreadable too, no menu).
    pub async fn stock_view(&self, organization_id: &str, day: NaiveDate, offset: FixedOffset) -> StockView {
        match self.snapshot(organization_id, day, offset).await {
            Ok(snapshot) => snapshot.view(),
            Err(e) => {
                warn!(org = %organization_id, %day, error = %e, "Ledger read failed, using empty view");
                let menu = MenuRepository::new(self.pool.clone(), self.feed.clone())
                    .list(organization_id, true)
                    .await
                    .unwrap_or_default();
                StockView::empty(day, &menu)
            }
        }
    }

    /// Deletes every ledger row of the organization in one database
    /// transaction. Menu, outlets and profiles are kept.
    pub async fn reset(&self, organization_id: &str) -> DbResult<ResetSummary> {
        let mut tx = self.pool.begin().await?;

        let transaction_items = sqlx::query(
            "DELETE FROM transaction_items WHERE transaction_id IN
                (SELECT id FROM transactions WHERE organization_id = ?1)",
        )
        .bind(organization_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let transactions = sqlx::query("DELETE FROM transactions WHERE organization_id = ?1")
            .bind(organization_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let daily_stocks = sqlx::query("DELETE FROM daily_stocks WHERE organization_id = ?1")
            .bind(organization_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let master_stocks = sqlx::query("DELETE FROM master_stocks WHERE organization_id = ?1")
            .bind(organization_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        let summary = ResetSummary {
            master_stocks,
            daily_stocks,
            transactions,
            transaction_items,
        };
        info!(org = %organization_id, ?summary, "Ledgers reset");

        for table in [
            ChangeTable::TransactionItems,
            ChangeTable::Transactions,
            ChangeTable::DailyStocks,
            ChangeTable::MasterStocks,
        ] {
            self.feed
                .publish(ChangeEvent::bulk(table, ChangeOp::Delete, organization_id));
        }

        Ok(summary)
    }
}
